//! Seed positions for bodies created without coordinates.
//!
//! Bodies are laid out on a sunflower spiral (Fermat's spiral with the golden
//! angle) around the gravity center, which keeps successive seeds apart and
//! roughly uniform in density without any randomness.

/// Position of the `index`-th auto-placed body.
///
/// `spacing` is the approximate distance between neighboring seeds.
pub fn seed_position(index: usize, center: (f64, f64), spacing: f64) -> (f64, f64) {
    let golden_angle = std::f64::consts::TAU / (1.0 + 5.0f64.sqrt());
    let angle = index as f64 * golden_angle;
    let radius = spacing * (index as f64 + 0.5).sqrt();

    (
        center.0 + radius * angle.cos(),
        center.1 + radius * angle.sin(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_seed_is_off_center() {
        let (x, y) = seed_position(0, (10.0, 20.0), 50.0);
        let d = (x - 10.0).hypot(y - 20.0);
        assert!((d - 50.0 * 0.5f64.sqrt()).abs() < 1e-9);
    }

    #[test]
    fn test_seeds_do_not_coincide() {
        let seeds: Vec<_> = (0..200).map(|i| seed_position(i, (0.0, 0.0), 20.0)).collect();
        for (i, a) in seeds.iter().enumerate() {
            for b in &seeds[i + 1..] {
                assert!((a.0 - b.0).hypot(a.1 - b.1) > 1.0);
            }
        }
    }
}
