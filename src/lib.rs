//! Network Physics - WASM Module
//!
//! This module provides the force-directed layout simulation behind the
//! interactive network chart. Nodes are simulated as bodies, links as
//! springs; the simulation pulls everything toward a gravity center, pushes
//! bodies apart and lets springs settle the layout. It is compiled to
//! WebAssembly and exposes a JavaScript-friendly API via wasm-bindgen.
//!
//! # Architecture
//!
//! - `config`: Physics constants, deserializable from a JS object
//! - `graph`: Bodies and springs with stable handles
//! - `simulation`: Force field, integrator, stability test and the simulator
//! - `spatial`: R-tree index for picking bodies under the pointer
//!
//! The module holds no timer. The host calls `tick()` once per animation
//! frame and stops scheduling frames as soon as it returns `false`.

use js_sys::Float64Array;
use wasm_bindgen::prelude::*;

pub mod config;
pub mod error;
pub mod graph;
pub mod simulation;
pub mod spatial;

pub use config::{PhysicsConfig, StepScheme};
pub use error::{Error, Handle};
pub use graph::{AxisPins, Body, BodyId, Spring, SpringId};
pub use simulation::{NewBody, Simulator, Stabilization};

/// Initialize the WASM module.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// Main entry point for the physics engine.
///
/// This struct wraps the internal Simulator and provides the public API
/// exposed to JavaScript. Body and spring handles cross the boundary as
/// plain `u32` values; using one after removal throws.
#[wasm_bindgen]
pub struct NetworkPhysicsWasm {
    simulator: Simulator,
}

#[wasm_bindgen]
impl NetworkPhysicsWasm {
    /// Create an empty simulation with default constants.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            simulator: Simulator::new(),
        }
    }

    /// Create an empty simulation from a config object.
    ///
    /// Keys are camelCase and optional, e.g. `{ gravityStrength: 0.02 }`.
    #[wasm_bindgen(js_name = withConfig)]
    pub fn with_config(config: JsValue) -> Result<NetworkPhysicsWasm, JsError> {
        let config = parse_config(config)?;
        Ok(Self {
            simulator: Simulator::with_config(config)?,
        })
    }

    // =========================================================================
    // Configuration
    // =========================================================================

    /// Replace the physics constants.
    #[wasm_bindgen(js_name = setConfig)]
    pub fn set_config(&mut self, config: JsValue) -> Result<(), JsError> {
        let config = parse_config(config)?;
        self.simulator.set_config(config)?;
        Ok(())
    }

    /// Get the current physics constants as a plain object.
    #[wasm_bindgen(js_name = getConfig)]
    pub fn get_config(&self) -> Result<JsValue, JsError> {
        serde_wasm_bindgen::to_value(self.simulator.config())
            .map_err(|e| JsError::new(&e.to_string()))
    }

    /// Set the point all bodies are pulled toward (normally the viewport center).
    #[wasm_bindgen(js_name = setGravityCenter)]
    pub fn set_gravity_center(&mut self, x: f64, y: f64) -> Result<(), JsError> {
        self.simulator.set_gravity_center(x, y)?;
        Ok(())
    }

    // =========================================================================
    // Body Operations
    // =========================================================================

    /// Create a body.
    ///
    /// Without `x` and `y` the body is seeded near the gravity center. Giving
    /// only one of them throws.
    /// `massWeight` replaces the configured base mass for this body.
    #[wasm_bindgen(js_name = createBody)]
    pub fn create_body(
        &mut self,
        x: Option<f64>,
        y: Option<f64>,
        pinned_x: Option<bool>,
        pinned_y: Option<bool>,
        mass_weight: Option<f64>,
    ) -> Result<u32, JsError> {
        let new = NewBody {
            position: explicit_position(x, y)?,
            pinned_x: pinned_x.unwrap_or(false),
            pinned_y: pinned_y.unwrap_or(false),
            mass_weight,
        };
        Ok(self.simulator.create_body(new)?.raw())
    }

    /// Remove a body together with its springs.
    #[wasm_bindgen(js_name = removeBody)]
    pub fn remove_body(&mut self, body_id: u32) -> Result<(), JsError> {
        self.simulator.remove_body(BodyId(body_id))?;
        Ok(())
    }

    /// Move a body (used while dragging).
    #[wasm_bindgen(js_name = setPosition)]
    pub fn set_position(&mut self, body_id: u32, x: f64, y: f64) -> Result<(), JsError> {
        self.simulator.set_position(BodyId(body_id), x, y)?;
        Ok(())
    }

    /// Pin or release the axes of a body.
    #[wasm_bindgen(js_name = setPinned)]
    pub fn set_pinned(
        &mut self,
        body_id: u32,
        x_pinned: bool,
        y_pinned: bool,
    ) -> Result<(), JsError> {
        self.simulator.set_pinned(BodyId(body_id), x_pinned, y_pinned)?;
        Ok(())
    }

    /// Get a body's X position.
    #[wasm_bindgen(js_name = getX)]
    pub fn get_x(&self, body_id: u32) -> Result<f64, JsError> {
        Ok(self.simulator.position(BodyId(body_id))?.0)
    }

    /// Get a body's Y position.
    #[wasm_bindgen(js_name = getY)]
    pub fn get_y(&self, body_id: u32) -> Result<f64, JsError> {
        Ok(self.simulator.position(BodyId(body_id))?.1)
    }

    /// Get the number of bodies.
    #[wasm_bindgen(js_name = bodyCount)]
    pub fn body_count(&self) -> u32 {
        self.simulator.body_count() as u32
    }

    /// Live body IDs, in the same order as `positions()`.
    #[wasm_bindgen(js_name = bodyIds)]
    pub fn body_ids(&self) -> Vec<u32> {
        self.simulator.body_ids().into_iter().map(BodyId::raw).collect()
    }

    /// Interleaved positions [x0, y0, x1, y1, ...] for the renderer.
    pub fn positions(&self) -> Float64Array {
        Float64Array::from(&self.simulator.positions()[..])
    }

    // =========================================================================
    // Spring Operations
    // =========================================================================

    /// Connect two bodies. Passing the same body twice creates a self-loop.
    #[wasm_bindgen(js_name = createSpring)]
    pub fn create_spring(
        &mut self,
        from: u32,
        to: u32,
        rest_length: Option<f64>,
    ) -> Result<u32, JsError> {
        let id = self
            .simulator
            .create_spring(BodyId(from), BodyId(to), rest_length)?;
        Ok(id.raw())
    }

    #[wasm_bindgen(js_name = removeSpring)]
    pub fn remove_spring(&mut self, spring_id: u32) -> Result<(), JsError> {
        self.simulator.remove_spring(SpringId(spring_id))?;
        Ok(())
    }

    #[wasm_bindgen(js_name = setRestLength)]
    pub fn set_rest_length(&mut self, spring_id: u32, rest_length: f64) -> Result<(), JsError> {
        self.simulator.set_rest_length(SpringId(spring_id), rest_length)?;
        Ok(())
    }

    /// Get the number of springs.
    #[wasm_bindgen(js_name = springCount)]
    pub fn spring_count(&self) -> u32 {
        self.simulator.spring_count() as u32
    }

    // =========================================================================
    // Simulation
    // =========================================================================

    /// Run one cycle. Returns true while the host should keep ticking.
    ///
    /// `dt` defaults to the configured time step.
    pub fn tick(&mut self, dt: Option<f64>) -> Result<bool, JsError> {
        let moving = match dt {
            Some(dt) => self.simulator.tick_with(dt)?,
            None => self.simulator.tick(),
        };
        Ok(moving)
    }

    /// Run cycles until the layout settles. Returns whether it converged
    /// before `iterationCap` (defaults to the configured cap).
    pub fn stabilize(&mut self, iteration_cap: Option<u32>) -> bool {
        let result = match iteration_cap {
            Some(cap) => self.simulator.stabilize_with_cap(cap),
            None => self.simulator.stabilize(),
        };
        result.converged
    }

    /// Whether anything moves, without running a cycle.
    #[wasm_bindgen(js_name = isMoving)]
    pub fn is_moving(&self) -> bool {
        self.simulator.is_moving()
    }

    /// Total cycles run.
    #[wasm_bindgen(js_name = cycleCount)]
    pub fn cycle_count(&self) -> f64 {
        self.simulator.cycle_count() as f64
    }

    // =========================================================================
    // Picking
    // =========================================================================

    /// Find the nearest body within `radius` of a point.
    #[wasm_bindgen(js_name = bodyAt)]
    pub fn body_at(&mut self, x: f64, y: f64, radius: f64) -> Option<u32> {
        self.simulator.body_at(x, y, radius).map(BodyId::raw)
    }

    /// Find all bodies within a rectangular region.
    #[wasm_bindgen(js_name = bodiesInRect)]
    pub fn bodies_in_rect(&mut self, min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Vec<u32> {
        self.simulator
            .bodies_in_rect((min_x, min_y), (max_x, max_y))
            .into_iter()
            .map(BodyId::raw)
            .collect()
    }

    // =========================================================================
    // Utilities
    // =========================================================================

    /// Get the bounding box of all bodies.
    ///
    /// Returns [min_x, min_y, max_x, max_y], or undefined if there are none.
    #[wasm_bindgen(js_name = getBounds)]
    pub fn get_bounds(&self) -> Option<Vec<f64>> {
        self.simulator
            .bounds()
            .map(|(min_x, min_y, max_x, max_y)| vec![min_x, min_y, max_x, max_y])
    }

    /// Remove all bodies and springs.
    pub fn clear(&mut self) {
        self.simulator.clear();
    }
}

impl Default for NetworkPhysicsWasm {
    fn default() -> Self {
        Self::new()
    }
}

/// Both coordinates or neither. A missing coordinate is reported as NaN.
fn explicit_position(x: Option<f64>, y: Option<f64>) -> Result<Option<(f64, f64)>, Error> {
    match (x, y) {
        (Some(x), Some(y)) => Ok(Some((x, y))),
        (None, None) => Ok(None),
        (x, y) => Err(Error::InvalidPosition {
            x: x.unwrap_or(f64::NAN),
            y: y.unwrap_or(f64::NAN),
        }),
    }
}

fn parse_config(config: JsValue) -> Result<PhysicsConfig, JsError> {
    if config.is_undefined() || config.is_null() {
        return Ok(PhysicsConfig::default());
    }
    serde_wasm_bindgen::from_value(config).map_err(|e| JsError::new(&e.to_string()))
}
