//! Simulator - the root of the physics core.
//!
//! The Simulator owns every body and spring, hands out stable handles for
//! them, and runs force -> integration -> stability cycles either one at a
//! time ([`Simulator::tick`]) or until the network settles
//! ([`Simulator::stabilize`]). It holds no timer: the host calls `tick` once
//! per frame and stops scheduling frames when it returns `false`.
//!
//! All graph mutation has to happen between cycles; there is no internal
//! locking.
//!
//! Handles are drawn from process-wide counters, so a handle issued by one
//! simulator is never registered with another and is rejected there as stale.

use petgraph::stable_graph::{EdgeIndex, NodeIndex};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};

use super::forces::ForceField;
use super::integrator::Integrator;
use super::placement::seed_position;
use super::stability::StabilityOracle;
use crate::config::PhysicsConfig;
use crate::error::{Error, Result};
use crate::graph::{AxisPins, Body, BodyId, PhysicsGraph, Spring, SpringId};
use crate::spatial::{BodyPoint, SpatialIndex};

static BODY_ID_COUNTER: AtomicU32 = AtomicU32::new(0);
static SPRING_ID_COUNTER: AtomicU32 = AtomicU32::new(0);

fn next_body_id() -> BodyId {
    BodyId(BODY_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
}

fn next_spring_id() -> SpringId {
    SpringId(SPRING_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
}

/// Parameters for [`Simulator::create_body`].
///
/// Without a position the body is seeded around the gravity center.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct NewBody {
    pub position: Option<(f64, f64)>,
    pub pinned_x: bool,
    pub pinned_y: bool,
    /// Replaces the configured base mass for this body.
    pub mass_weight: Option<f64>,
}

impl NewBody {
    /// A free body at an explicit position.
    pub fn at(x: f64, y: f64) -> Self {
        Self {
            position: Some((x, y)),
            ..Self::default()
        }
    }

    /// Pin the given axes.
    pub fn pinned(mut self, x: bool, y: bool) -> Self {
        self.pinned_x = x;
        self.pinned_y = y;
        self
    }

    /// Override the configured base mass.
    pub fn with_mass_weight(mut self, weight: f64) -> Self {
        self.mass_weight = Some(weight);
        self
    }
}

/// Outcome of [`Simulator::stabilize`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stabilization {
    /// False when the iteration cap ran out first. Not an error: bodies keep
    /// their last computed positions.
    pub converged: bool,
    /// Cycles actually run.
    pub iterations: u32,
}

/// The force-directed layout simulator.
pub struct Simulator {
    /// Bodies on nodes, springs on edges.
    graph: PhysicsGraph,

    /// Map from stable BodyId to petgraph NodeIndex
    body_index: HashMap<BodyId, NodeIndex>,

    /// Map from stable SpringId to petgraph EdgeIndex
    spring_index: HashMap<SpringId, EdgeIndex>,

    config: PhysicsConfig,
    forces: ForceField,
    integrator: Integrator,
    oracle: StabilityOracle,

    /// Supplied by the host, usually the center of the viewport.
    gravity_center: (f64, f64),

    /// Bodies seeded so far; drives the placement spiral.
    seeded: usize,

    cycles: u64,

    spatial: SpatialIndex,
    spatial_dirty: bool,
}

impl Simulator {
    /// Create an empty simulator with the default configuration.
    pub fn new() -> Self {
        Self::build(PhysicsConfig::default())
    }

    /// Create an empty simulator, rejecting an invalid configuration.
    pub fn with_config(config: PhysicsConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: PhysicsConfig) -> Self {
        Self {
            graph: PhysicsGraph::default(),
            body_index: HashMap::new(),
            spring_index: HashMap::new(),
            forces: ForceField::new(&config),
            integrator: Integrator::new(&config),
            oracle: StabilityOracle::new(&config),
            config,
            gravity_center: (0.0, 0.0),
            seeded: 0,
            cycles: 0,
            spatial: SpatialIndex::new(),
            spatial_dirty: false,
        }
    }

    // =========================================================================
    // Configuration
    // =========================================================================

    /// Current physics constants.
    pub fn config(&self) -> &PhysicsConfig {
        &self.config
    }

    /// Replace the configuration.
    ///
    /// Rebuilds the cycle components and recomputes every body's mass. On
    /// error the previous configuration stays in effect.
    pub fn set_config(&mut self, config: PhysicsConfig) -> Result<()> {
        config.validate()?;

        self.forces = ForceField::new(&config);
        self.integrator = Integrator::new(&config);
        self.oracle = StabilityOracle::new(&config);
        for body in self.graph.node_weights_mut() {
            body.update_mass(&config);
        }
        tracing::debug!(?config, "physics configuration replaced");
        self.config = config;
        Ok(())
    }

    /// Point every body is pulled toward.
    pub fn gravity_center(&self) -> (f64, f64) {
        self.gravity_center
    }

    /// Move the gravity center, usually to the center of the viewport.
    pub fn set_gravity_center(&mut self, x: f64, y: f64) -> Result<()> {
        check_finite(x, y)?;
        self.gravity_center = (x, y);
        Ok(())
    }

    // =========================================================================
    // Body Operations
    // =========================================================================

    /// Register a new body.
    pub fn create_body(&mut self, new: NewBody) -> Result<BodyId> {
        let position = match new.position {
            Some(position) => position,
            None => seed_position(
                self.seeded,
                self.gravity_center,
                self.config.spring_length * 0.5,
            ),
        };

        let id = next_body_id();
        let body = Body::new(
            id,
            position,
            AxisPins::from_axes(new.pinned_x, new.pinned_y),
            new.mass_weight,
            &self.config,
        )?;

        if new.position.is_none() {
            self.seeded += 1;
        }

        let index = self.graph.add_node(body);
        self.body_index.insert(id, index);
        self.spatial_dirty = true;

        tracing::trace!(%id, x = position.0, y = position.1, "created body");
        Ok(id)
    }

    /// Remove a body. Springs still attached to it are removed first.
    pub fn remove_body(&mut self, id: BodyId) -> Result<()> {
        let index = self.node_index(id)?;

        let mut attached = self.graph[index].springs().to_vec();
        attached.sort_unstable();
        attached.dedup();
        for spring in attached {
            self.remove_spring(spring)?;
        }

        self.graph.remove_node(index);
        self.body_index.remove(&id);
        self.spatial_dirty = true;

        tracing::trace!(%id, "removed body");
        Ok(())
    }

    /// Look up a live body.
    pub fn body(&self, id: BodyId) -> Result<&Body> {
        Ok(&self.graph[self.node_index(id)?])
    }

    /// Current position of a live body.
    pub fn position(&self, id: BodyId) -> Result<(f64, f64)> {
        self.body(id).map(Body::position)
    }

    /// Move a body, typically while it is being dragged.
    pub fn set_position(&mut self, id: BodyId, x: f64, y: f64) -> Result<()> {
        check_finite(x, y)?;
        let index = self.node_index(id)?;
        self.graph[index].set_position(x, y);
        self.spatial_dirty = true;
        Ok(())
    }

    /// Pin or release each axis of a body.
    pub fn set_pinned(&mut self, id: BodyId, x: bool, y: bool) -> Result<()> {
        let index = self.node_index(id)?;
        self.graph[index].set_pins(AxisPins::from_axes(x, y));
        Ok(())
    }

    /// Number of live bodies.
    pub fn body_count(&self) -> usize {
        self.graph.node_count()
    }

    /// All live bodies in slot order.
    pub fn bodies(&self) -> impl Iterator<Item = &Body> {
        self.graph.node_weights()
    }

    /// Live body IDs, in the same order as [`Simulator::positions`].
    pub fn body_ids(&self) -> Vec<BodyId> {
        self.bodies().map(Body::id).collect()
    }

    /// Interleaved positions `[x0, y0, x1, y1, ...]` in slot order.
    pub fn positions(&self) -> Vec<f64> {
        let mut positions = Vec::with_capacity(self.graph.node_count() * 2);
        for body in self.bodies() {
            let (x, y) = body.position();
            positions.push(x);
            positions.push(y);
        }
        positions
    }

    // =========================================================================
    // Spring Operations
    // =========================================================================

    /// Connect two registered bodies. `from == to` creates a self-loop.
    ///
    /// Without a rest length the configured default is used.
    pub fn create_spring(
        &mut self,
        from: BodyId,
        to: BodyId,
        rest_length: Option<f64>,
    ) -> Result<SpringId> {
        let from_index = self.node_index(from)?;
        let to_index = self.node_index(to)?;

        let id = next_spring_id();
        let spring = Spring::new(
            id,
            from,
            to,
            rest_length.unwrap_or(self.config.spring_length),
        )?;

        let edge = self.graph.add_edge(from_index, to_index, spring);
        self.spring_index.insert(id, edge);
        self.graph[from_index].attach_spring(id, &self.config);
        self.graph[to_index].attach_spring(id, &self.config);

        tracing::trace!(%id, %from, %to, "created spring");
        Ok(id)
    }

    /// Remove a spring and detach it from both endpoints.
    pub fn remove_spring(&mut self, id: SpringId) -> Result<()> {
        let edge = self
            .spring_index
            .remove(&id)
            .ok_or(Error::StaleHandle(id.into()))?;

        if let Some(spring) = self.graph.remove_edge(edge) {
            let (from, to) = spring.endpoints();
            for body in [from, to] {
                if let Some(&index) = self.body_index.get(&body) {
                    self.graph[index].detach_spring(id, &self.config);
                }
            }
        }

        tracing::trace!(%id, "removed spring");
        Ok(())
    }

    /// Look up a live spring.
    pub fn spring(&self, id: SpringId) -> Result<&Spring> {
        Ok(&self.graph[self.edge_index(id)?])
    }

    /// Change a spring's rest length. Its stiffness follows.
    pub fn set_rest_length(&mut self, id: SpringId, rest_length: f64) -> Result<()> {
        let edge = self.edge_index(id)?;
        self.graph[edge].set_rest_length(rest_length)
    }

    /// Number of live springs.
    pub fn spring_count(&self) -> usize {
        self.graph.edge_count()
    }

    // =========================================================================
    // Simulation
    // =========================================================================

    /// Recompute forces on every body without integrating.
    pub fn compute_forces(&mut self) {
        self.forces.apply(&mut self.graph, self.gravity_center);
    }

    /// Run one cycle with the configured time step.
    ///
    /// Returns whether any body is still moving, i.e. whether the host
    /// should schedule another tick.
    pub fn tick(&mut self) -> bool {
        self.run_cycle(self.config.time_step)
    }

    /// Run one cycle with an explicit time step.
    pub fn tick_with(&mut self, dt: f64) -> Result<bool> {
        if !dt.is_finite() || dt <= 0.0 {
            return Err(Error::InvalidTimeStep(dt));
        }
        Ok(self.run_cycle(dt))
    }

    /// Run cycles until nothing moves or the configured iteration cap is hit.
    pub fn stabilize(&mut self) -> Stabilization {
        self.stabilize_with_cap(self.config.iteration_cap)
    }

    /// Run cycles until nothing moves or `iteration_cap` cycles have run.
    pub fn stabilize_with_cap(&mut self, iteration_cap: u32) -> Stabilization {
        let dt = self.config.time_step;
        let mut iterations = 0;
        let mut converged = false;

        while !converged && iterations < iteration_cap {
            converged = !self.run_cycle(dt);
            iterations += 1;
        }

        tracing::debug!(
            converged,
            iterations,
            iteration_cap,
            bodies = self.graph.node_count(),
            "stabilization finished"
        );
        Stabilization {
            converged,
            iterations,
        }
    }

    /// Whether any body currently counts as moving, without running a cycle.
    pub fn is_moving(&self) -> bool {
        self.oracle.any_moving(self.graph.node_weights())
    }

    /// Total cycles run since creation.
    pub fn cycle_count(&self) -> u64 {
        self.cycles
    }

    fn run_cycle(&mut self, dt: f64) -> bool {
        self.forces.apply(&mut self.graph, self.gravity_center);
        self.integrator.step(&mut self.graph, dt);
        self.cycles += 1;
        self.spatial_dirty = true;
        self.oracle.any_moving(self.graph.node_weights())
    }

    // =========================================================================
    // Spatial Queries
    // =========================================================================

    /// Nearest body within `radius` of a point, for picking under a pointer.
    pub fn body_at(&mut self, x: f64, y: f64, radius: f64) -> Option<BodyId> {
        self.refresh_spatial_index();
        self.spatial.nearest_within(x, y, radius)
    }

    /// Bodies inside the rectangle spanned by two corners.
    pub fn bodies_in_rect(&mut self, corner_a: (f64, f64), corner_b: (f64, f64)) -> Vec<BodyId> {
        self.refresh_spatial_index();
        self.spatial.in_rect(corner_a, corner_b)
    }

    fn refresh_spatial_index(&mut self) {
        if !self.spatial_dirty {
            return;
        }
        let points = self
            .graph
            .node_weights()
            .map(|body| {
                let (x, y) = body.position();
                BodyPoint { id: body.id(), x, y }
            })
            .collect();
        self.spatial.rebuild(points);
        self.spatial_dirty = false;
    }

    // =========================================================================
    // Utilities
    // =========================================================================

    /// Bounding box `(min_x, min_y, max_x, max_y)` of all bodies.
    pub fn bounds(&self) -> Option<(f64, f64, f64, f64)> {
        let mut bodies = self.bodies();
        let (x, y) = bodies.next()?.position();
        Some(bodies.fold((x, y, x, y), |(min_x, min_y, max_x, max_y), body| {
            let (x, y) = body.position();
            (min_x.min(x), min_y.min(y), max_x.max(x), max_y.max(y))
        }))
    }

    /// Drop all bodies and springs. Handles issued before stay stale.
    pub fn clear(&mut self) {
        self.graph.clear();
        self.body_index.clear();
        self.spring_index.clear();
        self.seeded = 0;
        self.spatial.clear();
        self.spatial_dirty = false;
    }

    fn node_index(&self, id: BodyId) -> Result<NodeIndex> {
        self.body_index
            .get(&id)
            .copied()
            .ok_or(Error::StaleHandle(id.into()))
    }

    fn edge_index(&self, id: SpringId) -> Result<EdgeIndex> {
        self.spring_index
            .get(&id)
            .copied()
            .ok_or(Error::StaleHandle(id.into()))
    }
}

impl Default for Simulator {
    fn default() -> Self {
        Self::new()
    }
}

fn check_finite(x: f64, y: f64) -> Result<()> {
    if x.is_finite() && y.is_finite() {
        Ok(())
    } else {
        Err(Error::InvalidPosition { x, y })
    }
}
