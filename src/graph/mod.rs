//! Graph elements of the simulation.
//!
//! Bodies and springs are stored as node and edge weights of a petgraph
//! StableGraph, so removing one element never shifts the indices of the others.

mod body;
mod spring;

pub use body::{AxisPins, Body, BodyId};
pub use spring::{Spring, SpringId};

use petgraph::Undirected;
use petgraph::stable_graph::StableGraph;

/// Storage for the simulated network: bodies on nodes, springs on edges.
pub type PhysicsGraph = StableGraph<Body, Spring, Undirected>;
