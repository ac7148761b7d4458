//! Procedural scene graph: node/edge topology plus per-frame animation state.
//!
//! # Invariants
//! - No duplicate undirected edge between the same node pair.
//! - Every edge endpoint indexes into the current node list.
//! - `connections.len() < connection_limit` for every node.
//! - The node/edge collections are owned by exactly one `SceneGraph`;
//!   rebuilds replace them wholesale.

mod animate;
mod graph;

pub use animate::AnimationParams;
pub use graph::{Edge, Node, SceneGraph};

pub fn crate_info() -> &'static str {
    "synapse-scene v0.1.0"
}
