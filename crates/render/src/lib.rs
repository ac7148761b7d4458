//! Rendering adapter: renderer-agnostic interface plus culling math.
//!
//! # Invariants
//! - Renderers never mutate scene state; animation truth is scene-owned.
//! - Culling is conservative: a sphere touching the frustum is visible.
//!
//! # Workaround
//! The GPU backend needs device/queue/surface handles and so cannot fit
//! the [`Renderer`] trait signature; it lives in its own crate with a
//! wider interface. The trait covers the headless renderers.

mod culling;
mod renderer;

pub use culling::{Frustum, LodBands, LodLevel};
pub use renderer::{DebugTextRenderer, RenderView, Renderer};

pub fn crate_info() -> &'static str {
    "synapse-render v0.1.0"
}
