//! wgpu render backend for the synapse scene.
//!
//! Draws the node cloud as one instanced sphere batch and all edges as one
//! additive line batch, with an optional glow pass at Medium/High tier.
//!
//! # Invariants
//! - Renderer never mutates scene state.
//! - One instanced draw per node LOD bin, one line draw for all edges —
//!   never a draw call per object.
//! - Camera motion is NOT part of the animation clock.

mod camera;
mod gpu;
mod shaders;

pub use camera::OrbitCamera;
pub use gpu::{RenderStats, WgpuSceneRenderer};
