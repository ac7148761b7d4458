//! Runtime mount: the single entry point an embedder drives.
//!
//! Owns the scene, the frame timer, the quality controller and the
//! visibility gate, and advances them in a fixed order once per frame.
//!
//! # Invariants
//! - Tick ordering: gate, clock, scene update, quality evaluation, then
//!   any tier rebuild. A rebuild decided this frame is visible next frame.
//! - A suspended mount does zero scene or timing work.
//! - The low-end fallback never constructs a scene or touches a GPU.

mod mount;

pub use mount::{MountError, MountState, SceneMount, Tick};

pub fn crate_info() -> &'static str {
    "synapse-runtime v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("runtime"));
    }
}
