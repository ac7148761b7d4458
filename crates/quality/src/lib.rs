//! Quality management: frame timing, tier control loop, visibility gating.
//!
//! # Invariants
//! - The frame timer is the only source of performance truth; the
//!   controller never measures time itself.
//! - Tier changes happen only at evaluation boundaries, never mid-frame.
//! - A suspended gate means zero scheduled work, not reduced work.

mod controller;
mod frame_timer;
mod gate;

pub use controller::{Evaluation, QualityController, TierChange};
pub use frame_timer::FrameTimer;
pub use gate::{GateEvent, VisibilityGate};

pub fn crate_info() -> &'static str {
    "synapse-quality v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("quality"));
    }
}
