//! Capability probing: one-shot GPU tier classification.
//!
//! # Invariants
//! - Probing never fails; absence of a usable adapter is a `Low` result.
//! - The throwaway instance is dropped before the probe returns.

pub mod probe;

pub use probe::{classify, probe, probe_with_backends};

pub fn crate_info() -> &'static str {
    "synapse-capability v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("capability"));
    }
}
