//! Shared types for the synapse engine.
//!
//! # Invariants
//! - `Tier` is the single source of truth for tier-dependent budgets.
//! - Configuration is validated once at mount time; downstream code may
//!   assume validated values.

pub mod color;
pub mod config;
pub mod report;
pub mod tier;

pub use color::{Color, ParseColorError};
pub use config::{AdaptiveOptions, ConfigError, SceneConfig};
pub use report::PerformanceReport;
pub use tier::Tier;

pub fn crate_info() -> &'static str {
    "synapse-common v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("common"));
    }
}
