use serde::{Deserialize, Serialize};

/// Graphics capability tier governing scene complexity and effect budget.
///
/// Established once per mount (probed or forced) and re-assigned at runtime
/// only by the quality controller. The ordering `Low < Medium < High` makes
/// upgrade/downgrade comparisons explicit.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Low,
    Medium,
    High,
}

impl Tier {
    /// Default node count for scenes built at this tier.
    pub fn default_node_count(self) -> usize {
        match self {
            Tier::Low => 90,
            Tier::Medium => 140,
            Tier::High => 180,
        }
    }

    /// Whether the additive glow pass is part of this tier's effect budget.
    pub fn glow_enabled(self) -> bool {
        match self {
            Tier::Low => false,
            Tier::Medium | Tier::High => true,
        }
    }

    /// Internal resolution scale applied to the render surface.
    ///
    /// Stands in for the device-pixel-ratio cap used on constrained devices.
    pub fn resolution_scale(self) -> f32 {
        match self {
            Tier::Low => 0.75,
            Tier::Medium => 1.0,
            Tier::High => 1.0,
        }
    }

    /// One tier down, or `None` when already at `Low`.
    pub fn downgraded(self) -> Option<Tier> {
        match self {
            Tier::High => Some(Tier::Medium),
            Tier::Medium => Some(Tier::Low),
            Tier::Low => None,
        }
    }

    /// One tier up, or `None` when already at `High`.
    pub fn upgraded(self) -> Option<Tier> {
        match self {
            Tier::Low => Some(Tier::Medium),
            Tier::Medium => Some(Tier::High),
            Tier::High => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Tier::Low => "low",
            Tier::Medium => "medium",
            Tier::High => "high",
        }
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tier_ordering() {
        assert!(Tier::Low < Tier::Medium);
        assert!(Tier::Medium < Tier::High);
    }

    #[test]
    fn downgrade_chain_ends_at_low() {
        assert_eq!(Tier::High.downgraded(), Some(Tier::Medium));
        assert_eq!(Tier::Medium.downgraded(), Some(Tier::Low));
        assert_eq!(Tier::Low.downgraded(), None);
    }

    #[test]
    fn upgrade_chain_ends_at_high() {
        assert_eq!(Tier::Low.upgraded(), Some(Tier::Medium));
        assert_eq!(Tier::Medium.upgraded(), Some(Tier::High));
        assert_eq!(Tier::High.upgraded(), None);
    }

    #[test]
    fn glow_only_above_low() {
        assert!(!Tier::Low.glow_enabled());
        assert!(Tier::Medium.glow_enabled());
        assert!(Tier::High.glow_enabled());
    }

    #[test]
    fn node_counts_grow_with_tier() {
        assert!(Tier::Low.default_node_count() < Tier::Medium.default_node_count());
        assert!(Tier::Medium.default_node_count() < Tier::High.default_node_count());
    }

    #[test]
    fn serde_lowercase() {
        let json = serde_json::to_string(&Tier::Medium).unwrap();
        assert_eq!(json, "\"medium\"");
        let back: Tier = serde_json::from_str("\"high\"").unwrap();
        assert_eq!(back, Tier::High);
    }
}
