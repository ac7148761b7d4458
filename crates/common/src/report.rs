use serde::{Deserialize, Serialize};

use crate::tier::Tier;

/// Snapshot handed to the embedding caller on every quality evaluation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PerformanceReport {
    /// Smoothed frame rate over the sampling window.
    pub fps: f32,
    /// Tier in effect after this evaluation.
    pub quality_level: Tier,
    /// Mean frame time over the sampling window, in milliseconds.
    pub frame_time_ms: f32,
    /// Timestamp of the evaluation on the caller's clock, in milliseconds.
    pub timestamp_ms: f64,
}

impl std::fmt::Display for PerformanceReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "fps={:.1} frame_time={:.2}ms tier={}",
            self.fps, self.frame_time_ms, self.quality_level
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_display() {
        let report = PerformanceReport {
            fps: 58.3,
            quality_level: Tier::High,
            frame_time_ms: 17.2,
            timestamp_ms: 1000.0,
        };
        let s = format!("{report}");
        assert!(s.contains("fps=58.3"));
        assert!(s.contains("tier=high"));
    }
}
