use synapse_common::{AdaptiveOptions, PerformanceReport, Tier};

use crate::frame_timer::FrameTimer;

/// Smoothed frame rate that must hold before an upgrade is considered.
const UPGRADE_FRAME_RATE: f32 = 55.0;

/// Frames between policy evaluations, one window at a nominal 60 fps.
const EVAL_INTERVAL_FRAMES: u32 = 60;

/// A tier transition decided by one evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TierChange {
    pub from: Tier,
    pub to: Tier,
}

/// Outcome of one policy evaluation.
#[derive(Debug, Clone, Copy)]
pub struct Evaluation {
    pub report: PerformanceReport,
    /// `Some` when this evaluation changed the tier.
    pub transition: Option<TierChange>,
}

/// Closed-loop tier policy over the frame timer's output.
///
/// Downgrades are immediate (one step per evaluation, never two); upgrades
/// require the smoothed frame rate to hold above [`UPGRADE_FRAME_RATE`] for
/// `upgrade_after_frames` consecutive frames. The first evaluation after
/// construction is a grace period and never transitions, so start-up jank
/// cannot trigger a downgrade.
#[derive(Debug)]
pub struct QualityController {
    tier: Tier,
    upgrade_after_frames: u32,
    enable_metrics_logging: bool,
    frames_since_eval: u32,
    frames_above_upgrade: u32,
    in_grace_period: bool,
}

impl QualityController {
    pub fn new(initial_tier: Tier, options: &AdaptiveOptions) -> Self {
        Self {
            tier: initial_tier,
            upgrade_after_frames: options.upgrade_after_frames,
            enable_metrics_logging: options.enable_metrics_logging,
            frames_since_eval: 0,
            frames_above_upgrade: 0,
            in_grace_period: true,
        }
    }

    /// Tier currently in effect.
    pub fn tier(&self) -> Tier {
        self.tier
    }

    /// Feed one frame. Ordering contract: the caller records the frame into
    /// `timer` first, then calls this, so an evaluation always sees the
    /// sample for the frame that triggered it.
    ///
    /// Returns `Some` on evaluation boundaries (once per window).
    pub fn on_frame(&mut self, timer: &FrameTimer, now_ms: f64) -> Option<Evaluation> {
        if timer.frame_rate() >= UPGRADE_FRAME_RATE && timer.sample_count() > 0 {
            self.frames_above_upgrade = self.frames_above_upgrade.saturating_add(1);
        } else {
            self.frames_above_upgrade = 0;
        }

        self.frames_since_eval += 1;
        if self.frames_since_eval < EVAL_INTERVAL_FRAMES {
            return None;
        }
        self.frames_since_eval = 0;
        Some(self.evaluate(timer, now_ms))
    }

    fn evaluate(&mut self, timer: &FrameTimer, now_ms: f64) -> Evaluation {
        let transition = if self.in_grace_period {
            self.in_grace_period = false;
            None
        } else if timer.is_low_performance() {
            self.frames_above_upgrade = 0;
            self.step_down()
        } else if self.frames_above_upgrade >= self.upgrade_after_frames {
            self.frames_above_upgrade = 0;
            self.step_up()
        } else {
            None
        };

        let report = PerformanceReport {
            fps: timer.frame_rate(),
            quality_level: self.tier,
            frame_time_ms: timer.mean_frame_time_ms(),
            timestamp_ms: now_ms,
        };

        if self.enable_metrics_logging {
            tracing::info!(
                fps = report.fps,
                frame_time_ms = report.frame_time_ms,
                tier = %report.quality_level,
                changed = transition.is_some(),
                "quality evaluation"
            );
        }
        if let Some(change) = transition {
            tracing::debug!(from = %change.from, to = %change.to, "tier change");
        }

        Evaluation { report, transition }
    }

    fn step_down(&mut self) -> Option<TierChange> {
        let from = self.tier;
        let to = from.downgraded()?;
        self.tier = to;
        Some(TierChange { from, to })
    }

    fn step_up(&mut self) -> Option<TierChange> {
        let from = self.tier;
        let to = from.upgraded()?;
        self.tier = to;
        Some(TierChange { from, to })
    }
}
