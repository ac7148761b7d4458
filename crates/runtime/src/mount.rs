use synapse_common::{ConfigError, PerformanceReport, SceneConfig, Tier};
use synapse_quality::{Evaluation, FrameTimer, GateEvent, QualityController, TierChange, VisibilityGate};
use synapse_scene::{AnimationParams, SceneGraph};
use thiserror::Error;

/// Upper bound on one animation step. A stall longer than this advances
/// the scene by the clamp, not by the real elapsed time.
const MAX_STEP_S: f32 = 0.25;

/// Text shown instead of any graphics context on the low-end fallback.
const FALLBACK_TEXT: &str = "Interactive scene disabled on this device";

#[derive(Debug, Error)]
pub enum MountError {
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Lifecycle state of a mount.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MountState {
    /// Low-end fallback: no scene, no GPU, just [`SceneMount::placeholder_text`].
    Disabled,
    /// Lazy-loading and not yet visible; the scene is unbuilt.
    Pending,
    /// Scene built and ticking while the gate is open.
    Active,
}

/// Outcome of one [`SceneMount::tick`].
#[derive(Debug)]
pub enum Tick {
    /// Low-end fallback; draw the placeholder and stop scheduling frames.
    Disabled,
    /// Gate closed; nothing was advanced.
    Suspended,
    /// The scene advanced and should be rendered.
    Frame {
        /// Animation step applied this frame, in seconds.
        dt: f32,
        /// Present on evaluation boundaries.
        evaluation: Option<Evaluation>,
        /// Present when this frame's evaluation rebuilt the scene at a
        /// new tier. The rebuilt scene renders from the next frame on.
        rebuilt: Option<TierChange>,
    },
}

/// One embedded scene instance.
///
/// The embedder owns the clock and the surface; the mount owns everything
/// between them. Drive it with [`set_visible`] from viewport intersection
/// changes and [`tick`] once per scheduled frame.
///
/// [`set_visible`]: SceneMount::set_visible
/// [`tick`]: SceneMount::tick
pub struct SceneMount {
    config: SceneConfig,
    params: AnimationParams,
    tier: Tier,
    scene: Option<SceneGraph>,
    timer: FrameTimer,
    controller: Option<QualityController>,
    gate: VisibilityGate,
    disabled: bool,
    last_tick_ms: Option<f64>,
    on_report: Option<Box<dyn FnMut(&PerformanceReport)>>,
}

impl SceneMount {
    /// Mount with the capability probe deciding the initial tier.
    /// `force_quality` bypasses the probe entirely.
    pub fn new(config: SceneConfig) -> Result<Self, MountError> {
        let tier = match config.force_quality {
            Some(tier) => tier,
            None => synapse_capability::probe(),
        };
        Self::with_tier(config, tier)
    }

    /// Mount at a known tier. This is the headless/test path; `new` goes
    /// through here after resolving the tier.
    pub fn with_tier(config: SceneConfig, tier: Tier) -> Result<Self, MountError> {
        config.validate()?;

        let disabled = config.disable_on_low_end && tier == Tier::Low;
        let params = AnimationParams::from_config(&config);
        let timer = FrameTimer::new(FrameTimer::DEFAULT_CAPACITY, config.adaptive.min_frame_rate);
        let controller = (config.adaptive_quality && !disabled)
            .then(|| QualityController::new(tier, &config.adaptive));
        let gate = VisibilityGate::new(!config.lazy_load, config.lazy_load_margin_px);

        let mut mount = Self {
            config,
            params,
            tier,
            scene: None,
            timer,
            controller,
            gate,
            disabled,
            last_tick_ms: None,
            on_report: None,
        };

        if disabled {
            tracing::info!(tier = %tier, "low-end fallback, scene disabled");
        } else if !mount.config.lazy_load {
            mount.build_scene();
        }
        Ok(mount)
    }

    /// Register a callback invoked with every performance report.
    pub fn on_performance_report(&mut self, callback: impl FnMut(&PerformanceReport) + 'static) {
        self.on_report = Some(Box::new(callback));
    }

    pub fn state(&self) -> MountState {
        if self.disabled {
            MountState::Disabled
        } else if self.scene.is_none() {
            MountState::Pending
        } else {
            MountState::Active
        }
    }

    /// Tier currently in effect.
    pub fn tier(&self) -> Tier {
        self.tier
    }

    /// Render-resolution multiplier for the current tier.
    pub fn resolution_scale(&self) -> f32 {
        self.tier.resolution_scale()
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    pub fn params(&self) -> &AnimationParams {
        &self.params
    }

    pub fn scene(&self) -> Option<&SceneGraph> {
        self.scene.as_ref()
    }

    pub fn timer(&self) -> &FrameTimer {
        &self.timer
    }

    /// Text for the low-end fallback surface.
    pub fn placeholder_text(&self) -> &'static str {
        FALLBACK_TEXT
    }

    /// Report a viewport-intersection change from the embedder.
    pub fn set_visible(&mut self, visible: bool) -> Option<GateEvent> {
        if self.disabled {
            return None;
        }
        self.gate.set_intersecting(visible)
    }

    /// Pre-trigger margin the embedder should apply to its intersection test.
    pub fn gate_margin_px(&self) -> f32 {
        self.gate.margin_px()
    }

    /// Advance one frame at `now_ms` on the embedder's clock.
    ///
    /// Order per frame: gate, clock bookkeeping, scene animation, quality
    /// evaluation, tier rebuild. Suspended ticks do no work at all, and
    /// the first tick after a resume is a warm-up that contributes no
    /// frame sample and no animation step.
    pub fn tick(&mut self, now_ms: f64) -> Tick {
        if self.disabled {
            return Tick::Disabled;
        }
        if !self.gate.should_render() {
            return Tick::Suspended;
        }
        if self.gate.take_resumed() {
            self.timer.reset_clock();
            self.last_tick_ms = None;
        }

        // Deferred build lands on the first visible tick.
        if self.scene.is_none() {
            self.build_scene();
        }

        self.timer.record_frame(now_ms);
        let dt = match self.last_tick_ms {
            Some(last) => (((now_ms - last) / 1000.0) as f32).clamp(0.0, MAX_STEP_S),
            None => 0.0,
        };
        self.last_tick_ms = Some(now_ms);

        if let Some(scene) = self.scene.as_mut() {
            scene.update(dt, &self.params);
        }

        let evaluation = self
            .controller
            .as_mut()
            .and_then(|controller| controller.on_frame(&self.timer, now_ms));

        let mut rebuilt = None;
        if let Some(eval) = &evaluation {
            if let Some(callback) = self.on_report.as_mut() {
                callback(&eval.report);
            }
            if let Some(change) = eval.transition {
                self.tier = change.to;
                self.build_scene();
                rebuilt = Some(change);
            }
        }

        Tick::Frame { dt, evaluation, rebuilt }
    }

    fn build_scene(&mut self) {
        let node_count = self.config.node_count_for(self.tier);
        let started = std::time::Instant::now();
        let scene = SceneGraph::build(self.tier, node_count, self.config.connection_limit);
        tracing::debug!(
            tier = %self.tier,
            nodes = scene.node_count(),
            edges = scene.edge_count(),
            elapsed_ms = started.elapsed().as_secs_f64() * 1000.0,
            "scene built"
        );
        self.scene = Some(scene);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn config() -> SceneConfig {
        SceneConfig::default()
    }

    /// Tick at a steady rate, returning the final timestamp.
    fn run(mount: &mut SceneMount, start_ms: f64, fps: f64, frames: u32) -> f64 {
        let step = 1000.0 / fps;
        let mut now = start_ms;
        for _ in 0..frames {
            mount.tick(now);
            now += step;
        }
        now
    }

    #[test]
    fn mounts_and_builds_immediately() {
        let mount = SceneMount::with_tier(config(), Tier::High).unwrap();
        assert_eq!(mount.state(), MountState::Active);
        assert_eq!(mount.scene().unwrap().node_count(), 180);
    }

    #[test]
    fn invalid_config_is_rejected_before_any_scene() {
        let mut bad = config();
        bad.pulse_speed = -1.0;
        assert!(SceneMount::with_tier(bad, Tier::High).is_err());
    }

    #[test]
    fn low_end_fallback_builds_nothing() {
        let mut cfg = config();
        cfg.disable_on_low_end = true;
        let mut mount = SceneMount::with_tier(cfg, Tier::Low).unwrap();

        assert_eq!(mount.state(), MountState::Disabled);
        assert!(mount.scene().is_none());
        assert!(matches!(mount.tick(0.0), Tick::Disabled));
        assert!(mount.scene().is_none());
        assert!(!mount.placeholder_text().is_empty());
    }

    #[test]
    fn low_end_fallback_requires_low_tier() {
        let mut cfg = config();
        cfg.disable_on_low_end = true;
        let mount = SceneMount::with_tier(cfg, Tier::Medium).unwrap();
        assert_eq!(mount.state(), MountState::Active);
    }

    #[test]
    fn lazy_load_defers_build_until_visible() {
        let mut cfg = config();
        cfg.lazy_load = true;
        let mut mount = SceneMount::with_tier(cfg, Tier::Medium).unwrap();

        assert_eq!(mount.state(), MountState::Pending);
        assert!(matches!(mount.tick(0.0), Tick::Suspended));
        assert_eq!(mount.state(), MountState::Pending);

        mount.set_visible(true);
        assert!(matches!(mount.tick(16.0), Tick::Frame { .. }));
        assert_eq!(mount.state(), MountState::Active);
        assert_eq!(mount.scene().unwrap().node_count(), 140);
    }

    #[test]
    fn lazy_mount_opens_on_immediate_visibility_report() {
        let mut cfg = config();
        cfg.lazy_load = true;
        let mut mount = SceneMount::with_tier(cfg, Tier::Medium).unwrap();
        assert_eq!(mount.state(), MountState::Pending);

        // Embedders report visibility as soon as their surface exists; a
        // window that starts visible never sends an occlusion transition,
        // so the gate must not depend on one.
        assert_eq!(mount.set_visible(true), Some(GateEvent::Resumed));
        assert!(matches!(mount.tick(0.0), Tick::Frame { .. }));
        assert_eq!(mount.state(), MountState::Active);

        // The same report on an already-open gate is a no-op.
        let mut eager = SceneMount::with_tier(config(), Tier::Low).unwrap();
        assert_eq!(eager.set_visible(true), None);
        assert_eq!(eager.state(), MountState::Active);
    }

    #[test]
    fn suspension_is_total_and_resume_skips_the_gap() {
        let mut mount = SceneMount::with_tier(config(), Tier::Medium).unwrap();
        let now = run(&mut mount, 0.0, 60.0, 10);
        let clock_at_suspend = mount.scene().unwrap().clock();

        mount.set_visible(false);
        for i in 0..20 {
            assert!(matches!(mount.tick(now + i as f64 * 16.6), Tick::Suspended));
        }
        assert_eq!(mount.scene().unwrap().clock(), clock_at_suspend);

        // Resume a minute later: the first frame is a warm-up, not a
        // sixty-second catch-up step.
        mount.set_visible(true);
        let Tick::Frame { dt, .. } = mount.tick(now + 60_000.0) else {
            panic!("expected a frame after resume");
        };
        assert_eq!(dt, 0.0);
        assert_eq!(mount.scene().unwrap().clock(), clock_at_suspend);
    }

    #[test]
    fn sustained_slow_frames_rebuild_at_a_lower_tier() {
        let mut mount = SceneMount::with_tier(config(), Tier::High).unwrap();
        // Grace window, then a degraded window.
        let now = run(&mut mount, 0.0, 20.0, 60);
        run(&mut mount, now, 20.0, 60);

        assert_eq!(mount.tier(), Tier::Medium);
        assert_eq!(mount.scene().unwrap().node_count(), 140);
        assert_eq!(mount.scene().unwrap().tier(), Tier::Medium);
    }

    #[test]
    fn node_count_override_survives_tier_changes() {
        let mut cfg = config();
        cfg.node_count = Some(64);
        let mut mount = SceneMount::with_tier(cfg, Tier::High).unwrap();
        let now = run(&mut mount, 0.0, 20.0, 60);
        run(&mut mount, now, 20.0, 60);

        assert_eq!(mount.tier(), Tier::Medium);
        assert_eq!(mount.scene().unwrap().node_count(), 64);
    }

    #[test]
    fn adaptive_quality_off_means_fixed_tier() {
        let mut cfg = config();
        cfg.adaptive_quality = false;
        let mut mount = SceneMount::with_tier(cfg, Tier::High).unwrap();
        let now = run(&mut mount, 0.0, 15.0, 240);
        run(&mut mount, now, 15.0, 240);

        assert_eq!(mount.tier(), Tier::High);
        assert_eq!(mount.scene().unwrap().node_count(), 180);
    }

    #[test]
    fn reports_flow_through_the_callback() {
        let reports: Rc<RefCell<Vec<PerformanceReport>>> = Rc::default();
        let sink = Rc::clone(&reports);

        let mut mount = SceneMount::with_tier(config(), Tier::Medium).unwrap();
        mount.on_performance_report(move |report| sink.borrow_mut().push(*report));

        run(&mut mount, 0.0, 60.0, 180);
        let reports = reports.borrow();
        assert_eq!(reports.len(), 3);
        assert!((reports.last().unwrap().fps - 60.0).abs() < 1.0);
        assert_eq!(reports.last().unwrap().quality_level, Tier::Medium);
    }

    #[test]
    fn animation_step_is_clamped() {
        let mut mount = SceneMount::with_tier(config(), Tier::Low).unwrap();
        mount.tick(0.0);
        // A ten-second stall without a suspend still only advances by the clamp.
        let Tick::Frame { dt, .. } = mount.tick(10_000.0) else {
            panic!("expected a frame");
        };
        assert_eq!(dt, MAX_STEP_S);
    }
}
