use rand::Rng;
use synapse_common::SceneConfig;

use crate::graph::{NEVER, SceneGraph};

/// Tuning for the per-frame animation pass.
///
/// These are empirically tuned visual defaults, not invariants; the shape
/// (probabilistic activation, linear pulse decay, bounded drift) is what
/// matters.
#[derive(Debug, Clone, Copy)]
pub struct AnimationParams {
    /// Multiplier on activation probability and on decay/dwell speed.
    pub pulse_speed: f32,
    /// Activation probability per node per second, before `pulse_speed`.
    pub activation_rate: f32,
    /// Seconds a node stays active, divided by `pulse_speed`.
    pub active_dwell: f32,
    /// Span of the linear pulse decay in seconds, divided by `pulse_speed`.
    pub decay_window: f32,
    /// Peak drift angle in radians.
    pub drift_amplitude: f32,
    /// Drift oscillation rate in radians per second.
    pub drift_rate: f32,
}

impl Default for AnimationParams {
    fn default() -> Self {
        Self {
            pulse_speed: 1.0,
            activation_rate: 0.25,
            active_dwell: 1.2,
            decay_window: 1.0,
            drift_amplitude: 0.15,
            drift_rate: 0.12,
        }
    }
}

impl AnimationParams {
    pub fn from_config(config: &SceneConfig) -> Self {
        Self {
            pulse_speed: config.pulse_speed,
            ..Self::default()
        }
    }

    fn dwell(&self) -> f32 {
        self.active_dwell / self.pulse_speed
    }

    fn decay(&self) -> f32 {
        self.decay_window / self.pulse_speed
    }
}

/// Linear decay pulse: 1.0 at activation, 0.0 once `decay` has elapsed.
fn pulse_factor(clock: f32, last_active: f32, decay: f32) -> f32 {
    if last_active == NEVER {
        return 0.0;
    }
    (1.0 - (clock - last_active) / decay).max(0.0)
}

impl SceneGraph {
    /// Advance the animation by `dt` seconds.
    ///
    /// One call per displayed frame: advances the activity clock, fires
    /// probabilistic node activations (propagating to incident edges),
    /// expires stale activations, and updates the whole-scene drift.
    pub fn update(&mut self, dt: f32, params: &AnimationParams) {
        self.clock += dt;
        let clock = self.clock;
        let dwell = params.dwell();
        let p_fire = (params.activation_rate * params.pulse_speed * dt).min(1.0);

        {
            let (nodes, edges, incident, rng) = self.split_mut();

            let mut fired = Vec::new();
            for (i, node) in nodes.iter_mut().enumerate() {
                if node.active {
                    if clock - node.last_active > dwell {
                        node.active = false;
                    }
                } else if rng.r#gen::<f32>() < p_fire {
                    node.active = true;
                    node.last_active = clock;
                    fired.push(i);
                }
            }

            // Activation reaches every edge touching a fired node.
            for &i in &fired {
                for &e in &incident[i] {
                    edges[e].active = true;
                    edges[e].last_active = clock;
                }
            }

            for edge in edges.iter_mut() {
                if edge.active && clock - edge.last_active > dwell {
                    edge.active = false;
                }
            }
        }

        // Cosmetic two-axis drift; bounded amplitude is its only contract.
        self.drift = (
            (clock * params.drift_rate).sin() * params.drift_amplitude,
            (clock * params.drift_rate * 0.7).sin() * params.drift_amplitude,
        );
    }

    /// Decaying emphasis for a node, in [0, 1].
    pub fn node_pulse(&self, index: usize, params: &AnimationParams) -> f32 {
        pulse_factor(self.clock, self.nodes()[index].last_active, params.decay())
    }

    /// Rendered node scale: `base_size * (1 + pulse * 0.5)`.
    pub fn node_render_size(&self, index: usize, params: &AnimationParams) -> f32 {
        let node = &self.nodes()[index];
        node.base_size * (1.0 + self.node_pulse(index, params) * 0.5)
    }

    /// Decaying emphasis for an edge, in [0, 1].
    pub fn edge_pulse(&self, index: usize, params: &AnimationParams) -> f32 {
        pulse_factor(self.clock, self.edges()[index].last_active, params.decay())
    }

    /// Edge opacity: `0.1 + strength * 0.2 + pulse * 0.7`. Can exceed 1.0;
    /// the additive blend mode clamps it, not this function.
    pub fn edge_opacity(&self, index: usize, params: &AnimationParams) -> f32 {
        let edge = &self.edges()[index];
        0.1 + edge.strength * 0.2 + self.edge_pulse(index, params) * 0.7
    }

    /// Current drift angles around the X and Y axes, in radians.
    pub fn drift_angles(&self) -> (f32, f32) {
        self.drift
    }
}
