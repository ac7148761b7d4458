/// Transition reported by [`VisibilityGate::set_intersecting`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateEvent {
    /// The mount left the viewport; scheduling must stop.
    Suspended,
    /// The mount re-entered the viewport; scheduling may resume.
    Resumed,
}

/// Viewport-intersection gate deciding whether the render loop runs at all.
///
/// The gate only stores state; the scheduler owns the actual start/stop.
/// Suspension must be total (no background ticking), and resuming must not
/// replay the suspended interval: the caller consumes [`take_resumed`] and
/// resets its frame clock so the first delta after resume is a warm-up.
///
/// [`take_resumed`]: VisibilityGate::take_resumed
#[derive(Debug)]
pub struct VisibilityGate {
    intersecting: bool,
    margin_px: f32,
    resumed: bool,
}

impl VisibilityGate {
    pub fn new(initially_visible: bool, margin_px: f32) -> Self {
        Self {
            intersecting: initially_visible,
            margin_px,
            resumed: false,
        }
    }

    /// Pre-trigger margin the embedder should apply to its intersection test.
    pub fn margin_px(&self) -> f32 {
        self.margin_px
    }

    /// Update the intersection state. Repeating the current state is a
    /// no-op and returns `None`, so double-suspend is safe.
    pub fn set_intersecting(&mut self, intersecting: bool) -> Option<GateEvent> {
        if intersecting == self.intersecting {
            return None;
        }
        self.intersecting = intersecting;
        if intersecting {
            self.resumed = true;
            tracing::debug!("visibility gate resumed");
            Some(GateEvent::Resumed)
        } else {
            tracing::debug!("visibility gate suspended");
            Some(GateEvent::Suspended)
        }
    }

    /// Whether frame scheduling is currently permitted.
    pub fn should_render(&self) -> bool {
        self.intersecting
    }

    /// True exactly once after each suspend/resume cycle; the caller uses
    /// it to reset the frame clock instead of replaying missed time.
    pub fn take_resumed(&mut self) -> bool {
        std::mem::take(&mut self.resumed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_in_requested_state() {
        assert!(VisibilityGate::new(true, 0.0).should_render());
        assert!(!VisibilityGate::new(false, 200.0).should_render());
    }

    #[test]
    fn suspend_twice_equals_suspend_once() {
        let mut gate = VisibilityGate::new(true, 0.0);
        assert_eq!(gate.set_intersecting(false), Some(GateEvent::Suspended));
        assert_eq!(gate.set_intersecting(false), None);
        assert!(!gate.should_render());
    }

    #[test]
    fn resume_is_idempotent_too() {
        let mut gate = VisibilityGate::new(false, 0.0);
        assert_eq!(gate.set_intersecting(true), Some(GateEvent::Resumed));
        assert_eq!(gate.set_intersecting(true), None);
        assert!(gate.should_render());
    }

    #[test]
    fn resumed_flag_is_consumed_once() {
        let mut gate = VisibilityGate::new(true, 0.0);
        gate.set_intersecting(false);
        gate.set_intersecting(true);
        assert!(gate.take_resumed());
        assert!(!gate.take_resumed());
    }

    #[test]
    fn no_resumed_flag_without_a_transition() {
        let mut gate = VisibilityGate::new(true, 0.0);
        gate.set_intersecting(true);
        assert!(!gate.take_resumed());
    }
}
