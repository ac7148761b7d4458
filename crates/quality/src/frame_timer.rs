/// Rolling-window frame-time sampler.
///
/// Holds a fixed-capacity ring buffer of inter-frame deltas in
/// milliseconds. The smoothed frame rate is `1000 / mean(deltas)`; all
/// smoothing comes from the averaging window, there is no debounce.
#[derive(Debug)]
pub struct FrameTimer {
    deltas_ms: Vec<f32>,
    capacity: usize,
    index: usize,
    filled: bool,
    last_timestamp_ms: Option<f64>,
    min_frame_rate: f32,
}

impl FrameTimer {
    /// Default sampling window, roughly one second at 60 fps.
    pub const DEFAULT_CAPACITY: usize = 60;

    pub fn new(capacity: usize, min_frame_rate: f32) -> Self {
        Self {
            deltas_ms: vec![0.0; capacity.max(1)],
            capacity: capacity.max(1),
            index: 0,
            filled: false,
            last_timestamp_ms: None,
            min_frame_rate,
        }
    }

    /// Record a frame boundary at `now_ms` on the caller's clock.
    ///
    /// The first call after construction (or after `reset_clock`) is a
    /// warm-up sample: it establishes the reference timestamp and
    /// contributes no delta.
    pub fn record_frame(&mut self, now_ms: f64) {
        let Some(last) = self.last_timestamp_ms else {
            self.last_timestamp_ms = Some(now_ms);
            return;
        };
        self.last_timestamp_ms = Some(now_ms);

        let delta = (now_ms - last) as f32;
        // Clock going backwards or duplicate timestamps carry no signal.
        if delta <= 0.0 {
            return;
        }
        self.deltas_ms[self.index] = delta;
        self.index = (self.index + 1) % self.capacity;
        if self.index == 0 {
            self.filled = true;
        }
    }

    /// Forget the reference timestamp so the next `record_frame` is a
    /// warm-up sample. Used when resuming from a suspended state to avoid
    /// a catch-up delta spanning the suspension.
    pub fn reset_clock(&mut self) {
        self.last_timestamp_ms = None;
    }

    /// Number of deltas currently in the window.
    pub fn sample_count(&self) -> usize {
        if self.filled { self.capacity } else { self.index }
    }

    /// Mean frame time over the window, in milliseconds. Zero while warming up.
    pub fn mean_frame_time_ms(&self) -> f32 {
        let count = self.sample_count();
        if count == 0 {
            return 0.0;
        }
        let total: f32 = self.deltas_ms[..count].iter().sum();
        total / count as f32
    }

    /// Smoothed frame rate. Zero while warming up.
    pub fn frame_rate(&self) -> f32 {
        let mean = self.mean_frame_time_ms();
        if mean <= 0.0 { 0.0 } else { 1000.0 / mean }
    }

    /// Instantaneous low-performance check against the configured floor.
    /// False while warming up.
    pub fn is_low_performance(&self) -> bool {
        self.sample_count() > 0 && self.frame_rate() < self.min_frame_rate
    }
}

impl Default for FrameTimer {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY, 40.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Feed `frames` frames at a steady `fps` rate, starting at `start_ms`.
    fn feed(timer: &mut FrameTimer, start_ms: f64, fps: f64, frames: usize) -> f64 {
        let step = 1000.0 / fps;
        let mut now = start_ms;
        for _ in 0..frames {
            timer.record_frame(now);
            now += step;
        }
        now
    }

    #[test]
    fn warm_up_sample_contributes_nothing() {
        let mut timer = FrameTimer::new(60, 40.0);
        timer.record_frame(1000.0);
        assert_eq!(timer.sample_count(), 0);
        assert_eq!(timer.frame_rate(), 0.0);
        assert!(!timer.is_low_performance());
    }

    #[test]
    fn steady_feed_recovers_rate() {
        let mut timer = FrameTimer::new(60, 40.0);
        feed(&mut timer, 0.0, 60.0, 30);
        let fps = timer.frame_rate();
        assert!((fps - 60.0).abs() < 0.5, "fps = {fps}");
        assert!(!timer.is_low_performance());
    }

    #[test]
    fn slow_feed_flags_low_performance() {
        let mut timer = FrameTimer::new(60, 40.0);
        feed(&mut timer, 0.0, 25.0, 30);
        assert!(timer.is_low_performance());
        assert!((timer.mean_frame_time_ms() - 40.0).abs() < 0.5);
    }

    #[test]
    fn ring_buffer_evicts_oldest() {
        let mut timer = FrameTimer::new(4, 40.0);
        // Slow frames first, then enough fast frames to flush them out.
        let now = feed(&mut timer, 0.0, 10.0, 8);
        feed(&mut timer, now, 60.0, 5);
        let fps = timer.frame_rate();
        assert!((fps - 60.0).abs() < 1.0, "old samples not evicted, fps = {fps}");
        assert_eq!(timer.sample_count(), 4);
    }

    #[test]
    fn reset_clock_swallows_the_gap() {
        let mut timer = FrameTimer::new(60, 40.0);
        feed(&mut timer, 0.0, 60.0, 10);
        timer.reset_clock();
        // Five seconds later; without the reset this would be a 5000ms delta.
        timer.record_frame(5166.0);
        timer.record_frame(5182.6);
        assert!(timer.frame_rate() > 55.0);
    }

    #[test]
    fn backwards_clock_is_ignored() {
        let mut timer = FrameTimer::new(60, 40.0);
        timer.record_frame(100.0);
        timer.record_frame(90.0);
        assert_eq!(timer.sample_count(), 0);
        // Recovers once the clock moves forward again.
        timer.record_frame(106.6);
        assert_eq!(timer.sample_count(), 1);
    }
}
