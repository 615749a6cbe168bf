use std::fmt;
use std::time::Duration;

/// Weight of the newest sample in the running averages.
pub const AVERAGE_WEIGHT: f64 = 0.05;

/// Running averages of CPU and wall-clock frame time.
///
/// Each average is `(1 - w) * avg + w * sample`; the first sample seeds it.
#[derive(Debug, Clone, Default)]
pub struct FrameStats {
    avg_cpu_ms: Option<f64>,
    avg_frame_ms: Option<f64>,
    frames: u64,
    window: FrameWindow,
}

impl FrameStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one frame: `cpu` is time spent building it, `frame` the wall
    /// clock since the previous frame. A zero `frame` (first frame) only
    /// updates the CPU average.
    pub fn record(&mut self, cpu: Duration, frame: Duration) {
        self.frames += 1;
        self.avg_cpu_ms = Some(blend(self.avg_cpu_ms, ms(cpu)));
        if !frame.is_zero() {
            self.avg_frame_ms = Some(blend(self.avg_frame_ms, ms(frame)));
            self.window.record(frame);
        }
    }

    pub fn avg_cpu_ms(&self) -> f64 {
        self.avg_cpu_ms.unwrap_or(0.0)
    }

    pub fn avg_frame_ms(&self) -> f64 {
        self.avg_frame_ms.unwrap_or(0.0)
    }

    pub fn fps(&self) -> f64 {
        match self.avg_frame_ms {
            Some(ms) if ms > 0.0 => 1000.0 / ms,
            _ => 0.0,
        }
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Slowest frame among the recent window.
    pub fn worst_frame(&self) -> Duration {
        self.window.max()
    }
}

impl fmt::Display for FrameStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "fps: {:.1}  frame: {:.2}ms  cpu: {:.2}ms  worst: {:.2}ms",
            self.fps(),
            self.avg_frame_ms(),
            self.avg_cpu_ms(),
            ms(self.worst_frame()),
        )
    }
}

fn blend(avg: Option<f64>, sample: f64) -> f64 {
    match avg {
        Some(avg) => (1.0 - AVERAGE_WEIGHT) * avg + AVERAGE_WEIGHT * sample,
        None => sample,
    }
}

fn ms(d: Duration) -> f64 {
    d.as_secs_f64() * 1000.0
}

/// Ring buffer of the last few frame durations.
#[derive(Debug, Clone)]
pub struct FrameWindow {
    history: Vec<Duration>,
    index: usize,
    filled: bool,
}

impl Default for FrameWindow {
    fn default() -> Self {
        Self::new(120)
    }
}

impl FrameWindow {
    pub fn new(capacity: usize) -> Self {
        Self {
            history: vec![Duration::ZERO; capacity.max(1)],
            index: 0,
            filled: false,
        }
    }

    pub fn record(&mut self, dt: Duration) {
        self.history[self.index] = dt;
        self.index = (self.index + 1) % self.history.len();
        if self.index == 0 {
            self.filled = true;
        }
    }

    pub fn count(&self) -> usize {
        if self.filled {
            self.history.len()
        } else {
            self.index
        }
    }

    pub fn max(&self) -> Duration {
        self.history[..self.count()]
            .iter()
            .copied()
            .max()
            .unwrap_or(Duration::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_sample_seeds_average() {
        let mut stats = FrameStats::new();
        stats.record(Duration::from_millis(4), Duration::from_millis(20));
        assert!((stats.avg_cpu_ms() - 4.0).abs() < 1e-9);
        assert!((stats.avg_frame_ms() - 20.0).abs() < 1e-9);
        assert!((stats.fps() - 50.0).abs() < 1e-9);
    }

    #[test]
    fn later_samples_are_weighted() {
        let mut stats = FrameStats::new();
        stats.record(Duration::from_millis(10), Duration::from_millis(10));
        stats.record(Duration::from_millis(30), Duration::from_millis(30));
        // 0.95 * 10 + 0.05 * 30
        assert!((stats.avg_cpu_ms() - 11.0).abs() < 1e-9);
        assert!((stats.avg_frame_ms() - 11.0).abs() < 1e-9);
    }

    #[test]
    fn zero_frame_time_is_skipped() {
        let mut stats = FrameStats::new();
        stats.record(Duration::from_millis(2), Duration::ZERO);
        assert_eq!(stats.frames(), 1);
        assert_eq!(stats.avg_frame_ms(), 0.0);
        assert_eq!(stats.fps(), 0.0);
        stats.record(Duration::from_millis(2), Duration::from_millis(16));
        assert!((stats.avg_frame_ms() - 16.0).abs() < 1e-9);
    }

    #[test]
    fn window_wraps_around() {
        let mut window = FrameWindow::new(2);
        window.record(Duration::from_millis(30));
        window.record(Duration::from_millis(10));
        window.record(Duration::from_millis(20)); // overwrites 30
        assert_eq!(window.count(), 2);
        assert_eq!(window.max(), Duration::from_millis(20));
    }

    #[test]
    fn display_mentions_fps() {
        let mut stats = FrameStats::new();
        stats.record(Duration::from_millis(1), Duration::from_millis(16));
        let s = stats.to_string();
        assert!(s.starts_with("fps: 62.5"));
        assert!(s.contains("worst: 16.00ms"));
    }
}
