//! Frame timing for the gallery loop, enabled with the `render_metrics` feature.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

const WINDOW: Duration = Duration::from_secs(1);
const MAX_WINDOW_SAMPLES: usize = 16_384;

#[derive(Debug, Clone, Copy)]
struct FrameSample {
    finished_at: Instant,
    duration: Duration,
}

/// Cumulative and rolling one-second statistics over completed gallery frames.
#[derive(Debug)]
pub struct FrameMetrics {
    frame_count: u64,
    teleport_count: u64,
    total_frame_time: Duration,
    first_frame_started_at: Option<Instant>,
    last_frame_finished_at: Option<Instant>,
    window: VecDeque<FrameSample>,
    window_frame_time: Duration,
}

impl Default for FrameMetrics {
    fn default() -> Self {
        Self {
            frame_count: 0,
            teleport_count: 0,
            total_frame_time: Duration::ZERO,
            first_frame_started_at: None,
            last_frame_finished_at: None,
            window: VecDeque::new(),
            window_frame_time: Duration::ZERO,
        }
    }
}

impl FrameMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a frame that ran from `started_at` to `finished_at` and wrapped `teleports`
    /// tiles around the ring.
    pub fn record_frame(&mut self, started_at: Instant, finished_at: Instant, teleports: usize) {
        let duration = finished_at.saturating_duration_since(started_at);

        self.first_frame_started_at.get_or_insert(started_at);
        self.last_frame_finished_at = Some(finished_at);
        self.frame_count += 1;
        self.teleport_count += teleports as u64;
        self.total_frame_time += duration;

        if self.window.len() == MAX_WINDOW_SAMPLES {
            self.pop_oldest();
        }
        self.window.push_back(FrameSample {
            finished_at,
            duration,
        });
        self.window_frame_time += duration;

        while let Some(oldest) = self.window.front() {
            if finished_at.saturating_duration_since(oldest.finished_at) <= WINDOW {
                break;
            }
            self.pop_oldest();
        }
    }

    fn pop_oldest(&mut self) {
        if let Some(oldest) = self.window.pop_front() {
            self.window_frame_time = self.window_frame_time.saturating_sub(oldest.duration);
        }
    }

    pub fn total_frames(&self) -> u64 {
        self.frame_count
    }

    /// Tiles wrapped from one end of the ring to the other since the last reset.
    pub fn teleport_count(&self) -> u64 {
        self.teleport_count
    }

    /// Frames per second between the first frame's start and the last frame's end.
    pub fn overall_frames_per_second(&self) -> f64 {
        let (Some(first), Some(last)) = (self.first_frame_started_at, self.last_frame_finished_at)
        else {
            return 0.0;
        };
        let elapsed = last.saturating_duration_since(first).as_secs_f64();
        if elapsed == 0.0 {
            return 0.0;
        }
        self.frame_count as f64 / elapsed
    }

    pub fn overall_average_frame_time(&self) -> Duration {
        if self.frame_count == 0 {
            return Duration::ZERO;
        }
        Duration::from_secs_f64(self.total_frame_time.as_secs_f64() / self.frame_count as f64)
    }

    /// Frames finished within the last second.
    pub fn frames_per_second(&self) -> f64 {
        self.window.len() as f64
    }

    pub fn average_frame_time(&self) -> Duration {
        if self.window.is_empty() {
            return Duration::ZERO;
        }
        Duration::from_secs_f64(self.window_frame_time.as_secs_f64() / self.window.len() as f64)
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_duration_near(actual: Duration, expected: Duration) {
        let difference = if actual > expected {
            actual - expected
        } else {
            expected - actual
        };
        assert!(
            difference <= Duration::from_micros(1),
            "expected {actual:?} to be close to {expected:?}"
        );
    }

    #[test]
    fn empty_metrics_report_zero() {
        let metrics = FrameMetrics::new();
        assert_eq!(metrics.total_frames(), 0);
        assert_eq!(metrics.overall_frames_per_second(), 0.0);
        assert_eq!(metrics.overall_average_frame_time(), Duration::ZERO);
        assert_eq!(metrics.average_frame_time(), Duration::ZERO);
    }

    #[test]
    fn cumulative_averages_cover_all_frames() {
        let mut metrics = FrameMetrics::new();
        let start = Instant::now();
        metrics.record_frame(start, start + Duration::from_millis(10), 0);
        metrics.record_frame(
            start + Duration::from_millis(20),
            start + Duration::from_millis(40),
            2,
        );

        assert_eq!(metrics.total_frames(), 2);
        assert_eq!(metrics.teleport_count(), 2);
        assert_duration_near(metrics.overall_average_frame_time(), Duration::from_millis(15));
        assert!((metrics.overall_frames_per_second() - 50.0).abs() < 1e-9);
    }

    #[test]
    fn rolling_window_drops_frames_older_than_a_second() {
        let mut metrics = FrameMetrics::new();
        let start = Instant::now();
        metrics.record_frame(start, start + Duration::from_millis(10), 0);
        metrics.record_frame(
            start + Duration::from_millis(600),
            start + Duration::from_millis(620),
            0,
        );
        metrics.record_frame(
            start + Duration::from_millis(1_400),
            start + Duration::from_millis(1_440),
            1,
        );

        assert_eq!(metrics.frames_per_second(), 2.0);
        assert_duration_near(metrics.average_frame_time(), Duration::from_millis(30));

        metrics.reset();
        assert_eq!(metrics.total_frames(), 0);
        assert_eq!(metrics.teleport_count(), 0);
    }
}
