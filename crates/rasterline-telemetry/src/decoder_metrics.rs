use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Shared metrics for cross-thread decoder monitoring
#[derive(Clone, Default)]
pub struct DecoderMetrics {
    // Throughput
    pub frames_decoded: Arc<AtomicU64>,
    pub pulses_processed: Arc<AtomicU64>,
    pub frame_fps: Arc<AtomicU64>, // Frames per second * 10

    // Decoder error counters (mirrors of the drainable counters)
    pub no_signal_or_overrun: Arc<AtomicU64>,
    pub unrecognised_pulse_type: Arc<AtomicU64>,
    pub long_sync_pattern: Arc<AtomicU64>,
    pub unrecognised_sync_pattern: Arc<AtomicU64>,

    // Activity indicator
    pub last_frame_time: Arc<RwLock<Option<Instant>>>,
}

impl DecoderMetrics {
    pub fn increment_frames_decoded(&self) {
        self.frames_decoded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_pulses_processed(&self) {
        self.pulses_processed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn update_frame_fps(&self, fps: f64) {
        self.frame_fps.store((fps * 10.0) as u64, Ordering::Relaxed);
    }

    pub fn increment_no_signal_or_overrun(&self) {
        self.no_signal_or_overrun.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_unrecognised_pulse_type(&self) {
        self.unrecognised_pulse_type.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_long_sync_pattern(&self) {
        self.long_sync_pattern.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_unrecognised_sync_pattern(&self) {
        self.unrecognised_sync_pattern.fetch_add(1, Ordering::Relaxed);
    }

    pub fn mark_frame(&self) {
        *self.last_frame_time.write() = Some(Instant::now());
    }

    pub fn time_since_last_frame(&self) -> Option<Duration> {
        self.last_frame_time.read().map(|t| t.elapsed())
    }
}

#[derive(Debug)]
pub struct FrameRateTracker {
    last_update: Instant,
    frame_count: u64,
}

impl FrameRateTracker {
    pub fn new() -> Self {
        Self {
            last_update: Instant::now(),
            frame_count: 0,
        }
    }

    /// Count one frame; yields an updated rate once per elapsed second.
    pub fn tick(&mut self) -> Option<f64> {
        self.frame_count += 1;
        let elapsed = self.last_update.elapsed();

        if elapsed >= Duration::from_secs(1) {
            let fps = self.frame_count as f64 / elapsed.as_secs_f64();
            self.last_update = Instant::now();
            self.frame_count = 0;
            Some(fps)
        } else {
            None
        }
    }
}

impl Default for FrameRateTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_start_at_zero() {
        let metrics = DecoderMetrics::default();
        assert_eq!(metrics.frames_decoded.load(Ordering::Relaxed), 0);
        assert_eq!(metrics.no_signal_or_overrun.load(Ordering::Relaxed), 0);
        assert!(metrics.time_since_last_frame().is_none());
    }

    #[test]
    fn clones_share_the_same_counters() {
        let metrics = DecoderMetrics::default();
        let observer = metrics.clone();
        metrics.increment_frames_decoded();
        metrics.increment_long_sync_pattern();
        assert_eq!(observer.frames_decoded.load(Ordering::Relaxed), 1);
        assert_eq!(observer.long_sync_pattern.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn fps_is_stored_with_one_decimal() {
        let metrics = DecoderMetrics::default();
        metrics.update_frame_fps(25.0);
        assert_eq!(metrics.frame_fps.load(Ordering::Relaxed), 250);
    }

    #[test]
    fn mark_frame_records_activity() {
        let metrics = DecoderMetrics::default();
        metrics.mark_frame();
        assert!(metrics.time_since_last_frame().unwrap() < Duration::from_secs(1));
    }

    #[test]
    fn tracker_does_not_report_before_a_second_elapses() {
        let mut tracker = FrameRateTracker::new();
        assert!(tracker.tick().is_none());
        assert!(tracker.tick().is_none());
    }
}
