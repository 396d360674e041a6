use std::sync::Arc;

use rasterline_signal::{PulseAlignment, PulseInfo, PulseReader, SampleBuffer, SampleOffset};
use rasterline_telemetry::{DecoderMetrics, FrameRateTracker};

use crate::classify::{PulseClassifier, PulseKind};
use crate::config::{ConfigError, DecoderConfig};
use crate::frame::{level_to_brightness, FrameRaster};
use crate::pattern::{PatternRing, NEXT_FIELD_PATTERN, NEXT_FRAME_PATTERN};

/// Monotonic error counters, drained by [`FrameDecoder::take_errors`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DecoderErrors {
    /// Backlog exceeded; buffered samples were discarded.
    pub no_signal_or_overrun: u64,
    /// A pulse matched no classification row.
    pub unrecognised_pulse_type: u64,
    /// A symbol was pushed onto a full pattern ring; the expected sync
    /// pattern did not arrive in time.
    pub long_sync_pattern: u64,
    /// Reserved; reported but never incremented by current classification
    /// logic.
    pub unrecognised_sync_pattern: u64,
}

impl DecoderErrors {
    pub fn accumulate(&mut self, other: &DecoderErrors) {
        self.no_signal_or_overrun += other.no_signal_or_overrun;
        self.unrecognised_pulse_type += other.unrecognised_pulse_type;
        self.long_sync_pattern += other.long_sync_pattern;
        self.unrecognised_sync_pattern += other.unrecognised_sync_pattern;
    }

    pub fn total(&self) -> u64 {
        self.no_signal_or_overrun
            + self.unrecognised_pulse_type
            + self.long_sync_pattern
            + self.unrecognised_sync_pattern
    }
}

/// Coalesces consecutive pulses of one kind into a single debug log line,
/// so a healthy signal logs once per run of horizontal pulses rather than
/// once per line.
#[derive(Debug)]
struct PulseRunLogger {
    kind: PulseKind,
    count: u32,
    duration_ns: u32,
    low_ns: u32,
}

impl PulseRunLogger {
    fn new() -> Self {
        Self {
            kind: PulseKind::Unclassified,
            count: 0,
            duration_ns: 0,
            low_ns: 0,
        }
    }

    fn observe(&mut self, kind: PulseKind, duration_ns: u32, low_ns: u32) {
        if kind == self.kind {
            self.count += 1;
            return;
        }
        if self.count > 0 {
            tracing::debug!(
                "pulse run: {} x{} ({:.1}/{:.1} us)",
                self.kind.label(),
                self.count,
                self.low_ns as f32 / 1_000.0,
                self.duration_ns as f32 / 1_000.0,
            );
        }
        self.kind = kind;
        self.count = 1;
        self.duration_ns = duration_ns;
        self.low_ns = low_ns;
    }
}

/// Reconstructs raster frames from an unbounded chunked sample stream.
///
/// Chunks arrive through [`ingest`](FrameDecoder::ingest); the caller then
/// pumps [`read_frame`](FrameDecoder::read_frame) until it returns `false`
/// and reads [`frame`](FrameDecoder::frame) after every `true`. All
/// operations run on one thread; the decoder never blocks.
pub struct FrameDecoder {
    config: DecoderConfig,
    classifier: PulseClassifier,

    buffer: SampleBuffer,
    cursor: Option<usize>,
    next_chunk_expected_offset: SampleOffset,

    reader: PulseReader,
    pattern: PatternRing,

    raster: FrameRaster,
    next_line: u32,
    frame_ready: bool,

    errors: DecoderErrors,
    run_log: PulseRunLogger,
    metrics: Option<Arc<DecoderMetrics>>,
    fps_tracker: FrameRateTracker,
}

impl FrameDecoder {
    pub fn new(config: DecoderConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        tracing::info!(
            "Initialising frame decoder @ {:.2} MHz sample rate, {}x{} {}",
            config.sample_rate_mhz(),
            config.frame_width,
            config.frame_height,
            if config.interlaced {
                "interlaced"
            } else {
                "progressive"
            }
        );
        Ok(Self {
            classifier: PulseClassifier::new(&config),
            buffer: SampleBuffer::new(),
            cursor: None,
            next_chunk_expected_offset: 0,
            reader: PulseReader::new(PulseAlignment::LeftAligned, config.sync_threshold),
            pattern: PatternRing::new(),
            raster: FrameRaster::new(config.frame_width, config.frame_height),
            next_line: 0,
            frame_ready: false,
            errors: DecoderErrors::default(),
            run_log: PulseRunLogger::new(),
            metrics: None,
            fps_tracker: FrameRateTracker::new(),
            config,
        })
    }

    pub fn with_metrics(mut self, metrics: Arc<DecoderMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// The most recently completed raster; valid after
    /// [`read_frame`](FrameDecoder::read_frame) returns `true`, until the
    /// next call.
    pub fn frame(&self) -> &FrameRaster {
        &self.raster
    }

    /// Raster line the next horizontal pulse will fill.
    pub fn next_line(&self) -> u32 {
        self.next_line
    }

    pub fn errors(&self) -> DecoderErrors {
        self.errors
    }

    pub fn buffered_samples(&self) -> usize {
        self.buffer.total_samples()
    }

    pub fn buffered_chunks(&self) -> usize {
        self.buffer.chunk_count()
    }

    /// True when a stream discontinuity has been detected and the pulse
    /// extractor will reset on its next scan.
    pub fn desync_scheduled(&self) -> bool {
        self.reader.reset_scheduled()
    }

    /// Take ownership of all chunks in `incoming`, leaving it empty, then
    /// apply backlog control.
    pub fn ingest(&mut self, incoming: &mut SampleBuffer) {
        if incoming.is_empty() {
            return;
        }
        let first_new = self.buffer.chunk_count();
        self.buffer.concatenate(incoming);
        if self.cursor.is_none() {
            self.bind_chunk(Some(first_new));
        }
        if !self.overrun() {
            return;
        }
        self.errors.no_signal_or_overrun += 1;
        if let Some(metrics) = &self.metrics {
            metrics.increment_no_signal_or_overrun();
        }
        tracing::warn!(
            buffered = self.buffer.total_samples(),
            limit = self.config.max_backlog_samples,
            "sample backlog exceeded, trimming oldest chunks"
        );
        while self.overrun() {
            self.buffer.trim_before_and_including(0);
        }
        // The old scan position went away with the trimmed chunks, so the
        // rebind below is a discontinuity even when offsets happen to line
        // up again.
        match self.buffer.tail().map(|chunk| chunk.offset()) {
            Some(offset) => {
                self.handle_desync(offset);
                self.next_chunk_expected_offset = offset;
                self.bind_chunk(Some(0));
            }
            None => {
                self.cursor = None;
            }
        }
    }

    /// Pump buffered samples through the pulse extractor. Returns `true`
    /// when a complete frame is ready, `false` once all buffered data is
    /// drained; callers loop until `false`.
    pub fn read_frame(&mut self) -> bool {
        self.frame_ready = false;
        while let Some(cursor) = self.cursor {
            let pulse = match self.buffer.get(cursor) {
                Some(chunk) => self.reader.next(chunk),
                None => {
                    debug_assert!(false, "cursor index {cursor} out of range");
                    self.cursor = None;
                    break;
                }
            };
            match pulse {
                Some(info) => {
                    self.process_pulse(&info);
                    let removed = self.buffer.trim_before(cursor);
                    if removed > 0 {
                        self.cursor = Some(cursor - removed);
                    }
                    if self.frame_ready {
                        break;
                    }
                }
                None => {
                    let next = cursor + 1;
                    if next < self.buffer.chunk_count() {
                        self.bind_chunk(Some(next));
                    } else {
                        self.cursor = None;
                    }
                }
            }
        }
        if self.frame_ready {
            if let Some(metrics) = &self.metrics {
                metrics.increment_frames_decoded();
                metrics.mark_frame();
                if let Some(fps) = self.fps_tracker.tick() {
                    metrics.update_frame_fps(fps);
                }
            }
        }
        self.frame_ready
    }

    /// Add the current counters into `out` (when given) and zero them.
    pub fn take_errors(&mut self, out: Option<&mut DecoderErrors>) {
        if let Some(out) = out {
            out.accumulate(&self.errors);
        }
        self.errors = DecoderErrors::default();
    }

    fn overrun(&self) -> bool {
        self.buffer.total_samples() > self.config.max_backlog_samples
    }

    fn bind_chunk(&mut self, index: Option<usize>) {
        self.cursor = index;
        let Some(index) = index else { return };
        let Some(chunk) = self.buffer.get(index) else {
            debug_assert!(false, "bind target {index} out of range");
            self.cursor = None;
            return;
        };
        let offset = chunk.offset();
        let end = chunk.end_offset();
        if offset != self.next_chunk_expected_offset {
            self.handle_desync(offset);
        }
        self.next_chunk_expected_offset = end;
        self.reader.bind();
    }

    fn handle_desync(&mut self, offset: SampleOffset) {
        tracing::warn!(
            expected = self.next_chunk_expected_offset,
            actual = offset,
            "sample stream discontinuity, resetting decoder state"
        );
        self.reader.schedule_reset();
        self.pattern.clear();
        self.reset_frame();
    }

    fn reset_frame(&mut self) {
        self.raster.reset();
        self.next_line = 0;
        self.frame_ready = false;
    }

    fn select_field(&mut self, field: u32) {
        self.next_line = if self.config.interlaced && field == 1 {
            1
        } else {
            0
        };
    }

    fn take_next_line(&mut self) -> Option<u32> {
        let line = self.next_line;
        if line >= self.config.frame_height {
            return None;
        }
        self.next_line += if self.config.interlaced { 2 } else { 1 };
        Some(line)
    }

    fn process_pulse(&mut self, info: &PulseInfo) {
        let period_ps = self.config.sample_period_ps as u64;
        let duration_ns = (info.duration() * period_ps / 1_000) as u32;
        let high_ns = (info.trailing_width() * period_ps / 1_000) as u32;
        let low_ns = duration_ns - high_ns;

        let kind = self.classifier.classify(duration_ns, low_ns);
        self.run_log.observe(kind, duration_ns, low_ns);
        if let Some(metrics) = &self.metrics {
            metrics.increment_pulses_processed();
        }
        match kind {
            PulseKind::Horizontal => self.rasterize_line(info.transition, info.end),
            PulseKind::Unclassified => {
                self.errors.unrecognised_pulse_type += 1;
                if let Some(metrics) = &self.metrics {
                    metrics.increment_unrecognised_pulse_type();
                }
                self.pattern.clear();
            }
            recognised => {
                if !self.pattern.push(recognised.symbol()) {
                    self.errors.long_sync_pattern += 1;
                    if let Some(metrics) = &self.metrics {
                        metrics.increment_long_sync_pattern();
                    }
                }
                self.apply_sync_pattern();
            }
        }
    }

    fn apply_sync_pattern(&mut self) {
        if self.pattern.matches(NEXT_FRAME_PATTERN) {
            tracing::debug!("frame sync pattern recognised");
            self.frame_ready = true;
            self.select_field(0);
            self.pattern.clear();
        } else if self.pattern.matches(NEXT_FIELD_PATTERN) {
            tracing::debug!("field sync pattern recognised");
            self.select_field(1);
            self.pattern.clear();
        }
    }

    /// Sample the active region `[high_begin + back porch, high_end − front
    /// porch)` into the next raster line.
    fn rasterize_line(&mut self, high_begin: SampleOffset, high_end: SampleOffset) {
        let Some(line) = self.take_next_line() else { return };
        let data_begin = high_begin + self.config.samples_for_ns(self.config.back_porch_ns);
        let data_end = high_end.saturating_sub(self.config.samples_for_ns(self.config.front_porch_ns));
        if data_end <= data_begin {
            return;
        }
        let span = data_end - data_begin;
        let Some(mut chunk_index) = self.cursor else { return };
        let width = self.config.frame_width;
        let black = self.config.black_level;
        let white = self.config.white_level;
        let row = self.raster.row_mut(line);
        for col in 0..width {
            let offset = data_begin + span * col as u64 / width as u64;
            let Some(found) = self.buffer.seek(chunk_index, offset) else {
                tracing::error!(offset, "active-region sample not buffered, dropping line");
                return;
            };
            chunk_index = found;
            let Some(value) = self.buffer.get(found).and_then(|c| c.sample_at(offset)) else {
                return;
            };
            row[col as usize] = level_to_brightness(value, black, white);
        }
    }
}
