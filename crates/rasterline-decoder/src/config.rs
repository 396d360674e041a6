use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use rasterline_signal::Sample;

use crate::constants::{
    PAL_BACK_PORCH_NS, PAL_DEFAULT_MAX_BACKLOG_SAMPLES, PAL_DEFAULT_SAMPLE_PERIOD_PS,
    PAL_EQUALISER_LOW_NS, PAL_FRAME_HEIGHT, PAL_FRAME_WIDTH, PAL_FRONT_PORCH_NS,
    PAL_HORIZONTAL_SYNC_LOW_NS, PAL_LINE_DURATION_NS, PAL_SYNC_DURATION_NS, PAL_TOLERANCE_NS,
    PAL_VERTICAL_SYNC_LOW_NS,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration parsing error: {0}")]
    Parse(#[from] config::ConfigError),

    #[error("Validation failed: {field}: {reason}")]
    Validation { field: String, reason: String },
}

fn validation(field: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Validation {
        field: field.to_string(),
        reason: reason.into(),
    }
}

/// Decoder configuration, immutable after construction.
///
/// All levels are millivolts as delivered by the digitizer; all durations
/// are nanoseconds except the sample period, which needs picosecond
/// resolution at video sample rates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecoderConfig {
    pub sample_period_ps: u32,
    pub interlaced: bool,
    pub frame_width: u32,
    pub frame_height: u32,
    pub sync_threshold: Sample,
    pub black_level: Sample,
    pub white_level: Sample,
    pub max_backlog_samples: usize,
    pub sync_duration_ns: u32,
    pub line_duration_ns: u32,
    pub equaliser_low_ns: u32,
    pub vertical_sync_low_ns: u32,
    pub horizontal_sync_low_ns: u32,
    pub front_porch_ns: u32,
    pub back_porch_ns: u32,
    pub tolerance_ns: u32,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            sample_period_ps: PAL_DEFAULT_SAMPLE_PERIOD_PS,
            interlaced: true,
            frame_width: PAL_FRAME_WIDTH,
            frame_height: PAL_FRAME_HEIGHT,
            sync_threshold: 200,
            black_level: 300,
            white_level: 1000,
            max_backlog_samples: PAL_DEFAULT_MAX_BACKLOG_SAMPLES,
            sync_duration_ns: PAL_SYNC_DURATION_NS,
            line_duration_ns: PAL_LINE_DURATION_NS,
            equaliser_low_ns: PAL_EQUALISER_LOW_NS,
            vertical_sync_low_ns: PAL_VERTICAL_SYNC_LOW_NS,
            horizontal_sync_low_ns: PAL_HORIZONTAL_SYNC_LOW_NS,
            front_porch_ns: PAL_FRONT_PORCH_NS,
            back_porch_ns: PAL_BACK_PORCH_NS,
            tolerance_ns: PAL_TOLERANCE_NS,
        }
    }
}

impl DecoderConfig {
    /// Load and validate a configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .build()?;
        let decoded: DecoderConfig = settings.try_deserialize()?;
        decoded.validate()?;
        Ok(decoded)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sample_period_ps == 0 {
            return Err(validation("sample_period_ps", "must be non-zero"));
        }
        if self.frame_width == 0 || self.frame_height == 0 {
            return Err(validation("frame_width/frame_height", "must be non-zero"));
        }
        if self.white_level <= self.black_level {
            return Err(validation(
                "white_level",
                format!(
                    "must exceed black_level ({} <= {})",
                    self.white_level, self.black_level
                ),
            ));
        }
        if self.front_porch_ns + self.back_porch_ns >= self.line_duration_ns {
            return Err(validation(
                "front_porch_ns/back_porch_ns",
                "porches leave no active region within a line",
            ));
        }
        // Classification relies on non-overlapping tolerance windows, not on
        // table order; reject any configuration where two references could
        // both match one measurement.
        let window_pairs = [
            ("line_duration_ns/sync_duration_ns", self.line_duration_ns, self.sync_duration_ns),
            (
                "horizontal_sync_low_ns/equaliser_low_ns",
                self.horizontal_sync_low_ns,
                self.equaliser_low_ns,
            ),
            (
                "vertical_sync_low_ns/equaliser_low_ns",
                self.vertical_sync_low_ns,
                self.equaliser_low_ns,
            ),
            (
                "vertical_sync_low_ns/horizontal_sync_low_ns",
                self.vertical_sync_low_ns,
                self.horizontal_sync_low_ns,
            ),
        ];
        for (field, a, b) in window_pairs {
            if a.abs_diff(b) <= 2 * self.tolerance_ns {
                return Err(validation(
                    field,
                    format!("tolerance windows overlap ({a} vs {b} at ±{})", self.tolerance_ns),
                ));
            }
        }
        let frame_samples = self.frame_duration_samples();
        if self.max_backlog_samples as u64 <= 2 * frame_samples {
            return Err(validation(
                "max_backlog_samples",
                format!(
                    "must exceed two frame durations ({} <= {})",
                    self.max_backlog_samples,
                    2 * frame_samples
                ),
            ));
        }
        Ok(())
    }

    /// Number of whole samples covering `ns` nanoseconds.
    pub fn samples_for_ns(&self, ns: u32) -> u64 {
        ns as u64 * 1_000 / self.sample_period_ps as u64
    }

    pub fn frame_duration_samples(&self) -> u64 {
        self.line_duration_ns as u64 * self.frame_height as u64 * 1_000
            / self.sample_period_ps as u64
    }

    pub fn sample_rate_mhz(&self) -> f64 {
        1e6 / self.sample_period_ps as f64
    }
}
