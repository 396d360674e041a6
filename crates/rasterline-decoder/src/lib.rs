//! PAL-family composite video decoding.
//!
//! Feed digitizer sample chunks to a [`FrameDecoder`] and pump it for
//! grayscale raster frames. Sample transport and pulse extraction live in
//! `rasterline-signal`; cross-thread observability in
//! `rasterline-telemetry`.

pub mod classify;
pub mod config;
pub mod constants;
pub mod decoder;
pub mod frame;
pub mod pattern;

pub use classify::{PulseClassifier, PulseKind};
pub use config::{ConfigError, DecoderConfig};
pub use decoder::{DecoderErrors, FrameDecoder};
pub use frame::{level_to_brightness, FrameRaster};
pub use pattern::{PatternRing, NEXT_FIELD_PATTERN, NEXT_FRAME_PATTERN};
