pub mod decoder_metrics;

pub use decoder_metrics::*;
