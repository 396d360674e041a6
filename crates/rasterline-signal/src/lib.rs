pub mod buffer;
pub mod chunk;
pub mod pulse;
pub mod reader;

pub use buffer::SampleBuffer;
pub use chunk::{Sample, SampleChunk, SampleOffset};
pub use pulse::{PulseAlignment, PulseAnalyser, PulseInfo};
pub use reader::PulseReader;
