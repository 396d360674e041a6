use crate::chunk::{Sample, SampleChunk};
use crate::pulse::{PulseAlignment, PulseAnalyser, PulseInfo};

/// Scans one bound chunk at a time for threshold crossings and feeds them to
/// the pulse analyser.
///
/// The reader never borrows the chunk it is bound to; callers pass the
/// current chunk into [`next`](PulseReader::next) on every call. Threshold
/// state and analyser history carry across chunks so a pulse may span a
/// chunk boundary.
#[derive(Debug)]
pub struct PulseReader {
    analyser: PulseAnalyser,
    threshold: Sample,
    previous_state: bool,
    cursor: usize,
    reset_pending: bool,
}

impl PulseReader {
    pub fn new(alignment: PulseAlignment, threshold: Sample) -> Self {
        Self {
            analyser: PulseAnalyser::new(alignment, 0),
            threshold,
            previous_state: false,
            cursor: 0,
            reset_pending: true,
        }
    }

    /// Rewind the scan cursor for a newly bound chunk. Analyser history is
    /// untouched; contiguous chunks continue the same pulse stream.
    pub fn bind(&mut self) {
        self.cursor = 0;
    }

    /// Mark the upcoming sample stream as discontinuous with prior samples.
    /// The next scan resets the analyser to the bound chunk's first offset.
    pub fn schedule_reset(&mut self) {
        self.reset_pending = true;
    }

    pub fn reset_scheduled(&self) -> bool {
        self.reset_pending
    }

    /// Scan `chunk` from the cursor onward; returns the next completed pulse
    /// or `None` once the chunk is exhausted.
    pub fn next(&mut self, chunk: &SampleChunk) -> Option<PulseInfo> {
        if self.reset_pending {
            self.reset_pending = false;
            self.analyser.reset(chunk.offset());
        }
        let samples = chunk.samples();
        while self.cursor < samples.len() {
            let index = self.cursor;
            self.cursor += 1;
            let state = samples[index] >= self.threshold;
            if state == self.previous_state {
                continue;
            }
            self.previous_state = state;
            let offset = chunk.offset() + index as u64;
            if let Some(info) = self.analyser.transition(offset, state) {
                return Some(info);
            }
        }
        None
    }
}
