use std::collections::VecDeque;

use crate::chunk::{SampleChunk, SampleOffset};

/// Ordered sequence of sample chunks, oldest first.
///
/// Samples accumulate at the head end (highest index), are consumed walking
/// forward from the tail (index 0), and are trimmed from the tail. The
/// buffer is offset-agnostic: chunk offsets are the producer's contract and
/// are never validated here.
#[derive(Debug, Default)]
pub struct SampleBuffer {
    chunks: VecDeque<SampleChunk>,
    total_samples: usize,
}

impl SampleBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a zero-filled chunk at the head end and hand it back for the
    /// producer to fill.
    pub fn append(&mut self, offset: SampleOffset, length: usize) -> &mut SampleChunk {
        self.push(SampleChunk::new(offset, length));
        self.chunks.back_mut().expect("chunk was just appended")
    }

    /// Append an already-built chunk at the head end.
    pub fn push(&mut self, chunk: SampleChunk) {
        self.total_samples += chunk.len();
        self.chunks.push_back(chunk);
    }

    /// Splice all of `other`'s chunks onto the head end, leaving `other`
    /// empty. Chunk order and contents are preserved.
    pub fn concatenate(&mut self, other: &mut SampleBuffer) {
        self.total_samples += other.total_samples;
        other.total_samples = 0;
        self.chunks.append(&mut other.chunks);
    }

    /// Remove all chunks strictly older than `index`. Returns the number
    /// removed so callers can re-base their indices.
    pub fn trim_before(&mut self, index: usize) -> usize {
        let count = index.min(self.chunks.len());
        self.remove_oldest(count)
    }

    /// Remove all chunks up to and including `index`. The chunk at `index`
    /// is no longer valid afterwards. Returns the number removed.
    pub fn trim_before_and_including(&mut self, index: usize) -> usize {
        let count = (index + 1).min(self.chunks.len());
        self.remove_oldest(count)
    }

    fn remove_oldest(&mut self, count: usize) -> usize {
        for _ in 0..count {
            let chunk = self.chunks.pop_front().expect("count bounded by length");
            self.total_samples -= chunk.len();
        }
        count
    }

    pub fn clear(&mut self) {
        self.chunks.clear();
        self.total_samples = 0;
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    pub fn total_samples(&self) -> usize {
        self.total_samples
    }

    pub fn get(&self, index: usize) -> Option<&SampleChunk> {
        self.chunks.get(index)
    }

    /// Oldest chunk, if any.
    pub fn tail(&self) -> Option<&SampleChunk> {
        self.chunks.front()
    }

    /// Newest chunk, if any.
    pub fn head(&self) -> Option<&SampleChunk> {
        self.chunks.back()
    }

    /// Starting from `from`, walk forward while the chunk ends at or before
    /// `target`, then backward while the chunk starts after it. `Some` only
    /// when the resulting chunk's range contains `target`; typical seeks
    /// move at most one or two chunks.
    pub fn seek(&self, from: usize, target: SampleOffset) -> Option<usize> {
        if self.chunks.is_empty() {
            return None;
        }
        let mut index = from.min(self.chunks.len() - 1);
        while index + 1 < self.chunks.len() && self.chunks[index].end_offset() <= target {
            index += 1;
        }
        while index > 0 && self.chunks[index].offset() > target {
            index -= 1;
        }
        if self.chunks[index].contains(target) {
            Some(index)
        } else {
            None
        }
    }
}
