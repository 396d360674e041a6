//! Signal crate tests
//!
//! Tests cover:
//! - Sample buffer bookkeeping (totals, trim, concatenate)
//! - Seek contract (returned chunk always contains the target offset)
//! - Pulse extraction across chunk boundaries
//! - Ordering guarantee for emitted pulses

use rasterline_signal::{
    PulseAlignment, PulseReader, Sample, SampleBuffer, SampleChunk, SampleOffset,
};

// ─── Sample Buffer ───────────────────────────────────────────────────

#[test]
fn buffer_totals_match_chunk_lengths() {
    let mut buffer = SampleBuffer::new();
    for (offset, length) in [(0u64, 7usize), (7, 13), (20, 1)] {
        buffer.append(offset, length);
    }
    let summed: usize = (0..buffer.chunk_count())
        .map(|i| buffer.get(i).unwrap().len())
        .sum();
    assert_eq!(buffer.total_samples(), summed);
    assert_eq!(buffer.chunk_count(), 3);
}

#[test]
fn concatenate_empties_the_source_and_sums_totals() {
    let mut decoder_side = SampleBuffer::new();
    decoder_side.append(0, 10);
    let before = decoder_side.total_samples();

    let mut producer_side = SampleBuffer::new();
    producer_side.append(10, 20);
    producer_side.append(30, 20);
    let incoming = producer_side.total_samples();

    decoder_side.concatenate(&mut producer_side);
    assert_eq!(decoder_side.total_samples(), before + incoming);
    assert!(producer_side.is_empty());
    assert_eq!(producer_side.total_samples(), 0);
    assert_eq!(decoder_side.get(1).unwrap().offset(), 10);
    assert_eq!(decoder_side.get(2).unwrap().offset(), 30);
}

#[test]
fn concatenate_into_empty_buffer_adopts_all_chunks() {
    let mut empty = SampleBuffer::new();
    let mut full = SampleBuffer::new();
    full.append(100, 5);
    empty.concatenate(&mut full);
    assert_eq!(empty.chunk_count(), 1);
    assert_eq!(empty.tail().unwrap().offset(), 100);
    assert!(full.is_empty());
}

#[test]
fn trim_indices_clamp_to_length() {
    let mut buffer = SampleBuffer::new();
    buffer.append(0, 4);
    assert_eq!(buffer.trim_before(0), 0);
    assert_eq!(buffer.trim_before_and_including(5), 1);
    assert!(buffer.is_empty());
    assert_eq!(buffer.total_samples(), 0);
}

#[test]
fn seek_result_always_contains_the_target() {
    let mut buffer = SampleBuffer::new();
    for (offset, length) in [(0u64, 16usize), (16, 16), (32, 8), (40, 64)] {
        buffer.append(offset, length);
    }
    for start in 0..buffer.chunk_count() {
        for target in [0u64, 15, 16, 31, 32, 39, 40, 103] {
            let index = buffer
                .seek(start, target)
                .unwrap_or_else(|| panic!("seek({start}, {target}) failed"));
            let chunk = buffer.get(index).unwrap();
            assert!(chunk.offset() <= target, "chunk starts after target");
            assert!(target < chunk.end_offset(), "chunk ends before target");
        }
    }
    assert_eq!(buffer.seek(0, 104), None);
}

// ─── Pulse Extraction ────────────────────────────────────────────────

const THRESHOLD: Sample = 150;
const SYNC_MV: Sample = 0;
const ACTIVE_MV: Sample = 700;

/// Build `count` pulses of `low` sync samples followed by `high` active
/// samples, split into chunks of `chunk_len`, starting with a short active
/// preamble so the first sync edge is a clean fall.
fn pulse_train(count: usize, low: usize, high: usize, chunk_len: usize) -> Vec<SampleChunk> {
    let mut samples = vec![ACTIVE_MV; 4];
    for _ in 0..count {
        samples.extend(std::iter::repeat(SYNC_MV).take(low));
        samples.extend(std::iter::repeat(ACTIVE_MV).take(high));
    }
    samples.push(SYNC_MV);
    samples
        .chunks(chunk_len)
        .enumerate()
        .map(|(i, window)| SampleChunk::from_samples((i * chunk_len) as SampleOffset, window.to_vec()))
        .collect()
}

fn collect_pulses(chunks: &[SampleChunk]) -> Vec<rasterline_signal::PulseInfo> {
    let mut reader = PulseReader::new(PulseAlignment::LeftAligned, THRESHOLD);
    let mut pulses = Vec::new();
    for chunk in chunks {
        reader.bind();
        while let Some(pulse) = reader.next(chunk) {
            pulses.push(pulse);
        }
    }
    pulses
}

#[test]
fn contiguous_chunks_yield_every_pulse() {
    let chunks = pulse_train(10, 5, 59, 33);
    let pulses = collect_pulses(&chunks);
    assert_eq!(pulses.len(), 10, "one pulse per low/high period");
    for pulse in &pulses {
        assert_eq!(pulse.duration(), 64);
        assert_eq!(pulse.leading_width(), 5);
        assert_eq!(pulse.trailing_width(), 59);
    }
}

#[test]
fn pulses_are_emitted_in_strictly_increasing_order() {
    let chunks = pulse_train(24, 3, 29, 17);
    let pulses = collect_pulses(&chunks);
    assert!(!pulses.is_empty());
    for pulse in &pulses {
        assert!(pulse.start < pulse.transition);
        assert!(pulse.transition < pulse.end);
    }
    for pair in pulses.windows(2) {
        assert!(pair[0].end <= pair[1].start, "pulses overlap");
    }
}

#[test]
fn constant_level_produces_no_pulses() {
    let flat = vec![SampleChunk::from_samples(0, vec![ACTIVE_MV; 256])];
    assert!(collect_pulses(&flat).is_empty());
    let silent = vec![SampleChunk::from_samples(0, vec![SYNC_MV; 256])];
    assert!(collect_pulses(&silent).is_empty());
}
