use crate::chunk::SampleOffset;

/// Which half of the pulse carries the sync level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PulseAlignment {
    /// Low-then-high pulse, completed by the trailing falling edge.
    LeftAligned,
    /// High-then-low pulse, completed by the trailing rising edge.
    RightAligned,
}

impl PulseAlignment {
    /// Threshold state of the edge that completes a pulse.
    fn closing_state(self) -> bool {
        match self {
            PulseAlignment::LeftAligned => false,
            PulseAlignment::RightAligned => true,
        }
    }
}

/// One detected pulse, in absolute sample offsets.
///
/// `[start, transition)` is the leading portion and `[transition, end)` the
/// trailing portion; for a left-aligned extractor the leading portion is the
/// low (sync) region. `start < transition < end` holds for every emitted
/// pulse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PulseInfo {
    pub start: SampleOffset,
    pub transition: SampleOffset,
    pub end: SampleOffset,
}

impl PulseInfo {
    pub fn duration(&self) -> u64 {
        self.end - self.start
    }

    pub fn leading_width(&self) -> u64 {
        self.transition - self.start
    }

    pub fn trailing_width(&self) -> u64 {
        self.end - self.transition
    }
}

/// Stateful classifier turning threshold edges into pulses.
///
/// Keeps the offsets of the most recent rising and falling edge; a pulse is
/// emitted when the closing edge of the configured alignment arrives and
/// both prior edges have been observed.
#[derive(Debug)]
pub struct PulseAnalyser {
    alignment: PulseAlignment,
    rise_at: SampleOffset,
    fall_at: SampleOffset,
    last_state: bool,
}

impl PulseAnalyser {
    pub fn new(alignment: PulseAlignment, initial_offset: SampleOffset) -> Self {
        Self {
            alignment,
            rise_at: initial_offset,
            fall_at: initial_offset,
            last_state: alignment.closing_state(),
        }
    }

    pub fn alignment(&self) -> PulseAlignment {
        self.alignment
    }

    /// Record a threshold edge at `offset`; returns the completed pulse when
    /// this edge closes one.
    pub fn transition(&mut self, offset: SampleOffset, new_state: bool) -> Option<PulseInfo> {
        let edge_seen = new_state != self.last_state;
        let closing_edge = new_state == self.alignment.closing_state();
        let have_both_edges = self.rise_at != self.fall_at;

        let mut emitted = None;
        if edge_seen && closing_edge && have_both_edges {
            let info = match self.alignment {
                PulseAlignment::LeftAligned => PulseInfo {
                    start: self.fall_at,
                    transition: self.rise_at,
                    end: offset,
                },
                PulseAlignment::RightAligned => PulseInfo {
                    start: self.rise_at,
                    transition: self.fall_at,
                    end: offset,
                },
            };
            if info.end > info.transition && info.transition > info.start {
                emitted = Some(info);
            }
        }

        if new_state {
            self.rise_at = offset;
        } else {
            self.fall_at = offset;
        }
        self.last_state = new_state;
        emitted
    }

    /// Collapse the edge history to `offset`; no pulse can be emitted until
    /// two further edges arrive.
    pub fn reset(&mut self, offset: SampleOffset) {
        self.rise_at = offset;
        self.fall_at = offset;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn left_aligned_emits_on_trailing_falling_edge() {
        let mut analyser = PulseAnalyser::new(PulseAlignment::LeftAligned, 0);
        assert_eq!(analyser.transition(10, true), None);
        // The interval since the initial offset counts as the first low
        // portion, so this fall already completes a pulse.
        assert_eq!(
            analyser.transition(20, false),
            Some(PulseInfo {
                start: 0,
                transition: 10,
                end: 20
            })
        );
        assert_eq!(analyser.transition(24, true), None);
        assert_eq!(
            analyser.transition(84, false),
            Some(PulseInfo {
                start: 20,
                transition: 24,
                end: 84
            })
        );
    }

    #[test]
    fn right_aligned_emits_on_trailing_rising_edge() {
        let mut analyser = PulseAnalyser::new(PulseAlignment::RightAligned, 0);
        assert_eq!(analyser.transition(10, false), None);
        assert_eq!(
            analyser.transition(20, true),
            Some(PulseInfo {
                start: 0,
                transition: 10,
                end: 20
            })
        );
        assert_eq!(analyser.transition(80, false), None);
        assert_eq!(
            analyser.transition(84, true),
            Some(PulseInfo {
                start: 20,
                transition: 80,
                end: 84
            })
        );
    }

    #[test]
    fn no_pulse_until_both_edges_observed() {
        let mut analyser = PulseAnalyser::new(PulseAlignment::LeftAligned, 0);
        // A rise at the initial offset leaves rise_at == fall_at, so the
        // following fall has no complete history to emit from.
        assert_eq!(analyser.transition(0, true), None);
        assert_eq!(analyser.transition(4, false), None);
        assert_eq!(analyser.transition(8, true), None);
        let pulse = analyser.transition(16, false).expect("history complete");
        assert_eq!(
            pulse,
            PulseInfo {
                start: 4,
                transition: 8,
                end: 16
            }
        );
    }

    #[test]
    fn low_interval_since_reset_counts_as_pulse_start() {
        let mut analyser = PulseAnalyser::new(PulseAlignment::LeftAligned, 100);
        assert_eq!(analyser.transition(110, true), None);
        let pulse = analyser.transition(118, false).expect("pulse completes");
        assert_eq!(
            pulse,
            PulseInfo {
                start: 100,
                transition: 110,
                end: 118
            }
        );
    }

    #[test]
    fn repeated_state_is_not_an_edge() {
        let mut analyser = PulseAnalyser::new(PulseAlignment::LeftAligned, 0);
        analyser.transition(10, true);
        analyser.transition(20, false);
        analyser.transition(30, true);
        assert_eq!(analyser.transition(40, true), None);
    }

    #[test]
    fn reset_clears_edge_history() {
        let mut analyser = PulseAnalyser::new(PulseAlignment::LeftAligned, 0);
        analyser.transition(10, true);
        analyser.transition(20, false);
        analyser.transition(30, true);
        analyser.reset(35);
        assert_eq!(analyser.transition(40, false), None);
        assert_eq!(analyser.transition(44, true), None);
        let pulse = analyser.transition(104, false).expect("pulse after reset");
        assert_eq!(pulse.start, 40);
        assert_eq!(pulse.transition, 44);
        assert_eq!(pulse.end, 104);
    }

    #[test]
    fn emitted_pulses_are_strictly_ordered() {
        let mut analyser = PulseAnalyser::new(PulseAlignment::LeftAligned, 0);
        analyser.transition(10, true);
        // Falling edge at the same offset as the recorded rise; the ordering
        // sanity check must suppress the emission.
        analyser.transition(10, false);
        assert_eq!(analyser.transition(12, true), None);
        let pulse = analyser.transition(20, false);
        assert_eq!(
            pulse,
            Some(PulseInfo {
                start: 10,
                transition: 12,
                end: 20
            })
        );
    }
}
