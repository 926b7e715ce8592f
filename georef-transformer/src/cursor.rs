use georef_core::geometry::CHANNELS;
use georef_core::scan::sweep::{RangeSample, SweepBuffer};

/// Forward-only cursor over every (sequence, channel) slot of a sweep
/// buffer. Replaces the reference implementation's shared row/column
/// counters with a single owned object; it never moves backward.
pub struct SweepCursor<'a> {
    buffer: &'a SweepBuffer,
    sequence: usize,
    channel: usize,
}

impl<'a> SweepCursor<'a> {
    pub fn new(buffer: &'a SweepBuffer) -> Self {
        Self {
            buffer,
            sequence: 0,
            channel: 0,
        }
    }

    pub fn exhausted(&self) -> bool {
        self.sequence >= self.buffer.sequences.len()
    }

    /// Moves to the next channel, wrapping into the next sequence after
    /// channel 15. A no-op once the buffer is exhausted.
    pub fn advance(&mut self) {
        if self.exhausted() {
            return;
        }
        self.channel += 1;
        if self.channel >= CHANNELS {
            self.channel = 0;
            self.sequence += 1;
        }
    }

    /// The sample under the cursor. `None` when the buffer is exhausted
    /// or the current sequence never received an azimuth or a time
    /// backfill; such slots are skipped by the caller.
    pub fn peek(&self) -> Option<RangeSample> {
        if self.exhausted() {
            return None;
        }
        let sequence = &self.buffer.sequences[self.sequence];
        let azimuth = sequence.azimuth?;
        let timestamp = sequence.channel_time(self.channel)?;
        let laser_return = sequence.returns[self.channel];
        Some(RangeSample {
            timestamp,
            azimuth_centidegrees: azimuth,
            channel: self.channel,
            distance: laser_return.distance,
            reflectivity: laser_return.reflectivity,
        })
    }
}
