use crate::geometry::{CHANNELS, CHANNEL_PERIOD_US};

/// One laser return. A distance of exactly 0 means "no return" and is
/// dropped before any point is emitted.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChannelReturn {
    pub distance: f64,
    pub reflectivity: f64,
}

/// One synchronized firing across all 16 channels.
///
/// `azimuth` is in centidegrees, `Some` only once observed or
/// interpolated. `base_time` is in microseconds and `Some` only after a
/// `time=` record has backfilled the sequence's block. Timestamps,
/// azimuth and measurements are deliberately separate fields.
#[derive(Debug, Clone)]
pub struct FiringSequence {
    pub azimuth: Option<f64>,
    pub base_time: Option<f64>,
    pub returns: [ChannelReturn; CHANNELS],
}

impl FiringSequence {
    pub fn new(azimuth: Option<f64>) -> Self {
        Self {
            azimuth,
            base_time: None,
            returns: [ChannelReturn::default(); CHANNELS],
        }
    }

    /// Exact firing time of `channel`, offset from the sequence base by
    /// the inter-channel delay.
    pub fn channel_time(&self, channel: usize) -> Option<f64> {
        self.base_time
            .map(|base| base + CHANNEL_PERIOD_US * channel as f64)
    }
}

/// Flattened per-channel view of one laser return, produced by the
/// synchronizer's cursor once azimuth and timestamps are resolved.
#[derive(Debug, Clone, Copy)]
pub struct RangeSample {
    /// Microseconds, device clock.
    pub timestamp: f64,
    pub azimuth_centidegrees: f64,
    pub channel: usize,
    pub distance: f64,
    pub reflectivity: f64,
}

/// A structurally parsed GPS sentence from the rangefinder log. Not
/// consumed by the georeferencing transform; kept for diagnostics.
#[derive(Debug, Clone)]
pub struct GpsSentence {
    pub utc_time: String,
    pub valid: bool,
    pub lat: String,
    pub lat_hemi: char,
    pub lon: String,
    pub lon_hemi: char,
    pub speed_knots: String,
    pub true_course: String,
    pub date_stamp: String,
    pub variation: String,
    pub variation_hemi: char,
    pub checksum: String,
    /// Most recent rangefinder base timestamp seen before this
    /// sentence, in microseconds.
    pub source_timestamp: Option<f64>,
}

/// All rangefinder data for one run, owned by the pipeline for the
/// run's duration. Sized once up front from the pre-scan line count.
#[derive(Debug, Clone, Default)]
pub struct SweepBuffer {
    pub sequences: Vec<FiringSequence>,
    pub gps: Vec<GpsSentence>,
}

impl SweepBuffer {
    pub fn with_capacity(sequences: usize, gps: usize) -> Self {
        Self {
            sequences: Vec::with_capacity(sequences),
            gps: Vec::with_capacity(gps),
        }
    }

    pub fn len(&self) -> usize {
        self.sequences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequences.is_empty()
    }
}
