use serde::Deserialize;

/// What to do when a `GPS=` line does not carry the expected sentence.
/// The reference capture tooling occasionally wrote garbage after the
/// tag, and the reference pipeline stopped reading the rangefinder log
/// at that point. Kept as the default until the capture side is fixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GpsErrorPolicy {
    Abort,
    Skip,
}

/// What to do with malformed non-GPS records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordErrorPolicy {
    Skip,
    Abort,
}

/// Run configuration. Defaults reproduce the reference behavior.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Pairing window between a range sample and the selected pose, in
    /// milliseconds. A sample is accepted only if the time difference
    /// is strictly below this value.
    pub tolerance_ms: f64,

    /// Position corrections applied after rotation. Longitude offset is
    /// added to X, latitude offset subtracted from Y, altitude offset
    /// added to Z.
    pub lon_offset: f64,
    pub lat_offset: f64,
    pub alt_offset: f64,

    /// Pose yaw above this many degrees tags the point with flag 100,
    /// otherwise 0.
    pub yaw_flag_threshold_deg: f64,

    /// Correction for the base-epoch mismatch between the two clocks,
    /// added to every rangefinder timestamp, in microseconds. The two
    /// logs used to calibrate this were about 20 seconds apart.
    pub epoch_alignment_offset_us: f64,

    pub gps_error_policy: GpsErrorPolicy,
    pub record_error_policy: RecordErrorPolicy,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            tolerance_ms: 500.0,
            lon_offset: 0.0,
            lat_offset: 0.0,
            alt_offset: 0.0,
            yaw_flag_threshold_deg: 30.0,
            epoch_alignment_offset_us: 20_000_000.0,
            gps_error_policy: GpsErrorPolicy::Abort,
            record_error_policy: RecordErrorPolicy::Skip,
        }
    }
}

impl RunConfig {
    pub fn tolerance_us(&self) -> f64 {
        self.tolerance_ms * 1000.0
    }
}
