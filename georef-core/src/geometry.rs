/// Number of laser channels in one firing sequence.
pub const CHANNELS: usize = 16;

/// Delay between two consecutive firing sequences, in microseconds.
pub const SEQUENCE_PERIOD_US: f64 = 55.296;

/// Delay between two consecutive channel firings within a sequence,
/// in microseconds.
pub const CHANNEL_PERIOD_US: f64 = 2.304;

/// Number of firing sequences covered by one `time=` record.
pub const SEQUENCES_PER_TIME_BLOCK: usize = 24;

/// Azimuth range bound, in centidegrees.
pub const AZIMUTH_MAX_CENTIDEG: f64 = 36000.0;

// Per-channel vertical angles in degrees, in channel order, from the
// device documentation.
const ELEVATION_TABLE_DEG: [f64; CHANNELS] = [
    15.0, -1.0, 13.0, 3.0, 11.0, -5.0, 9.0, -7.0, 7.0, -9.0, 5.0, -11.0, 3.0, -13.0, 1.0, -15.0,
];

pub fn to_radians(angle_deg: f64) -> f64 {
    angle_deg * std::f64::consts::PI / 180.0
}

pub fn to_degrees(angle_rad: f64) -> f64 {
    angle_rad * 180.0 / std::f64::consts::PI
}

/// Fixed laser-array geometry: one elevation angle per channel, set at
/// construction and never changed afterwards.
#[derive(Debug, Clone)]
pub struct LaserGeometry {
    elevations_rad: [f64; CHANNELS],
}

impl LaserGeometry {
    /// Geometry of the 16-channel rangefinder this pipeline targets.
    pub fn vlp16() -> Self {
        let mut elevations_rad = [0.0; CHANNELS];
        for (rad, deg) in elevations_rad.iter_mut().zip(ELEVATION_TABLE_DEG) {
            *rad = to_radians(deg);
        }
        Self { elevations_rad }
    }

    /// Elevation angle of `channel` in radians.
    pub fn elevation(&self, channel: usize) -> f64 {
        self.elevations_rad[channel]
    }
}

impl Default for LaserGeometry {
    fn default() -> Self {
        Self::vlp16()
    }
}
