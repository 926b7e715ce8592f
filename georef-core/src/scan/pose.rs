/// One IMU navigation sample: position, orientation and a timestamp in
/// milliseconds since the unix epoch. The quaternion is carried through
/// from the log but the transform consumes roll/pitch/yaw.
#[derive(Debug, Clone, Copy)]
pub struct PoseSample {
    pub lat: f64,
    pub lon: f64,
    pub alt: f64,
    pub qw: f64,
    pub qx: f64,
    pub qy: f64,
    pub qz: f64,
    /// Degrees, as logged.
    pub roll: f64,
    pub pitch: f64,
    pub yaw: f64,
    pub timestamp: f64,
}
