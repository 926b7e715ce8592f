use serde::Serialize;

/// Flag value for points captured while the platform yaw exceeded the
/// configured threshold.
pub const FLAG_HIGH_YAW: u32 = 100;

/// Flag value for all other points.
pub const FLAG_NOMINAL: u32 = 0;

/// A georeferenced point in the world frame. Coordinates share the
/// linear unit of the raw range measurements. `flag` is an opaque
/// downstream marker, not a physical quantity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub flag: u32,
}

impl Point {
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

/// Anything that accepts finalized points. Implementations decide the
/// target and format; the pipeline only hands over records and calls
/// `finish` once at the end of the run.
pub trait PointSink {
    fn write_point(&mut self, point: &Point) -> Result<(), crate::GeorefError>;

    fn finish(&mut self) -> Result<(), crate::GeorefError> {
        Ok(())
    }
}
