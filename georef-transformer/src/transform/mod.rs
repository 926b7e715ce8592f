use georef_core::geometry::{to_radians, LaserGeometry};
use georef_core::scan::point::{Point, FLAG_HIGH_YAW, FLAG_NOMINAL};
use georef_core::scan::pose::PoseSample;
use georef_core::scan::sweep::RangeSample;
use georef_core::RunConfig;

pub trait Transform {
    fn georeference(&self, sample: &RangeSample, pose: &PoseSample) -> Point;
}

/// The fixed rotation/translation chain from a raw range measurement to
/// a world-frame point: sensor-frame Cartesian, then pitch about X,
/// roll, yaw, then the configured position offsets. The rotation order
/// is a design constant; changing it changes the output.
pub struct RigidBodyTransform {
    geometry: LaserGeometry,
    lon_offset: f64,
    lat_offset: f64,
    alt_offset: f64,
    yaw_flag_threshold_deg: f64,
}

impl RigidBodyTransform {
    pub fn new(geometry: LaserGeometry, config: &RunConfig) -> Self {
        Self {
            geometry,
            lon_offset: config.lon_offset,
            lat_offset: config.lat_offset,
            alt_offset: config.alt_offset,
            yaw_flag_threshold_deg: config.yaw_flag_threshold_deg,
        }
    }
}

impl Transform for RigidBodyTransform {
    fn georeference(&self, sample: &RangeSample, pose: &PoseSample) -> Point {
        let azimuth = to_radians(sample.azimuth_centidegrees / 100.0);
        let elevation = self.geometry.elevation(sample.channel);
        let distance = sample.distance;

        let x = distance * azimuth.sin() * elevation.cos();
        let y = distance * azimuth.cos() * elevation.cos();
        let z = -distance * elevation.sin();

        let roll = to_radians(pose.roll);
        let pitch = to_radians(pose.pitch);
        let yaw = to_radians(pose.yaw);

        // pitch about X
        let x1 = x;
        let y1 = y * pitch.cos() - z * pitch.sin();
        let z1 = y * pitch.sin() + z * pitch.cos();

        // roll about the resulting X axis
        let x2 = x1 * roll.cos() - z1 * roll.sin();
        let y2 = y1;
        let z2 = -x1 * roll.sin() + z1 * roll.cos();

        // yaw about Z
        let x3 = x2 * yaw.cos() - y2 * yaw.sin();
        let y3 = x2 * yaw.sin() + y2 * yaw.cos();
        let z3 = z2;

        let flag = if pose.yaw > self.yaw_flag_threshold_deg {
            FLAG_HIGH_YAW
        } else {
            FLAG_NOMINAL
        };

        Point {
            x: x3 + self.lon_offset,
            y: y3 - self.lat_offset,
            z: z3 + self.alt_offset,
            flag,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(azimuth_centideg: f64, channel: usize, distance: f64) -> RangeSample {
        RangeSample {
            timestamp: 0.0,
            azimuth_centidegrees: azimuth_centideg,
            channel,
            distance,
            reflectivity: 0.0,
        }
    }

    fn pose(roll: f64, pitch: f64, yaw: f64) -> PoseSample {
        PoseSample {
            lat: 0.0,
            lon: 0.0,
            alt: 0.0,
            qw: 1.0,
            qx: 0.0,
            qy: 0.0,
            qz: 0.0,
            roll,
            pitch,
            yaw,
            timestamp: 0.0,
        }
    }

    fn transform() -> RigidBodyTransform {
        RigidBodyTransform::new(LaserGeometry::vlp16(), &RunConfig::default())
    }

    #[test]
    fn level_pose_returns_sensor_frame_coordinates() {
        // channel 1 elevation is -1°, azimuth 90.00°
        let sample = sample(9000.0, 1, 10.0);
        let point = transform().georeference(&sample, &pose(0.0, 0.0, 0.0));

        let azimuth = to_radians(90.0);
        let elevation = to_radians(-1.0);
        let expected_x = 10.0 * azimuth.sin() * elevation.cos();
        let expected_y = 10.0 * azimuth.cos() * elevation.cos();
        let expected_z = -10.0 * elevation.sin();

        assert_eq!(point.x, expected_x);
        assert_eq!(point.y, expected_y);
        assert_eq!(point.z, expected_z);
        assert_eq!(point.flag, FLAG_NOMINAL);
    }

    #[test]
    fn yaw_rotates_about_z() {
        // distance along +Y (azimuth 0, channel with 0 elevation does
        // not exist; use channel 14 at 1° and fold it into expectation)
        let sample = sample(0.0, 14, 5.0);
        let point = transform().georeference(&sample, &pose(0.0, 0.0, 90.0));

        let elevation = to_radians(1.0);
        let y = 5.0 * elevation.cos();
        let z = -5.0 * elevation.sin();
        // yaw 90°: (x, y) -> (-y, x)
        assert!((point.x - (-y)).abs() < 1e-12);
        assert!(point.y.abs() < 1e-12);
        assert!((point.z - z).abs() < 1e-12);
        assert_eq!(point.flag, FLAG_HIGH_YAW);
    }

    #[test]
    fn rotation_order_is_pitch_roll_yaw() {
        let sample = sample(4500.0, 0, 7.0);
        let pose = pose(10.0, 20.0, 40.0);
        let point = transform().georeference(&sample, &pose);

        // recompute by hand in the documented order
        let azimuth = to_radians(45.0);
        let elevation = to_radians(15.0);
        let (x, y, z) = (
            7.0 * azimuth.sin() * elevation.cos(),
            7.0 * azimuth.cos() * elevation.cos(),
            -7.0 * elevation.sin(),
        );
        let (roll, pitch, yaw) = (to_radians(10.0), to_radians(20.0), to_radians(40.0));
        let (x1, y1, z1) = (x, y * pitch.cos() - z * pitch.sin(), y * pitch.sin() + z * pitch.cos());
        let (x2, y2, z2) = (
            x1 * roll.cos() - z1 * roll.sin(),
            y1,
            -x1 * roll.sin() + z1 * roll.cos(),
        );
        let expected = (
            x2 * yaw.cos() - y2 * yaw.sin(),
            x2 * yaw.sin() + y2 * yaw.cos(),
            z2,
        );

        assert_eq!(point.x, expected.0);
        assert_eq!(point.y, expected.1);
        assert_eq!(point.z, expected.2);
    }

    #[test]
    fn position_offsets_follow_sign_convention() {
        let mut config = RunConfig::default();
        config.lon_offset = 1.0;
        config.lat_offset = 2.0;
        config.alt_offset = 3.0;
        let transform = RigidBodyTransform::new(LaserGeometry::vlp16(), &config);

        let sample = sample(0.0, 0, 0.0);
        let point = transform.georeference(&sample, &pose(0.0, 0.0, 0.0));
        assert_eq!(point.x, 1.0);
        assert_eq!(point.y, -2.0);
        assert_eq!(point.z, 3.0);
    }

    #[test]
    fn yaw_flag_boundary_uses_strict_greater_than() {
        let transform = transform();
        let sample = sample(0.0, 0, 1.0);

        assert_eq!(
            transform.georeference(&sample, &pose(0.0, 0.0, 31.0)).flag,
            FLAG_HIGH_YAW
        );
        assert_eq!(
            transform.georeference(&sample, &pose(0.0, 0.0, 29.0)).flag,
            FLAG_NOMINAL
        );
        // exactly at the threshold stays nominal
        assert_eq!(
            transform.georeference(&sample, &pose(0.0, 0.0, 30.0)).flag,
            FLAG_NOMINAL
        );
    }
}
