use georef_core::scan::point::PointSink;
use georef_core::scan::pose::PoseSample;
use georef_core::scan::sweep::SweepBuffer;
use georef_core::{GeorefError, RunConfig};

use crate::cursor::SweepCursor;
use crate::transform::Transform;

const MS_PER_HOUR: f64 = 3_600_000.0;

/// Milliseconds-since-epoch reduced to microseconds past the start of
/// the current hour. The two sensor clocks only agree at sub-hour
/// precision; the residual base-epoch mismatch is corrected separately
/// by the configured alignment offset.
pub fn us_past_hour(timestamp_ms: f64) -> f64 {
    timestamp_ms.rem_euclid(MS_PER_HOUR) * 1000.0
}

/// Counters reported by one synchronization run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncStats {
    pub emitted: usize,
    pub zero_distance: usize,
    pub out_of_tolerance: usize,
    pub non_finite: usize,
}

/// Pairs each rangefinder sample with the nearest-in-time pose within
/// tolerance, scanning both streams forward exactly once.
pub struct ClockSynchronizer {
    tolerance_us: f64,
    epoch_alignment_offset_us: f64,
}

impl ClockSynchronizer {
    pub fn new(config: &RunConfig) -> Self {
        Self {
            tolerance_us: config.tolerance_us(),
            epoch_alignment_offset_us: config.epoch_alignment_offset_us,
        }
    }

    fn normalize(&self, lidar_timestamp_us: f64) -> f64 {
        lidar_timestamp_us + self.epoch_alignment_offset_us
    }

    /// Runs the pairing loop to exhaustion of either stream. Running
    /// out of samples on either side is the normal end of the run.
    pub fn run(
        &self,
        sweeps: &SweepBuffer,
        poses: &[PoseSample],
        transform: &dyn Transform,
        sink: &mut dyn PointSink,
    ) -> Result<SyncStats, GeorefError> {
        let mut stats = SyncStats::default();
        let mut cursor = SweepCursor::new(sweeps);

        'poses: for window in poses.windows(2) {
            let (pose_a, pose_b) = (&window[0], &window[1]);
            let window_start = us_past_hour(pose_a.timestamp);
            let window_end = us_past_hour(pose_b.timestamp);

            // skip everything before this pose window, including slots
            // that never received an azimuth or a time backfill
            loop {
                if cursor.exhausted() {
                    break 'poses;
                }
                match cursor.peek() {
                    None => cursor.advance(),
                    Some(sample) if self.normalize(sample.timestamp) < window_start => {
                        cursor.advance()
                    }
                    _ => break,
                }
            }

            while let Some(sample) = cursor.peek() {
                let t = self.normalize(sample.timestamp);
                if t < window_start || t >= window_end {
                    break;
                }

                if sample.distance == 0.0 {
                    stats.zero_distance += 1;
                    cursor.advance();
                    continue;
                }

                // nearest pose wins, ties go to the earlier one
                let diff_a = (window_start - t).abs();
                let diff_b = (window_end - t).abs();
                let (pose, diff) = if diff_a <= diff_b {
                    (pose_a, diff_a)
                } else {
                    (pose_b, diff_b)
                };

                if diff < self.tolerance_us {
                    let point = transform.georeference(&sample, pose);
                    if sample.distance.is_finite() && point.is_finite() {
                        sink.write_point(&point)?;
                        stats.emitted += 1;
                    } else {
                        stats.non_finite += 1;
                    }
                } else {
                    stats.out_of_tolerance += 1;
                }
                cursor.advance();
            }
        }

        log::debug!(
            "sync: {} emitted, {} zero-distance, {} out of tolerance, {} non-finite",
            stats.emitted,
            stats.zero_distance,
            stats.out_of_tolerance,
            stats.non_finite
        );
        Ok(stats)
    }
}
