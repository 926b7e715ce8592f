use georef_core::scan::point::PointSink;
use georef_core::scan::pose::PoseSample;
use georef_core::scan::sweep::SweepBuffer;
use georef_core::{GeorefError, RunConfig};

use crate::sync::{ClockSynchronizer, SyncStats};
use crate::transform::Transform;

pub trait Runner {
    fn execute(
        &self,
        sweeps: &SweepBuffer,
        poses: &[PoseSample],
        sink: &mut dyn PointSink,
    ) -> Result<SyncStats, GeorefError>;
}

/// Drives one full synchronization/transform pass and closes the sink.
pub struct GeorefRunner {
    transform: Box<dyn Transform>,
    synchronizer: ClockSynchronizer,
}

impl GeorefRunner {
    pub fn new(transform: Box<dyn Transform>, config: &RunConfig) -> Self {
        Self {
            transform,
            synchronizer: ClockSynchronizer::new(config),
        }
    }
}

impl Runner for GeorefRunner {
    fn execute(
        &self,
        sweeps: &SweepBuffer,
        poses: &[PoseSample],
        sink: &mut dyn PointSink,
    ) -> Result<SyncStats, GeorefError> {
        let stats = self
            .synchronizer
            .run(sweeps, poses, self.transform.as_ref(), sink)?;
        sink.finish()?;
        Ok(stats)
    }
}
