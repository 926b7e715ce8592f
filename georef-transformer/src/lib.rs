pub mod cursor;
pub mod runner;
pub mod sync;
pub mod transform;

pub use runner::{GeorefRunner, Runner};
pub use sync::{ClockSynchronizer, SyncStats};
pub use transform::RigidBodyTransform;
