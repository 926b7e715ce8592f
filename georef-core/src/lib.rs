pub mod config;
pub mod error;
pub mod geometry;
pub mod scan;

pub use config::{GpsErrorPolicy, RecordErrorPolicy, RunConfig};
pub use error::GeorefError;
