use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use georef_core::GeorefError;

pub mod imu;
pub mod lidar;

pub trait ParserProvider {
    type Output;

    fn get_parser(&self) -> Box<dyn Parser<Output = Self::Output>>;
}

pub trait Parser {
    type Output;

    fn parse(&self) -> Result<Self::Output, GeorefError>;
}

/// Counts the lines of `path` so buffers can be sized once before the
/// actual parse pass.
pub fn count_lines(path: &Path) -> Result<usize, GeorefError> {
    let reader = BufReader::new(File::open(path)?);
    let mut count = 0;
    for line in reader.lines() {
        line?;
        count += 1;
    }
    Ok(count)
}
