use std::io::Write;

use georef_core::scan::point::{Point, PointSink};
use georef_core::GeorefError;

/// Writes one point per line as four right-justified fixed-width
/// columns: X, Y, Z with five decimals, then the integer flag.
pub struct FixedWidthWriter<W: Write> {
    writer: W,
}

impl<W: Write> FixedWidthWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> PointSink for FixedWidthWriter<W> {
    fn write_point(&mut self, point: &Point) -> Result<(), GeorefError> {
        writeln!(
            self.writer,
            "{:>12.5} {:>12.5} {:>12.5} {:>12}",
            point.x, point.y, point.z, point.flag
        )?;
        Ok(())
    }

    fn finish(&mut self) -> Result<(), GeorefError> {
        self.writer.flush()?;
        Ok(())
    }
}

/// Writes one point per line as a JSON document.
pub struct JsonLinesWriter<W: Write> {
    writer: W,
}

impl<W: Write> JsonLinesWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> PointSink for JsonLinesWriter<W> {
    fn write_point(&mut self, point: &Point) -> Result<(), GeorefError> {
        let line = serde_json::to_string(point).map_err(std::io::Error::from)?;
        writeln!(self.writer, "{}", line)?;
        Ok(())
    }

    fn finish(&mut self) -> Result<(), GeorefError> {
        self.writer.flush()?;
        Ok(())
    }
}
