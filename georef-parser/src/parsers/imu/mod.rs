use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;

use georef_core::config::RecordErrorPolicy;
use georef_core::scan::pose::PoseSample;
use georef_core::GeorefError;

use super::{count_lines, Parser, ParserProvider};

// Byte offset and width of each field, in log order: lat, lon, alt,
// qw, qx, qy, qz, roll, pitch, yaw, timestamp.
const FIELD_OFFSETS: [usize; 11] = [0, 16, 31, 46, 61, 76, 91, 106, 121, 136, 151];
const FIELD_WIDTHS: [usize; 11] = [15, 15, 15, 15, 15, 15, 15, 15, 15, 15, 21];

pub struct ImuLogParserProvider {
    pub filename: PathBuf,
    pub record_error_policy: RecordErrorPolicy,
}

impl ParserProvider for ImuLogParserProvider {
    type Output = Vec<PoseSample>;

    fn get_parser(&self) -> Box<dyn Parser<Output = Vec<PoseSample>>> {
        Box::new(ImuLogParser {
            filename: self.filename.clone(),
            record_error_policy: self.record_error_policy,
        })
    }
}

pub struct ImuLogParser {
    pub filename: PathBuf,
    pub record_error_policy: RecordErrorPolicy,
}

impl Parser for ImuLogParser {
    type Output = Vec<PoseSample>;

    fn parse(&self) -> Result<Vec<PoseSample>, GeorefError> {
        let line_count = count_lines(&self.filename)?;
        let mut poses = Vec::with_capacity(line_count);

        let reader = BufReader::new(File::open(&self.filename)?);
        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            let line_no = index + 1;
            if line.trim().is_empty() {
                continue;
            }

            match parse_pose_line(&line, line_no) {
                Ok(pose) => poses.push(pose),
                Err(error) => match self.record_error_policy {
                    RecordErrorPolicy::Skip => log::warn!("skipping record: {}", error),
                    RecordErrorPolicy::Abort => return Err(error),
                },
            }
        }

        log::info!("IMU log: {} pose samples", poses.len());
        Ok(poses)
    }
}

fn parse_pose_line(line: &str, line_no: usize) -> Result<PoseSample, GeorefError> {
    let mut fields = [0.0; 11];
    for (value, (&start, &width)) in fields
        .iter_mut()
        .zip(FIELD_OFFSETS.iter().zip(FIELD_WIDTHS.iter()))
    {
        *value = line
            .get(start..(start + width).min(line.len()))
            .map(str::trim)
            .filter(|field| !field.is_empty())
            .and_then(|field| field.parse().ok())
            .ok_or_else(|| GeorefError::malformed(line_no, start, line))?;
    }

    Ok(PoseSample {
        lat: fields[0],
        lon: fields[1],
        alt: fields[2],
        qw: fields[3],
        qx: fields[4],
        qy: fields[5],
        qz: fields[6],
        roll: fields[7],
        pitch: fields[8],
        yaw: fields[9],
        timestamp: fields[10],
    })
}
