use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;

use georef_core::config::{GpsErrorPolicy, RecordErrorPolicy};
use georef_core::geometry::{CHANNELS, SEQUENCES_PER_TIME_BLOCK, SEQUENCE_PERIOD_US};
use georef_core::scan::sweep::{ChannelReturn, FiringSequence, GpsSentence, SweepBuffer};
use georef_core::GeorefError;

use super::{count_lines, Parser, ParserProvider};

const ANGLE_TAG: &str = "angle=";
const TIME_TAG: &str = "time=";
const GPS_TAG: &str = "GPS=";
const GPS_SENTINEL: &str = "GPS= $GP";

const FIELD_WIDTH: usize = 11;
// Azimuth sits right after the tag, measurement fields start at byte 18.
const AZIMUTH_OFFSET: usize = 6;
const DATA_OFFSET: usize = 18;
// Two firing sequences of 16 (distance, reflectivity) pairs per line.
const VALUES_PER_LINE: usize = 4 * CHANNELS;
// Enough for every field through the variation hemisphere plus the
// checksum delimiter; the checksum itself may run short on the tail.
const GPS_MIN_LEN: usize = 75;

// Every 13th line of the log is a time record, and each of the other
// 12 lines carries two firing sequences.
const LINES_PER_TIME_BLOCK: usize = 13;

pub struct LidarLogParserProvider {
    pub filename: PathBuf,
    pub gps_error_policy: GpsErrorPolicy,
    pub record_error_policy: RecordErrorPolicy,
}

impl ParserProvider for LidarLogParserProvider {
    type Output = SweepBuffer;

    fn get_parser(&self) -> Box<dyn Parser<Output = SweepBuffer>> {
        Box::new(LidarLogParser {
            filename: self.filename.clone(),
            gps_error_policy: self.gps_error_policy,
            record_error_policy: self.record_error_policy,
        })
    }
}

pub struct LidarLogParser {
    pub filename: PathBuf,
    pub gps_error_policy: GpsErrorPolicy,
    pub record_error_policy: RecordErrorPolicy,
}

impl Parser for LidarLogParser {
    type Output = SweepBuffer;

    fn parse(&self) -> Result<SweepBuffer, GeorefError> {
        let line_count = count_lines(&self.filename)?;
        let sequence_capacity =
            (line_count - line_count / LINES_PER_TIME_BLOCK) * 2;
        let gps_capacity = line_count / LINES_PER_TIME_BLOCK + 1;
        let mut buffer = SweepBuffer::with_capacity(sequence_capacity, gps_capacity);

        let reader = BufReader::new(File::open(&self.filename)?);
        let mut last_base_time: Option<f64> = None;
        // First sequence not yet covered by a time record.
        let mut block_start = 0usize;

        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            let line_no = index + 1;

            let outcome = if line.starts_with(ANGLE_TAG) {
                self.handle_angle_line(&line, line_no, &mut buffer)
            } else if line.starts_with(TIME_TAG) {
                self.handle_time_line(
                    &line,
                    line_no,
                    &mut buffer,
                    &mut last_base_time,
                    &mut block_start,
                )
            } else if line.starts_with(GPS_TAG) {
                match self.handle_gps_line(&line, line_no, last_base_time, &mut buffer) {
                    GpsOutcome::Ok => Ok(()),
                    GpsOutcome::Abort => {
                        log::error!(
                            "malformed GPS sentence at line {}, aborting rangefinder log",
                            line_no
                        );
                        break;
                    }
                }
            } else if line.trim().is_empty() {
                Ok(())
            } else {
                Err(GeorefError::malformed(line_no, 0, &line))
            };

            if let Err(error) = outcome {
                match self.record_error_policy {
                    RecordErrorPolicy::Skip => log::warn!("skipping record: {}", error),
                    RecordErrorPolicy::Abort => return Err(error),
                }
            }
        }

        log::info!(
            "rangefinder log: {} firing sequences, {} GPS sentences",
            buffer.sequences.len(),
            buffer.gps.len()
        );
        Ok(buffer)
    }
}

enum GpsOutcome {
    Ok,
    Abort,
}

impl LidarLogParser {
    /// One `angle=` line carries the observed azimuth of the first of
    /// two firing sequences plus 32 (distance, reflectivity) pairs. The
    /// second sequence's azimuth is left empty for interpolation.
    fn handle_angle_line(
        &self,
        line: &str,
        line_no: usize,
        buffer: &mut SweepBuffer,
    ) -> Result<(), GeorefError> {
        let azimuth = parse_field(line, AZIMUTH_OFFSET, line_no)?;

        let mut values = [0.0; VALUES_PER_LINE];
        for (i, value) in values.iter_mut().enumerate() {
            *value = parse_field(line, DATA_OFFSET + FIELD_WIDTH * i, line_no)?;
        }

        let mut first = FiringSequence::new(Some(azimuth));
        let mut second = FiringSequence::new(None);
        for channel in 0..CHANNELS {
            first.returns[channel] = ChannelReturn {
                distance: values[2 * channel],
                reflectivity: values[2 * channel + 1],
            };
            second.returns[channel] = ChannelReturn {
                distance: values[2 * CHANNELS + 2 * channel],
                reflectivity: values[2 * CHANNELS + 2 * channel + 1],
            };
        }
        buffer.sequences.push(first);
        buffer.sequences.push(second);
        Ok(())
    }

    /// A `time=` line closes a block of 24 firing sequences and
    /// backfills their base timestamps from the block base. Only the
    /// sequences collected since the previous time record are stamped.
    fn handle_time_line(
        &self,
        line: &str,
        line_no: usize,
        buffer: &mut SweepBuffer,
        last_base_time: &mut Option<f64>,
        block_start: &mut usize,
    ) -> Result<(), GeorefError> {
        let base = parse_field(line, TIME_TAG.len(), line_no)?;
        *last_base_time = Some(base);

        let end = buffer.sequences.len();
        let start = end.saturating_sub(SEQUENCES_PER_TIME_BLOCK).max(*block_start);
        if end - start < SEQUENCES_PER_TIME_BLOCK {
            log::warn!(
                "time record at line {} covers only {} of {} sequences",
                line_no,
                end - start,
                SEQUENCES_PER_TIME_BLOCK
            );
        }
        for (offset, sequence) in buffer.sequences[start..end].iter_mut().enumerate() {
            sequence.base_time = Some(base + SEQUENCE_PERIOD_US * offset as f64);
        }
        *block_start = end;
        Ok(())
    }

    fn handle_gps_line(
        &self,
        line: &str,
        line_no: usize,
        last_base_time: Option<f64>,
        buffer: &mut SweepBuffer,
    ) -> GpsOutcome {
        let sentence = if line.starts_with(GPS_SENTINEL) && line.len() >= GPS_MIN_LEN {
            extract_gps_sentence(line, last_base_time)
        } else {
            None
        };

        match sentence {
            Some(gps) => {
                buffer.gps.push(gps);
                GpsOutcome::Ok
            }
            None => match self.gps_error_policy {
                GpsErrorPolicy::Abort => GpsOutcome::Abort,
                GpsErrorPolicy::Skip => {
                    log::warn!("skipping malformed GPS sentence at line {}", line_no);
                    GpsOutcome::Ok
                }
            },
        }
    }
}

/// Extracts the fixed-offset RMC fields. `None` when any field range
/// does not fall on character boundaries.
fn extract_gps_sentence(line: &str, last_base_time: Option<f64>) -> Option<GpsSentence> {
    Some(GpsSentence {
        utc_time: line.get(12..18)?.to_string(),
        valid: line.get(19..20)? == "A",
        lat: line.get(21..30)?.to_string(),
        lat_hemi: line.get(31..32)?.chars().next()?,
        lon: line.get(33..43)?.to_string(),
        lon_hemi: line.get(44..45)?.chars().next()?,
        speed_knots: line.get(46..51)?.to_string(),
        true_course: line.get(52..57)?.to_string(),
        date_stamp: line.get(58..64)?.to_string(),
        variation: line.get(65..70)?.to_string(),
        variation_hemi: line.get(71..72)?.chars().next()?,
        checksum: line.get(73..line.len().min(77))?.to_string(),
        source_timestamp: last_base_time,
    })
}

/// Parses the 11-character numeric field starting at `start`.
fn parse_field(line: &str, start: usize, line_no: usize) -> Result<f64, GeorefError> {
    let end = (start + FIELD_WIDTH).min(line.len());
    line.get(start..end)
        .map(str::trim)
        .filter(|field| !field.is_empty())
        .and_then(|field| field.parse().ok())
        .ok_or_else(|| GeorefError::malformed(line_no, start, line))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn angle_line(azimuth: f64, distances: &[f64; 32]) -> String {
        let mut line = format!("angle={:>11} ", azimuth);
        for distance in distances {
            // distance then a zero reflectivity, 16 pairs per sequence
            line.push_str(&format!("{:>11}", distance));
            line.push_str(&format!("{:>11}", 0.0));
        }
        line
    }

    fn time_line(base: f64) -> String {
        format!("time={:>11}", base)
    }

    fn gps_line() -> String {
        // GPS= $GPRMC,214412,A,4056.1172,N,08033.2572,W,000.0,000.0,110918,008.6,W*68
        "GPS= $GPRMC,214412,A,4056.1172,N,08033.2572,W,000.0,000.0,110918,008.6,W*68".to_string()
    }

    fn write_log(lines: &[String]) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        for line in lines {
            writeln!(file, "{}", line).unwrap();
        }
        file.flush().unwrap();
        file
    }

    fn parser_for(file: &tempfile::NamedTempFile) -> LidarLogParser {
        LidarLogParser {
            filename: file.path().to_path_buf(),
            gps_error_policy: GpsErrorPolicy::Abort,
            record_error_policy: RecordErrorPolicy::Skip,
        }
    }

    #[test]
    fn angle_line_yields_two_sequences() {
        let mut distances = [0.0; 32];
        distances[0] = 123.0; // sequence 0, channel 0
        distances[16] = 456.0; // sequence 1, channel 0
        let file = write_log(&[angle_line(10000.0, &distances)]);

        let buffer = parser_for(&file).parse().unwrap();
        assert_eq!(buffer.sequences.len(), 2);
        assert_eq!(buffer.sequences[0].azimuth, Some(10000.0));
        assert_eq!(buffer.sequences[1].azimuth, None);
        assert_eq!(buffer.sequences[0].returns[0].distance, 123.0);
        assert_eq!(buffer.sequences[1].returns[0].distance, 456.0);
        assert_eq!(buffer.sequences[0].base_time, None);
    }

    #[test]
    fn time_line_backfills_the_previous_block() {
        let distances = [1.0; 32];
        let mut lines: Vec<String> = (0..12)
            .map(|i| angle_line(100.0 * i as f64, &distances))
            .collect();
        lines.push(time_line(1000000.0));
        let file = write_log(&lines);

        let buffer = parser_for(&file).parse().unwrap();
        assert_eq!(buffer.sequences.len(), 24);
        assert_eq!(buffer.sequences[0].base_time, Some(1000000.0));
        assert_eq!(
            buffer.sequences[23].base_time,
            Some(1000000.0 + 55.296 * 23.0)
        );
        // channel offset rides on top of the sequence base
        assert_eq!(
            buffer.sequences[0].channel_time(2),
            Some(1000000.0 + 2.304 * 2.0)
        );
    }

    #[test]
    fn gps_sentence_fields_are_extracted() {
        let distances = [1.0; 32];
        let mut lines: Vec<String> = (0..12)
            .map(|_| angle_line(100.0, &distances))
            .collect();
        lines.push(time_line(5000.0));
        lines.push(gps_line());
        let file = write_log(&lines);

        let buffer = parser_for(&file).parse().unwrap();
        assert_eq!(buffer.gps.len(), 1);
        let gps = &buffer.gps[0];
        assert_eq!(gps.utc_time, "214412");
        assert!(gps.valid);
        assert_eq!(gps.lat, "4056.1172");
        assert_eq!(gps.lat_hemi, 'N');
        assert_eq!(gps.lon, "08033.2572");
        assert_eq!(gps.lon_hemi, 'W');
        assert_eq!(gps.speed_knots, "000.0");
        assert_eq!(gps.true_course, "000.0");
        assert_eq!(gps.date_stamp, "110918");
        assert_eq!(gps.variation, "008.6");
        assert_eq!(gps.variation_hemi, 'W');
        assert_eq!(gps.checksum, "68");
        assert_eq!(gps.source_timestamp, Some(5000.0));
    }

    #[test]
    fn malformed_gps_aborts_remaining_log() {
        let distances = [1.0; 32];
        let file = write_log(&[
            angle_line(100.0, &distances),
            "GPS= garbage".to_string(),
            angle_line(200.0, &distances),
        ]);

        let buffer = parser_for(&file).parse().unwrap();
        // the angle line after the bad GPS sentence is never read
        assert_eq!(buffer.sequences.len(), 2);
    }

    #[test]
    fn malformed_gps_can_be_skipped_by_policy() {
        let distances = [1.0; 32];
        let file = write_log(&[
            angle_line(100.0, &distances),
            "GPS= garbage".to_string(),
            angle_line(200.0, &distances),
        ]);

        let mut parser = parser_for(&file);
        parser.gps_error_policy = GpsErrorPolicy::Skip;
        let buffer = parser.parse().unwrap();
        assert_eq!(buffer.sequences.len(), 4);
        assert!(buffer.gps.is_empty());
    }

    #[test]
    fn multibyte_gps_sentence_follows_gps_policy() {
        let distances = [1.0; 32];
        let mut bad = gps_line();
        // two-byte character straddling the latitude field boundary
        bad.replace_range(29..30, "é");
        let file = write_log(&[
            angle_line(100.0, &distances),
            bad,
            angle_line(200.0, &distances),
        ]);

        let buffer = parser_for(&file).parse().unwrap();
        assert_eq!(buffer.sequences.len(), 2);

        let mut parser = parser_for(&file);
        parser.gps_error_policy = GpsErrorPolicy::Skip;
        let buffer = parser.parse().unwrap();
        assert_eq!(buffer.sequences.len(), 4);
        assert!(buffer.gps.is_empty());
    }

    #[test]
    fn time_record_does_not_restamp_the_previous_block() {
        let distances = [1.0; 32];
        let mut lines: Vec<String> = (0..12)
            .map(|_| angle_line(100.0, &distances))
            .collect();
        lines.push(time_line(1000000.0));
        // one bad angle line shortens the second block to 2 sequences
        lines.push("angle=      bogus".to_string());
        lines.push(angle_line(200.0, &distances));
        lines.push(time_line(2000000.0));
        let file = write_log(&lines);

        let buffer = parser_for(&file).parse().unwrap();
        assert_eq!(buffer.sequences.len(), 26);
        assert_eq!(
            buffer.sequences[23].base_time,
            Some(1000000.0 + 55.296 * 23.0)
        );
        assert_eq!(buffer.sequences[24].base_time, Some(2000000.0));
        assert_eq!(buffer.sequences[25].base_time, Some(2000000.0 + 55.296));
    }

    #[test]
    fn short_angle_line_is_skipped_by_default() {
        let distances = [1.0; 32];
        let file = write_log(&[
            "angle=      100.0".to_string(),
            angle_line(200.0, &distances),
        ]);

        let buffer = parser_for(&file).parse().unwrap();
        assert_eq!(buffer.sequences.len(), 2);
        assert_eq!(buffer.sequences[0].azimuth, Some(200.0));
    }

    #[test]
    fn short_angle_line_aborts_with_abort_policy() {
        let file = write_log(&["angle=      100.0".to_string()]);
        let mut parser = parser_for(&file);
        parser.record_error_policy = RecordErrorPolicy::Abort;
        let result = parser.parse();
        // the first measurement field is the one that runs short
        assert!(matches!(
            result,
            Err(GeorefError::MalformedRecord {
                line: 1,
                offset: DATA_OFFSET,
                ..
            })
        ));
    }
}
