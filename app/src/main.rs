use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::PathBuf;

use chrono::Local;
use clap::{Parser, ValueEnum};
use env_logger::Builder;
use log::LevelFilter;

use georef_core::config::{GpsErrorPolicy, RecordErrorPolicy};
use georef_core::geometry::LaserGeometry;
use georef_core::scan::interpolation::interpolate_azimuths;
use georef_core::RunConfig;
use georef_exporter::{FixedWidthWriter, JsonLinesWriter};
use georef_parser::parsers::imu::ImuLogParserProvider;
use georef_parser::parsers::lidar::LidarLogParserProvider;
use georef_parser::parsers::{Parser as _, ParserProvider as _};
use georef_transformer::{GeorefRunner, RigidBodyTransform, Runner as _};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Jsonl,
}

#[derive(Parser, Debug)]
#[command(
    name = "Lidar Georef",
    about = "A tool for georeferencing raw rangefinder logs against an IMU pose log",
    version = "0.0.1"
)]
struct Cli {
    /// Rangefinder log (angle=/time=/GPS= records)
    #[arg(short, long, required = true, value_name = "FILE")]
    lidar: PathBuf,

    /// IMU pose log (fixed-width columns)
    #[arg(short, long, required = true, value_name = "FILE")]
    imu: PathBuf,

    /// Output point file
    #[arg(short, long, required = true, value_name = "FILE")]
    output: PathBuf,

    /// Optional JSON run configuration; CLI flags override its values
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    #[arg(long, value_name = "MS")]
    tolerance_ms: Option<f64>,

    #[arg(long)]
    lon_offset: Option<f64>,

    #[arg(long)]
    lat_offset: Option<f64>,

    #[arg(long)]
    alt_offset: Option<f64>,

    #[arg(long, value_name = "DEG")]
    yaw_flag_threshold_deg: Option<f64>,

    #[arg(long, value_name = "US")]
    epoch_alignment_offset_us: Option<f64>,

    /// Continue past malformed GPS sentences instead of aborting the
    /// rangefinder log
    #[arg(long)]
    skip_bad_gps: bool,

    /// Abort on any malformed record instead of skipping it
    #[arg(long)]
    abort_on_bad_record: bool,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

fn build_config(args: &Cli) -> Result<RunConfig, Box<dyn std::error::Error>> {
    let mut config = match &args.config {
        Some(path) => serde_json::from_reader(BufReader::new(File::open(path)?))?,
        None => RunConfig::default(),
    };

    if let Some(tolerance_ms) = args.tolerance_ms {
        config.tolerance_ms = tolerance_ms;
    }
    if let Some(lon_offset) = args.lon_offset {
        config.lon_offset = lon_offset;
    }
    if let Some(lat_offset) = args.lat_offset {
        config.lat_offset = lat_offset;
    }
    if let Some(alt_offset) = args.alt_offset {
        config.alt_offset = alt_offset;
    }
    if let Some(threshold) = args.yaw_flag_threshold_deg {
        config.yaw_flag_threshold_deg = threshold;
    }
    if let Some(offset) = args.epoch_alignment_offset_us {
        config.epoch_alignment_offset_us = offset;
    }
    if args.skip_bad_gps {
        config.gps_error_policy = GpsErrorPolicy::Skip;
    }
    if args.abort_on_bad_record {
        config.record_error_policy = RecordErrorPolicy::Abort;
    }
    Ok(config)
}

fn main() {
    Builder::new()
        .format(|buf, record| {
            writeln!(
                buf,
                "{} [{}] - {}",
                Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.args()
            )
        })
        .filter(None, LevelFilter::Info)
        .init();

    let args = Cli::parse();

    log::info!("rangefinder log: {:?}", args.lidar);
    log::info!("IMU log: {:?}", args.imu);
    log::info!("output file: {:?}", args.output);

    let config = match build_config(&args) {
        Ok(config) => config,
        Err(e) => {
            log::error!("Failed to load run configuration: {:?}", e);
            return;
        }
    };
    log::info!("run configuration: {:?}", config);

    let start = std::time::Instant::now();

    log::info!("start parsing rangefinder log...");
    let start_local = std::time::Instant::now();
    let lidar_parser = LidarLogParserProvider {
        filename: args.lidar.clone(),
        gps_error_policy: config.gps_error_policy,
        record_error_policy: config.record_error_policy,
    }
    .get_parser();
    let mut sweeps = match lidar_parser.parse() {
        Ok(sweeps) => sweeps,
        Err(e) => {
            log::error!("Failed to parse rangefinder log: {:?}", e);
            return;
        }
    };
    log::info!("finish parsing in {:?}", start_local.elapsed());

    log::info!("start azimuth interpolation...");
    let filled = interpolate_azimuths(&mut sweeps);
    log::info!("interpolated {} azimuths", filled);

    log::info!("start parsing IMU log...");
    let start_local = std::time::Instant::now();
    let imu_parser = ImuLogParserProvider {
        filename: args.imu.clone(),
        record_error_policy: config.record_error_policy,
    }
    .get_parser();
    let poses = match imu_parser.parse() {
        Ok(poses) => poses,
        Err(e) => {
            log::error!("Failed to parse IMU log: {:?}", e);
            return;
        }
    };
    log::info!("finish parsing in {:?}", start_local.elapsed());

    log::info!("start synchronization and georeferencing...");
    let start_local = std::time::Instant::now();
    let transform = RigidBodyTransform::new(LaserGeometry::vlp16(), &config);
    let runner = GeorefRunner::new(Box::new(transform), &config);

    let output_file = match File::create(&args.output) {
        Ok(file) => file,
        Err(e) => {
            log::error!("Failed to create output file: {:?}", e);
            return;
        }
    };
    let writer = BufWriter::new(output_file);

    let result = match args.format {
        OutputFormat::Text => {
            let mut sink = FixedWidthWriter::new(writer);
            runner.execute(&sweeps, &poses, &mut sink)
        }
        OutputFormat::Jsonl => {
            let mut sink = JsonLinesWriter::new(writer);
            runner.execute(&sweeps, &poses, &mut sink)
        }
    };

    let stats = match result {
        Ok(stats) => stats,
        Err(e) => {
            log::error!("Pipeline failed: {:?}", e);
            return;
        }
    };
    log::info!("finish georeferencing in {:?}", start_local.elapsed());

    log::info!(
        "{} points emitted ({} zero-distance, {} out of tolerance, {} non-finite skipped)",
        stats.emitted,
        stats.zero_distance,
        stats.out_of_tolerance,
        stats.non_finite
    );
    log::info!("Elapsed: {:?}", start.elapsed());
    log::info!("Finish processing");
}
