use std::{fs::OpenOptions, path::PathBuf};

use clap::{Parser, Subcommand};
use location_tracker_data_management::{project_path, DataManager, LOG_DIR};
use location_tracker_lib::{
    accumulator::{AccumulatorConfig, MAX_HORIZONTAL_ACCURACY, MAX_SAMPLE_AGE},
    display, share,
    trip_record::StoredTrip,
};
use tracker::{location_source::GpxReplaySource, trip_session::run_trip};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "tracker")]
#[command(about = "Record trips and look at past ones", long_about = None)]
struct Cli {
    /// Database file to use instead of the one in the project data directory
    #[arg(long, global = true)]
    database: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Record a trip, replaying a GPX track as the location source
    Record {
        gpx_file: PathBuf,
        /// Accuracy reported for every replayed fix, in meters
        #[arg(long, default_value_t = 5.0)]
        accuracy: f64,
        /// Replay speed relative to the recording
        #[arg(long, default_value_t = 1.0)]
        speedup: f64,
        /// Fixes with an accuracy at or above this are ignored, in meters
        #[arg(long, default_value_t = MAX_HORIZONTAL_ACCURACY)]
        max_accuracy: f64,
        /// Fixes older than this are ignored, in seconds
        #[arg(long, default_value_t = MAX_SAMPLE_AGE, value_parser = clap::value_parser!(i64).range(1..))]
        max_age: i64,
        /// Do not save the trip when it ends
        #[arg(long)]
        discard: bool,
    },
    /// List all trips, newest first
    List,
    /// Show the details of a trip
    Show { trip_id: i64 },
    /// Totals over all trips
    Stats,
    /// Print a message with the last location of a trip, the latest trip by default
    Share { trip_id: Option<i64> },
    /// Write a trip to a GPX file
    ExportGpx { trip_id: i64, output: PathBuf },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let log_dir = project_path(LOG_DIR)?;
    std::fs::create_dir_all(&log_dir)?;
    let log_file = log_dir.join("tracker.log");

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file)?;

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| format!("{}=trace,location_tracker_lib=trace,location_tracker_data_management=trace", env!("CARGO_CRATE_NAME")).into())
        )
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::fmt::layer().with_ansi(false).with_writer(file))
        .init();

    let cli = Cli::parse();

    let data_manager = match &cli.database {
        Some(path) => DataManager::open(path).await?,
        None => DataManager::start().await?,
    };

    match cli.command {
        Commands::Record { gpx_file, accuracy, speedup, max_accuracy, max_age, discard } => {
            let config = AccumulatorConfig::new(max_accuracy, max_age)?;

            let fixes = data_manager.import_gpx_fixes(&gpx_file)?;
            if fixes.is_empty() {
                anyhow::bail!("No timed track points in {:?}", gpx_file);
            }
            tracing::info!("Replaying {} fixes from {:?}", fixes.len(), gpx_file);

            let source = GpxReplaySource::new(fixes, accuracy, speedup);
            let stop = async {
                if let Err(err) = tokio::signal::ctrl_c().await {
                    tracing::error!("Failed to listen for Ctrl-C: {err}");
                    std::future::pending::<()>().await;
                }
            };

            let record = run_trip(source, config, stop).await?;
            println!("Distance:  {}", display::distance(record.distance));
            println!("Time:  {}", display::time(record.duration));

            if discard {
                tracing::info!("Trip discarded");
            } else {
                let trip_id = data_manager.save_trip(&record).await?;
                println!("Saved trip {}", trip_id);
            }
        },
        Commands::List => {
            for trip in data_manager.get_trips().await? {
                println!("{}\t{}\t{}\t{}", trip.trip_id, display::date(Some(trip.record.finished_at)), display::distance(trip.record.distance), display::time(trip.record.duration));
            }
        },
        Commands::Show { trip_id } => {
            let trip = data_manager.get_trip(trip_id).await?;
            print_trip(&trip);
        },
        Commands::Stats => {
            let summary = data_manager.trip_summary().await?;
            println!("Trips:  {}", summary.trip_count);
            println!("Distance:  {}", display::distance(summary.total_distance));
            println!("Time:  {}", display::time(summary.total_duration));
            println!("Longest:  {}", display::distance(summary.longest_distance));
            println!("Pace:  {}", display::pace(summary.total_distance, summary.total_duration));
        },
        Commands::Share { trip_id } => {
            let trip = match trip_id {
                Some(trip_id) => Some(data_manager.get_trip(trip_id).await?),
                None => data_manager.latest_trip().await?,
            };

            match trip.and_then(|trip| share::location_message(&trip.record.samples)) {
                Some(message) => println!("{}", message),
                None => println!("No location recorded"),
            }
        },
        Commands::ExportGpx { trip_id, output } => {
            data_manager.export_trip_gpx(trip_id, &output).await?;
        },
    }

    Ok(())
}

fn print_trip(trip: &StoredTrip) {
    let record = &trip.record;
    println!("Trip {}", trip.trip_id);
    println!("Distance:  {}", display::distance(record.distance));
    println!("Date:  {}", display::date(Some(record.finished_at)));
    println!("Time:  {}", display::time(record.duration));
    println!("Pace:  {}", display::pace(record.distance, record.duration));
    println!("Samples:  {}", record.samples.len());
}
