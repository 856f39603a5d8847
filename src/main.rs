//! Ant-Colony Trip Planner - Command Line Interface
//!
//! A demo binary that reads a trip description from a JSON file, plans it
//! with the ant-colony core, and prints the resulting schedule. The matrix
//! provider wired here (`HaversineResolver`) is a constant-speed stand-in
//! for a real geocoding/distance-matrix client, which lives outside this
//! crate's scope.

use aco_trip_planner::colony::{Colony, ColonyConfig};
use aco_trip_planner::resolver::HaversineResolver;
use aco_trip_planner::trip::Trip;

use clap::{Parser, Subcommand};
use serde::Deserialize;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "aco-trip-planner")]
#[command(author = "M2 AI2D Student")]
#[command(version = "0.1")]
#[command(about = "Plans a time-constrained tourist itinerary with an ant-colony metaheuristic")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Plan a trip described in a JSON file
    Plan {
        /// Path to a trip description (see `TripFile` for the expected shape)
        #[arg(short, long)]
        trip: PathBuf,

        /// Number of iterations to run
        #[arg(short, long, default_value = "200")]
        iterations: usize,

        /// Number of ants per iteration (defaults to 5 * sqrt(place count))
        #[arg(short, long)]
        agents: Option<usize>,

        /// Random seed for reproducible runs
        #[arg(short, long)]
        seed: Option<u64>,
    },
}

/// The demo CLI's own JSON trip format. This is a convenience for the demo
/// binary, not a wire protocol a real facade would expose.
#[derive(Debug, Deserialize)]
struct TripFile {
    trip: Trip,
    /// (latitude, longitude) per place, parallel to `trip.places`.
    coordinates: Vec<(f64, f64)>,
}

fn main() -> ExitCode {
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Plan { trip, iterations, agents, seed } => plan_trip(&trip, iterations, agents, seed),
    }
}

fn plan_trip(trip_path: &PathBuf, iterations: usize, agents: Option<usize>, seed: Option<u64>) -> ExitCode {
    let raw = match std::fs::read_to_string(trip_path) {
        Ok(raw) => raw,
        Err(e) => {
            log::error!("failed to read trip file {}: {}", trip_path.display(), e);
            return ExitCode::FAILURE;
        }
    };

    let trip_file: TripFile = match serde_json::from_str(&raw) {
        Ok(tf) => tf,
        Err(e) => {
            log::error!("failed to parse trip file {}: {}", trip_path.display(), e);
            return ExitCode::FAILURE;
        }
    };

    log::info!("planning trip with {} places", trip_file.trip.len());

    let resolver = HaversineResolver { coordinates: trip_file.coordinates };
    let mut config = ColonyConfig::for_trip(&trip_file.trip);
    config.iterations = iterations;
    if agents.is_some() {
        config.agents = agents;
    }
    if seed.is_some() {
        config.seed = seed;
    }

    let colony = Colony::new(config);
    match colony.plan(&trip_file.trip, &resolver) {
        Ok(itinerary) => {
            println!("{}", itinerary.schedule);
            println!();
            println!("Total priority: {}", itinerary.tour.priority_sum);
            println!("Places visited: {}", itinerary.tour.tour_length());
            println!("Total distance: {} m", itinerary.total_distance);
            println!("Trip ends: {}", itinerary.trip_end);
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("planning failed: {}", e);
            ExitCode::FAILURE
        }
    }
}
