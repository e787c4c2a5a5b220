use std::path::PathBuf;

use chrono::NaiveDate;
use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use transit_planner::domain::{Journey, Location, TransportMode, TransportStage, TramTime};
use transit_planner::graph::GraphBuilder;
use transit_planner::planner::{CancellationToken, JourneyRequest, RouteCalculator, SearchConfig};
use transit_planner::repository::{
    ClosedStationsRepository, NetworkFile, Repositories, TransportData, TransportDataContainer,
};

/// Plan journeys across a tram, bus and train network.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Network file (JSON)
    #[arg(long)]
    network: PathBuf,

    /// Search configuration file (JSON)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Origin station id, or `group:<area>`
    #[arg(long)]
    from: String,

    /// Destination station id, or `group:<area>`
    #[arg(long)]
    to: String,

    /// Travel date (YYYY-MM-DD)
    #[arg(long)]
    date: NaiveDate,

    /// Earliest departure (HH:MM)
    #[arg(long, value_parser = parse_time)]
    time: TramTime,

    /// Maximum number of changes
    #[arg(long, default_value_t = 2)]
    changes: u32,

    /// Modes to allow, comma separated (all if omitted)
    #[arg(long, value_delimiter = ',')]
    modes: Vec<TransportMode>,

    /// Write a diagram of each path request to the diagnostics directory
    #[arg(long)]
    diagnostics: bool,
}

fn parse_time(s: &str) -> Result<TramTime, String> {
    TramTime::parse_hhmm(s).map_err(|e| e.to_string())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => SearchConfig::load(path)?,
        None => SearchConfig::default(),
    };

    let network = NetworkFile::load(&args.network)?;
    let closed = ClosedStationsRepository::from_closures(network.closures.clone());
    let data = TransportDataContainer::new(network)?;
    let graph = GraphBuilder::new(&data).build()?;
    info!(
        nodes = graph.node_count()?,
        relationships = graph.relationship_count()?,
        "Graph built"
    );
    let repos = Repositories::new(data, closed);

    let request = JourneyRequest::new(
        Location::parse(&args.from),
        Location::parse(&args.to),
        args.date,
        args.time,
        args.changes,
    )
    .with_modes(args.modes)
    .with_diagnostics(args.diagnostics);

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling search");
            on_interrupt.cancel();
        }
    });

    let names = repos.clone();
    let journeys = tokio::task::spawn_blocking(move || {
        RouteCalculator::new(&graph, repos, config).plan(&request, cancel)
    })
    .await?;

    let journeys = match journeys {
        Ok(journeys) => journeys,
        Err(err) => {
            error!(error = %err, "Search failed");
            return Err(err.into());
        }
    };

    if journeys.is_empty() {
        println!("No journeys found");
    }
    for (index, journey) in journeys.iter().enumerate() {
        print_journey(index + 1, journey, names.data.as_ref());
    }
    Ok(())
}

fn print_journey(number: usize, journey: &Journey, data: &dyn TransportData) {
    println!(
        "{number}. {} -> {} ({} min, {} change(s))",
        journey.departure_time(),
        journey.arrival_time(),
        journey.total_duration().num_minutes(),
        journey.change_count()
    );
    for stage in journey.stages() {
        let from = data.station_name(stage.origin());
        let to = data.station_name(stage.destination());
        match stage {
            TransportStage::Vehicle(ride) => {
                let platform = ride
                    .board_platform()
                    .map(|p| format!(" platform {p}"))
                    .unwrap_or_default();
                println!(
                    "   {} {} {from}{platform} -> {} {to} ({}, {} stops)",
                    ride.departure_time(),
                    ride.mode(),
                    ride.arrival_time(),
                    ride.route(),
                    ride.passed_stops()
                );
            }
            TransportStage::Walk(walk) => {
                println!(
                    "   {} walk {from} -> {} {to}",
                    walk.departure,
                    walk.arrival_time()
                );
            }
        }
    }
}
