use std::path::PathBuf;

use clap::Parser;

mod dispatch;
mod error;
mod loader;
mod model;
mod simulator;

use dispatch::{Algorithm, AlgorithmParams, Dispatcher};
use model::Map;
use simulator::Simulator;

#[derive(Parser, Debug)]
#[command(author, version, about = "Online DPDPTW dispatcher and fleet simulator", long_about = None)]
struct Cli {
    /// Directory containing routes.csv, vehicles.csv, factories.csv and orders.csv.
    #[arg(long, default_value = "data/benchmark")]
    data_dir: PathBuf,

    /// Vehicle capacity used solely to decide which orders the loader must split into atomic
    /// sub-orders before dispatch; real per-vehicle capacity still comes from vehicles.csv.
    #[arg(long, default_value_t = 15)]
    vehicle_capacity: i32,

    /// Seed for the dispatcher's fallback RNG.
    #[arg(long, default_value_t = 727)]
    seed: u64,

    /// Simulated horizon, in minutes, for the terminal drain after the last slice is dispatched.
    #[arg(long, default_value_t = 200_000)]
    horizon_minutes: i64,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    let routes_path = cli.data_dir.join("routes.csv");
    let vehicles_path = cli.data_dir.join("vehicles.csv");
    let factories_path = cli.data_dir.join("factories.csv");
    let orders_path = cli.data_dir.join("orders.csv");

    let routes = loader::load_routes(&routes_path)?;
    let factories = loader::load_factories(&factories_path)?;
    let depot = loader::first_factory_id(&factories_path)?;
    let vehicles = loader::load_vehicles(&vehicles_path, depot)?;

    tracing::info!(
        vehicles = vehicles.len(),
        factories = factories.len(),
        horizon_minutes = cli.horizon_minutes,
        "loaded fleet"
    );

    let slices = loader::load_order_slices(&orders_path, cli.vehicle_capacity, None)?;
    tracing::info!(slices = slices.len(), "orders grouped into arrival slices");

    let mut sim = Simulator::new(routes, factories, vehicles);
    let dispatcher = Dispatcher::new(Algorithm::Greedy, AlgorithmParams::default(), cli.seed);

    for (slice_time, orders) in slices {
        sim.add_orders(orders);
        let batch = std::mem::take(&mut sim.pending);
        let unplaced = dispatcher.dispatch(&mut sim, batch)?;
        if !unplaced.is_empty() {
            tracing::warn!(
                slice_time,
                unplaced = unplaced.len(),
                "orders carried over to next slice"
            );
        }
        sim.add_orders(unplaced);
        sim.advance(chrono::Duration::seconds(slice_time - sim.now))?;
    }

    let leftover = std::mem::take(&mut sim.pending);
    for order in leftover {
        dispatcher.dispatch_one(&mut sim, order)?;
    }

    sim.drain()?;

    let mut distance = 0.0f32;
    let mut total_delay = chrono::Duration::zero();
    for vehicle in sim.vehicles.values() {
        distance += vehicle.distance;
        total_delay += vehicle.delay;
    }
    let delay_human = humantime::format_duration(
        total_delay.to_std().unwrap_or(std::time::Duration::ZERO),
    );
    tracing::info!(
        distance,
        delay_seconds = total_delay.num_seconds(),
        delay = %delay_human,
        "fleet drained"
    );

    Ok(())
}
