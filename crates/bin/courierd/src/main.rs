//! # courierd: the courier daemon
//!
//! Composition root that wires all adapters together and starts the
//! server and the background route monitor.
//!
//! ## Responsibilities
//! - Parse configuration (TOML file, env vars)
//! - Initialize the `SQLite` connection pool and run migrations
//! - Hydrate the stop registry from persisted state
//! - Construct repository and collaborator implementations (adapters)
//! - Construct application services, injecting adapters via port traits
//! - Spawn the monitor and build the axum router
//! - Bind to a TCP port and serve
//! - Handle graceful shutdown (SIGINT), stopping the monitor between ticks
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer: no domain logic belongs here.

mod config;

use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::EnvFilter;

use courier_adapter_http_axum::router;
use courier_adapter_http_axum::state::AppState;
use courier_adapter_storage_sqlite_sqlx::{
    Config as DbConfig, SqliteRouteStore, SqliteRuleRepository,
};
use courier_adapter_virtual::{
    FileBackupStore, FlatSpeedTravelModel, JsonExportWriter, StaticGeocoder, TracingNotifier,
};
use courier_app::dispatcher::Dispatcher;
use courier_app::event_bus::InProcessEventBus;
use courier_app::monitor::Monitor;
use courier_app::ports::RouteStore;
use courier_app::registry::StopRegistry;
use courier_app::services::route_service::RouteService;
use courier_app::services::rule_service::RuleService;
use courier_domain::vehicle::Vehicle;

use config::Config;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;

    let filter = EnvFilter::try_new(&config.logging.filter)
        .unwrap_or_else(|_| EnvFilter::new("courierd=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    // Database
    let db = DbConfig {
        database_url: config.database_url().to_string(),
    }
    .build()
    .await?;
    let pool = db.pool().clone();

    let store = SqliteRouteStore::new(pool.clone());
    let rule_repo = SqliteRuleRepository::new(pool);

    // Hydrate the registry from persisted state.
    let vehicle = match store.load_vehicle().await? {
        Some(vehicle) => vehicle,
        None => Vehicle::preset_named(&config.vehicle.preset)
            .map(Vehicle::from_preset)
            .unwrap_or_else(|| Vehicle::new("Ford", "Transit", 11.0, 12.5)),
    };
    let stops = store.load_stops().await?;
    tracing::info!(stops = stops.len(), vehicle = %vehicle.model, "route state loaded");
    let registry = Arc::new(StopRegistry::hydrate(vehicle, stops));

    // Event bus
    let event_bus = InProcessEventBus::new(256);

    // Services
    let route_service = Arc::new(RouteService::new(
        Arc::clone(&registry),
        store,
        StaticGeocoder::default(),
        FlatSpeedTravelModel::default(),
        event_bus.clone(),
        config.optimizer.ordering,
    ));
    let rule_service = Arc::new(RuleService::new(rule_repo));

    // Dispatcher and monitor
    let backup_source = config
        .database_file()
        .unwrap_or_else(|| "courier.db".into());
    let dispatcher = Arc::new(Dispatcher::new(
        Arc::clone(&route_service),
        TracingNotifier::default(),
        FileBackupStore::new(backup_source, &config.paths.backups),
        JsonExportWriter::new(&config.paths.exports),
    ));
    let (monitor, controls) = Monitor::new(
        registry,
        Arc::clone(&rule_service),
        dispatcher,
        event_bus,
        Duration::from_secs(config.monitor.interval_seconds),
    );
    let monitor_task = config.monitor.enabled.then(|| tokio::spawn(monitor.run()));

    // HTTP
    let state = AppState::new(route_service, rule_service, controls.clone());
    let app = router::build(state);

    let bind_addr = config.bind_addr();
    tracing::info!(%bind_addr, "courierd listening");

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // The monitor only stops between ticks, never mid-evaluation.
    controls.stop();
    if let Some(task) = monitor_task {
        let _ = task.await;
    }
    tracing::info!("courierd stopped");
    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
