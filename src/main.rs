//! Alarm Flood Status Service - Main Binary
//!
//! Loads the prediction job output once, then either prints the dashboard
//! JSON and exits, or serves it over HTTP for the rendering layer.
//!
//! Usage:
//!   cargo run --release                          # Serve on the configured port
//!   cargo run --release -- --endpoint 9090       # Serve on port 9090
//!   cargo run --release -- --once                # Print dashboard JSON and exit
//!   cargo run --release -- --config other.toml   # Use another config file
//!
//! Environment:
//!   DASHBOARD_CONFIG - config file path when --config is not given

use alarm_flood_service::config::{self, ConfigError, DashboardConfig};
use alarm_flood_service::endpoint::{self, DashboardQuery, DashboardState};
use alarm_flood_service::ingest::loader::load_series;
use alarm_flood_service::logging::{self, Component};
use std::env;
use std::sync::Arc;

fn main() {
    dotenv::dotenv().ok();

    println!("🌊 Alarm Flood Status Service");
    println!("==============================\n");

    // Parse command-line arguments
    let args: Vec<String> = env::args().collect();
    let mut config_path: Option<String> = None;
    let mut endpoint_port: Option<u16> = None;
    let mut once = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--config" => {
                if i + 1 < args.len() {
                    config_path = Some(args[i + 1].clone());
                    i += 2;
                } else {
                    eprintln!("Error: --config requires a file path");
                    std::process::exit(1);
                }
            }
            "--endpoint" => {
                match args.get(i + 1).and_then(|p| p.parse().ok()) {
                    Some(port) => endpoint_port = Some(port),
                    None => {
                        eprintln!("Error: --endpoint requires a port number");
                        std::process::exit(1);
                    }
                }
                i += 2;
            }
            "--once" => {
                once = true;
                i += 1;
            }
            _ => {
                eprintln!("Unknown argument: {}", args[i]);
                eprintln!("Usage: {} [--config PATH] [--endpoint PORT] [--once]", args[0]);
                std::process::exit(1);
            }
        }
    }

    // Configuration: a missing file means defaults, anything else is fatal
    let path = config::resolve_config_path(config_path.as_deref());
    let config = match config::load_config_from(&path) {
        Ok(config) => {
            println!("✓ Loaded configuration from {}", path.display());
            config
        }
        Err(ConfigError::NotFound(_)) => {
            println!("⚠️  {} not found, using default settings", path.display());
            DashboardConfig::default()
        }
        Err(e) => {
            eprintln!("\n❌ Invalid configuration: {}\n", e);
            std::process::exit(1);
        }
    };

    logging::init_logger(
        config.log_level(),
        config.logging.file.as_deref(),
        config.logging.timestamps,
    );
    logging::debug(
        Component::Config,
        Some(&path.display().to_string()),
        &format!(
            "thresholds: probability {}, alarms {}",
            config.thresholds.probability, config.thresholds.alarms
        ),
    );

    // Load the series once; every request evaluates against this copy
    println!("📊 Loading prediction series...");
    let loaded = load_series(&config.data.candidate_paths);
    if loaded.is_synthetic() {
        println!("⚠️  No data file found, showing demo data\n");
    } else {
        println!(
            "✓ {} records from {} ({} rows rejected)\n",
            loaded.series.len(),
            loaded.source,
            loaded.skipped_rows
        );
    }

    let port = endpoint_port.unwrap_or(config.endpoint.port);
    let workers = config.endpoint.workers;
    let state = DashboardState::new(loaded, config);

    if once {
        match endpoint::build_dashboard(&state, &DashboardQuery::default()) {
            Ok(dashboard) => match serde_json::to_string_pretty(&dashboard) {
                Ok(json) => println!("{}", json),
                Err(e) => {
                    eprintln!("❌ Failed to serialize dashboard: {}", e);
                    std::process::exit(1);
                }
            },
            Err(e) => {
                eprintln!("❌ {}", e);
                std::process::exit(1);
            }
        }
        return;
    }

    logging::info(Component::System, None, &format!("Starting endpoint on port {}", port));
    if let Err(e) = endpoint::start_endpoint_server(port, workers, Arc::new(state)) {
        eprintln!("\n❌ {}\n", e);
        std::process::exit(1);
    }
}
