//! `titros-cli` – TitrOS Coordinator Daemon
//!
//! This binary is the entry point for the TitrOS stack. It:
//!
//! 1. Loads `~/.titros/config.toml` (falling back to defaults when absent)
//!    and applies `TITROS_*` environment overrides.
//! 2. Wires the session registry, titration rig, coordinator, telemetry
//!    broadcaster, and WebSocket gateway together.
//! 3. Runs until **Ctrl-C**, then shuts down cleanly.

mod config;

use std::time::Duration;

use colored::Colorize;
use tracing::{info, warn};

use titros_hal::{SimLightSensor, SimPump, TitrationRig};
use titros_middleware::SessionRegistry;
use titros_runtime::{Coordinator, TelemetryBroadcaster, observability};
use titros_server::GatewayServer;
use titros_types::TitrError;

fn main() -> Result<(), TitrError> {
    // Structured logging first; the guard flushes OTel spans on exit.
    // The user-facing startup lines below still use println! for UX.
    let _guard = observability::init_tracing("titros");

    print_banner();

    let cfg = match config::load() {
        Ok(Some(cfg)) => {
            println!(
                "  Config loaded from {}",
                config::config_path().display().to_string().bold()
            );
            cfg
        }
        Ok(None) => {
            let mut cfg = config::Config::default();
            // First run: persist the defaults so operators have a file to edit.
            match config::save(&cfg) {
                Ok(()) => println!(
                    "  Default config written to {}",
                    config::config_path().display().to_string().bold()
                ),
                Err(e) => println!("{}: {}", "Could not write default config".yellow(), e),
            }
            config::apply_env_overrides(&mut cfg);
            cfg
        }
        Err(e) => {
            println!("{}: {}", "Config error".red(), e);
            println!("  Using default configuration.");
            config::Config::default()
        }
    };

    if cfg.sensor_ceiling <= cfg.sensor_floor {
        return Err(TitrError::Config(format!(
            "sensor band [{}, {}) is empty",
            cfg.sensor_floor, cfg.sensor_ceiling
        )));
    }

    let runtime = tokio::runtime::Runtime::new()
        .map_err(|e| TitrError::Io(format!("failed to start async runtime: {e}")))?;
    runtime.block_on(run(cfg))
}

async fn run(cfg: config::Config) -> Result<(), TitrError> {
    let registry = SessionRegistry::new();

    // The sim drivers stand in for the ESP32-backed pump relay and LDR
    // probe; swap them here when the hardware bridge lands.
    let rig = TitrationRig::new(Box::new(SimPump::new("titrant_pump")));
    let sensor = SimLightSensor::with_bounds("ldr_probe", cfg.sensor_floor, cfg.sensor_ceiling);

    let (coordinator, handle) = Coordinator::new(registry.clone(), rig);
    let broadcaster = TelemetryBroadcaster::new(registry, Box::new(sensor))
        .with_period(Duration::from_millis(cfg.telemetry_period_ms));
    let server = GatewayServer::new(handle).with_port(cfg.listen_port);

    tokio::spawn(coordinator.run());
    tokio::spawn(broadcaster.run());
    let gateway = tokio::spawn(server.run());

    println!(
        "  {} ws://0.0.0.0:{}  (telemetry every {} ms)\n",
        "Gateway listening on".green(),
        cfg.listen_port,
        cfg.telemetry_period_ms
    );
    println!("  Press {} to stop.\n", "Ctrl-C".bold());

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            println!();
            println!("{}", "⚠  Ctrl-C received – shutting down …".yellow().bold());
            info!("shutdown requested by operator");
            println!("{}", "  ✓ Exiting TitrOS.".green());
            Ok(())
        }
        result = gateway => {
            match result {
                Ok(Err(e)) => {
                    warn!(error = %e, "gateway terminated");
                    Err(e)
                }
                Ok(Ok(())) => Ok(()),
                Err(e) => Err(TitrError::Io(format!("gateway task panicked: {e}"))),
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Banner
// ─────────────────────────────────────────────────────────────────────────────

fn print_banner() {
    println!();
    println!("{}", r#"  ______ __       ____  _____"#.bold().cyan());
    println!("{}", r#" /_  __(_) /______/ __ \/ ___/"#.bold().cyan());
    println!("{}", r#"  / / / / __/ ___/ / / /\__ \ "#.bold().cyan());
    println!("{}", r#" / / / / /_/ /  / /_/ /___/ / "#.bold().cyan());
    println!("{}", r#"/_/ /_/\__/_/   \____//____/  "#.bold().cyan());
    println!();
    println!(
        "  {} {}",
        "TitrOS".bold(),
        format!("v{}", env!("CARGO_PKG_VERSION")).dimmed()
    );
    println!("  Shared Titration Rig Coordinator");
    println!();
}
