//! `trackfuse` – tracker fusion host.
//!
//! ```text
//! trackfuse [run] [CONFIG]   drive the simulated robot and print telemetry
//! trackfuse init  [CONFIG]   write a default config file
//! ```
//!
//! `CONFIG` defaults to `~/.trackfuse/config.toml`.  Ctrl-C stops the drive
//! loop after the current tick and still prints the final telemetry.

mod config;
mod demo;

use colored::Colorize;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::{info, warn};

enum Command {
    Run,
    Init,
}

fn parse_args() -> (Command, PathBuf) {
    let mut command = Command::Run;
    let mut path = None;
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "run" => command = Command::Run,
            "init" => command = Command::Init,
            other => path = Some(PathBuf::from(other)),
        }
    }
    (command, path.unwrap_or_else(config::config_path))
}

fn main() -> ExitCode {
    let _otel_guard = trackfuse_runtime::init_tracing("trackfuse");

    print_banner();
    let (command, path) = parse_args();

    match command {
        Command::Init => init(&path),
        Command::Run => run(&path),
    }
}

fn init(path: &std::path::Path) -> ExitCode {
    match config::save_to(&config::Settings::default(), path) {
        Ok(()) => {
            println!(
                "  {} Config written to {}",
                "✓".green().bold(),
                path.display().to_string().bold()
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            println!("{}: {}", "Error saving config".red(), e);
            ExitCode::FAILURE
        }
    }
}

fn run(path: &std::path::Path) -> ExitCode {
    let settings = match config::load_from(path) {
        Ok(Some(settings)) => {
            println!("  Config loaded from {}", path.display().to_string().bold());
            settings
        }
        Ok(None) => {
            println!(
                "  No config at {}; using defaults.  Run `{}` to create one.",
                path.display().to_string().dimmed(),
                "trackfuse init".bold()
            );
            let mut settings = config::Settings::default();
            config::apply_env_overrides(&mut settings);
            settings
        }
        Err(e) => {
            println!("{}: {}", "Config error".red(), e);
            return ExitCode::FAILURE;
        }
    };

    let fusion = match settings.fusion.to_config() {
        Ok(fusion) => fusion,
        Err(e) => {
            println!("{}: {}", "Config error".red(), e);
            return ExitCode::FAILURE;
        }
    };

    let shutdown = Arc::new(AtomicBool::new(false));
    let shutdown_clone = shutdown.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        println!();
        println!("{}", "⚠  Ctrl-C received – stopping after this tick …".yellow().bold());
        shutdown_clone.store(true, Ordering::SeqCst);
    }) {
        warn!(error = %e, "Failed to install Ctrl-C handler; graceful shutdown on Ctrl-C will not be available");
    }

    info!(
        ticks = settings.ticks,
        tick_period_ms = settings.tick_period_ms,
        enabled = fusion.enabled,
        "starting simulated drive"
    );
    let status = match demo::run(
        fusion,
        settings.ticks,
        Duration::from_millis(settings.tick_period_ms),
        &shutdown,
    ) {
        Ok(status) => status,
        Err(e) => {
            println!("{}: {}", "Fusion error".red(), e);
            return ExitCode::FAILURE;
        }
    };

    println!();
    println!(
        "  {} ticks, {} accepted, {} rejected, {} reset(s)",
        status.ticks.to_string().bold(),
        status.frames_accepted.to_string().green(),
        status.frames_rejected.to_string().yellow(),
        status.resets
    );
    match serde_json::to_string_pretty(&status.telemetry()) {
        Ok(json) => println!("{json}"),
        Err(e) => warn!(error = %e, "failed to serialize telemetry"),
    }
    ExitCode::SUCCESS
}

// ─────────────────────────────────────────────────────────────────────────────
// Banner
// ─────────────────────────────────────────────────────────────────────────────

fn print_banner() {
    println!();
    println!("{}", r#"  _                  _     __                "#.bold().cyan());
    println!("{}", r#" | |_ _ _ __ _ __ __| |__ / _|_  _ ___ ___  "#.bold().cyan());
    println!("{}", r#" |  _| '_/ _` / _/ /| / / |  _| || (_-</ -_) "#.bold().cyan());
    println!("{}", r#"  \__|_| \__,_\__\_\|_\_\ |_|  \_,_/__/\___| "#.bold().cyan());
    println!();
    println!("  {} {}",
        "trackfuse".bold(),
        format!("v{}", env!("CARGO_PKG_VERSION")).dimmed()
    );
    println!("  External tracker pose fusion");
    println!();
}
