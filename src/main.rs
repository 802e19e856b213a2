//! Nanoleaf countdown CLI
//!
//! Runs countdowns across a panel array and calibrates the left-to-right
//! panel order they sweep in.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::info;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use panel_countdown::nanoleaf::{ApiClient, NanoleafProvisioner, UdpPanelStream};
use panel_countdown::order::left_to_right;
use panel_countdown::{
    BootstrapOptions, CalibrationError, Calibrator, CancelToken, CandidateOrder,
    DEFAULT_STEP_RESOLUTION, DeviceConfig, IniFileStore, Player, Schedule, ThreadPacer,
    load_or_provision, parse_duration,
};

// =============================================================================
// CLI Arguments
// =============================================================================

/// Nanoleaf countdown timer
#[derive(Parser, Debug)]
#[command(name = "panel-countdown")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file holding the device address, token and panel order
    #[arg(short, long, default_value = "panel-countdown.ini")]
    config: PathBuf,

    /// Seconds to search for devices when no configuration exists
    #[arg(long, default_value = "10")]
    discovery_timeout: u64,

    /// Seconds to wait for the device to enter pairing mode
    #[arg(long, default_value = "10")]
    pairing_wait: u64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a countdown across the panels
    Countdown {
        /// Total time, e.g. 90, 5m30s, "1h 2m" or 05:30
        #[arg(value_parser = parse_duration)]
        duration: Duration,

        /// Brightness steps per panel (1-255)
        #[arg(short, long, default_value_t = DEFAULT_STEP_RESOLUTION,
              value_parser = clap::value_parser!(u16).range(1..=255))]
        resolution: u16,
    },

    /// Sweep a left-to-right panel order and save it
    Calibrate {
        /// Comma-separated panel ids, left to right. Omit to replay the saved order
        #[arg(value_parser = CandidateOrder::parse)]
        order: Option<CandidateOrder>,

        /// Pause between panels in milliseconds
        #[arg(long, default_value = "200")]
        delay_ms: u64,
    },

    /// List panels by position to help choose an order
    Layout,
}

// =============================================================================
// Main
// =============================================================================

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let cancel = CancelToken::new();

    match run(args, &cancel) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {:#}", err);
            if cancel.is_cancelled() {
                ExitCode::from(130)
            } else {
                ExitCode::FAILURE
            }
        }
    }
}

fn run(args: Args, cancel: &CancelToken) -> Result<()> {
    let handler_token = cancel.clone();
    ctrlc::set_handler(move || handler_token.cancel())
        .context("Failed to set Ctrl+C handler")?;

    let mut pacer = ThreadPacer::new(cancel.clone());
    let mut store = IniFileStore::new(&args.config);
    let options = BootstrapOptions {
        discovery_timeout: Duration::from_secs(args.discovery_timeout),
        pairing_wait: Duration::from_secs(args.pairing_wait),
    };

    let mut provisioner = NanoleafProvisioner::new(cancel.clone());
    let config = load_or_provision(&mut store, &mut provisioner, &mut pacer, options)
        .with_context(|| format!("Failed to load '{}'", args.config.display()))?;

    match args.command {
        Command::Countdown {
            duration,
            resolution,
        } => cmd_countdown(&config, pacer, duration, resolution),
        Command::Calibrate { order, delay_ms } => cmd_calibrate(
            &mut store,
            &config,
            pacer,
            order,
            Duration::from_millis(delay_ms),
        ),
        Command::Layout => cmd_layout(&config),
    }
}

// =============================================================================
// Commands
// =============================================================================

fn cmd_countdown(
    config: &DeviceConfig,
    pacer: ThreadPacer,
    duration: Duration,
    resolution: u16,
) -> Result<()> {
    let schedule = Schedule::builder(duration, &config.panel_order)
        .step_resolution(resolution)
        .build()
        .context("Cannot build countdown")?;

    let stream = UdpPanelStream::open(&config.credentials).context("Failed to open stream")?;
    let mut player = Player::new(stream, pacer);
    let summary = player.play(&schedule)?;

    info!(
        "sent {} steps over {:?}",
        summary.steps_sent, summary.paced
    );
    Ok(())
}

fn cmd_calibrate(
    store: &mut IniFileStore,
    config: &DeviceConfig,
    pacer: ThreadPacer,
    order: Option<CandidateOrder>,
    delay: Duration,
) -> Result<()> {
    // Reject a bad candidate before the device is switched into streaming mode.
    if let Some(candidate) = &order {
        config
            .panel_order
            .validate(candidate)
            .map_err(CalibrationError::from)?;
    }

    let stream = UdpPanelStream::open(&config.credentials).context("Failed to open stream")?;
    let mut calibrator = Calibrator::new(stream, pacer).with_step_delay(delay);

    match order {
        Some(candidate) => {
            let updated = calibrator.calibrate(store, config, &candidate)?;
            println!("Saved new ordering: {}", updated.panel_order.to_list());
        }
        None => {
            calibrator.sweep(&config.panel_order)?;
            println!(
                "Replayed saved ordering: {}",
                config.panel_order.to_list()
            );
        }
    }
    Ok(())
}

fn cmd_layout(config: &DeviceConfig) -> Result<()> {
    let credentials = &config.credentials;
    let positions = ApiClient::new(&credentials.address)?
        .panel_layout(&credentials.auth_token)
        .context("Failed to read panel layout")?;
    let sorted = left_to_right(&positions);

    println!("{:>6} {:>6} {:>6} {:>6}", "panel", "x", "y", "angle");
    for p in &sorted {
        println!("{:>6} {:>6} {:>6} {:>6}", p.panel, p.x, p.y, p.orientation);
    }

    let suggested: Vec<String> = sorted.iter().map(|p| p.panel.to_string()).collect();
    println!();
    println!("saved order:      {}", config.panel_order.to_list());
    println!("sorted by x:      {}", suggested.join(","));
    Ok(())
}
