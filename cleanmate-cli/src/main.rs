//! Cleanmate CLI — entry point.
//!
//! ```text
//! cleanmate status                    Print the device state as JSON
//! cleanmate map                       Print rooms and positions as JSON
//! cleanmate start --mode silent       Start cleaning
//! cleanmate clean-rooms 2 5           Clean specific rooms
//! cleanmate --config <path> ...       Use a custom config TOML
//! cleanmate --gen-config              Dump default config and exit
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use cleanmate_core::{CleanmateClient, MopMode, RoomCleaning, WorkMode, probe};

mod config;

use config::CliConfig;

// ── CLI ──────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "cleanmate", about = "Control a Cleanmate robot vacuum")]
struct Cli {
    /// Path to configuration TOML file.
    #[arg(short, long, default_value = "cleanmate.toml")]
    config: PathBuf,

    /// Device IP address (overrides config).
    #[arg(long)]
    host: Option<String>,

    /// Device auth code (overrides config).
    #[arg(long)]
    auth_code: Option<String>,

    /// Print the default configuration to stdout and exit.
    #[arg(long)]
    gen_config: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Query and print the device state.
    Status,
    /// Query and print the map.
    Map,
    /// Start cleaning.
    Start {
        #[arg(long, value_enum)]
        mode: Option<Mode>,
    },
    /// Stop cleaning.
    Stop,
    /// Pause cleaning.
    Pause,
    /// Return to the dock.
    Charge,
    /// Play the locate sound.
    Find,
    /// Set voice volume (0-100).
    Volume {
        #[arg(value_parser = clap::value_parser!(u8).range(0..=100))]
        level: u8,
    },
    /// Set mop water flow.
    Mop {
        #[arg(value_enum)]
        level: Mop,
    },
    /// Clean the given rooms once each.
    CleanRooms {
        #[arg(required = true)]
        rooms: Vec<u32>,
    },
    /// Check that the device accepts connections.
    Probe,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Mode {
    Intensive,
    Standard,
    Silent,
}

impl From<Mode> for WorkMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Intensive => WorkMode::Intensive,
            Mode::Standard => WorkMode::Standard,
            Mode::Silent => WorkMode::Silent,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Mop {
    High,
    Medium,
    Low,
}

impl From<Mop> for MopMode {
    fn from(mop: Mop) -> Self {
        match mop {
            Mop::High => MopMode::High,
            Mop::Medium => MopMode::Medium,
            Mop::Low => MopMode::Low,
        }
    }
}

// ── Main ─────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.gen_config {
        let text = toml::to_string_pretty(&CliConfig::default())?;
        println!("{text}");
        return Ok(ExitCode::SUCCESS);
    }

    let mut config = match CliConfig::load(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e}");
            return Ok(ExitCode::FAILURE);
        }
    };
    if let Some(host) = cli.host {
        config.device.host = host;
    }
    if let Some(code) = cli.auth_code {
        config.device.auth_code = code;
    }

    // Init tracing.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let Some(command) = cli.command else {
        eprintln!("no command given; see --help");
        return Ok(ExitCode::FAILURE);
    };

    let info = config.device.connection_info()?;

    if let Command::Probe = command {
        let reachable = probe(&info).await;
        println!("{info}: {}", if reachable { "reachable" } else { "unreachable" });
        return Ok(if reachable {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        });
    }

    let client = CleanmateClient::with_options(info, &config.device.auth_code)?;
    info!(peer = %client.connection_info(), ?command, "running command");

    let result = match command {
        Command::Status => client
            .update_state()
            .await
            .map(|state| print_json(&state)),
        Command::Map => client.update_map().await.map(|map| print_json(&map)),
        Command::Start { mode } => client.start(mode.map(WorkMode::from)).await,
        Command::Stop => client.stop().await,
        Command::Pause => client.pause().await,
        Command::Charge => client.charge().await,
        Command::Find => client.find().await,
        Command::Volume { level } => client.set_volume(level).await,
        Command::Mop { level } => client.set_mop_mode(level.into()).await,
        Command::CleanRooms { rooms } => {
            let rooms: Vec<RoomCleaning> = rooms.into_iter().map(RoomCleaning::once).collect();
            client.clean_rooms(&rooms).await
        }
        Command::Probe => Ok(()),
    };

    match result {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(e) => {
            error!(kind = %e.kind(), "{e}");
            Ok(ExitCode::FAILURE)
        }
    }
}

fn print_json(value: &impl serde::Serialize) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{text}"),
        Err(e) => error!("cannot render output: {e}"),
    }
}
