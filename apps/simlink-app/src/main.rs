//! simlink command-line host.
//!
//! - `serve`: bind the three session channels and drive a toy vehicle from
//!   the connected agent's commands
//! - `info`: print the resolved configuration and crate versions

mod demo;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use simlink_core::config::ServerConfig;
use simlink_server::protocol::Channel;
use simlink_server::server::SessionController;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

use crate::demo::DemoOptions;

// ---------------------------------------------------------------------------
// CLI
// ---------------------------------------------------------------------------

/// Session host between a simulator and an external control agent.
#[derive(Parser)]
#[command(name = "simlink", version, about)]
struct Cli {
    /// Enable debug logging.
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve a session over TCP with a demo vehicle.
    Serve {
        #[command(flatten)]
        config: ConfigArgs,

        /// Tick length in milliseconds.
        #[arg(long, default_value_t = 50)]
        tick_ms: u64,

        /// Ticks before an episode is cut short.
        #[arg(long, default_value_t = 600)]
        episode_ticks: u64,

        /// Exit after this many ticks (runs forever if omitted).
        #[arg(long)]
        max_ticks: Option<u64>,
    },

    /// Print the resolved configuration.
    Info {
        #[command(flatten)]
        config: ConfigArgs,
    },
}

/// Config file plus per-field overrides.
#[derive(Args)]
struct ConfigArgs {
    /// TOML config file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Interface to bind.
    #[arg(long)]
    host: Option<String>,

    #[arg(long)]
    world_port: Option<u16>,

    #[arg(long)]
    write_port: Option<u16>,

    #[arg(long)]
    read_port: Option<u16>,

    /// Number of selectable modes.
    #[arg(long)]
    modes: Option<i32>,

    /// Number of selectable scenes.
    #[arg(long)]
    scenes: Option<i32>,
}

impl ConfigArgs {
    fn resolve(self) -> Result<ServerConfig> {
        let mut config = match &self.config {
            Some(path) => ServerConfig::from_file(path)
                .with_context(|| format!("loading {}", path.display()))?,
            None => ServerConfig::default(),
        };

        if let Some(host) = self.host {
            config.host = host;
        }
        if let Some(port) = self.world_port {
            config.world_port = port;
        }
        if let Some(port) = self.write_port {
            config.write_port = port;
        }
        if let Some(port) = self.read_port {
            config.read_port = port;
        }
        if let Some(modes) = self.modes {
            config.modes_count = modes;
        }
        if let Some(scenes) = self.scenes {
            config.scenes_count = scenes;
        }

        config.validate().context("invalid configuration")?;
        Ok(config)
    }
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

fn run_serve(config: &ServerConfig, options: DemoOptions) -> Result<()> {
    let mut session = SessionController::bind(config).context("binding session channels")?;
    for channel in Channel::ALL {
        if let Some(addr) = session.transport().local_addr(channel) {
            info!(%channel, %addr, "ready");
        }
    }
    info!(
        modes = config.modes_count,
        scenes = config.scenes_count,
        "waiting for scene selection"
    );

    demo::run(&mut session, options);
    Ok(())
}

fn run_info(config: &ServerConfig) {
    println!("simlink v{}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("channels:");
    println!("  world-info  {}", config.world_addr());
    println!("  write       {}", config.write_addr());
    println!("  read        {}", config.read_addr());
    println!();
    println!("modes:  {}", config.modes_count);
    println!("scenes: {}", config.scenes_count);
    println!("worker poll interval: {} ms", config.poll_interval_ms);
}

// ---------------------------------------------------------------------------
// main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.debug { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .compact()
        .init();

    match cli.command {
        Commands::Serve {
            config,
            tick_ms,
            episode_ticks,
            max_ticks,
        } => {
            let config = config.resolve()?;
            let options = DemoOptions {
                tick: Duration::from_millis(tick_ms.max(1)),
                episode_ticks,
                max_ticks,
            };
            run_serve(&config, options)
        }
        Commands::Info { config } => {
            run_info(&config.resolve()?);
            Ok(())
        }
    }
}
