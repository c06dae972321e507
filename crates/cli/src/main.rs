//! Formcheck CLI
//!
//! A command-line tool for analyzing recorded sports sessions, scoring
//! injury risk and replaying live landmark streams.

mod commands;
mod input;
mod output;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use commands::{frame, session};
use formcheck_lib::{Analyzer, AnalyzerConfig, Sport};
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Sports form analysis CLI
#[derive(Parser)]
#[command(name = "formcheck")]
#[command(author, version, about = "Sports form analysis and injury risk scoring", long_about = None)]
pub struct Cli {
    /// Threshold overrides file (FORMCHECK_* environment variables still apply)
    #[arg(long, env = "FORMCHECK_CONFIG_FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(long, short, default_value = "table", global = true)]
    pub format: output::OutputFormat,

    /// Enable verbose output
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Print Prometheus metrics to stderr when the command finishes
    #[arg(long, global = true)]
    pub print_metrics: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Analyze a recorded session: feedback, recommendations and injury risk
    Analyze {
        /// Session bundle (JSON with pose_data)
        session: PathBuf,

        /// Sport (basketball, tennis, football, badminton, running)
        #[arg(long, short, default_value = "default")]
        sport: String,

        /// Training history (JSON array, most recent first)
        #[arg(long)]
        history: Option<PathBuf>,
    },

    /// Score injury risk for a recorded session
    Risk {
        /// Session bundle (JSON with pose_data)
        session: PathBuf,

        /// Sport (basketball, tennis, football, badminton, running)
        #[arg(long, short, default_value = "default")]
        sport: String,

        /// Training history (JSON array, most recent first)
        #[arg(long)]
        history: Option<PathBuf>,
    },

    /// Extract pose features from a recorded session
    Features {
        /// Session bundle (JSON with pose_data)
        session: PathBuf,
    },

    /// Evaluate frame rules on a single landmark set
    Frame {
        /// Landmark array (JSON)
        landmarks: PathBuf,

        /// Sport (basketball, tennis, football, badminton, running)
        #[arg(long, short, default_value = "default")]
        sport: String,
    },

    /// Replay frames through a live stream
    Live {
        /// Frames file (JSON Lines, one landmark array per line)
        frames: PathBuf,

        /// Sport (basketball, tennis, football, badminton, running)
        #[arg(long, short, default_value = "default")]
        sport: String,

        /// Show every Nth frame report
        #[arg(long, default_value_t = 1)]
        every: usize,
    },
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with(fmt::layer().json().with_writer(std::io::stderr))
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli) {
        output::print_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = AnalyzerConfig::load_from(cli.config.as_deref())?;
    debug!(file = ?cli.config, "Loaded analyzer configuration");
    let analyzer = Analyzer::with_config(config);
    analyzer.logger().log_startup(VERSION);

    match cli.command {
        Commands::Analyze {
            session,
            sport,
            history,
        } => {
            let recorded = input::read_session(&session)?;
            let history = history.as_deref().map(input::read_history).transpose()?;
            session::analyze(
                &analyzer,
                &recorded,
                Sport::from_name(&sport),
                history.as_ref(),
                cli.format,
            )?;
        }
        Commands::Risk {
            session,
            sport,
            history,
        } => {
            let recorded = input::read_session(&session)?;
            let history = history.as_deref().map(input::read_history).transpose()?;
            session::risk(
                &analyzer,
                &recorded,
                Sport::from_name(&sport),
                history.as_ref(),
                cli.format,
            )?;
        }
        Commands::Features { session } => {
            let recorded = input::read_session(&session)?;
            session::features(&analyzer, &recorded, cli.format)?;
        }
        Commands::Frame { landmarks, sport } => {
            let landmarks = input::read_landmarks(&landmarks)?;
            frame::frame(&analyzer, &landmarks, Sport::from_name(&sport), cli.format)?;
        }
        Commands::Live {
            frames,
            sport,
            every,
        } => {
            let stream_id = frames
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_else(|| "live".to_string());
            let recorded = input::read_frame_lines(&frames)?;
            frame::live(
                &analyzer,
                &stream_id,
                recorded,
                Sport::from_name(&sport),
                every,
                cli.format,
            )?;
        }
    }

    if cli.print_metrics {
        let text = analyzer
            .metrics()
            .render()
            .context("Failed to render metrics")?;
        eprint!("{}", text);
    }

    Ok(())
}
