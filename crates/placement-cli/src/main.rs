//! Placement - student placement portal from the terminal
//!
//! - `placement serve`: web portal with offline assets
//! - `placement students`: log in and watch the company listing load
//! - `placement config`: show or initialize the configuration file

use anyhow::Result;
use clap::{Parser, Subcommand};

use placement_core::paths;

mod config;
mod serve;
mod students;

/// Placement portal
#[derive(Parser)]
#[command(name = "placement")]
#[command(about = "Placement portal for students, recruiters and admins", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the placement web server
    ///
    /// Serves the landing menu, the student login and dashboard, and the
    /// offline assets (service worker, manifest, icon).
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value_t = 3000)]
        port: u16,
    },

    /// Log in as a student and load the company listing
    ///
    /// The password is read from stdin. Rate-limited listings are retried
    /// after a countdown; Ctrl-C logs out.
    Students {
        /// Eight-character roll number
        #[arg(short, long)]
        roll_number: String,
    },

    /// Show the effective configuration
    Config {
        /// Write the default configuration file
        #[arg(long)]
        init: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Serve mode has its own logging (stdout)
    if let Commands::Serve { port } = cli.command {
        return serve::run(port).await;
    }

    // Log to file so tracing output does not interleave with the dashboard
    let log_dir = paths::logs_dir();
    if let Err(e) = std::fs::create_dir_all(&log_dir) {
        eprintln!("Failed to create log directory: {}", e);
    }

    #[cfg(unix)]
    let null_device = "/dev/null";
    #[cfg(windows)]
    let null_device = "NUL";

    let log_file = match std::fs::File::create(paths::log_file_path()) {
        Ok(file) => file,
        Err(e) => {
            eprintln!(
                "Failed to create log file: {}, falling back to null device",
                e
            );
            std::fs::File::create(null_device)?
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::sync::Mutex::new(log_file))
        .with_ansi(false)
        .init();

    match cli.command {
        Commands::Students { roll_number } => students::run(roll_number).await,
        Commands::Config { init } => config::run(init),
        Commands::Serve { .. } => Ok(()),
    }
}
