//! UR Primary - command-line monitor for the primary interface
//!
//! Streams decoded records as JSON lines, decodes captured byte files
//! offline, and sends single dashboard commands.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::watch;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use ur_primary::config::DEFAULT_CONFIG_PATH;
use ur_primary::frame::DEFAULT_MAX_FRAME_LEN;
use ur_primary::json_output::output;
use ur_primary::{
    connect, Config, DashboardClient, PrimaryError, PrimaryStream, PrimarySubscriber, RobotConfig,
    StreamState,
};

#[derive(Parser)]
#[command(name = "ur-primary")]
#[command(about = "Universal Robots primary interface monitor")]
#[command(version)]
struct Args {
    /// Path to the robot configuration file
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Robot host, overrides the configuration file
    #[arg(long, global = true)]
    host: Option<String>,

    /// Show debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Stream decoded records from the robot as JSON lines
    Monitor {
        /// Print the whole snapshot every N seconds instead of each record
        #[arg(long)]
        snapshot_interval: Option<f64>,
    },
    /// Decode a captured primary interface byte dump
    Decode {
        file: PathBuf,

        #[arg(long, default_value_t = DEFAULT_MAX_FRAME_LEN)]
        max_frame_len: usize,
    },
    /// Send one command to the dashboard server and print the reply
    Dashboard {
        #[arg(required = true, num_args = 1..)]
        command: Vec<String>,
    },
}

impl Args {
    fn get_config_path(&self) -> String {
        self.config
            .clone()
            .or_else(|| std::env::var("UR_PRIMARY_CONFIG").ok())
            .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string())
    }

    fn robot_config(&self) -> Result<RobotConfig> {
        let config_path = self.get_config_path();
        let mut robot = match (Config::load_from_path(&config_path), &self.host) {
            (Ok(config), _) => config.robot,
            (Err(e), Some(host)) => {
                warn!("{}, using defaults for {}", e, host);
                RobotConfig::new(host.clone())
            }
            (Err(e), None) => {
                return Err(e).with_context(|| format!("Failed to load config {}", config_path))
            }
        };
        if let Some(host) = &self.host {
            robot.host = host.clone();
        }
        Ok(robot)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let default_filter = if args.verbose { "ur_primary=debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match &args.command {
        Commands::Monitor { snapshot_interval } => {
            let robot = args.robot_config()?;
            match snapshot_interval {
                Some(seconds) => monitor_snapshots(robot, *seconds).await,
                None => monitor_records(robot).await,
            }
        }
        Commands::Decode { file, max_frame_len } => decode_file(file, *max_frame_len).await,
        Commands::Dashboard { command } => {
            let robot = args.robot_config()?;
            send_dashboard(&robot, &command.join(" ")).await
        }
    }
}

/// Stop channel flipped by Ctrl+C
fn shutdown_on_ctrl_c() -> watch::Receiver<bool> {
    let (sender, receiver) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Shutdown requested");
            sender.send_replace(true);
        }
    });
    receiver
}

async fn monitor_records(robot: RobotConfig) -> Result<()> {
    info!("Connecting to {}", robot.primary_addr());
    let mut stream = connect(&robot)
        .await
        .context("Failed to connect to primary interface")?
        .with_shutdown(shutdown_on_ctrl_c());
    output::stream_state(stream.state(), None);

    while let Some(result) = stream.next_frame().await {
        match result {
            Ok(frame) => {
                for failure in &frame.failures {
                    output::decode_failure(failure);
                }
                for record in &frame.records {
                    output::record(record);
                }
            }
            Err(e) => output::stream_error(&e),
        }
    }

    output::stream_state(stream.state(), Some(stream.stats()));
    Ok(())
}

async fn monitor_snapshots(robot: RobotConfig, seconds: f64) -> Result<()> {
    let period = Duration::try_from_secs_f64(seconds)
        .ok()
        .filter(|period| !period.is_zero())
        .with_context(|| format!("Invalid snapshot interval: {}", seconds))?;

    info!("Connecting to {}", robot.primary_addr());
    let subscriber = PrimarySubscriber::spawn(robot)
        .await
        .context("Failed to start subscriber")?;
    let mut shutdown = shutdown_on_ctrl_c();
    let mut ticker = tokio::time::interval(period);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let snapshot = subscriber.latest();
                if !snapshot.is_empty() {
                    output::snapshot(&snapshot);
                }
            }
            _ = shutdown.changed() => break,
        }
    }

    subscriber.stop().await;
    Ok(())
}

async fn decode_file(file: &Path, max_frame_len: usize) -> Result<()> {
    let bytes = tokio::fs::read(file)
        .await
        .with_context(|| format!("Failed to read {}", file.display()))?;
    info!("Decoding {} bytes from {}", bytes.len(), file.display());

    let mut stream = PrimaryStream::new(&bytes[..]).with_max_frame_len(max_frame_len);
    while let Some(result) = stream.next_frame().await {
        match result {
            Ok(frame) => {
                for failure in &frame.failures {
                    output::decode_failure(failure);
                }
                for record in &frame.records {
                    output::record(record);
                }
            }
            // clean end of file
            Err(PrimaryError::Connection(_)) => {}
            Err(e) => {
                error!("Decoding stopped: {}", e);
                output::stream_error(&e);
            }
        }
    }

    let stats = stream.stats();
    info!(
        "Decoded {} frames, {} records, {} failures, {} skipped sub-packages",
        stats.frames, stats.records, stats.decode_failures, stats.skipped_sub_packages
    );
    if stream.state() == StreamState::Faulted {
        bail!("{} does not end on a frame boundary", file.display());
    }
    Ok(())
}

async fn send_dashboard(robot: &RobotConfig, command: &str) -> Result<()> {
    let mut client = DashboardClient::connect(robot)
        .await
        .context("Failed to connect to dashboard")?;
    let reply = client.send(command).await?;
    println!("{}", reply);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ur_primary::{Frame, MessageType};

    fn capture_file(name: &str, bytes: &[u8]) -> PathBuf {
        let file_name = format!("ur-primary-{}-{}.bin", name, std::process::id());
        let path = std::env::temp_dir().join(file_name);
        std::fs::write(&path, bytes).unwrap();
        path
    }

    #[tokio::test]
    async fn test_decode_file_clean_capture() {
        let mut bytes = Frame::new(MessageType::RobotState, vec![]).encode();
        bytes.extend(Frame::new(MessageType::ProgramState, vec![0; 4]).encode());
        let path = capture_file("clean", &bytes);

        let result = decode_file(&path, DEFAULT_MAX_FRAME_LEN).await;
        std::fs::remove_file(&path).unwrap();
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_decode_file_reports_truncated_capture() {
        let mut bytes = Frame::new(MessageType::RobotState, vec![]).encode();
        let second = Frame::new(MessageType::RobotState, vec![0; 7]).encode();
        bytes.extend(&second[..9]);
        let path = capture_file("truncated", &bytes);

        let result = decode_file(&path, DEFAULT_MAX_FRAME_LEN).await;
        std::fs::remove_file(&path).unwrap();
        let err = result.unwrap_err();
        assert!(err.to_string().contains("frame boundary"));
    }
}
