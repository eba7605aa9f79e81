use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use sysinfo::System;

use darts_sound_fx::{
    resolve, ConfigStore, GameData, GameDataStore, InteractionKind, JsonConfigStore, LogNotifier,
    RodioBackend, SoundFxOptions, SoundFxService,
};

const LOG_TARGET_STARTUP: &str = "darts_sound_fx::startup";

#[derive(Parser)]
#[command(version, about = "Sound effects for dart scoring")]
struct Cli {
    /// Settings file (defaults to the platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Playback volume from 0.0 to 1.0
    #[arg(long, global = true, default_value_t = 1.0)]
    volume: f32,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show which sounds a trigger resolves to
    Resolve { trigger: String },
    /// Play triggers in order
    Play {
        #[arg(required = true)]
        triggers: Vec<String>,
        /// Give up waiting for playback after this many seconds
        #[arg(long, default_value_t = 60)]
        timeout_secs: u64,
    },
    /// Feed game-state snapshots (one JSON object per line) through the classifier
    Replay {
        file: PathBuf,
        /// Delay between snapshots
        #[arg(long, default_value_t = 1000)]
        interval_ms: u64,
        #[arg(long, default_value_t = 60)]
        timeout_secs: u64,
    },
}

fn initialize_tracing() {
    use tracing_appender::rolling;
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    // Get log directory in user config folder
    let log_dir = dirs::config_dir()
        .map(|dir| dir.join("DartsSoundFx").join("logs"))
        .unwrap_or_else(|| PathBuf::from("logs"));

    if let Err(e) = fs::create_dir_all(&log_dir) {
        eprintln!("Warning: Failed to create log directory: {}", e);
    }

    // Create file appender with daily rotation
    let file_appender = rolling::daily(&log_dir, "darts-sound-fx.log");

    // Configure filter (info level by default)
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let file_layer = fmt::layer()
        .with_writer(file_appender)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false)
        .with_line_number(true);

    // In debug builds, also log to console
    #[cfg(debug_assertions)]
    {
        let console_layer = fmt::layer()
            .with_writer(std::io::stderr)
            .with_ansi(true)
            .with_target(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(file_layer)
            .with(console_layer)
            .init();
    }

    #[cfg(not(debug_assertions))]
    {
        tracing_subscriber::registry()
            .with(filter)
            .with(file_layer)
            .init();
    }

    tracing::info!("Log directory: {}", log_dir.display());
}

fn log_runtime_environment() {
    let version = env!("CARGO_PKG_VERSION");
    let os_name = System::long_os_version()
        .or_else(System::name)
        .unwrap_or_else(|| "Unknown OS".to_string());
    let kernel = System::kernel_version().unwrap_or_else(|| "Unknown Kernel".to_string());
    let architecture = std::env::consts::ARCH;

    tracing::info!(target: LOG_TARGET_STARTUP, "Starting darts-sound-fx v{} on ({})", version, architecture);
    tracing::info!(target: LOG_TARGET_STARTUP, "Operating System: {} (kernel {})", os_name, kernel);
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    initialize_tracing();
    log_runtime_environment();

    let store = match cli.config {
        Some(path) => JsonConfigStore::new(path),
        None => JsonConfigStore::default_location().context("Failed to locate settings file")?,
    };
    tracing::info!(target: LOG_TARGET_STARTUP, "Settings: {}", store.path().display());
    let store: Arc<dyn ConfigStore> = Arc::new(store);

    match cli.command {
        Commands::Resolve { trigger } => print_resolution(store.as_ref(), &trigger),
        Commands::Play {
            triggers,
            timeout_secs,
        } => play(store, cli.volume, &triggers, Duration::from_secs(timeout_secs)),
        Commands::Replay {
            file,
            interval_ms,
            timeout_secs,
        } => replay(
            store,
            cli.volume,
            &file,
            Duration::from_millis(interval_ms),
            Duration::from_secs(timeout_secs),
        ),
    }
}

fn print_resolution(store: &dyn ConfigStore, trigger: &str) -> Result<()> {
    let config = store.get_value().context("Failed to load settings")?;
    let resolution = resolve(trigger, &config.sound_fx.sounds);

    if resolution.is_empty() {
        println!("No sound found for trigger \"{}\"", trigger);
        return Ok(());
    }

    for (index, tier) in resolution.tiers().iter().enumerate() {
        println!("{}. {}: {}", index + 1, tier.matched, tier.names().join(", "));
    }
    Ok(())
}

fn start_service(
    store: Arc<dyn ConfigStore>,
    game: &GameDataStore,
    volume: f32,
) -> Result<SoundFxService> {
    let service = SoundFxService::start(
        store,
        game,
        Box::new(LogNotifier),
        SoundFxOptions::default(),
        move || RodioBackend::try_default().map(|backend| backend.with_volume(volume)),
    )
    .context("Failed to start sound effects")?;

    // Running from a terminal counts as a user gesture
    service.user_interaction(InteractionKind::KeyDown)?;
    Ok(service)
}

fn finish(mut service: SoundFxService, timeout: Duration) -> Result<()> {
    if !service.wait_idle(timeout)? {
        tracing::warn!("Playback still running after {:?}, stopping", timeout);
    }
    service.stop()?;
    Ok(())
}

fn play(
    store: Arc<dyn ConfigStore>,
    volume: f32,
    triggers: &[String],
    timeout: Duration,
) -> Result<()> {
    let game = GameDataStore::new();
    let service = start_service(store, &game, volume)?;

    for trigger in triggers {
        service.play_trigger(trigger.as_str())?;
    }

    finish(service, timeout)
}

fn replay(
    store: Arc<dyn ConfigStore>,
    volume: f32,
    file: &Path,
    interval: Duration,
    timeout: Duration,
) -> Result<()> {
    let contents = fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;

    let game = GameDataStore::new();
    let service = start_service(store, &game, volume)?;

    for (number, line) in contents.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let snapshot: GameData = serde_json::from_str(line)
            .with_context(|| format!("Invalid snapshot on line {}", number + 1))?;
        game.set_value(snapshot);
        thread::sleep(interval);
    }

    finish(service, timeout)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_volume_flag() {
        let cli = Cli::try_parse_from(["darts-sound-fx", "play", "ambient_t20"]).unwrap();
        assert_eq!(cli.volume, 1.0);

        let cli =
            Cli::try_parse_from(["darts-sound-fx", "play", "ambient_t20", "--volume", "0.4"])
                .unwrap();
        assert_eq!(cli.volume, 0.4);
        assert!(matches!(cli.command, Commands::Play { ref triggers, .. } if triggers.len() == 1));
    }
}
