// Sonify CLI - Cluster metric sonification
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! # Sonify
//!
//! Polls cluster health metrics and plays each reading as a note.
//!
//! ## Usage
//!
//! ```bash
//! # Live cluster from ~/.kube/config, colored output, MIDI if available
//! sonify --color --midi --namespace production
//!
//! # Another kubeconfig
//! sonify --kubeconfig ~/.kube/staging
//!
//! # Simulated readings without audio
//! sonify --source simulated --seed 42 --test-mode
//!
//! # Settings from a file
//! sonify -f sonify.yaml
//! ```

mod backend;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use sonify::{Config, ConsoleSink, PollLoop, Registry, Shutdown, SoundBackend, SourceKind};
use tracing::{error, info, Level};
use tracing_subscriber::EnvFilter;

/// Sonify: hear your cluster's health
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Print colored status lines
    #[arg(short, long)]
    color: bool,

    /// Use MIDI for sound output if available
    #[arg(short, long)]
    midi: bool,

    /// Seconds between polling cycles
    #[arg(short, long)]
    interval: Option<u64>,

    /// Namespace to monitor
    #[arg(short, long)]
    namespace: Option<String>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// YAML configuration file
    #[arg(short = 'f', long = "config")]
    config: Option<PathBuf>,

    /// Kubeconfig file for the cluster source
    #[arg(long)]
    kubeconfig: Option<String>,

    /// Metric source (cluster, simulated)
    #[arg(long)]
    source: Option<SourceKind>,

    /// Seed for the simulated source
    #[arg(long)]
    seed: Option<u64>,

    /// Disable audio; notes are logged only
    #[arg(long)]
    test_mode: bool,

    /// Audio output: PCM sink for tones, raw MIDI port for MIDI
    #[arg(long)]
    device: Option<String>,

    /// Note duration in seconds
    #[arg(long)]
    duration: Option<f64>,
}

impl Args {
    /// Apply command-line overrides on top of file and environment settings
    fn apply(&self, mut config: Config) -> Config {
        if self.color {
            config.monitoring.use_color = true;
        }
        if self.midi {
            config.audio.backend = SoundBackend::Midi;
        }
        if let Some(interval) = self.interval {
            config.monitoring.poll_interval = interval;
        }
        if let Some(namespace) = &self.namespace {
            config.cluster.namespace = namespace.clone();
        }
        if let Some(level) = &self.log_level {
            config.monitoring.log_level = level.to_lowercase();
        }
        if self.verbose {
            config.monitoring.log_level = "debug".to_string();
        }
        if let Some(path) = &self.kubeconfig {
            config.cluster.kubeconfig = Some(path.clone());
            config.cluster.use_kubeconfig = true;
        }
        if let Some(source) = self.source {
            config.source = source;
        }
        if let Some(seed) = self.seed {
            config.simulation.seed = Some(seed);
        }
        if self.test_mode {
            config.audio.enabled = false;
        }
        if let Some(device) = &self.device {
            config.audio.device = Some(device.clone());
        }
        if let Some(duration) = self.duration {
            config.audio.note_duration = duration;
        }
        config
    }
}

/// File, then environment, then command line
fn load_config(args: &Args) -> sonify::Result<Config> {
    let config = args.apply(Config::load(args.config.as_deref())?.merge_env());
    config.validate()?;
    Ok(config)
}

/// Registry, sampler, playback and sinks wired into a loop
async fn build_loop(config: &Config) -> sonify::Result<PollLoop> {
    let registry = Arc::new(Registry::cluster_defaults()?);
    let sampler = backend::build_sampler(config).await?;
    let playback = backend::build_playback(&config.audio);

    let mut poll = PollLoop::new(registry, sampler, playback, config.poll_settings())
        .with_selection(&config.metrics.enabled);
    if config.monitoring.use_color {
        poll = poll.with_sink(Box::new(ConsoleSink::stdout(true)));
    }
    Ok(poll)
}

fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = match log_level {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        };
        EnvFilter::from_default_env().add_directive(level.into())
    });

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    init_tracing(&config.monitoring.log_level);
    info!("Sonify v{}", sonify::VERSION);

    let mut poll = match build_loop(&config).await {
        Ok(poll) => poll,
        Err(e) => {
            error!("Failed to start: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let shutdown = Shutdown::new();
    let trigger = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupt received, finishing current metric");
            trigger.trigger();
        }
    });

    poll.run(shutdown).await;
    ExitCode::SUCCESS
}
