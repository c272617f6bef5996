//! Poll loop
//!
//! Drives one pass over the selected metrics per cycle:
//!
//! ```text
//! Idle ─► Sampling(m) ─► Mapping(m) ─► Emitting(m) ─┬─► Sampling(next)
//!                                                   └─► CycleSleep ─► Sampling(first)
//!                              cancellation ─► Terminated
//! ```
//!
//! Per-metric failures (unknown metric, failed sample) skip the metric for
//! the current cycle. A cycle-level error abandons the rest of the cycle and
//! goes straight to the inter-cycle sleep. Only cancellation ends the loop.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, error, info, trace, warn};

use crate::error::{CycleError, SampleError};
use crate::playback::Playback;
use crate::present::SignalSink;
use crate::registry::Registry;
use crate::sample::Sampler;
use crate::signal::{resolve, Signal};

/// Cooperative cancellation token.
///
/// Clones share state; triggering any clone cancels all of them.
#[derive(Debug, Clone)]
pub struct Shutdown {
    tx: Arc<watch::Sender<bool>>,
    rx: watch::Receiver<bool>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, rx) = watch::channel(false);
        Self {
            tx: Arc::new(tx),
            rx,
        }
    }

    /// Request termination
    pub fn trigger(&self) {
        self.tx.send_replace(true);
    }

    /// Whether termination was requested
    pub fn is_triggered(&self) -> bool {
        *self.rx.borrow()
    }

    /// Sleep for `duration` or until triggered. Returns `true` if triggered.
    pub async fn sleep(&mut self, duration: Duration) -> bool {
        if self.is_triggered() {
            return true;
        }
        let rx = &mut self.rx;
        tokio::select! {
            _ = tokio::time::sleep(duration) => {}
            // the sender lives in `self`, so the channel never closes here
            res = rx.wait_for(|triggered| *triggered) => return res.is_ok(),
        }
        self.is_triggered()
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

/// Loop settings
#[derive(Debug, Clone)]
pub struct PollSettings {
    /// Sleep between cycles
    pub interval: Duration,
    /// Namespace passed to the sampler
    pub namespace: String,
    /// Duration of each played note
    pub note_duration: Duration,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
            namespace: "default".to_string(),
            note_duration: Duration::from_millis(500),
        }
    }
}

/// Observable loop state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoopState {
    Idle,
    Sampling(String),
    Mapping(String),
    Emitting(String),
    CycleSleep,
    Terminated,
}

/// Why a metric produced no signal this cycle
#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    /// Name not in the registry
    UnknownMetric,
    /// Sampler failed
    Sample(SampleError),
}

/// Result of processing one metric
#[derive(Debug, Clone, PartialEq)]
pub enum MetricOutcome {
    Emitted(Signal),
    Skipped { metric: String, reason: SkipReason },
}

impl MetricOutcome {
    pub fn metric(&self) -> &str {
        match self {
            MetricOutcome::Emitted(signal) => &signal.metric,
            MetricOutcome::Skipped { metric, .. } => metric,
        }
    }

    pub fn is_emitted(&self) -> bool {
        matches!(self, MetricOutcome::Emitted(_))
    }
}

/// Outcomes of one cycle, in processing order
#[derive(Debug, Clone, Default)]
pub struct CycleReport {
    /// 1-based cycle number
    pub cycle: u64,
    pub outcomes: Vec<MetricOutcome>,
    /// Cancellation stopped the cycle before every metric was processed
    pub interrupted: bool,
}

impl CycleReport {
    fn new(cycle: u64) -> Self {
        Self {
            cycle,
            ..Default::default()
        }
    }

    /// Signals emitted this cycle
    pub fn emitted(&self) -> impl Iterator<Item = &Signal> {
        self.outcomes.iter().filter_map(|outcome| match outcome {
            MetricOutcome::Emitted(signal) => Some(signal),
            MetricOutcome::Skipped { .. } => None,
        })
    }

    /// Number of skipped metrics
    pub fn skipped(&self) -> usize {
        self.outcomes.iter().filter(|o| !o.is_emitted()).count()
    }
}

/// Totals over a whole run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoopSummary {
    /// Cycles started
    pub cycles: u64,
    /// Cycles abandoned on a cycle-level error
    pub failed_cycles: u64,
    pub emitted: u64,
    pub skipped: u64,
}

impl LoopSummary {
    fn record(&mut self, report: &CycleReport) {
        self.emitted += report.emitted().count() as u64;
        self.skipped += report.skipped() as u64;
    }
}

/// Sample → map → resolve → emit, once per metric per cycle
pub struct PollLoop {
    registry: Arc<Registry>,
    selection: Vec<String>,
    sampler: Box<dyn Sampler>,
    playback: Box<dyn Playback>,
    sinks: Vec<Box<dyn SignalSink>>,
    settings: PollSettings,
    state: LoopState,
    cycle: u64,
}

impl PollLoop {
    /// Create a loop over every registered metric
    pub fn new(
        registry: Arc<Registry>,
        sampler: Box<dyn Sampler>,
        playback: Box<dyn Playback>,
        settings: PollSettings,
    ) -> Self {
        let selection = registry.names();
        Self {
            registry,
            selection,
            sampler,
            playback,
            sinks: Vec::new(),
            settings,
            state: LoopState::Idle,
            cycle: 0,
        }
    }

    /// Restrict the loop to `enabled` metrics (see [`Registry::select`])
    pub fn with_selection<S: AsRef<str>>(mut self, enabled: &[S]) -> Self {
        self.selection = self.registry.select(enabled);
        for name in &self.selection {
            if !self.registry.contains(name) {
                warn!("Metric {} is enabled but not registered", name);
            }
        }
        self
    }

    /// Add a presentation sink
    pub fn with_sink(mut self, sink: Box<dyn SignalSink>) -> Self {
        self.sinks.push(sink);
        self
    }

    pub fn state(&self) -> &LoopState {
        &self.state
    }

    /// Metric names processed each cycle, in order
    pub fn selection(&self) -> &[String] {
        &self.selection
    }

    pub fn settings(&self) -> &PollSettings {
        &self.settings
    }

    fn set_state(&mut self, state: LoopState) {
        trace!("Poll loop state: {:?} -> {:?}", self.state, state);
        self.state = state;
    }

    /// Run one cycle.
    ///
    /// Cancellation is checked before each metric; the metric in flight
    /// always finishes.
    pub async fn run_cycle(&mut self, shutdown: &Shutdown) -> Result<CycleReport, CycleError> {
        self.cycle += 1;
        let mut report = CycleReport::new(self.cycle);
        debug!(
            "Cycle {} starting ({} metrics)",
            self.cycle,
            self.selection.len()
        );

        for position in 0..self.selection.len() {
            if shutdown.is_triggered() {
                report.interrupted = true;
                break;
            }
            let name = self.selection[position].clone();
            let outcome = self.process_metric(&name).await?;
            report.outcomes.push(outcome);
        }

        Ok(report)
    }

    async fn process_metric(&mut self, name: &str) -> Result<MetricOutcome, CycleError> {
        let registry = Arc::clone(&self.registry);
        let definition = match registry.lookup(name) {
            Ok(definition) => definition,
            Err(e) => {
                warn!("Skipping metric {}: {}", name, e);
                return Ok(MetricOutcome::Skipped {
                    metric: name.to_string(),
                    reason: SkipReason::UnknownMetric,
                });
            }
        };

        self.set_state(LoopState::Sampling(name.to_string()));
        let sample = match self
            .sampler
            .sample(definition, &self.settings.namespace)
            .await
        {
            Ok(sample) => sample,
            Err(e) => {
                warn!("Failed to get data for {}: {}", name, e);
                return Ok(MetricOutcome::Skipped {
                    metric: name.to_string(),
                    reason: SkipReason::Sample(e),
                });
            }
        };

        self.set_state(LoopState::Mapping(name.to_string()));
        let index = definition.index_for(sample.value);
        let signal = resolve(definition, index, &sample);

        self.set_state(LoopState::Emitting(name.to_string()));
        if let Err(e) = self
            .playback
            .play(signal.frequency, self.settings.note_duration)
            .await
        {
            error!("Failed to play tone for {}: {}", name, e);
        }
        info!("{}", signal.message);
        for sink in &mut self.sinks {
            sink.write(&signal)?;
        }

        Ok(MetricOutcome::Emitted(signal))
    }

    /// Run cycles until `shutdown` is triggered.
    pub async fn run(&mut self, mut shutdown: Shutdown) -> LoopSummary {
        let mut summary = LoopSummary::default();
        info!(
            "Starting metric sonification: {} metrics every {:?} from {} source, {} playback",
            self.selection.len(),
            self.settings.interval,
            self.sampler.source_name(),
            self.playback.backend_name()
        );

        loop {
            if shutdown.is_triggered() {
                break;
            }

            summary.cycles += 1;
            match self.run_cycle(&shutdown).await {
                Ok(report) => {
                    summary.record(&report);
                    if report.interrupted {
                        break;
                    }
                }
                Err(e) => {
                    summary.failed_cycles += 1;
                    error!("Cycle {} aborted: {}", self.cycle, e);
                }
            }

            self.set_state(LoopState::CycleSleep);
            if shutdown.sleep(self.settings.interval).await {
                break;
            }
        }

        self.set_state(LoopState::Terminated);
        info!(
            "Stopping Sonify after {} cycles ({} signals emitted, {} metrics skipped, {} cycles failed)",
            summary.cycles, summary.emitted, summary.skipped, summary.failed_cycles
        );
        summary
    }
}
