//! Run configuration.

use std::path::PathBuf;
use std::time::Duration;

pub(crate) const DEFAULT_MIN_LATENCY: Duration = Duration::from_millis(10);
pub(crate) const DEFAULT_MAX_LATENCY: Duration = Duration::from_millis(100);
pub(crate) const DEFAULT_DURATION: Duration = Duration::from_secs(10);
pub(crate) const DEFAULT_BUFFER_SIZE: usize = 64;

/// Configuration for a simulation run.
///
/// # Mailbox policy
///
/// `buffer_size` bounds each node's message and timer mailboxes. When a
/// mailbox is full, the in-flight delivery task waits for capacity: fast
/// senders are back-pressured against slow receivers and no envelope is
/// lost. Interrupt mailboxes are unbounded so interrupt sends can stay
/// synchronous, which preserves per-sender FIFO ordering.
#[derive(Debug, Clone)]
pub struct SimulationOptions {
    /// Lower bound (inclusive) of the random per-message delay.
    pub min_latency: Duration,
    /// Upper bound (exclusive) of the random per-message delay.
    pub max_latency: Duration,
    /// Wall-clock limit for [`run`](crate::Simulation::run).
    ///
    /// `Duration::ZERO` means unbounded; `run` rejects it, use
    /// [`run_until_cancelled`](crate::Simulation::run_until_cancelled)
    /// with your own token instead.
    pub duration: Duration,
    /// Per-node capacity of the message and timer mailboxes.
    pub buffer_size: usize,
    /// Human-readable trace log path. `None` disables the sink.
    pub trace_path: Option<PathBuf>,
    /// PlantUML sequence-diagram path. `None` disables the sink.
    pub uml_path: Option<PathBuf>,
    /// Java runtime used to invoke the diagram renderer after the run.
    pub renderer_runtime: Option<PathBuf>,
    /// Renderer jar (PlantUML). Rendering needs both paths and a
    /// configured `uml_path`; a renderer failure never fails the run.
    pub renderer_jar: Option<PathBuf>,
}

impl SimulationOptions {
    /// Set the latency window `[min, max)` applied to every message.
    pub fn with_latency(mut self, min: Duration, max: Duration) -> Self {
        self.min_latency = min;
        self.max_latency = max;
        self
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    pub fn with_buffer_size(mut self, buffer_size: usize) -> Self {
        self.buffer_size = buffer_size;
        self
    }

    pub fn with_trace_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.trace_path = Some(path.into());
        self
    }

    pub fn with_uml_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.uml_path = Some(path.into());
        self
    }

    pub fn with_renderer(mut self, runtime: impl Into<PathBuf>, jar: impl Into<PathBuf>) -> Self {
        self.renderer_runtime = Some(runtime.into());
        self.renderer_jar = Some(jar.into());
        self
    }

    /// Check internal consistency. Called at the start of a run.
    pub(crate) fn validate(&self) -> Result<(), String> {
        if self.max_latency < self.min_latency {
            return Err(format!(
                "max_latency ({:?}) must be >= min_latency ({:?})",
                self.max_latency, self.min_latency
            ));
        }
        if self.buffer_size == 0 {
            return Err("buffer_size must be at least 1".to_owned());
        }
        Ok(())
    }
}

impl Default for SimulationOptions {
    fn default() -> Self {
        SimulationOptions {
            min_latency: DEFAULT_MIN_LATENCY,
            max_latency: DEFAULT_MAX_LATENCY,
            duration: DEFAULT_DURATION,
            buffer_size: DEFAULT_BUFFER_SIZE,
            trace_path: None,
            uml_path: None,
            renderer_runtime: None,
            renderer_jar: None,
        }
    }
}
