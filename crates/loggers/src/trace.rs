//! Human-readable trace log.

use crate::{EventLog, LogError};
use meshsim_types::{
    Address, InterruptEnvelope, MessageEnvelope, NodeState, SimulationState, TimerEnvelope,
};
use std::fmt::Arguments;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::Instant;
use tracing::warn;

/// A line-per-event text log.
///
/// Each line is prefixed with the elapsed time since the sink was created,
/// in seconds with microsecond resolution:
///
/// ```text
/// [   0.000213] SimulationState(Running)
/// [   0.204811] SendMessage(client -> server, ping.request#17)
/// ```
///
/// Writes that fail disable the sink for the rest of the run with a single
/// warning.
pub struct TraceLog {
    out: Mutex<BufWriter<File>>,
    started: Instant,
    failed: AtomicBool,
}

impl TraceLog {
    /// Create a trace log writing to `path`, truncating any existing file.
    pub fn create(path: impl AsRef<Path>) -> Result<Self, LogError> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|source| LogError::Create {
            path: path.to_owned(),
            source,
        })?;
        Ok(TraceLog {
            out: Mutex::new(BufWriter::new(file)),
            started: Instant::now(),
            failed: AtomicBool::new(false),
        })
    }

    fn line(&self, args: Arguments<'_>) {
        if self.failed.load(Ordering::Relaxed) {
            return;
        }
        let elapsed = self.started.elapsed();
        let mut out = self.out.lock().expect("trace log poisoned");
        let result = writeln!(
            out,
            "[{:>4}.{:06}] {}",
            elapsed.as_secs(),
            elapsed.subsec_micros(),
            args
        )
        .and_then(|_| out.flush());
        if let Err(e) = result {
            if !self.failed.swap(true, Ordering::Relaxed) {
                warn!(error = %e, "trace log write failed, disabling sink");
            }
        }
    }
}

impl EventLog for TraceLog {
    fn simulation_state(&self, state: SimulationState) {
        self.line(format_args!("SimulationState({state})"));
    }

    fn node_state(&self, address: &Address, state: NodeState) {
        self.line(format_args!("NodeState({address}, {state})"));
    }

    fn send_message(&self, e: &MessageEnvelope) {
        self.line(format_args!(
            "SendMessage({} -> {}, {})",
            e.from, e.to, e.message
        ));
    }

    fn handle_message(&self, e: &MessageEnvelope) {
        self.line(format_args!(
            "HandleMessage({} -> {}, {})",
            e.from, e.to, e.message
        ));
    }

    fn drop_message(&self, e: &MessageEnvelope) {
        self.line(format_args!(
            "DropMessage({} -> {}, {})",
            e.from, e.to, e.message
        ));
    }

    fn set_timer(&self, e: &TimerEnvelope) {
        self.line(format_args!(
            "SetTimer({}, {}, {:?})",
            e.to, e.timer, e.duration
        ));
    }

    fn handle_timer(&self, e: &TimerEnvelope) {
        self.line(format_args!(
            "HandleTimer({}, {}, {:?})",
            e.to, e.timer, e.duration
        ));
    }

    fn drop_timer(&self, e: &TimerEnvelope) {
        self.line(format_args!(
            "DropTimer({}, {}, {:?})",
            e.to, e.timer, e.duration
        ));
    }

    fn send_interrupt(&self, e: &InterruptEnvelope) {
        self.line(format_args!(
            "SendInterrupt({} -> {}, {})",
            e.from, e.to, e.interrupt
        ));
    }

    fn handle_interrupt(&self, e: &InterruptEnvelope) {
        self.line(format_args!(
            "HandleInterrupt({} -> {}, {})",
            e.from, e.to, e.interrupt
        ));
    }

    fn drop_interrupt(&self, e: &InterruptEnvelope) {
        self.line(format_args!(
            "DropInterrupt({} -> {}, {})",
            e.from, e.to, e.interrupt
        ));
    }
}
