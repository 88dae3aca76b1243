//! PlantUML sequence-diagram log.

use crate::{EventLog, LogError};
use meshsim_types::{
    Address, InterruptEnvelope, MessageEnvelope, NodeState, SimulationState, TimerEnvelope,
};
use std::fmt::Arguments;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use tracing::warn;

/// Styling directives emitted after `@startuml`.
const PREAMBLE: &[&str] = &[
    "!theme reddress-lightred",
    "skinparam shadowing false",
    "skinparam sequenceArrowThickness 1",
    "skinparam responseMessageBelowArrow true",
    "skinparam sequenceMessageAlign right",
];

/// A sequence-diagram sink in PlantUML syntax.
///
/// Message and interrupt sends become `from -> to : kind` arrows; armed
/// timers become self-arrows on the arming node. The preamble is written
/// when the simulation reports `NotStarted` and the diagram is closed on
/// `Finished`.
pub struct SequenceLog {
    out: Mutex<BufWriter<File>>,
    path: PathBuf,
    failed: AtomicBool,
}

impl SequenceLog {
    /// Create a sequence log writing to `path`, truncating any existing
    /// file.
    pub fn create(path: impl AsRef<Path>) -> Result<Self, LogError> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|source| LogError::Create {
            path: path.to_owned(),
            source,
        })?;
        Ok(SequenceLog {
            out: Mutex::new(BufWriter::new(file)),
            path: path.to_owned(),
            failed: AtomicBool::new(false),
        })
    }

    /// Path the diagram is written to, for the external renderer.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn line(&self, args: Arguments<'_>) {
        if self.failed.load(Ordering::Relaxed) {
            return;
        }
        let mut out = self.out.lock().expect("sequence log poisoned");
        let result = writeln!(out, "{args}").and_then(|_| out.flush());
        if let Err(e) = result {
            if !self.failed.swap(true, Ordering::Relaxed) {
                warn!(error = %e, "sequence log write failed, disabling sink");
            }
        }
    }
}

impl EventLog for SequenceLog {
    fn simulation_state(&self, state: SimulationState) {
        match state {
            SimulationState::NotStarted => {
                self.line(format_args!("@startuml"));
                for directive in PREAMBLE {
                    self.line(format_args!("{directive}"));
                }
            }
            SimulationState::Running => {}
            SimulationState::Finished => self.line(format_args!("@enduml")),
        }
    }

    fn node_state(&self, _address: &Address, _state: NodeState) {}

    fn send_message(&self, e: &MessageEnvelope) {
        self.line(format_args!("{} -> {} : {}", e.from, e.to, e.message.kind()));
    }

    fn handle_message(&self, _e: &MessageEnvelope) {}
    fn drop_message(&self, _e: &MessageEnvelope) {}

    fn set_timer(&self, e: &TimerEnvelope) {
        self.line(format_args!("{} -> {} : {}", e.to, e.to, e.timer.kind()));
    }

    fn handle_timer(&self, _e: &TimerEnvelope) {}
    fn drop_timer(&self, _e: &TimerEnvelope) {}

    fn send_interrupt(&self, e: &InterruptEnvelope) {
        self.line(format_args!(
            "{} -> {} : {}",
            e.from,
            e.to,
            e.interrupt.kind()
        ));
    }

    fn handle_interrupt(&self, _e: &InterruptEnvelope) {}
    fn drop_interrupt(&self, _e: &InterruptEnvelope) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use meshsim_types::{Message, MessageKind, Timer, TimerKind};
    use std::time::Duration;

    #[test]
    fn produces_wellformed_diagram() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.uml");
        let log = SequenceLog::create(&path).unwrap();

        log.simulation_state(SimulationState::NotStarted);
        log.simulation_state(SimulationState::Running);
        log.send_message(&MessageEnvelope {
            message: Message::new(MessageKind("ping.request")),
            from: Address::new("client"),
            to: Address::new("server"),
        });
        log.set_timer(&TimerEnvelope {
            timer: Timer::new(TimerKind("ping.interval")),
            to: Address::new("client"),
            duration: Duration::from_millis(200),
        });
        log.simulation_state(SimulationState::Finished);
        drop(log);

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.first(), Some(&"@startuml"));
        assert_eq!(lines.last(), Some(&"@enduml"));
        assert!(lines.contains(&"client -> server : ping.request"));
        assert!(lines.contains(&"client -> client : ping.interval"));
    }
}
