//! In-memory event capture for tests.

use crate::EventLog;
use meshsim_types::{
    Address, InterruptEnvelope, MessageEnvelope, NodeState, PayloadId, SimulationState,
    TimerEnvelope,
};
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// One captured event.
#[derive(Debug, Clone)]
pub enum LogRecordKind {
    SimulationState(SimulationState),
    NodeState(Address, NodeState),
    SendMessage(MessageEnvelope),
    HandleMessage(MessageEnvelope),
    DropMessage(MessageEnvelope),
    SetTimer(TimerEnvelope),
    HandleTimer(TimerEnvelope),
    DropTimer(TimerEnvelope),
    SendInterrupt(InterruptEnvelope),
    HandleInterrupt(InterruptEnvelope),
    DropInterrupt(InterruptEnvelope),
}

/// A captured event together with its offset from sink creation.
#[derive(Debug, Clone)]
pub struct LogRecord {
    pub at: Duration,
    pub kind: LogRecordKind,
}

/// An [`EventLog`] that records every event in memory.
///
/// The assertion surface for integration tests: run a simulation with a
/// `MemoryLog` attached, then query the captured records.
#[derive(Debug)]
pub struct MemoryLog {
    started: Instant,
    records: Mutex<Vec<LogRecord>>,
}

impl MemoryLog {
    pub fn new() -> Self {
        MemoryLog {
            started: Instant::now(),
            records: Mutex::new(Vec::new()),
        }
    }

    fn push(&self, kind: LogRecordKind) {
        let at = self.started.elapsed();
        self.records
            .lock()
            .expect("memory log poisoned")
            .push(LogRecord { at, kind });
    }

    /// All captured records, in capture order.
    pub fn records(&self) -> Vec<LogRecord> {
        self.records.lock().expect("memory log poisoned").clone()
    }

    /// Capture offsets of `HandleMessage` events delivered to `node` (by
    /// full destination address).
    pub fn message_handles_for(&self, node: &Address) -> Vec<Duration> {
        self.records()
            .into_iter()
            .filter_map(|r| match r.kind {
                LogRecordKind::HandleMessage(ref e) if &e.to == node => Some(r.at),
                _ => None,
            })
            .collect()
    }

    /// Ids of interrupts handled at `node`, in handling order.
    pub fn interrupt_handles_for(&self, node: &Address) -> Vec<PayloadId> {
        self.records()
            .into_iter()
            .filter_map(|r| match r.kind {
                LogRecordKind::HandleInterrupt(ref e) if &e.to == node => Some(e.interrupt.id()),
                _ => None,
            })
            .collect()
    }

    /// Offset at which the interrupt with `id` was handled, if it was.
    pub fn interrupt_handled_at(&self, id: PayloadId) -> Option<Duration> {
        self.records().into_iter().find_map(|r| match r.kind {
            LogRecordKind::HandleInterrupt(ref e) if e.interrupt.id() == id => Some(r.at),
            _ => None,
        })
    }

    /// Send/handle offsets for the message with `id`, when both exist.
    pub fn message_flight(&self, id: PayloadId) -> Option<(Duration, Duration)> {
        let records = self.records();
        let sent = records.iter().find_map(|r| match r.kind {
            LogRecordKind::SendMessage(ref e) if e.message.id() == id => Some(r.at),
            _ => None,
        })?;
        let handled = records.iter().find_map(|r| match r.kind {
            LogRecordKind::HandleMessage(ref e) if e.message.id() == id => Some(r.at),
            _ => None,
        })?;
        Some((sent, handled))
    }

    /// Count of records matching a predicate.
    pub fn count(&self, mut predicate: impl FnMut(&LogRecordKind) -> bool) -> usize {
        self.records()
            .iter()
            .filter(|r| predicate(&r.kind))
            .count()
    }

    /// The state-transition walk observed for `node`.
    pub fn node_states(&self, node: &Address) -> Vec<NodeState> {
        self.records()
            .into_iter()
            .filter_map(|r| match r.kind {
                LogRecordKind::NodeState(ref addr, state) if addr == node => Some(state),
                _ => None,
            })
            .collect()
    }
}

impl Default for MemoryLog {
    fn default() -> Self {
        Self::new()
    }
}

impl EventLog for MemoryLog {
    fn simulation_state(&self, state: SimulationState) {
        self.push(LogRecordKind::SimulationState(state));
    }

    fn node_state(&self, address: &Address, state: NodeState) {
        self.push(LogRecordKind::NodeState(address.clone(), state));
    }

    fn send_message(&self, e: &MessageEnvelope) {
        self.push(LogRecordKind::SendMessage(e.clone()));
    }

    fn handle_message(&self, e: &MessageEnvelope) {
        self.push(LogRecordKind::HandleMessage(e.clone()));
    }

    fn drop_message(&self, e: &MessageEnvelope) {
        self.push(LogRecordKind::DropMessage(e.clone()));
    }

    fn set_timer(&self, e: &TimerEnvelope) {
        self.push(LogRecordKind::SetTimer(e.clone()));
    }

    fn handle_timer(&self, e: &TimerEnvelope) {
        self.push(LogRecordKind::HandleTimer(e.clone()));
    }

    fn drop_timer(&self, e: &TimerEnvelope) {
        self.push(LogRecordKind::DropTimer(e.clone()));
    }

    fn send_interrupt(&self, e: &InterruptEnvelope) {
        self.push(LogRecordKind::SendInterrupt(e.clone()));
    }

    fn handle_interrupt(&self, e: &InterruptEnvelope) {
        self.push(LogRecordKind::HandleInterrupt(e.clone()));
    }

    fn drop_interrupt(&self, e: &InterruptEnvelope) {
        self.push(LogRecordKind::DropInterrupt(e.clone()));
    }
}
