//! Event log sinks for the meshsim simulator.
//!
//! The engine reports every lifecycle event (simulation and node state
//! changes, plus send/handle/drop of each envelope kind) to a set of
//! [`EventLog`] sinks. Three sinks are provided:
//!
//! - [`TraceLog`]: a human-readable line-per-event file
//! - [`SequenceLog`]: a PlantUML sequence diagram
//! - [`MemoryLog`]: an in-memory capture used by tests
//!
//! Sinks are shared across worker tasks, so the trait takes `&self` and
//! implementations handle their own interior mutability. A sink that fails
//! mid-run disables itself with a one-time warning rather than failing the
//! simulation.

mod error;
mod memory;
mod render;
mod sequence;
mod trace;

pub use error::LogError;
pub use memory::{LogRecord, LogRecordKind, MemoryLog};
pub use render::render_sequence_diagram;
pub use sequence::SequenceLog;
pub use trace::TraceLog;

use meshsim_types::{
    Address, InterruptEnvelope, MessageEnvelope, NodeState, SimulationState, TimerEnvelope,
};

/// Sink for simulation lifecycle events.
///
/// Called from the engine, from dispatch workers, and from the primitives'
/// delivery tasks; implementations must be `Send + Sync`.
pub trait EventLog: Send + Sync {
    /// The simulation transitioned to `state`.
    fn simulation_state(&self, state: SimulationState);

    /// Node `address` transitioned to `state`.
    fn node_state(&self, address: &Address, state: NodeState);

    fn send_message(&self, envelope: &MessageEnvelope);
    fn handle_message(&self, envelope: &MessageEnvelope);
    fn drop_message(&self, envelope: &MessageEnvelope);

    fn set_timer(&self, envelope: &TimerEnvelope);
    fn handle_timer(&self, envelope: &TimerEnvelope);
    fn drop_timer(&self, envelope: &TimerEnvelope);

    fn send_interrupt(&self, envelope: &InterruptEnvelope);
    fn handle_interrupt(&self, envelope: &InterruptEnvelope);
    fn drop_interrupt(&self, envelope: &InterruptEnvelope);
}
