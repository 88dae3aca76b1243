//! Core types for the meshsim simulator.
//!
//! This crate provides the foundational vocabulary shared by the node
//! runtime and the simulation engine:
//!
//! - [`Address`]: hierarchical dotted identifier locating a node or subnode
//! - [`Message`], [`Timer`], [`Interrupt`]: the three payload kinds a node
//!   can receive, each a `(unique id, kind tag, opaque data)` triple
//! - [`MessageEnvelope`], [`TimerEnvelope`], [`InterruptEnvelope`]: routing
//!   wrappers around payloads
//! - [`NodeState`], [`SimulationState`]: lifecycle state enums
//!
//! Everything here is passive data. Scheduling, delivery, and dispatch live
//! in the engine; handler logic lives in node behaviors.

mod address;
mod envelope;
mod interrupt;
mod message;
mod payload;
mod state;
mod timer;

pub use address::Address;
pub use envelope::{InterruptEnvelope, MessageEnvelope, TimerEnvelope};
pub use interrupt::{Interrupt, InterruptKind, SleepFor, INTERRUPT_SLEEP, INTERRUPT_START, INTERRUPT_STOP};
pub use message::{Message, MessageKind};
pub use payload::{PayloadData, PayloadId};
pub use state::{NodeState, SimulationState};
pub use timer::{Timer, TimerKind};
