//! Routing envelopes around payloads.
//!
//! An envelope is owned by whichever mailbox or in-flight delivery task it
//! currently sits in, and ends its life either handled or dropped.

use crate::{Address, Interrupt, Message, Timer};
use std::time::Duration;

/// A message together with its sender and destination.
#[derive(Debug, Clone)]
pub struct MessageEnvelope {
    pub message: Message,
    pub from: Address,
    pub to: Address,
}

/// A timer together with its destination and the duration it was armed for.
///
/// `to` is always the address of the node that armed the timer.
#[derive(Debug, Clone)]
pub struct TimerEnvelope {
    pub timer: Timer,
    pub to: Address,
    pub duration: Duration,
}

/// An interrupt together with its sender and destination.
#[derive(Debug, Clone)]
pub struct InterruptEnvelope {
    pub interrupt: Interrupt,
    pub from: Address,
    pub to: Address,
}
