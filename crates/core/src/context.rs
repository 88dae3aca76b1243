//! The primitive surface handed to behaviors.

use crate::handle::SimulationHandle;
use meshsim_types::{Address, Interrupt, Message, Timer};
use std::time::Duration;

/// Capabilities available to a behavior while one of its handlers runs.
///
/// All primitives are non-blocking and become no-ops once the run is
/// cancelled. Sends are attributed to the handling node's full address, so
/// a subnode's traffic is distinguishable from its parent's in the logs.
pub struct NodeContext<'a> {
    handle: &'a SimulationHandle,
    address: &'a Address,
}

impl<'a> NodeContext<'a> {
    pub(crate) fn new(handle: &'a SimulationHandle, address: &'a Address) -> Self {
        NodeContext { handle, address }
    }

    /// The full address of the node whose handler is running.
    pub fn address(&self) -> &Address {
        self.address
    }

    /// Whether the run has been cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.handle.is_cancelled()
    }

    /// Send `message` to `to`, subject to one independent latency draw.
    pub fn send_message(&self, message: Message, to: &Address) {
        self.handle.send_message(self.address, message, to);
    }

    /// Send a clone of `message` to every address, in input order.
    ///
    /// Not atomic: receivers may observe partial delivery, and independent
    /// latency draws may reorder arrivals.
    pub fn broadcast_message(&self, message: &Message, to: &[Address]) {
        for address in to {
            self.handle.send_message(self.address, message.clone(), address);
        }
    }

    /// Arm `timer` to fire back at this node after `duration`.
    pub fn set_timer(&self, timer: Timer, duration: Duration) {
        self.handle.set_timer(self.address, timer, duration);
    }

    /// Send `interrupt` to `to`, bypassing latency.
    pub fn send_interrupt(&self, interrupt: Interrupt, to: &Address) {
        self.handle.send_interrupt(self.address, interrupt, to);
    }
}
