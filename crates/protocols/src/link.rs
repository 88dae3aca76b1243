//! Perfect point-to-point links.
//!
//! The runtime's own `send_message` already behaves as a perfect link, so
//! this relay exists as the canonical example of layering one abstraction
//! on another: clients hand it a [`Forward`] request and get a
//! [`PL_DELIVER`] acknowledgement back.

use meshsim_core::{Behavior, NodeContext};
use meshsim_types::{Address, Message, MessageKind, PayloadId, Timer};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const PL_SEND: MessageKind = MessageKind("pl.send");
pub const PL_DELIVER: MessageKind = MessageKind("pl.deliver");

/// Payload of a [`PL_SEND`] request.
#[derive(Clone)]
pub struct Forward {
    pub destination: Address,
    pub message: Message,
}

/// Payload of a [`PL_DELIVER`] acknowledgement.
#[derive(Clone)]
pub struct Delivery {
    pub message: Message,
}

/// Forwards each request's inner message to its destination exactly once
/// and acknowledges the requester.
pub struct PlRelay {
    forwarded: Arc<Mutex<HashSet<PayloadId>>>,
}

impl PlRelay {
    pub fn new() -> Self {
        PlRelay {
            forwarded: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// Handle to the ids of requests this relay has forwarded.
    pub fn forwarded(&self) -> Arc<Mutex<HashSet<PayloadId>>> {
        self.forwarded.clone()
    }
}

impl Default for PlRelay {
    fn default() -> Self {
        Self::new()
    }
}

impl Behavior for PlRelay {
    fn init(&mut self, _ctx: &NodeContext<'_>) {}

    fn on_message(&mut self, ctx: &NodeContext<'_>, message: &Message, from: &Address) -> bool {
        if message.kind() != PL_SEND {
            return false;
        }
        let Some(forward) = message.payload::<Forward>() else {
            return false;
        };
        let fresh = self
            .forwarded
            .lock()
            .expect("pl forwarded set poisoned")
            .insert(message.id());
        if fresh {
            ctx.send_message(forward.message.clone(), &forward.destination);
            ctx.send_message(
                Message::with_data(
                    PL_DELIVER,
                    Delivery {
                        message: forward.message.clone(),
                    },
                ),
                from,
            );
        }
        true
    }

    fn on_timer(&mut self, _ctx: &NodeContext<'_>, _timer: &Timer, _elapsed: Duration) -> bool {
        false
    }
}
