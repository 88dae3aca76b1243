//! Best-effort broadcast: the basic-broadcast algorithm.
//!
//! A [`BebRelay`] fans a requested message out to every configured peer in
//! one round of point-to-point sends. No reliability assumption: if the
//! relay crashes mid-broadcast, some peers deliver and some do not.

use meshsim_core::{Behavior, NodeContext};
use meshsim_types::{Address, Message, MessageKind, PayloadId, Timer, TimerKind};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const BEB_BROADCAST: MessageKind = MessageKind("beb.broadcast");
pub const HELLO: MessageKind = MessageKind("hello.greeting");
pub const HELLO_DELAY: TimerKind = TimerKind("hello.delay");

/// Payload of a [`BEB_BROADCAST`] request: the message to fan out.
#[derive(Clone)]
pub struct BroadcastRequest {
    pub message: Message,
}

/// Payload of a [`HELLO`] greeting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Greeting(pub String);

/// Fans each broadcast request out to its peer list. Any other message
/// kind is treated as a delivery to the relay itself and recorded.
pub struct BebRelay {
    peers: Vec<Address>,
    delivered: Arc<Mutex<HashSet<PayloadId>>>,
}

impl BebRelay {
    pub fn new(peers: Vec<Address>) -> Self {
        BebRelay {
            peers,
            delivered: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// Handle to the ids of non-broadcast messages delivered to the relay.
    pub fn delivered(&self) -> Arc<Mutex<HashSet<PayloadId>>> {
        self.delivered.clone()
    }
}

impl Behavior for BebRelay {
    fn init(&mut self, _ctx: &NodeContext<'_>) {}

    fn on_message(&mut self, ctx: &NodeContext<'_>, message: &Message, _from: &Address) -> bool {
        if message.kind() == BEB_BROADCAST {
            let Some(request) = message.payload::<BroadcastRequest>() else {
                return false;
            };
            // The inner message keeps its id across the fan-out, so every
            // receiver records the same id for the same broadcast.
            ctx.broadcast_message(&request.message, &self.peers);
            true
        } else {
            self.delivered
                .lock()
                .expect("beb delivered set poisoned")
                .insert(message.id());
            true
        }
    }

    fn on_timer(&mut self, _ctx: &NodeContext<'_>, _timer: &Timer, _elapsed: Duration) -> bool {
        false
    }
}

/// Requests one hello broadcast through a [`BebRelay`] after an initial
/// delay, and records every hello it receives from anyone.
pub struct HelloSender {
    relay: Address,
    delay: Duration,
    sent: Arc<Mutex<Vec<PayloadId>>>,
    received: Arc<Mutex<HashSet<PayloadId>>>,
}

impl HelloSender {
    pub fn new(relay: Address, delay: Duration) -> Self {
        HelloSender {
            relay,
            delay,
            sent: Arc::new(Mutex::new(Vec::new())),
            received: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// Handle to the ids of greetings this node has broadcast.
    pub fn sent(&self) -> Arc<Mutex<Vec<PayloadId>>> {
        self.sent.clone()
    }

    /// Handle to the ids of greetings delivered to this node.
    pub fn received(&self) -> Arc<Mutex<HashSet<PayloadId>>> {
        self.received.clone()
    }
}

impl Behavior for HelloSender {
    fn init(&mut self, ctx: &NodeContext<'_>) {
        ctx.set_timer(Timer::new(HELLO_DELAY), self.delay);
    }

    fn on_message(&mut self, _ctx: &NodeContext<'_>, message: &Message, _from: &Address) -> bool {
        if message.kind() == HELLO {
            self.received
                .lock()
                .expect("hello received set poisoned")
                .insert(message.id());
            true
        } else {
            false
        }
    }

    fn on_timer(&mut self, ctx: &NodeContext<'_>, timer: &Timer, _elapsed: Duration) -> bool {
        if timer.kind() == HELLO_DELAY {
            let hello = Message::with_data(
                HELLO,
                Greeting(format!("hello from {}", ctx.address())),
            );
            self.sent
                .lock()
                .expect("hello sent list poisoned")
                .push(hello.id());
            ctx.send_message(
                Message::with_data(BEB_BROADCAST, BroadcastRequest { message: hello }),
                &self.relay,
            );
            true
        } else {
            false
        }
    }
}
