//! Ping/pong: a client pings a server on a re-arming interval timer.

use meshsim_core::{Behavior, NodeContext};
use meshsim_types::{Address, Message, MessageKind, Timer, TimerKind};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

pub const PING: MessageKind = MessageKind("ping.request");
pub const PONG: MessageKind = MessageKind("ping.reply");
pub const PING_INTERVAL: TimerKind = TimerKind("ping.interval");

/// Sends a ping to `server` every `interval` and counts the pongs that
/// come back. The interval timer re-arms itself on every fire.
pub struct PingClient {
    server: Address,
    interval: Duration,
    pings_sent: Arc<AtomicU64>,
    pongs: Arc<AtomicU64>,
}

impl PingClient {
    pub fn new(server: Address, interval: Duration) -> Self {
        PingClient {
            server,
            interval,
            pings_sent: Arc::new(AtomicU64::new(0)),
            pongs: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Handle to the count of pings sent so far.
    pub fn pings_sent(&self) -> Arc<AtomicU64> {
        self.pings_sent.clone()
    }

    /// Handle to the count of pongs received so far.
    pub fn pongs(&self) -> Arc<AtomicU64> {
        self.pongs.clone()
    }
}

impl Behavior for PingClient {
    fn init(&mut self, ctx: &NodeContext<'_>) {
        ctx.set_timer(Timer::new(PING_INTERVAL), self.interval);
    }

    fn on_message(&mut self, _ctx: &NodeContext<'_>, message: &Message, _from: &Address) -> bool {
        if message.kind() == PONG {
            self.pongs.fetch_add(1, Ordering::Relaxed);
            true
        } else {
            false
        }
    }

    fn on_timer(&mut self, ctx: &NodeContext<'_>, timer: &Timer, _elapsed: Duration) -> bool {
        if timer.kind() == PING_INTERVAL {
            ctx.send_message(Message::new(PING), &self.server);
            self.pings_sent.fetch_add(1, Ordering::Relaxed);
            ctx.set_timer(Timer::new(PING_INTERVAL), self.interval);
            true
        } else {
            false
        }
    }
}

/// Replies to every ping with a pong and counts the pings it saw.
pub struct PingServer {
    pings: Arc<AtomicU64>,
}

impl PingServer {
    pub fn new() -> Self {
        PingServer {
            pings: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Handle to the count of pings handled so far.
    pub fn pings(&self) -> Arc<AtomicU64> {
        self.pings.clone()
    }
}

impl Default for PingServer {
    fn default() -> Self {
        Self::new()
    }
}

impl Behavior for PingServer {
    fn init(&mut self, _ctx: &NodeContext<'_>) {}

    fn on_message(&mut self, ctx: &NodeContext<'_>, message: &Message, from: &Address) -> bool {
        if message.kind() == PING {
            self.pings.fetch_add(1, Ordering::Relaxed);
            ctx.send_message(Message::new(PONG), from);
            true
        } else {
            false
        }
    }

    fn on_timer(&mut self, _ctx: &NodeContext<'_>, _timer: &Timer, _elapsed: Duration) -> bool {
        false
    }
}
