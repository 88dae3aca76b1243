//! Echo: a server that reflects every payload back to its sender.

use meshsim_core::{Behavior, NodeContext};
use meshsim_types::{Address, Message, MessageKind, Timer, TimerKind};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

pub const ECHO: MessageKind = MessageKind("echo.payload");
pub const ECHO_TICK: TimerKind = TimerKind("echo.tick");

/// Reflects every [`ECHO`] message back to whoever sent it.
pub struct EchoServer {
    echoed: Arc<AtomicU64>,
}

impl EchoServer {
    pub fn new() -> Self {
        EchoServer {
            echoed: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Handle to the count of messages echoed so far.
    pub fn echoed(&self) -> Arc<AtomicU64> {
        self.echoed.clone()
    }
}

impl Default for EchoServer {
    fn default() -> Self {
        Self::new()
    }
}

impl Behavior for EchoServer {
    fn init(&mut self, _ctx: &NodeContext<'_>) {}

    fn on_message(&mut self, ctx: &NodeContext<'_>, message: &Message, from: &Address) -> bool {
        if message.kind() == ECHO {
            self.echoed.fetch_add(1, Ordering::Relaxed);
            // The reflected copy keeps the original payload id, so logs
            // show the same message travelling both directions.
            ctx.send_message(message.clone(), from);
            true
        } else {
            false
        }
    }

    fn on_timer(&mut self, _ctx: &NodeContext<'_>, _timer: &Timer, _elapsed: Duration) -> bool {
        false
    }
}

/// Sends an [`ECHO`] payload to `server` on an interval and counts the
/// reflections that come back.
pub struct EchoClient {
    server: Address,
    interval: Duration,
    reflected: Arc<AtomicU64>,
}

impl EchoClient {
    pub fn new(server: Address, interval: Duration) -> Self {
        EchoClient {
            server,
            interval,
            reflected: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Handle to the count of reflections received so far.
    pub fn reflected(&self) -> Arc<AtomicU64> {
        self.reflected.clone()
    }
}

impl Behavior for EchoClient {
    fn init(&mut self, ctx: &NodeContext<'_>) {
        ctx.set_timer(Timer::new(ECHO_TICK), self.interval);
    }

    fn on_message(&mut self, _ctx: &NodeContext<'_>, message: &Message, _from: &Address) -> bool {
        if message.kind() == ECHO {
            self.reflected.fetch_add(1, Ordering::Relaxed);
            true
        } else {
            false
        }
    }

    fn on_timer(&mut self, ctx: &NodeContext<'_>, timer: &Timer, _elapsed: Duration) -> bool {
        if timer.kind() == ECHO_TICK {
            ctx.send_message(
                Message::with_data(ECHO, format!("hello from {}", ctx.address())),
                &self.server,
            );
            ctx.set_timer(Timer::new(ECHO_TICK), self.interval);
            true
        } else {
            false
        }
    }
}
