//! A crash-stop process with a configured lifetime.

use crate::detector::{CrashNotice, CRASH, HEARTBEAT_REPLY, HEARTBEAT_REQUEST};
use crate::election::{LeaderNotice, LEADER};
use meshsim_core::{Behavior, NodeContext};
use meshsim_types::{Address, Interrupt, Message, Timer, TimerKind};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const LIFETIME: TimerKind = TimerKind("faulty.lifetime");

/// Answers heartbeats and records crash/leader announcements until its
/// lifetime elapses, then stops itself with a Stop interrupt.
pub struct FaultyProcess {
    lifetime: Duration,
    crashes_seen: Arc<Mutex<Vec<Address>>>,
    leaders_seen: Arc<Mutex<Vec<Address>>>,
}

impl FaultyProcess {
    pub fn new(lifetime: Duration) -> Self {
        FaultyProcess {
            lifetime,
            crashes_seen: Arc::new(Mutex::new(Vec::new())),
            leaders_seen: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Handle to the crash announcements this node received before it
    /// stopped.
    pub fn crashes_seen(&self) -> Arc<Mutex<Vec<Address>>> {
        self.crashes_seen.clone()
    }

    /// Handle to the leader announcements this node received before it
    /// stopped.
    pub fn leaders_seen(&self) -> Arc<Mutex<Vec<Address>>> {
        self.leaders_seen.clone()
    }
}

impl Behavior for FaultyProcess {
    fn init(&mut self, ctx: &NodeContext<'_>) {
        ctx.set_timer(Timer::new(LIFETIME), self.lifetime);
    }

    fn on_message(&mut self, ctx: &NodeContext<'_>, message: &Message, from: &Address) -> bool {
        if message.kind() == HEARTBEAT_REQUEST {
            ctx.send_message(Message::new(HEARTBEAT_REPLY), from);
            true
        } else if message.kind() == CRASH {
            if let Some(CrashNotice { node }) = message.payload::<CrashNotice>() {
                self.crashes_seen
                    .lock()
                    .expect("crashes seen poisoned")
                    .push(node.clone());
            }
            true
        } else if message.kind() == LEADER {
            if let Some(LeaderNotice { node }) = message.payload::<LeaderNotice>() {
                self.leaders_seen
                    .lock()
                    .expect("leaders seen poisoned")
                    .push(node.clone());
            }
            true
        } else {
            false
        }
    }

    fn on_timer(&mut self, ctx: &NodeContext<'_>, timer: &Timer, _elapsed: Duration) -> bool {
        if timer.kind() == LIFETIME {
            ctx.send_interrupt(Interrupt::stop(), ctx.address());
            true
        } else {
            false
        }
    }
}
