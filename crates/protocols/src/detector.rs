//! Perfect failure detector: the exclude-on-timeout algorithm.
//!
//! Assumes crash-stop processes and a synchronous system whose message
//! delay is bounded well below the polling timeout. Each polling round
//! broadcasts a heartbeat request to the monitored nodes still considered
//! live; a node silent for a whole round is declared crashed exactly once
//! and announced to every subscriber.

use meshsim_core::{Behavior, NodeContext};
use meshsim_types::{Address, Message, MessageKind, Timer, TimerKind};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::debug;

pub const HEARTBEAT_REQUEST: MessageKind = MessageKind("pfd.heartbeat-request");
pub const HEARTBEAT_REPLY: MessageKind = MessageKind("pfd.heartbeat-reply");
pub const CRASH: MessageKind = MessageKind("pfd.crash");
pub const PFD_POLL: TimerKind = TimerKind("pfd.poll");

/// Payload of a [`CRASH`] announcement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrashNotice {
    pub node: Address,
}

/// Monitors a fixed set of nodes and announces each crash to the
/// subscriber list.
///
/// `timeout` must comfortably exceed one round trip under the simulation's
/// maximum latency, or live nodes will be falsely excluded.
pub struct FailureDetector {
    monitored: Vec<Address>,
    subscribers: Vec<Address>,
    timeout: Duration,
    alive: HashSet<Address>,
    crashed: HashSet<Address>,
    detected: Arc<Mutex<Vec<Address>>>,
}

impl FailureDetector {
    pub fn new(monitored: Vec<Address>, subscribers: Vec<Address>, timeout: Duration) -> Self {
        FailureDetector {
            monitored,
            subscribers,
            timeout,
            alive: HashSet::new(),
            crashed: HashSet::new(),
            detected: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Handle to the crashed nodes in detection order.
    pub fn detected(&self) -> Arc<Mutex<Vec<Address>>> {
        self.detected.clone()
    }

    fn request_heartbeats(&self, ctx: &NodeContext<'_>) {
        let live: Vec<Address> = self
            .monitored
            .iter()
            .filter(|n| !self.crashed.contains(*n))
            .cloned()
            .collect();
        ctx.broadcast_message(&Message::new(HEARTBEAT_REQUEST), &live);
    }
}

impl Behavior for FailureDetector {
    fn init(&mut self, ctx: &NodeContext<'_>) {
        self.request_heartbeats(ctx);
        ctx.set_timer(Timer::new(PFD_POLL), self.timeout);
    }

    fn on_message(&mut self, _ctx: &NodeContext<'_>, message: &Message, from: &Address) -> bool {
        if message.kind() == HEARTBEAT_REPLY {
            self.alive.insert(from.clone());
            true
        } else {
            false
        }
    }

    fn on_timer(&mut self, ctx: &NodeContext<'_>, timer: &Timer, _elapsed: Duration) -> bool {
        if timer.kind() != PFD_POLL {
            return false;
        }
        // Anything silent for the whole round is crashed, announced once,
        // in monitoring-list order within the round.
        for node in &self.monitored {
            if !self.alive.contains(node) && self.crashed.insert(node.clone()) {
                debug!(node = %node, "failure detector excluding node");
                self.detected
                    .lock()
                    .expect("pfd detected list poisoned")
                    .push(node.clone());
                let notice = Message::with_data(CRASH, CrashNotice { node: node.clone() });
                ctx.broadcast_message(&notice, &self.subscribers);
            }
        }
        self.alive.clear();
        self.request_heartbeats(ctx);
        ctx.set_timer(Timer::new(PFD_POLL), self.timeout);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use meshsim_core::{mailbox, Dispatch, Node, SimulationHandle};
    use meshsim_types::TimerEnvelope;
    use std::collections::HashMap;
    use tokio_util::sync::CancellationToken;

    fn detector_node() -> (Node, Arc<Mutex<Vec<Address>>>) {
        let detector = FailureDetector::new(
            vec![Address::new("a"), Address::new("b")],
            vec![Address::new("watcher")],
            Duration::from_millis(100),
        );
        let detected = detector.detected();
        (Node::new(Address::new("pfd"), detector), detected)
    }

    #[tokio::test]
    async fn silent_nodes_excluded_once() {
        let (tx, _rx) = mailbox(8);
        let mut routes = HashMap::new();
        routes.insert(Address::new("pfd"), tx);
        let handle = SimulationHandle::new(
            routes,
            Vec::new(),
            Duration::from_millis(1),
            Duration::from_millis(2),
            CancellationToken::new(),
        );
        let (mut node, detected) = detector_node();

        let poll = TimerEnvelope {
            timer: Timer::new(PFD_POLL),
            to: Address::new("pfd"),
            duration: Duration::from_millis(100),
        };
        // Two rounds with nobody replying: both nodes excluded in the
        // first round, nothing new in the second.
        assert_eq!(node.dispatch_timer(&handle, &poll), Dispatch::Handled);
        assert_eq!(node.dispatch_timer(&handle, &poll), Dispatch::Handled);

        let detected = detected.lock().unwrap();
        assert_eq!(detected.as_slice(), &[Address::new("a"), Address::new("b")]);
    }
}
