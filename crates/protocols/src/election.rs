//! Monarchical leader election over a perfect failure detector.
//!
//! Rank is position in the configured node list; the lowest-ranked live
//! node is leader. Crash notifications come from a [`FailureDetector`]
//! running as a subnode of the election node, the layered composition the
//! runtime's subnode routing exists for.

use crate::detector::{FailureDetector, CrashNotice, CRASH, HEARTBEAT_REPLY, HEARTBEAT_REQUEST};
use meshsim_core::{Behavior, Node, NodeContext};
use meshsim_types::{Address, Message, MessageKind, Timer};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::debug;

pub const LEADER: MessageKind = MessageKind("le.leader");

/// Payload of a [`LEADER`] announcement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaderNotice {
    pub node: Address,
}

/// Crash-stop leader election: on the leader's crash, promote the
/// lowest-ranked live node and announce it to every live node.
pub struct MonarchicalElection {
    ranked: Vec<Address>,
    crashed: HashSet<Address>,
    leader: Option<Address>,
    elected: Arc<Mutex<Vec<Address>>>,
}

impl MonarchicalElection {
    pub fn new(ranked: Vec<Address>) -> Self {
        MonarchicalElection {
            ranked,
            crashed: HashSet::new(),
            leader: None,
            elected: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Handle to the sequence of leaders elected after crashes (the
    /// initial leader is not recorded).
    pub fn elected(&self) -> Arc<Mutex<Vec<Address>>> {
        self.elected.clone()
    }

    /// Assemble the election node at `address` with its failure-detector
    /// subnode monitoring the ranked nodes.
    pub fn into_node(self, address: Address, timeout: Duration) -> Node {
        let detector =
            FailureDetector::new(self.ranked.clone(), vec![address.clone()], timeout);
        Node::new(address.clone(), self)
            .with_subnode(Node::new(address.child("pfd"), detector))
    }

    fn lowest_ranked_live(&self) -> Option<&Address> {
        self.ranked.iter().find(|n| !self.crashed.contains(*n))
    }
}

impl Behavior for MonarchicalElection {
    fn init(&mut self, _ctx: &NodeContext<'_>) {
        self.leader = self.ranked.first().cloned();
    }

    fn on_message(&mut self, ctx: &NodeContext<'_>, message: &Message, from: &Address) -> bool {
        if message.kind() == CRASH {
            let Some(CrashNotice { node }) = message.payload::<CrashNotice>() else {
                return false;
            };
            self.crashed.insert(node.clone());
            if self.leader.as_ref() != Some(node) {
                return true;
            }
            match self.lowest_ranked_live().cloned() {
                Some(next) => {
                    debug!(leader = %next, "electing new leader");
                    self.leader = Some(next.clone());
                    self.elected
                        .lock()
                        .expect("election list poisoned")
                        .push(next.clone());
                    let notice =
                        Message::with_data(LEADER, LeaderNotice { node: next });
                    let live: Vec<Address> = self
                        .ranked
                        .iter()
                        .filter(|n| !self.crashed.contains(*n))
                        .cloned()
                        .collect();
                    ctx.broadcast_message(&notice, &live);
                }
                None => {
                    debug!("all ranked nodes crashed, no leader");
                    self.leader = None;
                }
            }
            true
        } else if message.kind() == HEARTBEAT_REQUEST {
            // The election node may itself be monitored by other detectors.
            ctx.send_message(Message::new(HEARTBEAT_REPLY), from);
            true
        } else {
            false
        }
    }

    fn on_timer(&mut self, _ctx: &NodeContext<'_>, _timer: &Timer, _elapsed: Duration) -> bool {
        false
    }
}
