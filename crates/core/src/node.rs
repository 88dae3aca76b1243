//! Nodes: behaviors with an address, a lifecycle state, and subnodes.

use crate::behavior::Behavior;
use crate::context::NodeContext;
use crate::handle::SimulationHandle;
use meshsim_types::{
    Address, Interrupt, InterruptEnvelope, MessageEnvelope, NodeState, SleepFor, TimerEnvelope,
    INTERRUPT_SLEEP, INTERRUPT_START, INTERRUPT_STOP,
};
use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use thiserror::Error;
use tracing::{debug, error, warn};

/// Errors from subnode registration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum NodeError {
    #[error("subnode with address {0} already registered")]
    DuplicateSubnode(Address),
}

/// Terminal outcome of offering an envelope to a node hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// A node claimed the envelope and its handler recognized it.
    Handled,
    /// A node matched the address but the envelope was dropped: wrong
    /// state, unrecognized kind, or a panicking handler.
    Dropped,
    /// No node in this hierarchy has the envelope's address.
    Unmatched,
}

/// An addressable actor in the simulation.
///
/// Owns its lifecycle state and its subnodes; holds the user's protocol
/// logic as a boxed [`Behavior`]. All dispatch for one root hierarchy runs
/// on that root's worker task, so no locking is needed on node state.
pub struct Node {
    address: Address,
    state: NodeState,
    subnodes: Vec<Node>,
    behavior: Box<dyn Behavior>,
}

impl Node {
    /// Create a node at `address` running `behavior`, initially `Running`.
    pub fn new(address: Address, behavior: impl Behavior + 'static) -> Self {
        Node {
            address,
            state: NodeState::Running,
            subnodes: Vec::new(),
            behavior: Box::new(behavior),
        }
    }

    pub fn address(&self) -> &Address {
        &self.address
    }

    pub fn state(&self) -> NodeState {
        self.state
    }

    pub fn subnodes(&self) -> &[Node] {
        &self.subnodes
    }

    /// Register a subnode. Its address should extend this node's address;
    /// only uniqueness among siblings is enforced.
    pub fn add_subnode(&mut self, node: Node) -> Result<(), NodeError> {
        if self.subnodes.iter().any(|n| n.address == node.address) {
            return Err(NodeError::DuplicateSubnode(node.address));
        }
        self.subnodes.push(node);
        Ok(())
    }

    /// Builder form of [`add_subnode`](Self::add_subnode).
    ///
    /// # Panics
    /// Panics if a subnode with the same address is already registered.
    pub fn with_subnode(mut self, node: Node) -> Self {
        self.add_subnode(node)
            .unwrap_or_else(|e| panic!("{e}"));
        self
    }

    /// Find a node in this hierarchy by full address.
    pub fn find(&self, address: &Address) -> Option<&Node> {
        if &self.address == address {
            return Some(self);
        }
        self.subnodes.iter().find_map(|n| n.find(address))
    }

    // ── Lifecycle ────────────────────────────────────────────────────────

    /// Initialize this node and then its subnodes, depth-first.
    ///
    /// Called exactly once by the engine before the workers start. Each
    /// node's initial state is reported to the log sinks. A panicking init
    /// stops the offending node only; its subnodes still initialize.
    pub fn init(&mut self, handle: &SimulationHandle) {
        debug!(node = %self.address, "init");
        handle.log_node_state(&self.address, self.state);
        let behavior = &mut self.behavior;
        let ctx = NodeContext::new(handle, &self.address);
        if let Err(panic) = catch_unwind(AssertUnwindSafe(|| behavior.init(&ctx))) {
            self.fault(handle, panic);
        }
        for subnode in &mut self.subnodes {
            subnode.init(handle);
        }
    }

    /// Stop this node after a handler fault.
    fn fault(&mut self, handle: &SimulationHandle, panic: Box<dyn Any + Send>) {
        error!(
            node = %self.address,
            reason = panic_message(panic.as_ref()),
            "handler panicked, stopping node"
        );
        if self.state != NodeState::Stopped {
            self.state = NodeState::Stopped;
            handle.log_node_state(&self.address, self.state);
        }
    }

    // ── Dispatch ─────────────────────────────────────────────────────────

    /// Offer a message envelope to this hierarchy.
    ///
    /// Walks depth-first until a node's address matches the envelope's
    /// destination. At the match: a node that is not `Running` drops the
    /// message; otherwise the behavior decides.
    pub fn dispatch_message(
        &mut self,
        handle: &SimulationHandle,
        envelope: &MessageEnvelope,
    ) -> Dispatch {
        if self.address == envelope.to {
            if self.state != NodeState::Running {
                handle.log_drop_message(envelope);
                return Dispatch::Dropped;
            }
            let behavior = &mut self.behavior;
            let ctx = NodeContext::new(handle, &self.address);
            let outcome = catch_unwind(AssertUnwindSafe(|| {
                behavior.on_message(&ctx, &envelope.message, &envelope.from)
            }));
            return match outcome {
                Ok(true) => {
                    handle.log_handle_message(envelope);
                    Dispatch::Handled
                }
                Ok(false) => {
                    handle.log_drop_message(envelope);
                    Dispatch::Dropped
                }
                Err(panic) => {
                    self.fault(handle, panic);
                    handle.log_drop_message(envelope);
                    Dispatch::Dropped
                }
            };
        }
        for subnode in &mut self.subnodes {
            match subnode.dispatch_message(handle, envelope) {
                Dispatch::Unmatched => continue,
                outcome => return outcome,
            }
        }
        Dispatch::Unmatched
    }

    /// Offer a timer envelope to this hierarchy. Same routing and state
    /// gate as messages: only a `Running` node fires its timers.
    pub fn dispatch_timer(
        &mut self,
        handle: &SimulationHandle,
        envelope: &TimerEnvelope,
    ) -> Dispatch {
        if self.address == envelope.to {
            if self.state != NodeState::Running {
                handle.log_drop_timer(envelope);
                return Dispatch::Dropped;
            }
            let behavior = &mut self.behavior;
            let ctx = NodeContext::new(handle, &self.address);
            let outcome = catch_unwind(AssertUnwindSafe(|| {
                behavior.on_timer(&ctx, &envelope.timer, envelope.duration)
            }));
            return match outcome {
                Ok(true) => {
                    handle.log_handle_timer(envelope);
                    Dispatch::Handled
                }
                Ok(false) => {
                    handle.log_drop_timer(envelope);
                    Dispatch::Dropped
                }
                Err(panic) => {
                    self.fault(handle, panic);
                    handle.log_drop_timer(envelope);
                    Dispatch::Dropped
                }
            };
        }
        for subnode in &mut self.subnodes {
            match subnode.dispatch_timer(handle, envelope) {
                Dispatch::Unmatched => continue,
                outcome => return outcome,
            }
        }
        Dispatch::Unmatched
    }

    /// Offer an interrupt envelope to this hierarchy.
    ///
    /// Interrupts reach sleeping nodes (that is how they wake up); only a
    /// stopped node drops them. The built-in kinds are consumed here;
    /// anything else defers to the behavior's interrupt hook.
    pub fn dispatch_interrupt(
        &mut self,
        handle: &SimulationHandle,
        envelope: &InterruptEnvelope,
    ) -> Dispatch {
        if self.address == envelope.to {
            if self.state == NodeState::Stopped {
                handle.log_drop_interrupt(envelope);
                return Dispatch::Dropped;
            }
            return self.apply_interrupt(handle, envelope);
        }
        for subnode in &mut self.subnodes {
            match subnode.dispatch_interrupt(handle, envelope) {
                Dispatch::Unmatched => continue,
                outcome => return outcome,
            }
        }
        Dispatch::Unmatched
    }

    /// Built-in interrupt semantics, then the user hook.
    fn apply_interrupt(
        &mut self,
        handle: &SimulationHandle,
        envelope: &InterruptEnvelope,
    ) -> Dispatch {
        let kind = envelope.interrupt.kind();
        if kind == INTERRUPT_STOP {
            self.state = NodeState::Stopped;
            handle.log_node_state(&self.address, self.state);
            handle.log_handle_interrupt(envelope);
            return Dispatch::Handled;
        }
        if kind == INTERRUPT_SLEEP {
            if self.state != NodeState::Running {
                handle.log_drop_interrupt(envelope);
                return Dispatch::Dropped;
            }
            let Some(&SleepFor(duration)) = envelope.interrupt.payload::<SleepFor>() else {
                warn!(node = %self.address, "sleep interrupt without duration");
                handle.log_drop_interrupt(envelope);
                return Dispatch::Dropped;
            };
            self.state = NodeState::Sleeping;
            handle.log_node_state(&self.address, self.state);
            handle.schedule_interrupt(
                self.address.clone(),
                self.address.clone(),
                Interrupt::start(),
                duration,
            );
            handle.log_handle_interrupt(envelope);
            return Dispatch::Handled;
        }
        if kind == INTERRUPT_START {
            if self.state != NodeState::Sleeping {
                handle.log_drop_interrupt(envelope);
                return Dispatch::Dropped;
            }
            self.state = NodeState::Running;
            handle.log_node_state(&self.address, self.state);
            handle.log_handle_interrupt(envelope);
            return Dispatch::Handled;
        }

        let behavior = &mut self.behavior;
        let ctx = NodeContext::new(handle, &self.address);
        let outcome = catch_unwind(AssertUnwindSafe(|| {
            behavior.on_interrupt(&ctx, &envelope.interrupt, &envelope.from)
        }));
        match outcome {
            Ok(true) => {
                handle.log_handle_interrupt(envelope);
                Dispatch::Handled
            }
            Ok(false) => {
                handle.log_drop_interrupt(envelope);
                Dispatch::Dropped
            }
            Err(panic) => {
                self.fault(handle, panic);
                handle.log_drop_interrupt(envelope);
                Dispatch::Dropped
            }
        }
    }
}

impl std::fmt::Debug for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Node")
            .field("address", &self.address)
            .field("state", &self.state)
            .field("subnodes", &self.subnodes)
            .finish()
    }
}

/// Best-effort extraction of a panic payload's message.
fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s
    } else {
        "non-string panic payload"
    }
}
