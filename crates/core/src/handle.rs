//! The node runtime's entry point back into the engine.
//!
//! A [`SimulationHandle`] bundles everything a primitive needs: the
//! per-root-node mailbox senders, the latency window, the registered log
//! sinks, the run's cancellation token, and the event counters. Nodes hold
//! it by reference through their [`NodeContext`](crate::NodeContext); delay
//! tasks hold cheap clones.

use crate::stats::{RunCounters, SimulationStats};
use meshsim_loggers::EventLog;
use meshsim_types::{
    Address, Interrupt, InterruptEnvelope, Message, MessageEnvelope, NodeState, SimulationState,
    Timer, TimerEnvelope,
};
use rand::Rng;
use std::collections::HashMap;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::trace;

/// Sender side of one root node's three mailboxes.
///
/// Message and timer mailboxes are bounded; a full mailbox back-pressures
/// the in-flight delivery task, never the sending handler, and never loses
/// an envelope. The interrupt mailbox is unbounded so interrupt sends stay
/// synchronous, which is what preserves per-sender FIFO ordering.
#[derive(Debug, Clone)]
pub struct Mailbox {
    pub messages: mpsc::Sender<MessageEnvelope>,
    pub timers: mpsc::Sender<TimerEnvelope>,
    pub interrupts: mpsc::UnboundedSender<InterruptEnvelope>,
}

/// Receiver side of one root node's mailboxes, consumed by its worker.
#[derive(Debug)]
pub struct MailboxReceivers {
    pub messages: mpsc::Receiver<MessageEnvelope>,
    pub timers: mpsc::Receiver<TimerEnvelope>,
    pub interrupts: mpsc::UnboundedReceiver<InterruptEnvelope>,
}

/// Create a mailbox pair with the given message/timer capacity.
pub fn mailbox(buffer: usize) -> (Mailbox, MailboxReceivers) {
    let (message_tx, message_rx) = mpsc::channel(buffer);
    let (timer_tx, timer_rx) = mpsc::channel(buffer);
    let (interrupt_tx, interrupt_rx) = mpsc::unbounded_channel();
    (
        Mailbox {
            messages: message_tx,
            timers: timer_tx,
            interrupts: interrupt_tx,
        },
        MailboxReceivers {
            messages: message_rx,
            timers: timer_rx,
            interrupts: interrupt_rx,
        },
    )
}

struct HandleInner {
    /// Root address → that hierarchy's mailbox senders.
    routes: HashMap<Address, Mailbox>,
    loggers: Vec<Arc<dyn EventLog>>,
    min_latency: Duration,
    max_latency: Duration,
    cancel: CancellationToken,
    counters: RunCounters,
}

/// Shared entry point from node primitives back into the engine.
#[derive(Clone)]
pub struct SimulationHandle {
    inner: Arc<HandleInner>,
}

impl SimulationHandle {
    pub fn new(
        routes: HashMap<Address, Mailbox>,
        loggers: Vec<Arc<dyn EventLog>>,
        min_latency: Duration,
        max_latency: Duration,
        cancel: CancellationToken,
    ) -> Self {
        SimulationHandle {
            inner: Arc::new(HandleInner {
                routes,
                loggers,
                min_latency,
                max_latency,
                cancel,
                counters: RunCounters::default(),
            }),
        }
    }

    /// Whether the run's deadline has fired. Primitives become no-ops once
    /// this is true.
    pub fn is_cancelled(&self) -> bool {
        self.inner.cancel.is_cancelled()
    }

    pub fn stats(&self) -> SimulationStats {
        self.inner.counters.snapshot()
    }

    /// One independent uniform draw from `[min_latency, max_latency)`.
    fn random_latency(&self) -> Duration {
        let (min, max) = (self.inner.min_latency, self.inner.max_latency);
        if max <= min {
            return min;
        }
        let window = (max - min).as_nanos() as u64;
        min + Duration::from_nanos(rand::thread_rng().gen_range(0..window))
    }

    // ── Primitives ───────────────────────────────────────────────────────

    /// Send `message` from `from` to `to`, subject to latency.
    ///
    /// Local (same root) and remote sends take the identical path: a
    /// spawned delivery task sleeps one latency draw, then enqueues on the
    /// destination root's message mailbox. A destination whose root is not
    /// registered is dropped immediately.
    pub fn send_message(&self, from: &Address, message: Message, to: &Address) {
        if self.is_cancelled() {
            trace!(from = %from, to = %to, "send_message after cancellation, ignoring");
            return;
        }
        let envelope = MessageEnvelope {
            message,
            from: from.clone(),
            to: to.clone(),
        };
        self.log_send_message(&envelope);
        let Some(route) = self.inner.routes.get(&envelope.to.root()) else {
            self.log_drop_message(&envelope);
            return;
        };
        let tx = route.messages.clone();
        let delay = self.random_latency();
        let cancel = self.inner.cancel.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = cancel.cancelled() => {}
                _ = tokio::time::sleep(delay) => {
                    tokio::select! {
                        _ = cancel.cancelled() => {}
                        _ = tx.send(envelope) => {}
                    }
                }
            }
        });
    }

    /// Arm `timer` for `owner`; it is enqueued on the owner's timer mailbox
    /// after `duration` (latency does not apply).
    pub fn set_timer(&self, owner: &Address, timer: Timer, duration: Duration) {
        if self.is_cancelled() {
            trace!(owner = %owner, "set_timer after cancellation, ignoring");
            return;
        }
        let envelope = TimerEnvelope {
            timer,
            to: owner.clone(),
            duration,
        };
        self.log_set_timer(&envelope);
        let Some(route) = self.inner.routes.get(&envelope.to.root()) else {
            self.log_drop_timer(&envelope);
            return;
        };
        let tx = route.timers.clone();
        let cancel = self.inner.cancel.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = cancel.cancelled() => {}
                _ = tokio::time::sleep(duration) => {
                    tokio::select! {
                        _ = cancel.cancelled() => {}
                        _ = tx.send(envelope) => {}
                    }
                }
            }
        });
    }

    /// Send `interrupt` from `from` to `to`.
    ///
    /// Enqueues synchronously on the destination's unbounded interrupt
    /// mailbox: no latency, and interrupts from one sender to one receiver
    /// arrive in send order.
    pub fn send_interrupt(&self, from: &Address, interrupt: Interrupt, to: &Address) {
        if self.is_cancelled() {
            trace!(from = %from, to = %to, "send_interrupt after cancellation, ignoring");
            return;
        }
        let envelope = InterruptEnvelope {
            interrupt,
            from: from.clone(),
            to: to.clone(),
        };
        self.log_send_interrupt(&envelope);
        match self.inner.routes.get(&envelope.to.root()) {
            Some(route) => {
                if let Err(rejected) = route.interrupts.send(envelope) {
                    self.log_drop_interrupt(&rejected.0);
                }
            }
            None => self.log_drop_interrupt(&envelope),
        }
    }

    /// Send `interrupt` after `delay`. Used by the Sleep built-in to
    /// self-send Start once the sleep period elapses.
    pub fn schedule_interrupt(
        &self,
        from: Address,
        to: Address,
        interrupt: Interrupt,
        delay: Duration,
    ) {
        let handle = self.clone();
        let cancel = self.inner.cancel.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = cancel.cancelled() => {}
                _ = tokio::time::sleep(delay) => handle.send_interrupt(&from, interrupt, &to),
            }
        });
    }

    // ── Logger fan-out ───────────────────────────────────────────────────
    //
    // Every event goes to every registered sink; the matching counter is
    // bumped in the same place so stats and logs cannot disagree.

    pub fn log_simulation_state(&self, state: SimulationState) {
        for log in &self.inner.loggers {
            log.simulation_state(state);
        }
    }

    pub fn log_node_state(&self, address: &Address, state: NodeState) {
        for log in &self.inner.loggers {
            log.node_state(address, state);
        }
    }

    pub fn log_send_message(&self, envelope: &MessageEnvelope) {
        self.inner.counters.messages_sent.fetch_add(1, Ordering::Relaxed);
        for log in &self.inner.loggers {
            log.send_message(envelope);
        }
    }

    pub fn log_handle_message(&self, envelope: &MessageEnvelope) {
        self.inner.counters.messages_handled.fetch_add(1, Ordering::Relaxed);
        for log in &self.inner.loggers {
            log.handle_message(envelope);
        }
    }

    pub fn log_drop_message(&self, envelope: &MessageEnvelope) {
        self.inner.counters.messages_dropped.fetch_add(1, Ordering::Relaxed);
        for log in &self.inner.loggers {
            log.drop_message(envelope);
        }
    }

    pub fn log_set_timer(&self, envelope: &TimerEnvelope) {
        self.inner.counters.timers_set.fetch_add(1, Ordering::Relaxed);
        for log in &self.inner.loggers {
            log.set_timer(envelope);
        }
    }

    pub fn log_handle_timer(&self, envelope: &TimerEnvelope) {
        self.inner.counters.timers_handled.fetch_add(1, Ordering::Relaxed);
        for log in &self.inner.loggers {
            log.handle_timer(envelope);
        }
    }

    pub fn log_drop_timer(&self, envelope: &TimerEnvelope) {
        self.inner.counters.timers_dropped.fetch_add(1, Ordering::Relaxed);
        for log in &self.inner.loggers {
            log.drop_timer(envelope);
        }
    }

    pub fn log_send_interrupt(&self, envelope: &InterruptEnvelope) {
        self.inner.counters.interrupts_sent.fetch_add(1, Ordering::Relaxed);
        for log in &self.inner.loggers {
            log.send_interrupt(envelope);
        }
    }

    pub fn log_handle_interrupt(&self, envelope: &InterruptEnvelope) {
        self.inner.counters.interrupts_handled.fetch_add(1, Ordering::Relaxed);
        for log in &self.inner.loggers {
            log.handle_interrupt(envelope);
        }
    }

    pub fn log_drop_interrupt(&self, envelope: &InterruptEnvelope) {
        self.inner.counters.interrupts_dropped.fetch_add(1, Ordering::Relaxed);
        for log in &self.inner.loggers {
            log.drop_interrupt(envelope);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handle_with_route(
        root: &str,
        buffer: usize,
    ) -> (SimulationHandle, MailboxReceivers, CancellationToken) {
        let (tx, rx) = mailbox(buffer);
        let mut routes = HashMap::new();
        routes.insert(Address::new(root), tx);
        let cancel = CancellationToken::new();
        let handle = SimulationHandle::new(
            routes,
            Vec::new(),
            Duration::from_millis(1),
            Duration::from_millis(2),
            cancel.clone(),
        );
        (handle, rx, cancel)
    }

    #[tokio::test]
    async fn message_arrives_after_latency() {
        let (handle, mut rx, _cancel) = handle_with_route("server", 8);
        let from = Address::new("client");
        let to = Address::new("server");
        handle.send_message(&from, Message::new(meshsim_types::MessageKind("t.m")), &to);

        let envelope = rx.messages.recv().await.expect("delivery");
        assert_eq!(envelope.from, from);
        assert_eq!(envelope.to, to);
        assert_eq!(handle.stats().messages_sent, 1);
    }

    #[tokio::test]
    async fn unknown_root_is_dropped_at_send() {
        let (handle, _rx, _cancel) = handle_with_route("server", 8);
        let from = Address::new("client");
        handle.send_message(
            &from,
            Message::new(meshsim_types::MessageKind("t.m")),
            &Address::new("nobody"),
        );
        let stats = handle.stats();
        assert_eq!(stats.messages_sent, 1);
        assert_eq!(stats.messages_dropped, 1);
    }

    #[tokio::test]
    async fn interrupts_preserve_send_order() {
        let (handle, mut rx, _cancel) = handle_with_route("server", 8);
        let from = Address::new("client");
        let to = Address::new("server");
        let first = Interrupt::new(meshsim_types::InterruptKind("t.a"));
        let second = Interrupt::new(meshsim_types::InterruptKind("t.b"));
        let (first_id, second_id) = (first.id(), second.id());
        handle.send_interrupt(&from, first, &to);
        handle.send_interrupt(&from, second, &to);

        assert_eq!(rx.interrupts.recv().await.unwrap().interrupt.id(), first_id);
        assert_eq!(rx.interrupts.recv().await.unwrap().interrupt.id(), second_id);
    }

    #[tokio::test]
    async fn cancelled_handle_ignores_primitives() {
        let (handle, mut rx, cancel) = handle_with_route("server", 8);
        cancel.cancel();
        let from = Address::new("client");
        let to = Address::new("server");
        handle.send_message(&from, Message::new(meshsim_types::MessageKind("t.m")), &to);
        handle.send_interrupt(&from, Interrupt::stop(), &to);
        assert_eq!(handle.stats(), SimulationStats::default());
        assert!(rx.interrupts.try_recv().is_err());
    }
}
