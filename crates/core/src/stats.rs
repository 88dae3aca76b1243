//! Run statistics.

use std::sync::atomic::{AtomicU64, Ordering};

/// Live event counters shared by the handle's logging fan-out.
#[derive(Debug, Default)]
pub struct RunCounters {
    pub messages_sent: AtomicU64,
    pub messages_handled: AtomicU64,
    pub messages_dropped: AtomicU64,
    pub timers_set: AtomicU64,
    pub timers_handled: AtomicU64,
    pub timers_dropped: AtomicU64,
    pub interrupts_sent: AtomicU64,
    pub interrupts_handled: AtomicU64,
    pub interrupts_dropped: AtomicU64,
}

impl RunCounters {
    pub fn snapshot(&self) -> SimulationStats {
        SimulationStats {
            messages_sent: self.messages_sent.load(Ordering::Relaxed),
            messages_handled: self.messages_handled.load(Ordering::Relaxed),
            messages_dropped: self.messages_dropped.load(Ordering::Relaxed),
            timers_set: self.timers_set.load(Ordering::Relaxed),
            timers_handled: self.timers_handled.load(Ordering::Relaxed),
            timers_dropped: self.timers_dropped.load(Ordering::Relaxed),
            interrupts_sent: self.interrupts_sent.load(Ordering::Relaxed),
            interrupts_handled: self.interrupts_handled.load(Ordering::Relaxed),
            interrupts_dropped: self.interrupts_dropped.load(Ordering::Relaxed),
        }
    }
}

/// Statistics snapshot returned when a run completes.
///
/// An envelope sent but neither handled nor dropped was abandoned by
/// cancellation (still in flight when the deadline fired).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SimulationStats {
    pub messages_sent: u64,
    pub messages_handled: u64,
    pub messages_dropped: u64,
    pub timers_set: u64,
    pub timers_handled: u64,
    pub timers_dropped: u64,
    pub interrupts_sent: u64,
    pub interrupts_handled: u64,
    pub interrupts_dropped: u64,
}

impl SimulationStats {
    /// Messages still in flight (or queued) when the run ended.
    pub fn messages_abandoned(&self) -> u64 {
        self.messages_sent
            .saturating_sub(self.messages_handled + self.messages_dropped)
    }

    /// Fraction of sent messages that were handled.
    pub fn message_delivery_rate(&self) -> f64 {
        if self.messages_sent == 0 {
            1.0
        } else {
            self.messages_handled as f64 / self.messages_sent as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_reflects_counters() {
        let counters = RunCounters::default();
        counters.messages_sent.store(10, Ordering::Relaxed);
        counters.messages_handled.store(7, Ordering::Relaxed);
        counters.messages_dropped.store(1, Ordering::Relaxed);
        let stats = counters.snapshot();
        assert_eq!(stats.messages_sent, 10);
        assert_eq!(stats.messages_abandoned(), 2);
        assert!((stats.message_delivery_rate() - 0.7).abs() < 1e-9);
    }
}
