//! Out-of-band control signals.
//!
//! Interrupts bypass network latency and gate on node state differently
//! from messages: a sleeping node still receives interrupts so it can be
//! woken. Three kinds are built into the runtime; protocols may define
//! their own kinds and handle them in their interrupt hook.

use crate::payload::{downcast, PayloadData, PayloadId};
use std::any::Any;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Tag identifying an interrupt kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InterruptKind(pub &'static str);

impl fmt::Display for InterruptKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Built-in: permanently stop the target node.
pub const INTERRUPT_STOP: InterruptKind = InterruptKind("stop");
/// Built-in: wake a sleeping node.
pub const INTERRUPT_START: InterruptKind = InterruptKind("start");
/// Built-in: put a running node to sleep; carries [`SleepFor`].
pub const INTERRUPT_SLEEP: InterruptKind = InterruptKind("sleep");

/// Payload of a [`INTERRUPT_SLEEP`] interrupt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SleepFor(pub Duration);

/// An out-of-band control signal sent to a node.
#[derive(Clone)]
pub struct Interrupt {
    id: PayloadId,
    kind: InterruptKind,
    data: Option<PayloadData>,
}

impl Interrupt {
    pub fn new(kind: InterruptKind) -> Self {
        Interrupt {
            id: PayloadId::next(),
            kind,
            data: None,
        }
    }

    pub fn with_data<T: Any + Send + Sync>(kind: InterruptKind, data: T) -> Self {
        Interrupt {
            id: PayloadId::next(),
            kind,
            data: Some(Arc::new(data)),
        }
    }

    /// A [`INTERRUPT_STOP`] interrupt.
    pub fn stop() -> Self {
        Interrupt::new(INTERRUPT_STOP)
    }

    /// A [`INTERRUPT_START`] interrupt.
    pub fn start() -> Self {
        Interrupt::new(INTERRUPT_START)
    }

    /// A [`INTERRUPT_SLEEP`] interrupt putting the target to sleep for
    /// `duration`.
    pub fn sleep(duration: Duration) -> Self {
        Interrupt::with_data(INTERRUPT_SLEEP, SleepFor(duration))
    }

    pub fn id(&self) -> PayloadId {
        self.id
    }

    pub fn kind(&self) -> InterruptKind {
        self.kind
    }

    pub fn payload<T: Any + Send + Sync>(&self) -> Option<&T> {
        downcast(self.data.as_ref())
    }
}

impl fmt::Display for Interrupt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.kind, self.id)
    }
}

impl fmt::Debug for Interrupt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Interrupt")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("has_data", &self.data.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sleep_carries_duration() {
        let i = Interrupt::sleep(Duration::from_millis(300));
        assert_eq!(i.kind(), INTERRUPT_SLEEP);
        assert_eq!(
            i.payload::<SleepFor>(),
            Some(&SleepFor(Duration::from_millis(300)))
        );
    }

    #[test]
    fn builtin_constructors_use_builtin_kinds() {
        assert_eq!(Interrupt::stop().kind(), INTERRUPT_STOP);
        assert_eq!(Interrupt::start().kind(), INTERRUPT_START);
    }
}
