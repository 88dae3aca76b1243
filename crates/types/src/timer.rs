//! Timers a node arms against itself.

use crate::payload::{downcast, PayloadData, PayloadId};
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Tag identifying a timer kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerKind(pub &'static str);

impl fmt::Display for TimerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// A timer payload, delivered back to the arming node after its requested
/// duration has elapsed.
#[derive(Clone)]
pub struct Timer {
    id: PayloadId,
    kind: TimerKind,
    data: Option<PayloadData>,
}

impl Timer {
    pub fn new(kind: TimerKind) -> Self {
        Timer {
            id: PayloadId::next(),
            kind,
            data: None,
        }
    }

    pub fn with_data<T: Any + Send + Sync>(kind: TimerKind, data: T) -> Self {
        Timer {
            id: PayloadId::next(),
            kind,
            data: Some(Arc::new(data)),
        }
    }

    pub fn id(&self) -> PayloadId {
        self.id
    }

    pub fn kind(&self) -> TimerKind {
        self.kind
    }

    pub fn payload<T: Any + Send + Sync>(&self) -> Option<&T> {
        downcast(self.data.as_ref())
    }
}

impl fmt::Display for Timer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.kind, self.id)
    }
}

impl fmt::Debug for Timer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Timer")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("has_data", &self.data.is_some())
            .finish()
    }
}
