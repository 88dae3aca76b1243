//! Payload identity and opaque payload data.

use std::any::Any;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Process-wide payload id counter. Shared by messages, timers, and
/// interrupts so every constructed payload gets a distinct id.
static NEXT_PAYLOAD_ID: AtomicU64 = AtomicU64::new(1);

/// Globally unique identifier of a single payload instance.
///
/// Ids exist so that logs and tests can correlate a send event with the
/// matching handle or drop event. Two payloads constructed with the same
/// kind and data still get distinct ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PayloadId(u64);

impl PayloadId {
    pub(crate) fn next() -> Self {
        PayloadId(NEXT_PAYLOAD_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for PayloadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque payload data, narrowed by the receiving handler based on the
/// payload's kind tag.
///
/// Stored behind an `Arc` so a broadcast clones cheaply and every receiver
/// observes the same underlying value.
pub type PayloadData = Arc<dyn Any + Send + Sync>;

/// Downcast helper shared by the three payload kinds.
pub(crate) fn downcast<T: Any + Send + Sync>(data: Option<&PayloadData>) -> Option<&T> {
    data.and_then(|d| d.downcast_ref::<T>())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique() {
        let a = PayloadId::next();
        let b = PayloadId::next();
        assert_ne!(a, b);
    }
}
