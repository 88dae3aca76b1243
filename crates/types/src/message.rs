//! Messages exchanged between nodes.

use crate::payload::{downcast, PayloadData, PayloadId};
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Tag identifying a message kind, chosen by the protocol that defines it.
///
/// Handlers match on the kind to decide whether and how to narrow the
/// opaque payload data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MessageKind(pub &'static str);

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// A message sent from one node to another.
///
/// Cloning a message preserves its id; the id changes only when a new
/// message is constructed.
#[derive(Clone)]
pub struct Message {
    id: PayloadId,
    kind: MessageKind,
    data: Option<PayloadData>,
}

impl Message {
    /// Create a message with no payload data.
    pub fn new(kind: MessageKind) -> Self {
        Message {
            id: PayloadId::next(),
            kind,
            data: None,
        }
    }

    /// Create a message carrying `data`.
    pub fn with_data<T: Any + Send + Sync>(kind: MessageKind, data: T) -> Self {
        Message {
            id: PayloadId::next(),
            kind,
            data: Some(Arc::new(data)),
        }
    }

    pub fn id(&self) -> PayloadId {
        self.id
    }

    pub fn kind(&self) -> MessageKind {
        self.kind
    }

    /// Narrow the payload data to `T`. Returns `None` if the message has no
    /// data or the data is of a different type.
    pub fn payload<T: Any + Send + Sync>(&self) -> Option<&T> {
        downcast(self.data.as_ref())
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.kind, self.id)
    }
}

impl fmt::Debug for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Message")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("has_data", &self.data.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GREETING: MessageKind = MessageKind("test.greeting");

    #[test]
    fn same_kind_and_data_distinct_ids() {
        let a = Message::with_data(GREETING, "hi".to_owned());
        let b = Message::with_data(GREETING, "hi".to_owned());
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn clone_preserves_id() {
        let a = Message::new(GREETING);
        assert_eq!(a.clone().id(), a.id());
    }

    #[test]
    fn payload_narrows_by_type() {
        let m = Message::with_data(GREETING, 7u32);
        assert_eq!(m.payload::<u32>(), Some(&7));
        assert_eq!(m.payload::<String>(), None);
        assert_eq!(Message::new(GREETING).payload::<u32>(), None);
    }
}
