//! Node runtime for the meshsim simulator.
//!
//! A node is a [`Behavior`] (the user's protocol logic) wrapped in a
//! [`Node`] (address, lifecycle state, subnodes). Behaviors react to
//! messages, timers, and interrupts through synchronous handlers and emit
//! new work through the [`NodeContext`] primitives, which re-enter the
//! engine via the [`SimulationHandle`].
//!
//! # Dispatch model
//!
//! The engine runs one worker task per *root* node. An envelope addressed
//! to `"le.pfd"` is routed to the `"le"` worker, which walks its subnode
//! tree depth-first until a node claims the envelope. Handlers of one root
//! hierarchy therefore never run concurrently with each other, while
//! different hierarchies run in parallel.

mod behavior;
mod context;
mod handle;
mod node;
mod stats;

pub use behavior::Behavior;
pub use context::NodeContext;
pub use handle::{mailbox, Mailbox, MailboxReceivers, SimulationHandle};
pub use node::{Dispatch, Node, NodeError};
pub use stats::{RunCounters, SimulationStats};
