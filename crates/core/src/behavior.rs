//! The user-facing handler contract.

use crate::NodeContext;
use meshsim_types::{Address, Interrupt, Message, Timer};
use std::time::Duration;

/// Protocol logic attached to a node.
///
/// Handlers are synchronous and expected to run to completion without
/// blocking; they mutate their own state and emit further work through the
/// [`NodeContext`] primitives. Each `on_*` hook returns whether the payload
/// was recognized; an unrecognized payload is dropped (and logged) by the
/// runtime.
///
/// Layered protocols compose by nesting: give the outer node a subnode
/// running the inner protocol rather than chaining handlers.
pub trait Behavior: Send {
    /// Called exactly once before the dispatch workers start.
    fn init(&mut self, ctx: &NodeContext<'_>);

    /// A message arrived from `from`.
    fn on_message(&mut self, ctx: &NodeContext<'_>, message: &Message, from: &Address) -> bool;

    /// A timer armed by this node fired after `elapsed`.
    fn on_timer(&mut self, ctx: &NodeContext<'_>, timer: &Timer, elapsed: Duration) -> bool;

    /// A non-built-in interrupt arrived from `from`.
    ///
    /// Stop/Sleep/Start are consumed by the runtime before this hook; only
    /// protocol-defined kinds reach it. The default recognizes nothing.
    fn on_interrupt(&mut self, ctx: &NodeContext<'_>, interrupt: &Interrupt, from: &Address) -> bool {
        let _ = (ctx, interrupt, from);
        false
    }
}
