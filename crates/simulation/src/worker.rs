//! The per-root-node dispatch worker.

use meshsim_core::{Dispatch, MailboxReceivers, Node, SimulationHandle};
use tokio_util::sync::CancellationToken;
use tracing::trace;

/// Consume one root node's mailboxes until the run is cancelled.
///
/// Envelopes are processed one at a time, so handlers within one root
/// hierarchy never run concurrently; the interleaving across the three
/// mailboxes is whatever the selector picks among ready branches. The node
/// is returned to the engine when the worker exits so its final state
/// stays inspectable.
pub(crate) async fn node_worker(
    mut node: Node,
    mut mailboxes: MailboxReceivers,
    handle: SimulationHandle,
    cancel: CancellationToken,
) -> Node {
    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            Some(envelope) = mailboxes.messages.recv() => {
                if node.dispatch_message(&handle, &envelope) == Dispatch::Unmatched {
                    handle.log_drop_message(&envelope);
                }
            }
            Some(envelope) = mailboxes.timers.recv() => {
                if node.dispatch_timer(&handle, &envelope) == Dispatch::Unmatched {
                    handle.log_drop_timer(&envelope);
                }
            }
            Some(envelope) = mailboxes.interrupts.recv() => {
                if node.dispatch_interrupt(&handle, &envelope) == Dispatch::Unmatched {
                    handle.log_drop_interrupt(&envelope);
                }
            }
        }
    }
    trace!(node = %node.address(), "worker exited");
    node
}
