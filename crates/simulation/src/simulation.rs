//! The simulation driver.

use crate::options::SimulationOptions;
use crate::worker::node_worker;
use crate::SimulationError;
use meshsim_core::{mailbox, Node, SimulationHandle, SimulationStats};
use meshsim_loggers::{render_sequence_diagram, EventLog, SequenceLog, TraceLog};
use meshsim_types::{Address, SimulationState};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// A one-shot distributed-system simulation.
///
/// Register nodes and log sinks while `NotStarted`, then call [`run`]
/// (deadline-bounded) or [`run_until_cancelled`] (caller-controlled).
/// After the run the registry still holds every root node, so tests can
/// inspect final node state through [`node`].
///
/// [`run`]: Simulation::run
/// [`run_until_cancelled`]: Simulation::run_until_cancelled
/// [`node`]: Simulation::node
pub struct Simulation {
    options: SimulationOptions,
    nodes: BTreeMap<Address, Node>,
    loggers: Vec<Arc<dyn EventLog>>,
    state: SimulationState,
}

impl Simulation {
    pub fn new(options: SimulationOptions) -> Self {
        Simulation {
            options,
            nodes: BTreeMap::new(),
            loggers: Vec::new(),
            state: SimulationState::NotStarted,
        }
    }

    pub fn options(&self) -> &SimulationOptions {
        &self.options
    }

    pub fn state(&self) -> SimulationState {
        self.state
    }

    // ── Registry ─────────────────────────────────────────────────────────

    /// Register a root node. Valid only before the run starts.
    pub fn add_node(&mut self, node: Node) -> Result<(), SimulationError> {
        if self.state != SimulationState::NotStarted {
            return Err(SimulationError::AlreadyStarted);
        }
        let address = node.address().clone();
        if !address.is_root() {
            return Err(SimulationError::NotARoot(address));
        }
        if self.nodes.contains_key(&address) {
            return Err(SimulationError::DuplicateAddress(address));
        }
        self.nodes.insert(address, node);
        Ok(())
    }

    /// Unregister and return a node. Valid only before the run starts; to
    /// make a node disappear mid-run, send it a Stop interrupt instead.
    pub fn remove_node(&mut self, address: &Address) -> Result<Node, SimulationError> {
        if self.state != SimulationState::NotStarted {
            return Err(SimulationError::AlreadyStarted);
        }
        self.nodes
            .remove(address)
            .ok_or_else(|| SimulationError::UnknownAddress(address.clone()))
    }

    /// Look up a node (or subnode) by full address.
    pub fn node(&self, address: &Address) -> Option<&Node> {
        self.nodes.get(&address.root())?.find(address)
    }

    /// Attach a log sink. Every lifecycle event is fanned out to every
    /// registered sink.
    pub fn add_logger(&mut self, logger: Arc<dyn EventLog>) {
        self.loggers.push(logger);
    }

    /// Detach a previously attached sink (matched by identity).
    pub fn remove_logger(&mut self, logger: &Arc<dyn EventLog>) {
        self.loggers.retain(|l| !Arc::ptr_eq(l, logger));
    }

    // ── Running ──────────────────────────────────────────────────────────

    /// Run until the configured `duration` elapses.
    pub async fn run(&mut self) -> Result<SimulationStats, SimulationError> {
        if self.options.duration == Duration::ZERO {
            return Err(SimulationError::UnboundedDuration);
        }
        let cancel = CancellationToken::new();
        let deadline = self.options.duration;
        let timer = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(deadline).await;
            timer.cancel();
        });
        self.run_until_cancelled(cancel).await
    }

    /// Run until `cancel` fires. This is the unbounded form behind a
    /// `duration` of zero: the caller owns termination.
    pub async fn run_until_cancelled(
        &mut self,
        cancel: CancellationToken,
    ) -> Result<SimulationStats, SimulationError> {
        if self.state != SimulationState::NotStarted {
            return Err(SimulationError::AlreadyStarted);
        }
        self.options
            .validate()
            .map_err(SimulationError::InvalidOptions)?;

        // File sinks requested through options join the caller-registered
        // sinks for this run. Creation failures surface before any node
        // initializes.
        let mut loggers = self.loggers.clone();
        if let Some(path) = &self.options.trace_path {
            loggers.push(Arc::new(TraceLog::create(path)?));
        }
        if let Some(path) = &self.options.uml_path {
            loggers.push(Arc::new(SequenceLog::create(path)?));
        }

        let mut receivers = HashMap::new();
        let mut routes = HashMap::new();
        for address in self.nodes.keys() {
            let (tx, rx) = mailbox(self.options.buffer_size);
            routes.insert(address.clone(), tx);
            receivers.insert(address.clone(), rx);
        }
        let handle = SimulationHandle::new(
            routes,
            loggers,
            self.options.min_latency,
            self.options.max_latency,
            cancel.clone(),
        );

        handle.log_simulation_state(self.state);
        self.state = SimulationState::Running;
        handle.log_simulation_state(self.state);
        info!(
            nodes = self.nodes.len(),
            duration = ?self.options.duration,
            "simulation running"
        );

        // Depth-first init of every hierarchy, parent before subnodes,
        // before any worker starts consuming mailboxes.
        let mut nodes = std::mem::take(&mut self.nodes);
        for node in nodes.values_mut() {
            node.init(&handle);
        }

        let mut workers: Vec<JoinHandle<Node>> = Vec::with_capacity(nodes.len());
        for (address, node) in nodes {
            let mailboxes = receivers
                .remove(&address)
                .expect("mailbox exists for every registered node");
            workers.push(tokio::spawn(node_worker(
                node,
                mailboxes,
                handle.clone(),
                cancel.clone(),
            )));
        }

        // The run ends when the deadline (or the caller) cancels; workers
        // acknowledge on their next selector iteration and hand their node
        // back. In-flight delivery tasks abandon their enqueues.
        cancel.cancelled().await;
        for worker in workers {
            match worker.await {
                Ok(node) => {
                    let address = node.address().clone();
                    self.nodes.insert(address, node);
                }
                Err(e) => warn!(error = %e, "worker task failed to join"),
            }
        }

        self.state = SimulationState::Finished;
        handle.log_simulation_state(self.state);
        let stats = handle.stats();
        debug!(?stats, "simulation finished");

        self.render_diagram();
        Ok(stats)
    }

    /// Invoke the external sequence-diagram renderer, if configured.
    /// Failures are logged and never fail the run.
    fn render_diagram(&self) {
        let (Some(runtime), Some(jar), Some(diagram)) = (
            &self.options.renderer_runtime,
            &self.options.renderer_jar,
            &self.options.uml_path,
        ) else {
            return;
        };
        if let Err(e) = render_sequence_diagram(runtime, jar, diagram) {
            warn!(error = %e, "sequence diagram rendering failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use meshsim_core::{Behavior, NodeContext};
    use meshsim_types::{Message, Timer};

    struct Idle;

    impl Behavior for Idle {
        fn init(&mut self, _ctx: &NodeContext<'_>) {}

        fn on_message(&mut self, _ctx: &NodeContext<'_>, _m: &Message, _f: &Address) -> bool {
            false
        }

        fn on_timer(&mut self, _ctx: &NodeContext<'_>, _t: &Timer, _e: Duration) -> bool {
            false
        }
    }

    #[test]
    fn duplicate_address_rejected() {
        let mut sim = Simulation::new(SimulationOptions::default());
        sim.add_node(Node::new(Address::new("a"), Idle)).unwrap();
        assert!(matches!(
            sim.add_node(Node::new(Address::new("a"), Idle)),
            Err(SimulationError::DuplicateAddress(_))
        ));
    }

    #[test]
    fn non_root_registration_rejected() {
        let mut sim = Simulation::new(SimulationOptions::default());
        assert!(matches!(
            sim.add_node(Node::new(Address::new("a.b"), Idle)),
            Err(SimulationError::NotARoot(_))
        ));
    }

    #[test]
    fn removing_unknown_node_rejected() {
        let mut sim = Simulation::new(SimulationOptions::default());
        assert!(matches!(
            sim.remove_node(&Address::new("ghost")),
            Err(SimulationError::UnknownAddress(_))
        ));
    }

    #[test]
    fn remove_returns_the_node() {
        let mut sim = Simulation::new(SimulationOptions::default());
        sim.add_node(Node::new(Address::new("a"), Idle)).unwrap();
        let node = sim.remove_node(&Address::new("a")).unwrap();
        assert_eq!(node.address(), &Address::new("a"));
        assert!(sim.node(&Address::new("a")).is_none());
    }

    #[tokio::test]
    async fn zero_duration_rejected_by_run() {
        let mut sim = Simulation::new(
            SimulationOptions::default().with_duration(Duration::ZERO),
        );
        assert!(matches!(
            sim.run().await,
            Err(SimulationError::UnboundedDuration)
        ));
    }

    #[tokio::test]
    async fn simulation_is_one_shot() {
        let mut sim = Simulation::new(
            SimulationOptions::default().with_duration(Duration::from_millis(50)),
        );
        sim.run().await.unwrap();
        assert_eq!(sim.state(), SimulationState::Finished);
        assert!(matches!(
            sim.run().await,
            Err(SimulationError::AlreadyStarted)
        ));
        assert!(matches!(
            sim.add_node(Node::new(Address::new("late"), Idle)),
            Err(SimulationError::AlreadyStarted)
        ));
    }
}
