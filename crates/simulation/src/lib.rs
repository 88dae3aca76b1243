//! The meshsim simulation engine.
//!
//! [`Simulation`] owns the node registry, the per-root-node mailboxes, the
//! registered log sinks, and the run lifecycle. A run:
//!
//! 1. initializes every node depth-first (parent before subnodes),
//! 2. spawns exactly one dispatch worker per root node,
//! 3. lets nodes exchange messages (under injected latency), timers, and
//!    interrupts until the wall-clock deadline fires,
//! 4. joins all workers and returns a [`SimulationStats`] snapshot.
//!
//! ```no_run
//! use meshsim_core::Node;
//! use meshsim_simulation::{Simulation, SimulationOptions};
//! use meshsim_types::Address;
//!
//! # struct Idle;
//! # impl meshsim_core::Behavior for Idle {
//! #     fn init(&mut self, _: &meshsim_core::NodeContext<'_>) {}
//! #     fn on_message(&mut self, _: &meshsim_core::NodeContext<'_>, _: &meshsim_types::Message, _: &Address) -> bool { false }
//! #     fn on_timer(&mut self, _: &meshsim_core::NodeContext<'_>, _: &meshsim_types::Timer, _: std::time::Duration) -> bool { false }
//! # }
//! # #[tokio::main] async fn main() -> Result<(), meshsim_simulation::SimulationError> {
//! let mut sim = Simulation::new(SimulationOptions::default());
//! sim.add_node(Node::new(Address::new("server"), Idle))?;
//! let stats = sim.run().await?;
//! println!("handled {} messages", stats.messages_handled);
//! # Ok(())
//! # }
//! ```

mod error;
mod options;
mod simulation;
mod worker;

pub use error::SimulationError;
pub use options::SimulationOptions;
pub use simulation::Simulation;

pub use meshsim_core::SimulationStats;
