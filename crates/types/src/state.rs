//! Node and simulation lifecycle states.

use std::fmt;

/// Lifecycle state of a node.
///
/// Legal transitions: `Running ↔ Sleeping`, `Running → Stopped`,
/// `Sleeping → Stopped`. `Stopped` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeState {
    Running,
    Sleeping,
    Stopped,
}

impl fmt::Display for NodeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            NodeState::Running => "Running",
            NodeState::Sleeping => "Sleeping",
            NodeState::Stopped => "Stopped",
        };
        f.write_str(s)
    }
}

/// Lifecycle state of a simulation run.
///
/// One-shot: `NotStarted → Running → Finished`, no reuse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SimulationState {
    NotStarted,
    Running,
    Finished,
}

impl fmt::Display for SimulationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SimulationState::NotStarted => "NotStarted",
            SimulationState::Running => "Running",
            SimulationState::Finished => "Finished",
        };
        f.write_str(s)
    }
}
