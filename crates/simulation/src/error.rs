//! Engine errors.
//!
//! Only registration mistakes and setup failures surface as errors.
//! Routing problems (unknown destination, wrong-state target, unrecognized
//! kind) are logged drops, and reaching the deadline is the normal
//! termination path, not an error.

use meshsim_loggers::LogError;
use meshsim_types::Address;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimulationError {
    /// A node with this address is already registered.
    #[error("a node with address {0} is already registered")]
    DuplicateAddress(Address),

    /// No node with this address is registered.
    #[error("no node with address {0} is registered")]
    UnknownAddress(Address),

    /// Top-level nodes must be registered under a single-segment address;
    /// deeper addresses belong to subnodes.
    #[error("nodes must be registered under a root address, got {0}")]
    NotARoot(Address),

    /// The registry can only be mutated, and a run started, before `run`.
    #[error("simulation has already been started")]
    AlreadyStarted,

    /// `duration` was zero, which means unbounded; use
    /// `run_until_cancelled` with an explicit token instead.
    #[error("duration of zero means unbounded; use run_until_cancelled")]
    UnboundedDuration,

    /// The options failed validation.
    #[error("invalid options: {0}")]
    InvalidOptions(String),

    /// A log sink could not be created.
    #[error(transparent)]
    Log(#[from] LogError),
}
