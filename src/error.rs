//! Error types for the simulation engine.
//!
//! Every validation failure in the engine maps to one [`SimulationError`]
//! reason and is raised synchronously at the offending call. Programming
//! errors that cannot be reported to the caller, such as an event observed
//! out of heap order, trip assertions instead.

use thiserror::Error;

use crate::types::ComponentId;

/// Errors raised by the simulation engine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SimulationError {
    /// A link was constructed with a zero latency. Links must always delay
    /// delivery by at least one tick.
    #[error("link latency must be at least one tick")]
    InvalidLatency,

    /// A timer was armed with a zero delay. Self-scheduled events must land
    /// strictly in the future.
    #[error("delay must be at least one tick")]
    InvalidDelay,

    /// A link was asked to deliver without a target port, or an edge was
    /// used before its component was registered with a simulator.
    #[error("link was not connected")]
    Unconnected,

    /// A connect was attempted between a link and a port whose owning
    /// components are registered with different simulators.
    #[error("link and port belong to different simulators")]
    CrossSimulator,

    /// An edge already owned by one component was handed to another.
    #[error("edge is already owned by component {owner}")]
    BackRefConflict {
        /// The component that already owns the edge.
        owner: ComponentId,
    },
}

/// Result type for engine operations.
pub type SimResult<T> = Result<T, SimulationError>;
