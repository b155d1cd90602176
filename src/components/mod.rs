//! Reusable components.
//!
//! Small building blocks that cover the common ends of a simulation graph:
//! an [`Emitter`] to feed messages in, a [`Relay`] to model a forwarding
//! hop, a [`Recorder`] to observe what arrived, and the [`EventLog`]
//! logging component with its [`LogHandle`].

pub mod emitter;
pub mod logger;
pub mod recorder;
pub mod relay;

pub use emitter::Emitter;
pub use logger::{EventLog, LogHandle, LogLevel, LogRecord};
pub use recorder::Recorder;
pub use relay::Relay;
