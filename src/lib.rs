//! # Orrery Simulation Engine
//!
//! A component-based discrete-event simulation library. A simulation is a
//! set of user-defined components exchanging typed messages over explicit
//! edges: [`Port`]s receive, [`Link`]s send to one port, [`BcastLink`]s fan
//! out, [`Timer`]s schedule a component's own wake-ups. The [`Simulator`]
//! advances an integer tick clock to the earliest pending event and runs
//! exactly the components with work due, in registration order.
//!
//! ## Design Principles
//!
//! - **Typed channels**: message types are checked where a link meets a
//!   port; the simulator itself never inspects payloads.
//! - **Strictly future delivery**: every link has a latency of at least one
//!   tick, so a tick is closed the moment it runs and no component can see
//!   a message sent within the same tick.
//! - **Deterministic ordering**: components run in registration order
//!   within a tick, and equal-time events drain in insertion order.
//! - **Single-threaded by design**: behaviors run to completion on one
//!   thread; the latency floor is what would let the graph be partitioned
//!   across workers later without changing user code.
//!
//! ## Quick example
//!
//! ```
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! use orrery::components::{Emitter, Recorder};
//! use orrery::Simulator;
//!
//! let mut sim = Simulator::new(0);
//! let emitter = Rc::new(RefCell::new(Emitter::new(1).unwrap().with_message(42u32, 0)));
//! let recorder = Rc::new(RefCell::new(Recorder::<u32>::new()));
//! sim.register(emitter.clone()).unwrap();
//! sim.register(recorder.clone()).unwrap();
//! emitter.borrow_mut().output.connect(&recorder.borrow().input).unwrap();
//!
//! sim.run().unwrap();
//! assert_eq!(recorder.borrow().received(), &[(42, 1)]);
//! ```

pub mod component;
pub mod components;
pub mod config;
pub mod edge;
pub mod error;
pub mod event;
pub mod link;
pub mod port;
pub mod simulator;
pub mod timer;
pub mod types;

// Re-export commonly used types
pub use component::{Component, Context, Phase};
pub use config::{ConfigError, ConfigResult, SimParams};
pub use edge::{Edge, EdgeOwner};
pub use error::{SimResult, SimulationError};
pub use event::Event;
pub use link::{BatchLink, BcastLink, Link};
pub use port::{Messages, Port, Remaining};
pub use simulator::{QuitReason, Simulator, SimulatorStats};
pub use timer::Timer;
pub use types::{ComponentId, SimTime, NO_EVENT};
