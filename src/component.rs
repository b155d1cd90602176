//! The component trait and the per-invocation context.
//!
//! A component is the user's unit of behavior: a struct holding state plus
//! edge fields (ports, timers, links). The engine interacts with it through
//! two methods. [`Component::activate`] is the behavior callback, invoked
//! once at startup, once per tick with work due, and once at shutdown.
//! [`Component::edges`] enumerates every edge the component owns so the
//! simulator can bind back-references at registration and poll head times
//! between ticks; it stands in for the field-walking code the source of a
//! component would otherwise have generated.
//!
//! # Example
//!
//! ```
//! use orrery::{Component, Context, Edge, Link, Port, SimulationError};
//!
//! struct Echo {
//!     input: Port<u32>,
//!     output: Link<u32>,
//! }
//!
//! impl Component for Echo {
//!     fn activate(&mut self, ctx: &mut Context) -> Result<(), SimulationError> {
//!         for value in self.input.messages(ctx) {
//!             self.output.send(value)?;
//!         }
//!         Ok(())
//!     }
//!
//!     fn edges(&mut self) -> Vec<&mut dyn Edge> {
//!         vec![&mut self.input, &mut self.output]
//!     }
//! }
//! ```

use crate::edge::Edge;
use crate::error::SimulationError;
use crate::types::SimTime;

/// Lifecycle phase of a behavior invocation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// The one-time startup round before any tick. Message iterators are
    /// suppressed; sends and timer arms are allowed.
    Startup,
    /// A regular tick with at least one event due for this component.
    Tick,
    /// The one-time shutdown round. Only the remaining-messages iterator
    /// yields events.
    Shutdown,
}

/// Per-invocation view of the simulator handed to a behavior callback.
///
/// Carries the current tick and lifecycle phase, and collects a
/// cooperative quit request. Quitting never interrupts the current
/// invocation; the scheduler honors it when it next evaluates its loop
/// condition, and shutdown still runs for every component.
#[derive(Debug)]
pub struct Context {
    now: SimTime,
    phase: Phase,
    quit: bool,
}

impl Context {
    pub(crate) fn new(now: SimTime, phase: Phase) -> Self {
        Self {
            now,
            phase,
            quit: false,
        }
    }

    /// The current simulated time.
    pub fn now(&self) -> SimTime {
        self.now
    }

    /// The lifecycle phase of this invocation.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// True during the startup round.
    pub fn is_startup(&self) -> bool {
        self.phase == Phase::Startup
    }

    /// True during the shutdown round.
    pub fn is_shutdown(&self) -> bool {
        self.phase == Phase::Shutdown
    }

    pub(crate) fn is_tick(&self) -> bool {
        self.phase == Phase::Tick
    }

    /// Requests cooperative termination of the simulation.
    pub fn quit(&mut self) {
        self.quit = true;
    }

    pub(crate) fn quit_requested(&self) -> bool {
        self.quit
    }
}

/// The behavior contract every simulated component implements.
pub trait Component {
    /// The behavior callback.
    ///
    /// Called with `Phase::Startup` once before the first tick, with
    /// `Phase::Tick` whenever this component has an event due at the
    /// current tick, and with `Phase::Shutdown` once after the loop ends.
    /// Returning an error aborts the run at this call.
    fn activate(&mut self, ctx: &mut Context) -> Result<(), SimulationError>;

    /// Enumerates every edge this component owns.
    ///
    /// The simulator binds each listed edge at registration and uses their
    /// head times to schedule ticks, so the list must be complete: an edge
    /// missing here is never wired and can never wake the component. Edges
    /// held inside vectors or tuples are included simply by pushing them
    /// into the returned list.
    fn edges(&mut self) -> Vec<&mut dyn Edge>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_phases() {
        let startup = Context::new(0, Phase::Startup);
        assert!(startup.is_startup());
        assert!(!startup.is_shutdown());
        assert!(!startup.is_tick());

        let tick = Context::new(3, Phase::Tick);
        assert!(tick.is_tick());
        assert_eq!(tick.now(), 3);

        let shutdown = Context::new(9, Phase::Shutdown);
        assert!(shutdown.is_shutdown());
        assert_eq!(shutdown.phase(), Phase::Shutdown);
    }

    #[test]
    fn test_quit_is_recorded() {
        let mut ctx = Context::new(0, Phase::Tick);
        assert!(!ctx.quit_requested());
        ctx.quit();
        assert!(ctx.quit_requested());
    }
}
