//! Self-scheduled events.
//!
//! A [`Timer`] is a port fused with a link back to the same component: the
//! component arms it with [`set`](Timer::set) and receives the message
//! through the usual drain iterators when the delay elapses. Arming with a
//! zero delay is rejected, so a timer can never wake its component within
//! the tick that armed it.

use crate::component::Context;
use crate::edge::{Edge, EdgeOwner};
use crate::error::SimulationError;
use crate::port::{Messages, Port, Remaining};
use crate::types::SimTime;

/// A typed self-directed edge for delayed wake-ups.
#[derive(Debug)]
pub struct Timer<M> {
    port: Port<M>,
}

impl<M> Default for Timer<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M> Timer<M> {
    /// Creates a new, empty timer.
    pub fn new() -> Self {
        Self { port: Port::new() }
    }

    /// Arms the timer: the message is delivered back to this component at
    /// `now + delay`.
    ///
    /// Fails with `InvalidDelay` when `delay` is zero, and with
    /// `Unconnected` when the timer is not part of a registered component.
    pub fn set(&self, message: M, delay: SimTime) -> Result<(), SimulationError> {
        if delay == 0 {
            return Err(SimulationError::InvalidDelay);
        }
        let owner = self.port.owner().ok_or(SimulationError::Unconnected)?;
        let time = owner.now() + delay;
        self.port.shared().borrow_mut().push(message, time);
        Ok(())
    }

    /// The tick of the earliest pending event, or
    /// [`NO_EVENT`](crate::NO_EVENT).
    pub fn head_time(&self) -> SimTime {
        self.port.head_time()
    }

    /// Number of events currently queued.
    pub fn pending(&self) -> usize {
        self.port.pending()
    }

    /// Iterates over the messages due at the current tick. Same phase
    /// gating as [`Port::messages`].
    pub fn messages(&self, ctx: &Context) -> Messages<M> {
        self.port.messages(ctx)
    }

    /// Iterates over every queued event during shutdown. Same rules as
    /// [`Port::remaining_messages`].
    pub fn remaining_messages(&self, ctx: &Context) -> Remaining<M> {
        self.port.remaining_messages(ctx)
    }
}

impl<M> Edge for Timer<M> {
    fn bind(&mut self, owner: &EdgeOwner) -> Result<(), SimulationError> {
        self.port.bind(owner)
    }

    fn head_time(&self) -> SimTime {
        self.port.head_time()
    }

    fn pending(&self) -> usize {
        self.port.pending()
    }

    fn delivered(&self) -> u64 {
        Edge::delivered(&self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::{Context, Phase};
    use crate::edge::SimClock;
    use crate::types::{ComponentId, NO_EVENT};
    use std::rc::Rc;

    fn bound_timer(clock: &Rc<SimClock>) -> Timer<u32> {
        let mut timer = Timer::new();
        timer
            .bind(&EdgeOwner::new(ComponentId(0), clock.clone()))
            .unwrap();
        timer
    }

    #[test]
    fn test_zero_delay_rejected() {
        let clock = Rc::new(SimClock::new());
        let timer = bound_timer(&clock);
        assert_eq!(timer.set(1, 0).unwrap_err(), SimulationError::InvalidDelay);
    }

    #[test]
    fn test_unbound_set_fails() {
        let timer: Timer<u32> = Timer::new();
        assert_eq!(timer.set(1, 5).unwrap_err(), SimulationError::Unconnected);
    }

    #[test]
    fn test_set_schedules_relative_to_now() {
        let clock = Rc::new(SimClock::new());
        let timer = bound_timer(&clock);
        clock.advance(7);
        timer.set(1, 3).unwrap();
        assert_eq!(timer.head_time(), 10);

        let ctx = Context::new(10, Phase::Tick);
        let fired: Vec<u32> = timer.messages(&ctx).collect();
        assert_eq!(fired, vec![1]);
        assert_eq!(timer.head_time(), NO_EVENT);
    }
}
