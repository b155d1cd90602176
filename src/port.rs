//! Inbound message endpoints.
//!
//! A [`Port`] owns a min-heap of pending [`Event`]s for one message type.
//! The queue sits behind a shared handle so that any number of links can
//! deliver into it without the sender and receiver components knowing about
//! each other; the port keeps the only user-facing view.
//!
//! Draining is lazy and phase-gated: the regular [`messages`](Port::messages)
//! iterator pops only events due at the current tick and yields nothing
//! during startup or shutdown, while [`remaining_messages`](Port::remaining_messages)
//! exposes everything left in the queue during shutdown so no event is
//! silently lost.

use std::cell::RefCell;
use std::collections::BinaryHeap;
use std::rc::Rc;

use crate::component::Context;
use crate::edge::{bind_owner, Edge, EdgeOwner};
use crate::error::SimulationError;
use crate::event::Event;
use crate::types::{SimTime, NO_EVENT};

/// Heap state shared between a port and the links that target it.
#[derive(Debug)]
pub(crate) struct PortQueue<M> {
    heap: BinaryHeap<Event<M>>,
    next_seq: u64,
    delivered: u64,
}

impl<M> PortQueue<M> {
    fn new() -> Self {
        Self {
            heap: BinaryHeap::new(),
            next_seq: 0,
            delivered: 0,
        }
    }

    pub(crate) fn push(&mut self, message: M, time: SimTime) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Event::new(message, time, seq));
    }

    fn head_time(&self) -> SimTime {
        self.heap.peek().map(|event| event.time).unwrap_or(NO_EVENT)
    }
}

pub(crate) type SharedQueue<M> = Rc<RefCell<PortQueue<M>>>;

/// A typed inbound endpoint with a time-ordered event queue.
///
/// Many links may target one port; each delivery lands in the same queue.
/// Within a tick, equal-time events drain in the order they were inserted.
///
/// # Example
///
/// ```
/// use orrery::{Port, NO_EVENT};
///
/// let port: Port<u32> = Port::new();
/// assert_eq!(port.head_time(), NO_EVENT);
/// assert_eq!(port.pending(), 0);
/// ```
#[derive(Debug)]
pub struct Port<M> {
    queue: SharedQueue<M>,
    owner: Option<EdgeOwner>,
}

impl<M> Port<M> {
    /// Creates a new, empty port.
    pub fn new() -> Self {
        Self {
            queue: Rc::new(RefCell::new(PortQueue::new())),
            owner: None,
        }
    }

    /// The tick of the earliest pending event, or [`NO_EVENT`] when the
    /// queue is empty.
    pub fn head_time(&self) -> SimTime {
        self.queue.borrow().head_time()
    }

    /// Number of events currently queued.
    pub fn pending(&self) -> usize {
        self.queue.borrow().heap.len()
    }

    /// Iterates over the messages due at the current tick, popping them
    /// from the queue.
    ///
    /// Yields nothing during startup and shutdown. Observing a queued event
    /// earlier than the current tick is a scheduling bug and aborts the
    /// process.
    pub fn messages(&self, ctx: &Context) -> Messages<M> {
        Messages {
            queue: self.queue.clone(),
            now: ctx.now(),
            active: ctx.is_tick(),
        }
    }

    /// Iterates over every event still queued, as `(message, time)` pairs.
    ///
    /// Intended for the shutdown phase, where the regular iterator is
    /// suppressed; outside shutdown it yields nothing.
    pub fn remaining_messages(&self, ctx: &Context) -> Remaining<M> {
        Remaining {
            queue: self.queue.clone(),
            active: ctx.is_shutdown(),
        }
    }

    pub(crate) fn shared(&self) -> SharedQueue<M> {
        self.queue.clone()
    }

    pub(crate) fn owner(&self) -> Option<&EdgeOwner> {
        self.owner.as_ref()
    }
}

impl<M> Default for Port<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M> Edge for Port<M> {
    fn bind(&mut self, owner: &EdgeOwner) -> Result<(), SimulationError> {
        bind_owner(&mut self.owner, owner)
    }

    fn head_time(&self) -> SimTime {
        Port::head_time(self)
    }

    fn pending(&self) -> usize {
        Port::pending(self)
    }

    fn delivered(&self) -> u64 {
        self.queue.borrow().delivered
    }
}

/// Lazy iterator over the messages due at one tick.
///
/// Holds its own handle to the queue, so the owning component remains free
/// to use its other edges (including links that target this same port)
/// while iterating.
pub struct Messages<M> {
    queue: SharedQueue<M>,
    now: SimTime,
    active: bool,
}

impl<M> Iterator for Messages<M> {
    type Item = M;

    fn next(&mut self) -> Option<M> {
        if !self.active {
            return None;
        }
        let mut queue = self.queue.borrow_mut();
        let head_time = queue.heap.peek()?.time;
        assert!(
            head_time >= self.now,
            "event scheduled for tick {} observed at tick {}",
            head_time,
            self.now
        );
        if head_time != self.now {
            return None;
        }
        queue.delivered += 1;
        queue.heap.pop().map(|event| event.message)
    }
}

/// Draining iterator over all leftover events, used at shutdown.
pub struct Remaining<M> {
    queue: SharedQueue<M>,
    active: bool,
}

impl<M> Iterator for Remaining<M> {
    type Item = (M, SimTime);

    fn next(&mut self) -> Option<(M, SimTime)> {
        if !self.active {
            return None;
        }
        let mut queue = self.queue.borrow_mut();
        queue.heap.pop().map(|event| (event.message, event.time))
    }
}
