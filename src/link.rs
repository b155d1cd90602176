//! Outbound message edges.
//!
//! A [`Link`] carries messages from its owning component to exactly one
//! target [`Port`], always at least one tick in the future: the delivery
//! time of a send is `now + latency + extra_delay` with `latency >= 1`.
//! That strict-future guarantee is what keeps a tick closed once it runs,
//! and is also what would let components be spread across workers later
//! without changing user code, so the constructor rejects zero latencies
//! outright.
//!
//! [`BcastLink`] is the fan-out variant with zero or more targets, and
//! [`BatchLink`] a link whose latency the engine picks itself, reserved
//! for traffic whose timing is not part of the simulated semantics (log
//! records, for instance).
//!
//! Because `extra_delay` may vary per message, messages sent in order may
//! arrive out of order. That is intended behavior, not a defect.

use crate::edge::{bind_owner, Edge, EdgeOwner};
use crate::error::SimulationError;
use crate::port::{Port, SharedQueue};
use crate::types::SimTime;

/// Latency assigned to every [`BatchLink`]. Chosen by the engine so that
/// framework traffic stays off the user-visible timeline while remaining
/// open to batching optimizations later.
const BATCH_LATENCY: SimTime = 1;

/// A typed outbound edge with a fixed positive latency and one target port.
///
/// # Example
///
/// ```
/// use orrery::{Link, SimulationError};
///
/// assert!(matches!(
///     Link::<u32>::new(0),
///     Err(SimulationError::InvalidLatency)
/// ));
/// let link = Link::<u32>::new(3).unwrap();
/// assert_eq!(link.latency(), 3);
/// assert!(!link.is_connected());
/// ```
#[derive(Debug)]
pub struct Link<M> {
    latency: SimTime,
    owner: Option<EdgeOwner>,
    target: Option<SharedQueue<M>>,
}

impl<M> Link<M> {
    /// Creates a link with the given latency.
    ///
    /// Fails with `InvalidLatency` when `latency` is zero; every link must
    /// delay delivery by at least one tick.
    pub fn new(latency: SimTime) -> Result<Self, SimulationError> {
        if latency == 0 {
            return Err(SimulationError::InvalidLatency);
        }
        Ok(Self {
            latency,
            owner: None,
            target: None,
        })
    }

    /// The fixed latency of this link, in ticks.
    pub fn latency(&self) -> SimTime {
        self.latency
    }

    /// True once a target port has been set.
    pub fn is_connected(&self) -> bool {
        self.target.is_some()
    }

    /// Binds this link to its destination port.
    ///
    /// When both ends already belong to registered components, the owning
    /// components must be registered with the same simulator. Connecting an
    /// already-connected link replaces the previous target; the last
    /// connect wins.
    pub fn connect(&mut self, port: &Port<M>) -> Result<(), SimulationError> {
        check_same_simulator(self.owner.as_ref(), port.owner())?;
        self.target = Some(port.shared());
        Ok(())
    }

    /// Sends a message over this link, delivering at `now + latency`.
    pub fn send(&self, message: M) -> Result<(), SimulationError> {
        self.send_delayed(message, 0)
    }

    /// Sends a message with an additional per-message delay, delivering at
    /// `now + latency + extra_delay`.
    pub fn send_delayed(&self, message: M, extra_delay: SimTime) -> Result<(), SimulationError> {
        let target = self.target.as_ref().ok_or(SimulationError::Unconnected)?;
        let owner = self.owner.as_ref().ok_or(SimulationError::Unconnected)?;
        let time = owner.now() + self.latency + extra_delay;
        target.borrow_mut().push(message, time);
        Ok(())
    }
}

impl<M> Edge for Link<M> {
    fn bind(&mut self, owner: &EdgeOwner) -> Result<(), SimulationError> {
        bind_owner(&mut self.owner, owner)
    }

    fn validate(&self) -> Result<(), SimulationError> {
        if self.target.is_none() {
            return Err(SimulationError::Unconnected);
        }
        Ok(())
    }
}

/// A typed outbound edge delivering to any number of ports.
///
/// Each send pushes a copy of the message to every target with one shared
/// delivery time. A broadcast with no targets is a no-op rather than an
/// error, so optional listeners can simply stay unconnected.
#[derive(Debug)]
pub struct BcastLink<M> {
    latency: SimTime,
    owner: Option<EdgeOwner>,
    targets: Vec<SharedQueue<M>>,
}

impl<M> BcastLink<M> {
    /// Creates a broadcast link with the given latency.
    ///
    /// Fails with `InvalidLatency` when `latency` is zero.
    pub fn new(latency: SimTime) -> Result<Self, SimulationError> {
        if latency == 0 {
            return Err(SimulationError::InvalidLatency);
        }
        Ok(Self {
            latency,
            owner: None,
            targets: Vec::new(),
        })
    }

    /// The fixed latency of this link, in ticks.
    pub fn latency(&self) -> SimTime {
        self.latency
    }

    /// Number of connected target ports.
    pub fn target_count(&self) -> usize {
        self.targets.len()
    }

    /// Adds a destination port. Each connect appends; the same port may be
    /// added more than once, in which case it receives the message once per
    /// connection.
    pub fn connect(&mut self, port: &Port<M>) -> Result<(), SimulationError> {
        check_same_simulator(self.owner.as_ref(), port.owner())?;
        self.targets.push(port.shared());
        Ok(())
    }
}

impl<M: Clone> BcastLink<M> {
    /// Broadcasts a message to every connected port, delivering at
    /// `now + latency`.
    pub fn send(&self, message: M) -> Result<(), SimulationError> {
        self.send_delayed(message, 0)
    }

    /// Broadcasts with an additional per-message delay. All targets receive
    /// the same delivery time.
    pub fn send_delayed(&self, message: M, extra_delay: SimTime) -> Result<(), SimulationError> {
        if self.targets.is_empty() {
            return Ok(());
        }
        let owner = self.owner.as_ref().ok_or(SimulationError::Unconnected)?;
        let time = owner.now() + self.latency + extra_delay;
        for target in &self.targets {
            target.borrow_mut().push(message.clone(), time);
        }
        Ok(())
    }
}

impl<M> Edge for BcastLink<M> {
    fn bind(&mut self, owner: &EdgeOwner) -> Result<(), SimulationError> {
        bind_owner(&mut self.owner, owner)
    }
}

/// A link whose latency the engine chooses, currently one tick.
///
/// Reserved for framework-internal traffic such as log records, where the
/// latency is an implementation detail rather than simulated semantics.
/// The send contract is otherwise identical to [`Link`].
#[derive(Debug)]
pub struct BatchLink<M> {
    inner: Link<M>,
}

impl<M> BatchLink<M> {
    /// Creates a batch link. The latency is engine-chosen, so construction
    /// cannot fail.
    pub fn new() -> Self {
        Self {
            inner: Link {
                latency: BATCH_LATENCY,
                owner: None,
                target: None,
            },
        }
    }

    /// True once a target port has been set.
    pub fn is_connected(&self) -> bool {
        self.inner.is_connected()
    }

    /// Binds this link to its destination port. Same rules as
    /// [`Link::connect`].
    pub fn connect(&mut self, port: &Port<M>) -> Result<(), SimulationError> {
        self.inner.connect(port)
    }

    /// Sends a message, delivering at the engine-chosen latency.
    pub fn send(&self, message: M) -> Result<(), SimulationError> {
        self.inner.send(message)
    }

    /// Sends with an additional per-message delay.
    pub fn send_delayed(&self, message: M, extra_delay: SimTime) -> Result<(), SimulationError> {
        self.inner.send_delayed(message, extra_delay)
    }
}

impl<M> Default for BatchLink<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M> Edge for BatchLink<M> {
    fn bind(&mut self, owner: &EdgeOwner) -> Result<(), SimulationError> {
        self.inner.bind(owner)
    }

    fn validate(&self) -> Result<(), SimulationError> {
        self.inner.validate()
    }
}

fn check_same_simulator(
    link_owner: Option<&EdgeOwner>,
    port_owner: Option<&EdgeOwner>,
) -> Result<(), SimulationError> {
    if let (Some(link_owner), Some(port_owner)) = (link_owner, port_owner) {
        if !link_owner.same_simulator(port_owner) {
            return Err(SimulationError::CrossSimulator);
        }
    }
    Ok(())
}
