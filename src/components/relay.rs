//! Forwarding hop with an optional added delay.

use crate::component::{Component, Context};
use crate::edge::Edge;
use crate::error::SimulationError;
use crate::link::Link;
use crate::port::Port;
use crate::types::SimTime;

/// A component that forwards every message it receives.
///
/// Useful for modeling fixed-latency hops such as a network switch or a
/// pipeline stage: a message arriving at tick `t` leaves on the output
/// link and arrives at `t + latency + added_delay`.
pub struct Relay<M> {
    /// Inbound endpoint; connect upstream links here.
    pub input: Port<M>,
    /// Outbound link; connect it to the downstream port.
    pub output: Link<M>,
    added_delay: SimTime,
    forwarded: u64,
}

impl<M> Relay<M> {
    /// Creates a relay whose output link has the given latency.
    pub fn new(latency: SimTime) -> Result<Self, SimulationError> {
        Ok(Self {
            input: Port::new(),
            output: Link::new(latency)?,
            added_delay: 0,
            forwarded: 0,
        })
    }

    /// Adds a fixed extra delay to every forwarded message.
    pub fn with_added_delay(mut self, delay: SimTime) -> Self {
        self.added_delay = delay;
        self
    }

    /// Number of messages forwarded so far.
    pub fn forwarded(&self) -> u64 {
        self.forwarded
    }
}

impl<M: 'static> Component for Relay<M> {
    fn activate(&mut self, ctx: &mut Context) -> Result<(), SimulationError> {
        for message in self.input.messages(ctx) {
            self.output.send_delayed(message, self.added_delay)?;
            self.forwarded += 1;
        }
        Ok(())
    }

    fn edges(&mut self) -> Vec<&mut dyn Edge> {
        vec![&mut self.input, &mut self.output]
    }
}
