//! Message sink for observation.

use crate::component::{Component, Context};
use crate::edge::Edge;
use crate::error::SimulationError;
use crate::port::Port;
use crate::types::SimTime;

/// A sink that records every message it receives together with its arrival
/// tick, and separately whatever was still queued at shutdown.
///
/// Keep an `Rc` handle to the recorder when registering it and read the
/// collected pairs back once the run is over.
pub struct Recorder<M> {
    /// Inbound endpoint; connect sending links here.
    pub input: Port<M>,
    received: Vec<(M, SimTime)>,
    remaining: Vec<(M, SimTime)>,
}

impl<M> Recorder<M> {
    /// Creates an empty recorder.
    pub fn new() -> Self {
        Self {
            input: Port::new(),
            received: Vec::new(),
            remaining: Vec::new(),
        }
    }

    /// Messages delivered during the run, in delivery order.
    pub fn received(&self) -> &[(M, SimTime)] {
        &self.received
    }

    /// Events that were still queued when shutdown ran, in time order.
    pub fn remaining(&self) -> &[(M, SimTime)] {
        &self.remaining
    }
}

impl<M> Default for Recorder<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: 'static> Component for Recorder<M> {
    fn activate(&mut self, ctx: &mut Context) -> Result<(), SimulationError> {
        if ctx.is_shutdown() {
            for pair in self.input.remaining_messages(ctx) {
                self.remaining.push(pair);
            }
            return Ok(());
        }
        let now = ctx.now();
        for message in self.input.messages(ctx) {
            self.received.push((message, now));
        }
        Ok(())
    }

    fn edges(&mut self) -> Vec<&mut dyn Edge> {
        vec![&mut self.input]
    }
}
