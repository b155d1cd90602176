//! Fixed-schedule message source.

use crate::component::{Component, Context};
use crate::edge::Edge;
use crate::error::SimulationError;
use crate::link::Link;
use crate::types::SimTime;

/// A component that sends a fixed schedule of messages at startup.
///
/// Each scheduled entry is a `(message, extra_delay)` pair; the message is
/// delivered at `latency + extra_delay`, so a single emitter can spread its
/// output over the timeline.
///
/// # Example
///
/// ```
/// use orrery::components::Emitter;
///
/// let emitter = Emitter::new(1)
///     .unwrap()
///     .with_message(1u32, 0)
///     .with_message(2u32, 5);
/// assert_eq!(emitter.scheduled(), 2);
/// ```
pub struct Emitter<M> {
    /// The outbound link; connect it to the receiving port.
    pub output: Link<M>,
    schedule: Vec<(M, SimTime)>,
    quit_after_send: bool,
    sent: u64,
}

impl<M: Clone> Emitter<M> {
    /// Creates an emitter whose link has the given latency.
    pub fn new(latency: SimTime) -> Result<Self, SimulationError> {
        Ok(Self {
            output: Link::new(latency)?,
            schedule: Vec::new(),
            quit_after_send: false,
            sent: 0,
        })
    }

    /// Adds a message to the startup schedule with the given extra delay.
    pub fn with_message(mut self, message: M, extra_delay: SimTime) -> Self {
        self.schedule.push((message, extra_delay));
        self
    }

    /// Requests cooperative termination right after the startup sends.
    pub fn then_quit(mut self) -> Self {
        self.quit_after_send = true;
        self
    }

    /// Number of scheduled messages.
    pub fn scheduled(&self) -> usize {
        self.schedule.len()
    }

    /// Number of messages sent so far.
    pub fn sent(&self) -> u64 {
        self.sent
    }
}

impl<M: Clone + 'static> Component for Emitter<M> {
    fn activate(&mut self, ctx: &mut Context) -> Result<(), SimulationError> {
        if !ctx.is_startup() {
            return Ok(());
        }
        for (message, extra_delay) in &self.schedule {
            self.output.send_delayed(message.clone(), *extra_delay)?;
            self.sent += 1;
        }
        if self.quit_after_send {
            ctx.quit();
        }
        Ok(())
    }

    fn edges(&mut self) -> Vec<&mut dyn Edge> {
        vec![&mut self.output]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_accumulates_schedule() {
        let emitter = Emitter::new(2)
            .unwrap()
            .with_message("a", 0)
            .with_message("b", 10);
        assert_eq!(emitter.scheduled(), 2);
        assert_eq!(emitter.output.latency(), 2);
        assert_eq!(emitter.sent(), 0);
    }

    #[test]
    fn test_zero_latency_propagates() {
        assert!(matches!(
            Emitter::<u8>::new(0),
            Err(SimulationError::InvalidLatency)
        ));
    }
}
