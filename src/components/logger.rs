//! In-simulation logging.
//!
//! Logging is deliberately not engine logic: the [`EventLog`] is an
//! ordinary component with a port of [`LogRecord`] messages, and producers
//! hold a [`LogHandle`] that filters by level and ships records over a
//! [`BatchLink`]. The batch link keeps log traffic off the user-visible
//! timeline while still delivering every record before shutdown drains.
//!
//! The sink forwards records to the `tracing` facade, so whatever
//! subscriber the host application installed decides where they end up.

use serde::{Deserialize, Serialize};

use crate::component::{Component, Context};
use crate::edge::Edge;
use crate::error::SimulationError;
use crate::link::BatchLink;
use crate::port::Port;
use crate::types::SimTime;

/// Severity of a log record, ordered from most to least verbose.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

/// A structured log record produced inside the simulation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogRecord {
    /// Severity of the record.
    pub level: LogLevel,
    /// Name of the producing component.
    pub origin: String,
    /// The logged message body.
    pub body: String,
    /// Simulated time at which the record was produced.
    pub tick: SimTime,
}

/// Producer-side handle to the logging component.
///
/// Components embed a handle, include its link in their edge walker, and
/// connect it to the [`EventLog`]'s input port. Records below the handle's
/// minimum level are dropped before they ever reach the link.
pub struct LogHandle {
    link: BatchLink<LogRecord>,
    origin: String,
    min_level: LogLevel,
}

impl LogHandle {
    /// Creates a handle reporting under the given origin name.
    pub fn new(origin: impl Into<String>) -> Self {
        Self {
            link: BatchLink::new(),
            origin: origin.into(),
            min_level: LogLevel::Trace,
        }
    }

    /// Drops records below `level` at the producer.
    pub fn with_min_level(mut self, level: LogLevel) -> Self {
        self.min_level = level;
        self
    }

    /// Connects this handle to a logging component's input port.
    pub fn connect(&mut self, log: &EventLog) -> Result<(), SimulationError> {
        self.link.connect(&log.input)
    }

    /// Emits a record at the given level and the current tick.
    ///
    /// Filtered records are dropped silently; anything else requires the
    /// handle to be connected, like any other link.
    pub fn emit(
        &self,
        ctx: &Context,
        level: LogLevel,
        body: impl Into<String>,
    ) -> Result<(), SimulationError> {
        if level < self.min_level {
            return Ok(());
        }
        self.link.send(LogRecord {
            level,
            origin: self.origin.clone(),
            body: body.into(),
            tick: ctx.now(),
        })
    }

    /// The edge backing this handle, for the owning component's walker.
    pub fn link_mut(&mut self) -> &mut BatchLink<LogRecord> {
        &mut self.link
    }
}

/// The logging component: collects [`LogRecord`]s and forwards them to the
/// `tracing` facade.
pub struct EventLog {
    /// Inbound endpoint every [`LogHandle`] connects to.
    pub input: Port<LogRecord>,
    records_seen: u64,
}

impl EventLog {
    /// Creates the logging component.
    pub fn new() -> Self {
        Self {
            input: Port::new(),
            records_seen: 0,
        }
    }

    /// Number of records received, including shutdown leftovers.
    pub fn records_seen(&self) -> u64 {
        self.records_seen
    }

    fn forward(record: &LogRecord) {
        match record.level {
            LogLevel::Trace => tracing::trace!(
                origin = %record.origin,
                tick = record.tick,
                "{}",
                record.body
            ),
            LogLevel::Debug => tracing::debug!(
                origin = %record.origin,
                tick = record.tick,
                "{}",
                record.body
            ),
            LogLevel::Info => tracing::info!(
                origin = %record.origin,
                tick = record.tick,
                "{}",
                record.body
            ),
            LogLevel::Warn => tracing::warn!(
                origin = %record.origin,
                tick = record.tick,
                "{}",
                record.body
            ),
            LogLevel::Error => tracing::error!(
                origin = %record.origin,
                tick = record.tick,
                "{}",
                record.body
            ),
        }
    }
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for EventLog {
    fn activate(&mut self, ctx: &mut Context) -> Result<(), SimulationError> {
        if ctx.is_shutdown() {
            for (record, _) in self.input.remaining_messages(ctx) {
                Self::forward(&record);
                self.records_seen += 1;
            }
            return Ok(());
        }
        for record in self.input.messages(ctx) {
            Self::forward(&record);
            self.records_seen += 1;
        }
        Ok(())
    }

    fn edges(&mut self) -> Vec<&mut dyn Edge> {
        vec![&mut self.input]
    }
}
