//! The simulation orchestrator.
//!
//! The `Simulator` owns the registered components, tracks the current tick
//! and the global next-event horizon, and drives the main loop: one startup
//! round, then repeated advances of simulated time to the earliest pending
//! event, then one shutdown round. Components run in registration order
//! within a tick, and only the components that actually have an event due
//! at the new current time are invoked.

use std::any::type_name;
use std::cell::RefCell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::component::{Component, Context, Phase};
use crate::config::SimParams;
use crate::edge::{EdgeOwner, SimClock};
use crate::error::{SimResult, SimulationError};
use crate::types::{ComponentId, SimTime, NO_EVENT};

/// Why a run terminated.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuitReason {
    /// No component had any pending event left.
    Exhausted,
    /// The configured quit time was exceeded.
    Deadline,
    /// A component requested termination through its context.
    Requested,
}

/// Statistics collected over one run.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SimulatorStats {
    /// Number of ticks at which at least one component ran.
    pub ticks_executed: u64,
    /// Total behavior invocations, including startup and shutdown rounds.
    pub activations: u64,
    /// Events consumed through regular message iterators.
    pub events_delivered: u64,
    /// Events still queued when the shutdown round began.
    pub events_remaining: u64,
    /// Simulated time when the run ended.
    pub final_time: SimTime,
    /// The termination condition that fired, set once `run` returns.
    pub quit_reason: Option<QuitReason>,
}

struct Registered {
    label: &'static str,
    component: Rc<RefCell<dyn Component>>,
    next_event: SimTime,
}

/// The simulation orchestrator.
///
/// Components are registered once, before `run`; the graph cannot change
/// once the loop has started. Callers keep their own `Rc` handles to the
/// components they register, both to connect links after registration and
/// to inspect state when the run is over.
pub struct Simulator {
    clock: Rc<SimClock>,
    components: Vec<Registered>,
    quit_time: SimTime,
    quit_requested: bool,
    stats: SimulatorStats,
}

impl Simulator {
    /// Creates a simulator.
    ///
    /// A `quit_time` of zero means "run until no events remain"; any other
    /// value terminates the loop once the current time exceeds it.
    pub fn new(quit_time: SimTime) -> Self {
        Self {
            clock: Rc::new(SimClock::new()),
            components: Vec::new(),
            quit_time,
            quit_requested: false,
            stats: SimulatorStats::default(),
        }
    }

    /// Creates a simulator from loaded parameters.
    pub fn with_params(params: &SimParams) -> Self {
        Self::new(params.quit_time)
    }

    /// The current simulated time.
    pub fn current_time(&self) -> SimTime {
        self.clock.now()
    }

    /// The configured quit time, zero meaning unbounded.
    pub fn quit_time(&self) -> SimTime {
        self.quit_time
    }

    /// Number of registered components.
    pub fn component_count(&self) -> usize {
        self.components.len()
    }

    /// Statistics for the most recent run.
    pub fn stats(&self) -> &SimulatorStats {
        &self.stats
    }

    /// Requests cooperative termination.
    ///
    /// Inside a behavior callback use [`Context::quit`] instead; this
    /// method covers the host application side, for instance to stop a run
    /// before it starts. The main loop never begins once the flag is set,
    /// but startup and shutdown rounds still run for every component.
    pub fn quit(&mut self) {
        self.quit_requested = true;
    }

    /// Registers a component and wires the back-references of every edge
    /// its walker yields.
    ///
    /// Registration order is the order components run in within a tick.
    /// Fails with `BackRefConflict` when an edge already belongs to a
    /// different component, which includes registering one component with
    /// two simulators. Registering the same component twice is not
    /// supported.
    pub fn register<C: Component + 'static>(
        &mut self,
        component: Rc<RefCell<C>>,
    ) -> SimResult<ComponentId> {
        let id = ComponentId(self.components.len());
        let owner = EdgeOwner::new(id, self.clock.clone());
        for edge in component.borrow_mut().edges() {
            edge.bind(&owner)?;
        }
        let label = type_name::<C>();
        debug!(component = label, id = id.index(), "registered component");
        let shared: Rc<RefCell<dyn Component>> = component;
        self.components.push(Registered {
            label,
            component: shared,
            next_event: NO_EVENT,
        });
        Ok(id)
    }

    /// Runs the simulation to completion.
    ///
    /// Validates link connectivity, invokes every component once with the
    /// startup phase, then advances simulated time to the global minimum
    /// next-event tick until a termination condition fires, and finally
    /// invokes every component once with the shutdown phase. An error
    /// returned by a behavior aborts the run at that call, skipping the
    /// remaining rounds.
    pub fn run(&mut self) -> SimResult<()> {
        self.validate_graph()?;
        self.stats = SimulatorStats::default();
        let count = self.components.len();
        debug!(
            components = count,
            quit_time = self.quit_time,
            "simulation starting"
        );

        for index in 0..count {
            self.activate_at(index, Phase::Startup)?;
        }

        let mut next = self.refresh_next_events();
        while self.keep_going(next) {
            self.clock.advance(next);
            trace!(tick = next, "advancing simulated time");
            self.stats.ticks_executed += 1;
            for index in 0..count {
                if self.recompute_next_event(index) == next {
                    self.activate_at(index, Phase::Tick)?;
                }
            }
            next = self.refresh_next_events();
        }

        self.stats.quit_reason = Some(if self.quit_requested {
            QuitReason::Requested
        } else if next == NO_EVENT {
            QuitReason::Exhausted
        } else {
            QuitReason::Deadline
        });
        self.stats.events_remaining = self.sum_edges(|edge| edge.pending() as u64);

        for index in 0..count {
            self.activate_at(index, Phase::Shutdown)?;
        }

        self.stats.events_delivered = self.sum_edges(|edge| edge.delivered());
        self.stats.final_time = self.clock.now();
        debug!(
            final_time = self.stats.final_time,
            ticks = self.stats.ticks_executed,
            reason = ?self.stats.quit_reason,
            "simulation finished"
        );
        Ok(())
    }

    /// Exports run statistics and per-component queue state as JSON.
    pub fn export_stats(&mut self) -> serde_json::Value {
        let mut components = Vec::with_capacity(self.components.len());
        for index in 0..self.components.len() {
            let entry = &self.components[index];
            let label = entry.label;
            let shared = entry.component.clone();
            let mut component = shared.borrow_mut();
            let mut pending = 0usize;
            let mut delivered = 0u64;
            for edge in component.edges() {
                pending += edge.pending();
                delivered += edge.delivered();
            }
            components.push(serde_json::json!({
                "id": index,
                "component": label,
                "pending": pending,
                "delivered": delivered,
            }));
        }
        serde_json::json!({
            "simulator": {
                "current_time": self.clock.now(),
                "quit_time": self.quit_time,
                "component_count": self.components.len(),
                "ticks_executed": self.stats.ticks_executed,
                "activations": self.stats.activations,
                "events_delivered": self.stats.events_delivered,
                "events_remaining": self.stats.events_remaining,
                "quit_reason": self.stats.quit_reason,
            },
            "components": components,
        })
    }

    fn keep_going(&self, next: SimTime) -> bool {
        !self.quit_requested
            && next != NO_EVENT
            && (self.quit_time == 0 || self.quit_time >= self.clock.now())
    }

    fn validate_graph(&mut self) -> SimResult<()> {
        for index in 0..self.components.len() {
            let shared = self.components[index].component.clone();
            let mut component = shared.borrow_mut();
            for edge in component.edges() {
                edge.validate()?;
            }
        }
        Ok(())
    }

    fn activate_at(&mut self, index: usize, phase: Phase) -> SimResult<()> {
        let shared = self.components[index].component.clone();
        let mut ctx = Context::new(self.clock.now(), phase);
        shared.borrow_mut().activate(&mut ctx)?;
        if ctx.quit_requested() {
            self.quit_requested = true;
        }
        self.stats.activations += 1;
        Ok(())
    }

    /// Recomputes one component's next-event time as the minimum head time
    /// across its edges.
    fn recompute_next_event(&mut self, index: usize) -> SimTime {
        let shared = self.components[index].component.clone();
        let mut component = shared.borrow_mut();
        let mut next = NO_EVENT;
        for edge in component.edges() {
            next = next.min(edge.head_time());
        }
        drop(component);
        self.components[index].next_event = next;
        next
    }

    /// Recomputes every component's next-event time and returns the global
    /// minimum over the stored values.
    fn refresh_next_events(&mut self) -> SimTime {
        for index in 0..self.components.len() {
            self.recompute_next_event(index);
        }
        self.components
            .iter()
            .map(|entry| entry.next_event)
            .min()
            .unwrap_or(NO_EVENT)
    }

    fn sum_edges(&mut self, f: impl Fn(&dyn crate::edge::Edge) -> u64) -> u64 {
        let mut total = 0;
        for index in 0..self.components.len() {
            let shared = self.components[index].component.clone();
            let mut component = shared.borrow_mut();
            for edge in component.edges() {
                total += f(edge);
            }
        }
        total
    }
}

impl Default for Simulator {
    fn default() -> Self {
        Self::new(0)
    }
}
