//! A small queueing simulation: customers arrive at a service desk, wait
//! their turn, and are served one at a time.
//!
//! Run with: `cargo run --example service_desk`

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use orrery::components::{EventLog, LogHandle, LogLevel, Recorder};
use orrery::{Component, Context, Edge, Link, Port, SimParams, SimTime, SimulationError, Simulator};

/// A customer heading for the desk.
#[derive(Clone, Debug)]
struct Customer {
    id: u32,
    arrived_at: SimTime,
}

/// A served customer, reported to the sink.
#[derive(Clone, Debug)]
struct Served {
    id: u32,
    waited: SimTime,
}

/// Emits a fixed arrival plan at startup, spread over the timeline.
struct Arrivals {
    output: Link<Customer>,
    inter_arrival: SimTime,
    count: u32,
    log: LogHandle,
}

impl Arrivals {
    fn new(count: u32, inter_arrival: SimTime) -> Result<Self, SimulationError> {
        Ok(Self {
            output: Link::new(1)?,
            inter_arrival,
            count,
            log: LogHandle::new("arrivals").with_min_level(LogLevel::Info),
        })
    }
}

impl Component for Arrivals {
    fn activate(&mut self, ctx: &mut Context) -> Result<(), SimulationError> {
        if !ctx.is_startup() {
            return Ok(());
        }
        for id in 0..self.count {
            let extra = SimTime::from(id) * self.inter_arrival;
            let arrived_at = ctx.now() + self.output.latency() + extra;
            self.output.send_delayed(Customer { id, arrived_at }, extra)?;
        }
        self.log
            .emit(ctx, LogLevel::Info, format!("planned {} arrivals", self.count))?;
        Ok(())
    }

    fn edges(&mut self) -> Vec<&mut dyn Edge> {
        vec![&mut self.output, self.log.link_mut()]
    }
}

/// Serves one customer at a time, with a fixed service time modeled by a
/// self-directed link.
struct Desk {
    arrivals: Port<Customer>,
    done_port: Port<Customer>,
    done_link: Link<Customer>,
    output: Link<Served>,
    queue: VecDeque<Customer>,
    busy: bool,
    log: LogHandle,
}

impl Desk {
    fn new(service_time: SimTime) -> Result<Self, SimulationError> {
        Ok(Self {
            arrivals: Port::new(),
            done_port: Port::new(),
            done_link: Link::new(service_time)?,
            output: Link::new(1)?,
            queue: VecDeque::new(),
            busy: false,
            log: LogHandle::new("desk").with_min_level(LogLevel::Info),
        })
    }

    fn start_next(&mut self) -> Result<(), SimulationError> {
        if self.busy {
            return Ok(());
        }
        if let Some(customer) = self.queue.pop_front() {
            self.busy = true;
            self.done_link.send(customer)?;
        }
        Ok(())
    }
}

impl Component for Desk {
    fn activate(&mut self, ctx: &mut Context) -> Result<(), SimulationError> {
        if ctx.is_startup() || ctx.is_shutdown() {
            return Ok(());
        }
        for customer in self.arrivals.messages(ctx) {
            self.queue.push_back(customer);
        }
        let finished: Vec<Customer> = self.done_port.messages(ctx).collect();
        for customer in finished {
            self.busy = false;
            let waited = ctx.now() - customer.arrived_at;
            self.log.emit(
                ctx,
                LogLevel::Info,
                format!("served customer {} after {} ticks", customer.id, waited),
            )?;
            self.output.send(Served {
                id: customer.id,
                waited,
            })?;
        }
        self.start_next()
    }

    fn edges(&mut self) -> Vec<&mut dyn Edge> {
        vec![
            &mut self.arrivals,
            &mut self.done_port,
            &mut self.done_link,
            &mut self.output,
            self.log.link_mut(),
        ]
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let params = SimParams::from_yaml_str("quit_time: 0\nlog_level: info\n")?;
    let level: tracing::Level = params.log_level.parse().unwrap_or(tracing::Level::INFO);
    tracing_subscriber::fmt().with_max_level(level).init();

    let mut sim = Simulator::with_params(&params);

    let arrivals = Rc::new(RefCell::new(Arrivals::new(8, 3)?));
    let desk = Rc::new(RefCell::new(Desk::new(5)?));
    let sink = Rc::new(RefCell::new(Recorder::<Served>::new()));
    let log = Rc::new(RefCell::new(EventLog::new()));

    sim.register(arrivals.clone())?;
    sim.register(desk.clone())?;
    sim.register(sink.clone())?;
    sim.register(log.clone())?;

    {
        let mut desk_guard = desk.borrow_mut();
        let desk_inner = &mut *desk_guard;
        desk_inner.done_link.connect(&desk_inner.done_port)?;
    }
    arrivals.borrow_mut().output.connect(&desk.borrow().arrivals)?;
    desk.borrow_mut().output.connect(&sink.borrow().input)?;
    arrivals.borrow_mut().log.connect(&log.borrow())?;
    desk.borrow_mut().log.connect(&log.borrow())?;

    sim.run()?;

    println!("final time: {}", sim.current_time());
    for (served, tick) in sink.borrow().received() {
        println!(
            "customer {:>2} left at tick {:>3} after waiting {:>2} ticks",
            served.id, tick, served.waited
        );
    }
    println!("{}", serde_json::to_string_pretty(&sim.export_stats())?);

    Ok(())
}
