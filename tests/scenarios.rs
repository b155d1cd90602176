//! End-to-end simulation scenarios.
//!
//! Each test builds a small component graph, runs it to completion and
//! checks the observable delivery schedule: self-loops, point-to-point
//! messaging, out-of-order extra delays, broadcast fan-out, cooperative
//! quit with pending events, and timer cascades.

use std::cell::RefCell;
use std::rc::Rc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use orrery::components::{Emitter, Recorder};
use orrery::{
    BcastLink, Component, Context, Edge, Link, Port, QuitReason, SimTime, SimulationError,
    Simulator, Timer,
};

// ============================================================================
// Test Components
// ============================================================================

/// A component wired to itself: sends once at startup, records arrivals.
struct SelfLooper {
    port: Port<bool>,
    link: Link<bool>,
    hits: Vec<SimTime>,
}

impl SelfLooper {
    fn new(latency: SimTime) -> Rc<RefCell<Self>> {
        let looper = Rc::new(RefCell::new(Self {
            port: Port::new(),
            link: Link::new(latency).unwrap(),
            hits: Vec::new(),
        }));
        {
            let mut guard = looper.borrow_mut();
            let inner = &mut *guard;
            inner.link.connect(&inner.port).unwrap();
        }
        looper
    }
}

impl Component for SelfLooper {
    fn activate(&mut self, ctx: &mut Context) -> Result<(), SimulationError> {
        if ctx.is_startup() {
            self.link.send(true)?;
            return Ok(());
        }
        for _ in self.port.messages(ctx) {
            self.hits.push(ctx.now());
        }
        Ok(())
    }

    fn edges(&mut self) -> Vec<&mut dyn Edge> {
        vec![&mut self.port, &mut self.link]
    }
}

/// Broadcasts one message at startup.
struct Broadcaster {
    link: BcastLink<i64>,
    payload: i64,
}

impl Broadcaster {
    fn new(latency: SimTime, payload: i64) -> Self {
        Self {
            link: BcastLink::new(latency).unwrap(),
            payload,
        }
    }
}

impl Component for Broadcaster {
    fn activate(&mut self, ctx: &mut Context) -> Result<(), SimulationError> {
        if ctx.is_startup() {
            self.link.send(self.payload)?;
        }
        Ok(())
    }

    fn edges(&mut self) -> Vec<&mut dyn Edge> {
        vec![&mut self.link]
    }
}

/// Arms a timer at startup and re-arms with random positive delays until a
/// fixed number of firings have happened.
struct Cascade {
    timer: Timer<u32>,
    remaining_arms: u32,
    rng: StdRng,
    sent: Vec<(u32, SimTime)>,
    fired: Vec<(u32, SimTime)>,
}

impl Cascade {
    fn new(arms: u32, seed: u64) -> Self {
        Self {
            timer: Timer::new(),
            remaining_arms: arms,
            rng: StdRng::seed_from_u64(seed),
            sent: Vec::new(),
            fired: Vec::new(),
        }
    }

    fn arm(&mut self, ctx: &Context) -> Result<(), SimulationError> {
        let delay = self.rng.gen_range(1..=9);
        let message = self.remaining_arms;
        self.sent.push((message, ctx.now() + delay));
        self.timer.set(message, delay)?;
        self.remaining_arms -= 1;
        Ok(())
    }
}

impl Component for Cascade {
    fn activate(&mut self, ctx: &mut Context) -> Result<(), SimulationError> {
        if ctx.is_startup() {
            return self.arm(ctx);
        }
        if ctx.is_shutdown() {
            return Ok(());
        }
        let due: Vec<u32> = self.timer.messages(ctx).collect();
        for message in due {
            self.fired.push((message, ctx.now()));
            if self.remaining_arms > 0 {
                self.arm(ctx)?;
            }
        }
        Ok(())
    }

    fn edges(&mut self) -> Vec<&mut dyn Edge> {
        vec![&mut self.timer]
    }
}

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn test_self_loop_delivers_once_at_latency() {
    let mut sim = Simulator::new(0);
    let looper = SelfLooper::new(1);
    sim.register(looper.clone()).unwrap();

    sim.run().unwrap();

    assert_eq!(looper.borrow().hits, vec![1]);
    assert_eq!(sim.current_time(), 1);
    assert_eq!(sim.stats().quit_reason, Some(QuitReason::Exhausted));
}

#[test]
fn test_two_components_one_message() {
    let mut sim = Simulator::new(0);
    let sender = Rc::new(RefCell::new(
        Emitter::new(1).unwrap().with_message(42i64, 0),
    ));
    let receiver = Rc::new(RefCell::new(Recorder::<i64>::new()));
    sim.register(sender.clone()).unwrap();
    sim.register(receiver.clone()).unwrap();
    sender
        .borrow_mut()
        .output
        .connect(&receiver.borrow().input)
        .unwrap();

    sim.run().unwrap();

    assert_eq!(receiver.borrow().received(), &[(42, 1)]);
    assert!(receiver.borrow().remaining().is_empty());
}

#[test]
fn test_multi_delay_batch_arrives_spread_out() {
    let mut sim = Simulator::new(0);
    let sender = Rc::new(RefCell::new(
        Emitter::new(1)
            .unwrap()
            .with_message(1i64, 0)
            .with_message(2i64, 5)
            .with_message(3i64, 25),
    ));
    let receiver = Rc::new(RefCell::new(Recorder::<i64>::new()));
    sim.register(sender.clone()).unwrap();
    sim.register(receiver.clone()).unwrap();
    sender
        .borrow_mut()
        .output
        .connect(&receiver.borrow().input)
        .unwrap();

    sim.run().unwrap();

    // Delivery time is send time + latency + extra delay, exactly.
    assert_eq!(receiver.borrow().received(), &[(1, 1), (2, 6), (3, 26)]);
    assert_eq!(sim.stats().ticks_executed, 3);
}

#[test]
fn test_broadcast_reaches_every_receiver() {
    let mut sim = Simulator::new(0);
    let sender = Rc::new(RefCell::new(Broadcaster::new(1, 42)));
    let first = Rc::new(RefCell::new(Recorder::<i64>::new()));
    let second = Rc::new(RefCell::new(Recorder::<i64>::new()));
    sim.register(sender.clone()).unwrap();
    sim.register(first.clone()).unwrap();
    sim.register(second.clone()).unwrap();
    sender.borrow_mut().link.connect(&first.borrow().input).unwrap();
    sender
        .borrow_mut()
        .link
        .connect(&second.borrow().input)
        .unwrap();
    assert_eq!(sender.borrow().link.target_count(), 2);

    sim.run().unwrap();

    assert_eq!(first.borrow().received(), &[(42, 1)]);
    assert_eq!(second.borrow().received(), &[(42, 1)]);
    assert_eq!(sim.stats().events_delivered, 2);
}

#[test]
fn test_quit_leaves_message_for_shutdown_drain() {
    let mut sim = Simulator::new(0);
    let sender = Rc::new(RefCell::new(
        Emitter::new(1).unwrap().with_message(42i64, 0).then_quit(),
    ));
    let receiver = Rc::new(RefCell::new(Recorder::<i64>::new()));
    sim.register(sender.clone()).unwrap();
    sim.register(receiver.clone()).unwrap();
    sender
        .borrow_mut()
        .output
        .connect(&receiver.borrow().input)
        .unwrap();

    sim.run().unwrap();

    // The regular handler never saw the message; the shutdown drain did.
    assert!(receiver.borrow().received().is_empty());
    assert_eq!(receiver.borrow().remaining(), &[(42, 1)]);
    assert_eq!(sim.stats().quit_reason, Some(QuitReason::Requested));
    assert_eq!(sim.current_time(), 0);
}

#[test]
fn test_timer_cascade_fires_in_order() {
    let mut sim = Simulator::new(0);
    let cascade = Rc::new(RefCell::new(Cascade::new(8, 0xC0FFEE)));
    sim.register(cascade.clone()).unwrap();

    sim.run().unwrap();

    let cascade = cascade.borrow();
    assert_eq!(cascade.fired.len(), 8);
    // Every firing matches what was armed, at exactly the armed tick.
    assert_eq!(cascade.fired, cascade.sent);
    for window in cascade.fired.windows(2) {
        assert!(window[0].1 <= window[1].1, "firings out of order");
    }
}
