#![allow(dead_code)]

// Shared harness: recording lamp pins, a fake button, and a virtual clock
// built on embassy-time's mock driver. The mock clock is process-wide, so
// each scenario file holds a single clock-driven test.

use std::{
    cell::{Cell, RefCell},
    convert::Infallible,
    future::Future,
    rc::Rc,
};

use crossing::{
    Config, Controller, Crossing, Event, Lamp, Lamps, Mode,
    event::{EVENT_CAPACITY, EVENT_PUBLISHERS, EVENT_SUBSCRIBERS},
    run_day,
};
use embassy_futures::{
    block_on,
    select::{Either, select},
    yield_now,
};
use embassy_sync::{blocking_mutex::raw::NoopRawMutex, pubsub::Subscriber};
use embassy_time::{Duration, Instant, MockDriver};
use embedded_hal::digital::{self, ErrorKind, ErrorType, InputPin, OutputPin};

pub type TestCrossing = Crossing<NoopRawMutex, MockLamp>;

/// One write to a lamp pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    pub at_ms: u64,
    pub lamp: Lamp,
    pub high: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aspect {
    Dark,
    Green,
    Yellow,
    Red,
}

impl Aspect {
    fn of(green: bool, red: bool) -> Self {
        match (green, red) {
            (false, false) => Aspect::Dark,
            (true, false) => Aspect::Green,
            (true, true) => Aspect::Yellow,
            (false, true) => Aspect::Red,
        }
    }
}

#[derive(Debug)]
pub struct PinFault;

impl digital::Error for PinFault {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Other
    }
}

pub struct MockLamp {
    lamp: Lamp,
    edges: Rc<RefCell<Vec<Edge>>>,
    fault: Rc<Cell<bool>>,
}

impl MockLamp {
    fn write(&mut self, high: bool) -> Result<(), PinFault> {
        if self.fault.get() {
            return Err(PinFault);
        }
        self.edges.borrow_mut().push(Edge {
            at_ms: now_ms(),
            lamp: self.lamp,
            high,
        });
        Ok(())
    }
}

impl ErrorType for MockLamp {
    type Error = PinFault;
}

impl OutputPin for MockLamp {
    fn set_low(&mut self) -> Result<(), PinFault> {
        self.write(false)
    }

    fn set_high(&mut self) -> Result<(), PinFault> {
        self.write(true)
    }
}

/// The two lamp pins as seen from outside: every write, and switches to
/// make writes fail.
pub struct Panel {
    edges: Rc<RefCell<Vec<Edge>>>,
    faults: [Rc<Cell<bool>>; 2],
}

impl Panel {
    pub fn new() -> (Self, Lamps<MockLamp>) {
        let edges = Rc::new(RefCell::new(Vec::new()));
        let faults = [Rc::new(Cell::new(false)), Rc::new(Cell::new(false))];
        let pin = |lamp: Lamp, fault: &Rc<Cell<bool>>| MockLamp {
            lamp,
            edges: edges.clone(),
            fault: fault.clone(),
        };
        let lamps = Lamps::new(pin(Lamp::Green, &faults[0]), pin(Lamp::Red, &faults[1]));
        (Self { edges, faults }, lamps)
    }

    pub fn edges(&self) -> Vec<Edge> {
        self.edges.borrow().clone()
    }

    pub fn set_fault(&self, lamp: Lamp, failing: bool) {
        let index = match lamp {
            Lamp::Green => 0,
            Lamp::Red => 1,
        };
        self.faults[index].set(failing);
    }

    /// Aspect changes, taking the settled state at each instant so that the
    /// writes of one hand-over collapse into a single change.
    pub fn aspects(&self) -> Vec<(u64, Aspect)> {
        let mut green = false;
        let mut red = false;
        let mut aspects: Vec<(u64, Aspect)> = Vec::new();
        let edges = self.edges();

        let mut i = 0;
        while i < edges.len() {
            let at_ms = edges[i].at_ms;
            while i < edges.len() && edges[i].at_ms == at_ms {
                match edges[i].lamp {
                    Lamp::Green => green = edges[i].high,
                    Lamp::Red => red = edges[i].high,
                }
                i += 1;
            }
            let aspect = Aspect::of(green, red);
            let last = aspects.last().map(|(_, a)| *a).unwrap_or(Aspect::Dark);
            if aspect != last {
                aspects.push((at_ms, aspect));
            }
        }
        aspects
    }

    pub fn aspect_now(&self) -> Aspect {
        self.aspects().last().map(|(_, a)| *a).unwrap_or(Aspect::Dark)
    }
}

pub struct MockButton {
    pressed: Rc<Cell<bool>>,
}

impl ErrorType for MockButton {
    type Error = Infallible;
}

// Pulled up: a press reads low.
impl InputPin for MockButton {
    fn is_high(&mut self) -> Result<bool, Infallible> {
        Ok(!self.pressed.get())
    }

    fn is_low(&mut self) -> Result<bool, Infallible> {
        Ok(self.pressed.get())
    }
}

pub struct Button {
    pressed: Rc<Cell<bool>>,
}

impl Button {
    pub fn new() -> (Self, MockButton) {
        let pressed = Rc::new(Cell::new(false));
        (
            Self {
                pressed: pressed.clone(),
            },
            MockButton { pressed },
        )
    }

    pub fn press(&self) {
        self.pressed.set(true);
    }

    pub fn release(&self) {
        self.pressed.set(false);
    }
}

pub fn now_ms() -> u64 {
    Instant::now().as_millis()
}

/// Let every task run until it blocks again, without moving the clock.
pub async fn settle() {
    for _ in 0..32 {
        yield_now().await;
    }
}

/// Move the clock forward by one millisecond.
pub fn tick() {
    MockDriver::get().advance(Duration::from_millis(1));
}

/// Move the clock forward a millisecond at a time, settling after each.
pub async fn advance_to(ms: u64) {
    while now_ms() < ms {
        tick();
        settle().await;
    }
}

/// A day-mode crossing built through the controller, as the board does it.
pub fn day_crossing() -> (Panel, Button, TestCrossing, MockButton) {
    let (panel, lamps) = Panel::new();
    let (button, input) = Button::new();
    let Controller::Day(day) = Controller::new(&Config::new(Mode::Day), lamps, input) else {
        panic!("day config produced a night controller");
    };
    let (crossing, input) = day.into_parts::<NoopRawMutex>();
    (panel, button, crossing, input)
}

/// Run the day tasks against `script` until the script finishes.
pub fn run_scenario<T>(
    crossing: &TestCrossing,
    input: MockButton,
    script: impl Future<Output = T>,
) -> T {
    MockDriver::get().reset();
    block_on(async {
        match select(run_day(crossing, input), script).await {
            Either::First(never) => match never {},
            Either::Second(result) => result,
        }
    })
}

pub type EventLog<'a> =
    Subscriber<'a, NoopRawMutex, Event, EVENT_CAPACITY, EVENT_SUBSCRIBERS, EVENT_PUBLISHERS>;

/// Drain whatever the subscriber has queued, stamped with the current time.
pub fn drain(subscriber: &mut EventLog<'_>, into: &mut Vec<(u64, Event)>) {
    while let Some(event) = subscriber.try_next_message_pure() {
        into.push((now_ms(), event));
    }
}

/// Like `advance_to`, collecting events as they happen.
pub async fn advance_recording(
    ms: u64,
    subscriber: &mut EventLog<'_>,
    into: &mut Vec<(u64, Event)>,
) {
    drain(subscriber, into);
    while now_ms() < ms {
        tick();
        settle().await;
        drain(subscriber, into);
    }
}
