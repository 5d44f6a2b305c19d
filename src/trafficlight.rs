pub mod baton;

use core::{cmp::min, convert::Infallible};

use embassy_sync::{
    blocking_mutex::raw::RawMutex,
    mutex::{Mutex, MutexGuard},
};
use embassy_futures::select::{Either, select};
use embassy_time::{Duration, Instant, Timer};
use embedded_hal::digital::{InputPin, OutputPin};
use enum_ordinalize::Ordinalize;

use crate::{
    config::{Config, PhaseDurations, PollIntervals},
    error::Error,
    event::{Event, EventChannel},
    io::{Lamp, Lamps, PedestrianInput},
    pedestrian::{PedestrianMonitor, PedestrianRequest},
};
use baton::{PhaseBaton, PhaseToken};

#[derive(Debug, Ordinalize, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Phase {
    Green,
    Yellow,
    Red,
}

impl Phase {
    pub const fn next(self) -> Phase {
        match self {
            Phase::Green => Phase::Yellow,
            Phase::Yellow => Phase::Red,
            Phase::Red => Phase::Green,
        }
    }

    pub fn green(&self) -> bool {
        match self {
            Phase::Green | Phase::Yellow => true,
            Phase::Red => false,
        }
    }

    pub fn red(&self) -> bool {
        match self {
            Phase::Yellow | Phase::Red => true,
            Phase::Green => false,
        }
    }

    pub fn lights(&self, lamp: Lamp) -> bool {
        match lamp {
            Lamp::Green => self.green(),
            Lamp::Red => self.red(),
        }
    }

    /// The lamps this phase switches on, in `Lamp` order.
    pub fn lamps(self) -> impl Iterator<Item = Lamp> {
        Lamp::VARIANTS
            .iter()
            .copied()
            .filter(move |lamp| self.lights(*lamp))
    }

    pub fn duration(&self, durations: &PhaseDurations) -> Duration {
        match self {
            Phase::Green => durations.green,
            Phase::Yellow => durations.yellow,
            Phase::Red => durations.red,
        }
    }

    /// Only green can be cut short by a pedestrian.
    pub fn interruptible(&self) -> bool {
        matches!(self, Phase::Green)
    }
}

/// Everything the day-mode tasks share.
///
/// The lamps sit behind an async mutex that a phase holds for its whole
/// lit period, so at most one phase drives the outputs at a time. The baton
/// already serialises the phases; the lock makes overlap observable (a
/// `try_lock` from outside fails while any phase is active).
pub struct Crossing<M: RawMutex, P> {
    lamps: Mutex<M, Lamps<P>>,
    baton: PhaseBaton<M>,
    request: PedestrianRequest,
    events: EventChannel<M>,
    durations: PhaseDurations,
    intervals: PollIntervals,
}

impl<M: RawMutex, P: OutputPin> Crossing<M, P> {
    pub fn new(lamps: Lamps<P>, config: &Config) -> Self {
        Self {
            lamps: Mutex::new(lamps),
            baton: PhaseBaton::new(Phase::Green),
            request: PedestrianRequest::new(),
            events: EventChannel::new(),
            durations: config.durations,
            intervals: config.intervals,
        }
    }

    pub fn lamps(&self) -> &Mutex<M, Lamps<P>> {
        &self.lamps
    }

    pub fn baton(&self) -> &PhaseBaton<M> {
        &self.baton
    }

    pub fn request(&self) -> &PedestrianRequest {
        &self.request
    }

    pub fn events(&self) -> &EventChannel<M> {
        &self.events
    }

    fn record(&self, event: Event) {
        debug!("{}", event);
        self.events.immediate_publisher().publish_immediate(event);
    }

    /// Poll the pedestrian button forever, raising requests.
    pub async fn pedestrian_monitor<I: InputPin>(&self, input: I) -> Result<Infallible, Error> {
        let mut input = PedestrianInput::configure(input)?;
        let mut monitor = PedestrianMonitor::new(self.intervals);

        loop {
            let step = monitor.poll(input.is_asserted(), &self.request);
            if let Some(event) = step.event {
                if event == Event::RequestAccepted {
                    info!("pedestrian request accepted");
                }
                self.record(event);
            }
            Timer::after(step.next_poll).await;
        }
    }

    pub async fn green_phase(&self) -> Result<Infallible, Error> {
        let mut token = self.claim(Phase::Green).await?;

        loop {
            self.serve(Phase::Green).await;
            self.hand_off(token);
            token = self.baton.acquire(Phase::Green).await;
        }
    }

    pub async fn yellow_phase(&self) -> Result<Infallible, Error> {
        let mut token = self.claim(Phase::Yellow).await?;

        loop {
            self.serve(Phase::Yellow).await;
            self.hand_off(token);
            token = self.baton.acquire(Phase::Yellow).await;
        }
    }

    pub async fn red_phase(&self) -> Result<Infallible, Error> {
        let mut token = self.claim(Phase::Red).await?;

        loop {
            self.serve(Phase::Red).await;
            // The crossing has been served; whatever was pending is done
            // with, and the next green starts clean.
            if self.request.clear() {
                self.record(Event::RequestCleared);
            }
            self.hand_off(token);
            token = self.baton.acquire(Phase::Red).await;
        }
    }

    /// Wait for the first turn of `phase`, then configure the lines it
    /// drives. Nobody else holds the lamps during our turn, so the lock is
    /// free. On failure the token is dropped and the cycle stops here.
    async fn claim(&self, phase: Phase) -> Result<PhaseToken, Error> {
        let token = self.baton.acquire(phase).await;
        let mut lamps = self.lamps.lock().await;
        for lamp in phase.lamps() {
            lamps.configure(lamp)?;
        }
        Ok(token)
    }

    /// One lit period of `phase`, from taking the lamps to giving them back.
    async fn serve(&self, phase: Phase) {
        let mut lamps = self.lock(phase).await;
        self.light(&mut lamps, phase);

        if let Some(elapsed) = self.hold(phase).await {
            info!("green cut short after {=u64} ms", elapsed.as_millis());
            self.record(Event::GreenCutShort {
                after_ms: elapsed.as_millis(),
            });
        }

        self.extinguish(&mut lamps, phase);
        self.unlock(lamps, phase);
    }

    /// Stay lit for the phase's duration. An interruptible phase stays lit
    /// for at least one `green_check` and then ends as soon as a request is
    /// pending; it returns how long it was lit if that happened.
    async fn hold(&self, phase: Phase) -> Option<Duration> {
        let full = phase.duration(&self.durations);
        if !phase.interruptible() {
            Timer::after(full).await;
            return None;
        }

        let lit_at = Instant::now();
        Timer::after(min(self.intervals.green_check, full)).await;
        match select(Timer::at(lit_at + full), self.request.wait_pending()).await {
            Either::First(()) => None,
            Either::Second(()) => Some(lit_at.elapsed()),
        }
    }

    async fn lock(&self, phase: Phase) -> MutexGuard<'_, M, Lamps<P>> {
        let guard = self.lamps.lock().await;
        self.record(Event::LockAcquired(phase));
        guard
    }

    fn unlock(&self, guard: MutexGuard<'_, M, Lamps<P>>, phase: Phase) {
        drop(guard);
        self.record(Event::LockReleased(phase));
    }

    fn light(&self, lamps: &mut Lamps<P>, phase: Phase) {
        for lamp in phase.lamps() {
            lamps.set(lamp, true);
        }
        self.record(Event::PhaseLit(phase));
    }

    fn extinguish(&self, lamps: &mut Lamps<P>, phase: Phase) {
        for lamp in phase.lamps() {
            lamps.set(lamp, false);
        }
        self.record(Event::PhaseDark(phase));
    }

    fn hand_off(&self, token: PhaseToken) {
        let from = token.phase();
        let to = self.baton.hand_off(token);
        self.record(Event::HandedOff { from, to });
    }
}
