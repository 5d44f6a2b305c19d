/*
 * Startup: pick day or night once, from the static configuration.
 *
 * Day mode becomes a `Crossing` plus four tasks: the pedestrian monitor and
 * one task per phase. Night mode becomes a `BlinkLoop` and the pedestrian
 * input is simply dropped. The board spawns the day tasks on the embassy
 * executor; `run_day` drives the same four futures on whatever executor the
 * caller has, which is what the tests use.
 */

use core::{convert::Infallible, future::Future};

use embassy_futures::join::join4;
use embassy_sync::blocking_mutex::raw::RawMutex;
use embedded_hal::digital::{InputPin, OutputPin};

use crate::{
    config::{Config, Mode},
    error::Error,
    io::Lamps,
    night::BlinkLoop,
    trafficlight::Crossing,
};

pub enum Controller<P, I> {
    Day(DayMode<P, I>),
    Night(BlinkLoop<P>),
}

impl<P: OutputPin, I: InputPin> Controller<P, I> {
    pub fn new(config: &Config, lamps: Lamps<P>, input: I) -> Self {
        match config.mode {
            Mode::Day => Controller::Day(DayMode {
                lamps,
                input,
                config: *config,
            }),
            Mode::Night => {
                info!("night mode selected, pedestrian button unused");
                Controller::Night(BlinkLoop::new(lamps, &config.durations))
            }
        }
    }

    pub fn mode(&self) -> Mode {
        match self {
            Controller::Day(_) => Mode::Day,
            Controller::Night(_) => Mode::Night,
        }
    }
}

/// Day mode before its shared state has a home.
pub struct DayMode<P, I> {
    lamps: Lamps<P>,
    input: I,
    config: Config,
}

impl<P: OutputPin, I: InputPin> DayMode<P, I> {
    /// Build the shared crossing state. The caller decides where it lives
    /// (a `StaticCell` on the board, the stack in tests).
    pub fn into_parts<M: RawMutex>(self) -> (Crossing<M, P>, I) {
        let durations = &self.config.durations;
        info!(
            "day mode: green {=u64} ms, yellow {=u64} ms, red {=u64} ms, cycle {=u64} ms",
            durations.green.as_millis(),
            durations.yellow.as_millis(),
            durations.red.as_millis(),
            durations.cycle().as_millis()
        );
        (Crossing::new(self.lamps, &self.config), self.input)
    }
}

/// Run a task until it gives up, and say why.
pub async fn supervise(task: &'static str, run: impl Future<Output = Result<Infallible, Error>>) {
    match run.await {
        Ok(never) => match never {},
        Err(err) => error!("{=str} task stopped: {}", task, err),
    }
}

/// All four day tasks, concurrently. Only resolves if all of them fail,
/// and then parks, since there is nothing left to run.
pub async fn run_day<M: RawMutex, P: OutputPin, I: InputPin>(
    crossing: &Crossing<M, P>,
    input: I,
) -> Infallible {
    join4(
        supervise("pedestrian", crossing.pedestrian_monitor(input)),
        supervise("green", crossing.green_phase()),
        supervise("yellow", crossing.yellow_phase()),
        supervise("red", crossing.red_phase()),
    )
    .await;

    warn!("every day task has stopped");
    core::future::pending().await
}
