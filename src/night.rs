/*
 * Night mode: yellow blinks, nothing else happens.
 *
 * There are no competing writers at night, so the blinker owns the lamps
 * outright instead of going through the crossing's lock. The on/off decision
 * is kept apart from the waiting, as `step()`, so it can be exercised without
 * a timer. `run()` consumes the blinker; there is no way back to day mode.
 */

use core::convert::Infallible;

use embassy_time::{Duration, Timer};
use embedded_hal::digital::OutputPin;

use crate::{config::PhaseDurations, error::Error, io::Lamps, trafficlight::Phase};

pub struct BlinkLoop<P> {
    lamps: Lamps<P>,
    on: Duration,
    off: Duration,
    lit: bool,
}

impl<P: OutputPin> BlinkLoop<P> {
    pub fn new(lamps: Lamps<P>, durations: &PhaseDurations) -> Self {
        Self {
            lamps,
            on: durations.night_on,
            off: durations.night_off,
            lit: false,
        }
    }

    pub fn configure(&mut self) -> Result<(), Error> {
        for lamp in Phase::Yellow.lamps() {
            self.lamps.configure(lamp)?;
        }
        Ok(())
    }

    pub fn is_lit(&self) -> bool {
        self.lit
    }

    /// Flip both lamps and return how long to keep them that way.
    pub fn step(&mut self) -> Duration {
        self.lit = !self.lit;
        for lamp in Phase::Yellow.lamps() {
            self.lamps.set(lamp, self.lit);
        }
        if self.lit { self.on } else { self.off }
    }

    pub async fn run(mut self) -> Result<Infallible, Error> {
        self.configure()?;
        info!(
            "night mode: blinking {=u64}/{=u64} ms",
            self.on.as_millis(),
            self.off.as_millis()
        );

        loop {
            let hold = self.step();
            Timer::after(hold).await;
        }
    }
}
