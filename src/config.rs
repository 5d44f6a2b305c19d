/*
 * Static configuration. Everything here is fixed at compile time; the only
 * knob is the `night-mode` cargo feature, which selects the mode.
 */

use embassy_time::Duration;

/// Operating mode, chosen once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Mode {
    /// The green, yellow, red cycle with pedestrian requests.
    Day,
    /// Both lamps blink together (yellow), nothing else runs.
    Night,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PhaseDurations {
    pub green: Duration,
    pub yellow: Duration,
    pub red: Duration,
    pub night_on: Duration,
    pub night_off: Duration,
}

impl PhaseDurations {
    pub const DEFAULT: Self = Self {
        green: Duration::from_millis(3000),
        yellow: Duration::from_millis(1000),
        red: Duration::from_millis(4000),
        night_on: Duration::from_millis(500),
        night_off: Duration::from_millis(500),
    };

    /// Length of one undisturbed day cycle.
    pub fn cycle(&self) -> Duration {
        self.green + self.yellow + self.red
    }
}

impl Default for PhaseDurations {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// How often the tasks look at their inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PollIntervals {
    /// Button polling while no press is being tracked.
    pub idle: Duration,
    /// Button polling while waiting for an accepted press to be released.
    pub release: Duration,
    /// Shortest time a green stays lit before a pending request can end it.
    pub green_check: Duration,
}

impl PollIntervals {
    pub const DEFAULT: Self = Self {
        idle: Duration::from_millis(100),
        release: Duration::from_millis(50),
        green_check: Duration::from_millis(100),
    };
}

impl Default for PollIntervals {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    pub mode: Mode,
    pub durations: PhaseDurations,
    pub intervals: PollIntervals,
}

impl Config {
    pub const fn new(mode: Mode) -> Self {
        Self {
            mode,
            durations: PhaseDurations::DEFAULT,
            intervals: PollIntervals::DEFAULT,
        }
    }
}

pub const MODE: Mode = if cfg!(feature = "night-mode") {
    Mode::Night
} else {
    Mode::Day
};

pub const CONFIG: Config = Config::new(MODE);
