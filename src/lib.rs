/*
 * Pedestrian crossing traffic light.
 *
 * The crate holds everything that is not specific to the board: the phase
 * tasks and their hand-off, the pedestrian button monitor, the night-mode
 * blinker and the bootstrap that picks between day and night. The board
 * binary in `main.rs` only wires pins to these pieces and spawns tasks.
 */

#![cfg_attr(not(test), no_std)]

// Must come first so the logging macros are visible to the other modules.
mod fmt;

pub mod config;
pub mod controller;
pub mod error;
pub mod event;
pub mod io;
pub mod night;
pub mod pedestrian;
pub mod trafficlight;

pub use config::{CONFIG, Config, Mode, PhaseDurations, PollIntervals};
pub use controller::{Controller, DayMode, run_day, supervise};
pub use error::{Error, Line};
pub use event::{Event, EventChannel};
pub use io::{Lamp, Lamps, PedestrianInput, Polarity};
pub use night::BlinkLoop;
pub use pedestrian::{MonitorState, MonitorStep, PedestrianMonitor, PedestrianRequest};
pub use trafficlight::{Crossing, Phase, baton::PhaseBaton, baton::PhaseToken};
