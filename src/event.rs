/*
 * Trace events. Every phase change, lock hand-over and button decision is
 * logged and also published on a pub/sub channel, so that something outside
 * the tasks (a test, a diagnostics task) can follow the cycle.
 */

use embassy_sync::pubsub::PubSubChannel;

use crate::trafficlight::Phase;

pub const EVENT_CAPACITY: usize = 16;
pub const EVENT_SUBSCRIBERS: usize = 2;
pub const EVENT_PUBLISHERS: usize = 1;

pub type EventChannel<M> =
    PubSubChannel<M, Event, EVENT_CAPACITY, EVENT_SUBSCRIBERS, EVENT_PUBLISHERS>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Event {
    LockAcquired(Phase),
    LockReleased(Phase),
    PhaseLit(Phase),
    PhaseDark(Phase),
    /// Green ended early for a pedestrian, after this many milliseconds.
    GreenCutShort { after_ms: u64 },
    HandedOff { from: Phase, to: Phase },
    RequestAccepted,
    ButtonReleased,
    RequestCleared,
}
