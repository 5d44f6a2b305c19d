/*
 * The pedestrian side of the crossing.
 *
 * The button is polled rather than interrupt driven. A press is turned into a
 * request at most once: after accepting a press the monitor waits for the
 * button to come back up before it will look for the next one, so holding the
 * button down does not keep re-requesting. The monitor never withdraws a
 * request. Only the red phase clears it, once the crossing has actually been
 * served.
 */

use core::{
    future::poll_fn,
    sync::atomic::{AtomicBool, Ordering},
    task::Poll,
};

use embassy_sync::waitqueue::AtomicWaker;
use embassy_time::Duration;

use crate::{config::PollIntervals, event::Event};

/// The "someone wants to cross" flag.
///
/// Lock-free. There is exactly one setter (the monitor), one clearer (the red
/// phase) and one reader (the green phase). The flag is what counts; the
/// waker only gets a waiting green to look at it as soon as it is raised.
pub struct PedestrianRequest {
    pending: AtomicBool,
    raised: AtomicWaker,
}

impl Default for PedestrianRequest {
    fn default() -> Self {
        Self::new()
    }
}

impl PedestrianRequest {
    pub const fn new() -> Self {
        Self {
            pending: AtomicBool::new(false),
            raised: AtomicWaker::new(),
        }
    }

    /// Raise the request. Returns `true` only if it was not already pending.
    pub fn try_raise(&self) -> bool {
        let raised = self
            .pending
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok();
        if raised {
            self.raised.wake();
        }
        raised
    }

    /// Resolves as soon as a request is pending. Only one task may wait.
    pub async fn wait_pending(&self) {
        poll_fn(|cx| {
            self.raised.register(cx.waker());
            if self.is_pending() {
                Poll::Ready(())
            } else {
                Poll::Pending
            }
        })
        .await
    }

    pub fn is_pending(&self) -> bool {
        self.pending.load(Ordering::Acquire)
    }

    /// Withdraw the request. Returns whether one was pending.
    pub fn clear(&self) -> bool {
        self.pending.swap(false, Ordering::AcqRel)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MonitorState {
    Idle,
    WaitingForRelease,
}

/// What the monitor decided on one poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonitorStep {
    pub event: Option<Event>,
    /// How long to wait before the next poll.
    pub next_poll: Duration,
}

/// Button debouncing, without any notion of time. The async loop in
/// `Crossing::pedestrian_monitor` feeds it the button level and sleeps for
/// whatever it asks.
#[derive(Debug, Clone)]
pub struct PedestrianMonitor {
    state: MonitorState,
    intervals: PollIntervals,
}

impl PedestrianMonitor {
    pub fn new(intervals: PollIntervals) -> Self {
        Self {
            state: MonitorState::Idle,
            intervals,
        }
    }

    pub fn state(&self) -> MonitorState {
        self.state
    }

    pub fn poll(&mut self, asserted: bool, request: &PedestrianRequest) -> MonitorStep {
        match (self.state, asserted) {
            (MonitorState::Idle, true) if request.try_raise() => {
                self.state = MonitorState::WaitingForRelease;
                self.step(Some(Event::RequestAccepted))
            }
            // A press while a request is still pending is simply not ours to
            // take; look again on the next idle poll.
            (MonitorState::Idle, _) => self.step(None),
            (MonitorState::WaitingForRelease, false) => {
                self.state = MonitorState::Idle;
                self.step(Some(Event::ButtonReleased))
            }
            (MonitorState::WaitingForRelease, true) => self.step(None),
        }
    }

    fn step(&self, event: Option<Event>) -> MonitorStep {
        let next_poll = match self.state {
            MonitorState::Idle => self.intervals.idle,
            MonitorState::WaitingForRelease => self.intervals.release,
        };
        MonitorStep { event, next_poll }
    }
}
