/*
 * Phase hand-off.
 *
 * There is one baton for the whole cycle. It always names the phase whose
 * turn it is. The task of that phase takes it, which yields a `PhaseToken`,
 * and passing the token back in moves the baton on to the next phase. Since
 * the token can't be copied, a phase can only hand off a turn it actually
 * had. Green holds the baton at startup.
 */

use core::{cell::RefCell, future::poll_fn, task::Poll};

use embassy_sync::{
    blocking_mutex::{Mutex, raw::RawMutex},
    waitqueue::MultiWakerRegistration,
};
use enum_ordinalize::Ordinalize;

use super::Phase;

/// Proof that the holder owns the current phase.
#[derive(Debug, PartialEq, Eq)]
#[must_use = "a dropped token stalls the cycle; hand it off"]
pub struct PhaseToken {
    phase: Phase,
}

impl PhaseToken {
    pub fn phase(&self) -> Phase {
        self.phase
    }
}

struct State {
    owner: Phase,
    taken: bool,
    waiters: MultiWakerRegistration<{ Phase::VARIANT_COUNT }>,
}

pub struct PhaseBaton<M: RawMutex> {
    state: Mutex<M, RefCell<State>>,
}

impl<M: RawMutex> PhaseBaton<M> {
    pub const fn new(first: Phase) -> Self {
        Self {
            state: Mutex::new(RefCell::new(State {
                owner: first,
                taken: false,
                waiters: MultiWakerRegistration::new(),
            })),
        }
    }

    /// The phase whose turn it is, taken or not.
    pub fn owner(&self) -> Phase {
        self.state.lock(|state| state.borrow().owner)
    }

    pub fn try_acquire(&self, phase: Phase) -> Option<PhaseToken> {
        self.state.lock(|state| {
            let mut state = state.borrow_mut();
            if state.owner == phase && !state.taken {
                state.taken = true;
                Some(PhaseToken { phase })
            } else {
                None
            }
        })
    }

    /// Wait for `phase`'s turn.
    pub async fn acquire(&self, phase: Phase) -> PhaseToken {
        poll_fn(|cx| {
            self.state.lock(|state| {
                let mut state = state.borrow_mut();
                if state.owner == phase && !state.taken {
                    state.taken = true;
                    Poll::Ready(PhaseToken { phase })
                } else {
                    state.waiters.register(cx.waker());
                    Poll::Pending
                }
            })
        })
        .await
    }

    /// Give the turn to the next phase. Returns that phase.
    pub fn hand_off(&self, token: PhaseToken) -> Phase {
        let next = token.phase.next();
        self.state.lock(|state| {
            let mut state = state.borrow_mut();
            state.owner = next;
            state.taken = false;
            state.waiters.wake();
        });
        next
    }
}
