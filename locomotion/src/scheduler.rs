//! One-shot timers advanced by the fixed tick.
//!
//! Timers are owned by an ability (fired into its `on_timer` hook and cancelled when it
//! stops) or ownerless (surfaced as [`ControllerEvent::TimerFired`](crate::ControllerEvent)).

use crate::ability::AbilityIndex;

/// Caller-chosen discriminator passed back when a timer fires.
pub type TimerKey = u32;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle(u64);

#[derive(Clone, Copy, Debug, PartialEq)]
struct Timer {
    handle: TimerHandle,
    owner: Option<AbilityIndex>,
    due: f64,
    key: TimerKey,
}

/// A timer that came due during [`Scheduler::advance`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Fired {
    pub handle: TimerHandle,
    pub owner: Option<AbilityIndex>,
    pub key: TimerKey,
}

#[derive(Clone, Debug, Default)]
pub struct Scheduler {
    now: f64,
    next_handle: u64,
    // Kept in scheduling order; fired timers are removed.
    timers: Vec<Timer>,
}

impl Scheduler {
    /// Simulation time (seconds) accumulated by [`advance`](Self::advance).
    pub fn now(&self) -> f64 {
        self.now
    }

    pub fn schedule(
        &mut self,
        owner: Option<AbilityIndex>,
        delay_seconds: f32,
        key: TimerKey,
    ) -> TimerHandle {
        let handle = TimerHandle(self.next_handle);
        self.next_handle += 1;
        self.timers.push(Timer {
            handle,
            owner,
            due: self.now + f64::from(delay_seconds.max(0.0)),
            key,
        });
        handle
    }

    /// Returns `false` if the timer already fired or was cancelled.
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        let before = self.timers.len();
        self.timers.retain(|t| t.handle != handle);
        self.timers.len() != before
    }

    /// Cancels every pending timer owned by `owner`. Returns how many were dropped.
    pub fn cancel_owned(&mut self, owner: AbilityIndex) -> usize {
        let before = self.timers.len();
        self.timers.retain(|t| t.owner != Some(owner));
        before - self.timers.len()
    }

    pub fn is_pending(&self, handle: TimerHandle) -> bool {
        self.timers.iter().any(|t| t.handle == handle)
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    /// Advances the clock and removes every timer that is now due, in scheduling order.
    pub fn advance(&mut self, dt: f32) -> Vec<Fired> {
        self.now += f64::from(dt.max(0.0));
        let now = self.now;
        let mut fired = Vec::new();
        self.timers.retain(|t| {
            if t.due <= now {
                fired.push(Fired {
                    handle: t.handle,
                    owner: t.owner,
                    key: t.key,
                });
                false
            } else {
                true
            }
        });
        fired
    }

    pub fn clear(&mut self) {
        self.timers.clear();
    }
}
