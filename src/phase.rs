//! Urgency phase of the tracked item.
//!
//! | condition                               | phase        |
//! |-----------------------------------------|--------------|
//! | acknowledged, or `now > deadline`       | `Idle`       |
//! | `cosy < now < aggressive`               | `Cosy`       |
//! | otherwise                               | `Aggressive` |
//!
//! The table is evaluated as written, including for times *before* the
//! cosy threshold, which therefore count as aggressive.

use crate::item::Item;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Phase {
    /// Nothing to remind about.
    Idle,
    /// Slow ring animation.
    Cosy,
    /// Fast ring animation.
    Aggressive,
}

impl Phase {
    pub fn is_active(self) -> bool {
        self != Phase::Idle
    }
}

/// Phase of `item` at Unix time `now`.
pub fn evaluate(now: u64, item: &Item, acknowledged: bool) -> Phase {
    if acknowledged || now > item.deadline {
        Phase::Idle
    } else if now > item.cosy && now < item.aggressive {
        Phase::Cosy
    } else {
        Phase::Aggressive
    }
}

/// What changed on the last [`PhaseTracker::update`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Transition {
    /// Nothing evaluated, or same phase as before.
    Steady,
    /// Became `Idle` from anything else.
    Finished,
    /// Became active from `Idle` or from the unevaluated start state.
    Started(Phase),
    /// Moved between `Cosy` and `Aggressive`.
    Escalated(Phase),
}

/// Remembers the previous phase and whether a reminder is running.
///
/// A reminder is *armed* when one has been decoded and stays armed until
/// the phase reaches `Idle`. While disarmed the phase is frozen.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PhaseTracker {
    armed: bool,
    current: Option<Phase>,
}

impl PhaseTracker {
    pub const fn new() -> Self {
        Self {
            armed: false,
            current: None,
        }
    }

    /// A reminder was just decoded.
    pub fn arm(&mut self) {
        self.armed = true;
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    /// Last evaluated phase, `None` before the first evaluation.
    pub fn current(&self) -> Option<Phase> {
        self.current
    }

    /// Re-evaluate. Does nothing while disarmed or without a synced
    /// clock (`now == None`).
    pub fn update(&mut self, now: Option<u64>, item: &Item, acknowledged: bool) -> Transition {
        let Some(now) = now else {
            return Transition::Steady;
        };
        if !self.armed {
            return Transition::Steady;
        }

        let next = evaluate(now, item, acknowledged);
        let previous = self.current.replace(next);
        if next == Phase::Idle {
            self.armed = false;
        }

        match (previous, next) {
            (Some(p), n) if p == n => Transition::Steady,
            (_, Phase::Idle) => Transition::Finished,
            (Some(Phase::Cosy | Phase::Aggressive), n) => Transition::Escalated(n),
            (_, n) => Transition::Started(n),
        }
    }
}
