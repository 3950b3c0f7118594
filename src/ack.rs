//! Non-blocking acknowledgement publishing with bounded retry.
//!
//! An acknowledgement is queued by the button handler and pushed to the
//! status topic by [`AckPublisher::poll`] whenever the link is up and the
//! backoff delay has passed. After too many failures it is dropped.

use crate::config::{RetryPolicy, ACK_TOKEN};
use crate::error::Error;
use crate::topics::Topic;
use crate::traits::{LinkState, Network};

/// Whether the radio was up when the user acknowledged.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AckOrigin {
    Online,
    /// Radio was off; the device deep-sleeps right after publishing.
    Offline,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PublishOutcome {
    /// Nothing queued.
    Idle,
    /// Queued, waiting for the link or the backoff delay.
    Waiting,
    Published(AckOrigin),
    /// Attempt failed; the next one is scheduled.
    Retrying { failures: u8, delay_ms: u64 },
    /// Attempt limit reached, acknowledgement dropped.
    GaveUp(Error),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Pending {
    origin: AckOrigin,
    failures: u8,
    not_before_ms: u64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AckPublisher {
    pending: Option<Pending>,
}

impl AckPublisher {
    pub const fn new() -> Self {
        Self { pending: None }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Queue an acknowledgement. A repeated request restarts the retry
    /// budget; an offline origin is kept once seen.
    pub fn request(&mut self, origin: AckOrigin, now_ms: u64) {
        let origin = match self.pending {
            Some(p) if p.origin == AckOrigin::Offline => AckOrigin::Offline,
            _ => origin,
        };
        self.pending = Some(Pending {
            origin,
            failures: 0,
            not_before_ms: now_ms,
        });
    }

    pub fn poll<N: Network>(&mut self, net: &mut N, policy: &RetryPolicy, now_ms: u64) -> PublishOutcome {
        let Some(mut pending) = self.pending else {
            return PublishOutcome::Idle;
        };
        if net.link() != LinkState::Up || now_ms < pending.not_before_ms {
            return PublishOutcome::Waiting;
        }

        match net.try_publish(Topic::Status, ACK_TOKEN.as_bytes(), true) {
            Ok(()) => {
                self.pending = None;
                info!("ack published ({})", pending.origin);
                PublishOutcome::Published(pending.origin)
            }
            Err(e) => {
                pending.failures = pending.failures.saturating_add(1);
                if pending.failures >= policy.max_attempts {
                    self.pending = None;
                    error!("ack publish gave up after {} attempts: {}", pending.failures, e);
                    return PublishOutcome::GaveUp(e);
                }
                let delay_ms = policy.delay_after(pending.failures);
                pending.not_before_ms = now_ms.saturating_add(delay_ms);
                self.pending = Some(pending);
                warn!("ack publish failed ({}), retry in {} ms", e, delay_ms);
                PublishOutcome::Retrying {
                    failures: pending.failures,
                    delay_ms,
                }
            }
        }
    }
}
