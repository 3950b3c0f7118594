//! Radio duty cycle - keeps WiFi off except for short sync sessions.
//!
//! A session starts when the scheduled start time is reached and ends as
//! soon as every topic has been processed since power-up and the clock
//! is synced. The next session is then scheduled `radio_sleep_secs`
//! later.
//!
//! ESP32-S2 power figures for orientation:
//! - WiFi connected: ~70-90 mA
//! - Modem off, CPU running the LED ring: ~20-40 mA
//! - Deep sleep: ~20 µA

use crate::power_logic;
use crate::traits::LinkState;

/// What the main loop should do with the radio.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RadioCommand {
    Hold,
    BringUp,
    ShutDown,
}

/// Radio scheduler.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DutyCycle {
    sleep_secs: u64,
    next_start: u64,
    sleep_allowed: bool,
}

impl DutyCycle {
    pub const fn new(sleep_secs: u64) -> Self {
        Self {
            sleep_secs,
            next_start: 0,
            sleep_allowed: false,
        }
    }

    /// Unix time at which the radio comes back up.
    pub fn next_start(&self) -> u64 {
        self.next_start
    }

    /// `false` while a session is still waiting for topics.
    pub fn sleep_allowed(&self) -> bool {
        self.sleep_allowed
    }

    /// Periodic decision, once per loop iteration.
    pub fn decide(
        &mut self,
        link: LinkState,
        now: Option<u64>,
        all_topics_fresh: bool,
        publish_pending: bool,
    ) -> RadioCommand {
        if !all_topics_fresh {
            self.sleep_allowed = false;
        }

        if link == LinkState::Down {
            return if power_logic::radio_start_due(now, self.next_start) {
                info!("Power: radio start due (next_start={})", self.next_start);
                RadioCommand::BringUp
            } else {
                RadioCommand::Hold
            };
        }

        if !power_logic::radio_may_sleep(all_topics_fresh, now.is_some(), publish_pending) {
            return RadioCommand::Hold;
        }

        self.rest(now);
        self.sleep_allowed = true;
        info!("Power: session complete, radio off until {}", self.next_start);
        RadioCommand::ShutDown
    }

    /// Long-press handling: an active radio goes down and is rescheduled,
    /// a sleeping one is made due immediately.
    pub fn toggle(&mut self, link: LinkState, now: Option<u64>) -> RadioCommand {
        if link == LinkState::Down {
            self.next_start = 0;
            info!("Power: radio forced on");
            RadioCommand::BringUp
        } else {
            self.rest(now);
            info!("Power: radio forced off until {}", self.next_start);
            RadioCommand::ShutDown
        }
    }

    /// Make the radio due on the next decision.
    pub fn force_start(&mut self) {
        self.next_start = 0;
    }

    /// Schedule the next session one sleep period after `now`.
    fn rest(&mut self, now: Option<u64>) {
        self.next_start = now.unwrap_or(0).saturating_add(self.sleep_secs);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SLEEP: u64 = 1800;

    #[test]
    fn first_decision_brings_radio_up() {
        let mut dc = DutyCycle::new(SLEEP);
        assert_eq!(dc.decide(LinkState::Down, None, false, false), RadioCommand::BringUp);
    }

    #[test]
    fn shuts_down_once_all_topics_are_fresh() {
        let mut dc = DutyCycle::new(SLEEP);
        let now = Some(1_700_000_000);
        assert_eq!(dc.decide(LinkState::Up, now, false, false), RadioCommand::Hold);
        assert!(!dc.sleep_allowed());

        assert_eq!(dc.decide(LinkState::Up, now, true, false), RadioCommand::ShutDown);
        assert_eq!(dc.next_start(), 1_700_000_000 + SLEEP);
        assert!(dc.sleep_allowed());
    }

    #[test]
    fn stays_up_without_clock_or_with_publish_pending() {
        let mut dc = DutyCycle::new(SLEEP);
        assert_eq!(dc.decide(LinkState::Up, None, true, false), RadioCommand::Hold);
        assert_eq!(dc.decide(LinkState::Up, Some(10), true, true), RadioCommand::Hold);
        assert_eq!(dc.decide(LinkState::Connecting, Some(10), true, false), RadioCommand::ShutDown);
    }

    #[test]
    fn waits_until_next_start() {
        let mut dc = DutyCycle::new(SLEEP);
        dc.decide(LinkState::Up, Some(1000), true, false);
        assert_eq!(dc.decide(LinkState::Down, Some(2799), true, false), RadioCommand::Hold);
        assert_eq!(dc.decide(LinkState::Down, Some(2800), true, false), RadioCommand::BringUp);
    }

    #[test]
    fn toggle_both_ways() {
        let mut dc = DutyCycle::new(SLEEP);
        assert_eq!(dc.toggle(LinkState::Up, Some(500)), RadioCommand::ShutDown);
        assert_eq!(dc.next_start(), 500 + SLEEP);

        assert_eq!(dc.toggle(LinkState::Down, Some(600)), RadioCommand::BringUp);
        assert_eq!(dc.next_start(), 0);
    }
}
