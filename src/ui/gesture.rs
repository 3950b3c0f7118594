//! Click / double-click / long-press recognition for one button.
//!
//! Pure state machine fed with the raw pin level and a millisecond
//! timestamp, so the button task only has to poll.

use crate::config::{BUTTON_CLICK_MS, BUTTON_DEBOUNCE_MS, BUTTON_LONG_PRESS_MS};
use crate::ui::ButtonEvent;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum State {
    Released,
    Pressed { since: u64 },
    AwaitSecond { released_at: u64 },
    SecondPress,
    Held,
}

#[derive(Clone, Copy, Debug)]
pub struct GestureDetector {
    debounce_ms: u64,
    click_ms: u64,
    long_press_ms: u64,
    raw: bool,
    raw_since: u64,
    level: bool,
    state: State,
}

impl GestureDetector {
    pub const fn new() -> Self {
        Self::with_timing(BUTTON_DEBOUNCE_MS, BUTTON_CLICK_MS, BUTTON_LONG_PRESS_MS)
    }

    pub const fn with_timing(debounce_ms: u64, click_ms: u64, long_press_ms: u64) -> Self {
        Self {
            debounce_ms,
            click_ms,
            long_press_ms,
            raw: false,
            raw_since: 0,
            level: false,
            state: State::Released,
        }
    }

    /// Feed the current pin level (`true` = pressed).
    ///
    /// A click is reported once the double-click window has expired; a
    /// long press fires while the button is still held.
    pub fn update(&mut self, pressed: bool, now_ms: u64) -> Option<ButtonEvent> {
        if pressed != self.raw {
            self.raw = pressed;
            self.raw_since = now_ms;
        }
        if self.raw != self.level && now_ms.saturating_sub(self.raw_since) >= self.debounce_ms {
            self.level = self.raw;
        }

        let down = self.level;
        match self.state {
            State::Released => {
                if down {
                    self.state = State::Pressed { since: now_ms };
                }
                None
            }
            State::Pressed { since } => {
                if !down {
                    self.state = State::AwaitSecond {
                        released_at: now_ms,
                    };
                    None
                } else if now_ms.saturating_sub(since) >= self.long_press_ms {
                    self.state = State::Held;
                    Some(ButtonEvent::LongPress)
                } else {
                    None
                }
            }
            State::AwaitSecond { released_at } => {
                if down {
                    self.state = State::SecondPress;
                    None
                } else if now_ms.saturating_sub(released_at) >= self.click_ms {
                    self.state = State::Released;
                    Some(ButtonEvent::Click)
                } else {
                    None
                }
            }
            State::SecondPress => {
                if down {
                    None
                } else {
                    self.state = State::Released;
                    Some(ButtonEvent::DoubleClick)
                }
            }
            State::Held => {
                if !down {
                    self.state = State::Released;
                }
                None
            }
        }
    }
}

impl Default for GestureDetector {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Drive the detector in 10 ms steps through `(pressed, duration)` phases.
    fn run(script: &[(bool, u64)]) -> std::vec::Vec<ButtonEvent> {
        let mut det = GestureDetector::new();
        let mut events = std::vec::Vec::new();
        let mut t = 0;
        for &(pressed, duration) in script {
            let end = t + duration;
            while t < end {
                events.extend(det.update(pressed, t));
                t += 10;
            }
        }
        events
    }

    #[test]
    fn short_press_is_a_click_after_window() {
        let events = run(&[(false, 100), (true, 150), (false, 600)]);
        assert_eq!(events, [ButtonEvent::Click]);
    }

    #[test]
    fn click_waits_for_double_click_window() {
        let events = run(&[(false, 100), (true, 150), (false, 200)]);
        assert!(events.is_empty());
    }

    #[test]
    fn two_quick_presses_are_a_double_click() {
        let events = run(&[(true, 120), (false, 150), (true, 120), (false, 600)]);
        assert_eq!(events, [ButtonEvent::DoubleClick]);
    }

    #[test]
    fn long_hold_fires_once_while_held() {
        let events = run(&[(true, 2000), (false, 600)]);
        assert_eq!(events, [ButtonEvent::LongPress]);
    }

    #[test]
    fn bounces_shorter_than_debounce_are_ignored() {
        let events = run(&[(true, 20), (false, 30), (true, 20), (false, 800)]);
        assert!(events.is_empty());
    }
}
