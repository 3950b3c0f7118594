//! Application-wide constants and compile-time configuration.
//!
//! All hardware pin assignments, timing parameters, and protocol
//! constants live here so they can be tuned in one place. The subset the
//! control loop consumes at runtime is bundled into [`Settings`].

use crate::ui::actions::ButtonMap;

// Radio duty cycle

/// Seconds the radio stays off after all topics have been received.
pub const WIFI_SLEEP_DURATION_SECS: u64 = 1800;

/// Delay (ms) inserted per tick while topics are still missing, so the
/// network tasks get time to run.
pub const SETTLE_DELAY_MS: u32 = 100;

// Button

/// Deep-sleep duration after a single click (6 hours).
pub const BUTTON_SLEEP_DURATION_SECS: u64 = 21_600;

/// Button debounce time (ms).
pub const BUTTON_DEBOUNCE_MS: u64 = 50;

/// Maximum gap between two clicks to count as a double-click (ms).
pub const BUTTON_CLICK_MS: u64 = 400;

/// Hold time before a press is reported as a long press (ms).
pub const BUTTON_LONG_PRESS_MS: u64 = 800;

// MQTT

/// Largest payload accepted on any subscribed topic (bytes).
pub const MAX_MESSAGE_LEN: usize = 64;

/// Topic tree prepended to all topics. Must end with `/`.
pub const TOPIC_ROOT: &str = "rememberall/";

/// Display text: `LineCount|ColorLine1;TextLine1|ColorLine2;TextLine2|...`
pub const TEXT_TOPIC: &str = "rememberall/eventTxt";

/// Reminder timing: `DeadlineHex|CosyHex|AggressiveHex|RingColorHex`
pub const REMINDER_TOPIC: &str = "rememberall/eventReminder";

/// Free text status; `ack` once the current reminder was acknowledged.
pub const STATUS_TOPIC: &str = "rememberall/Status";

/// Status payload marking the current item as acknowledged.
pub const ACK_TOKEN: &str = "ack";

/// First retry delay after a failed ack publish (ms).
pub const ACK_RETRY_BASE_MS: u64 = 250;

/// Upper bound for the exponential ack retry delay (ms).
pub const ACK_RETRY_MAX_MS: u64 = 8_000;

/// Failed publish attempts before the ack is given up.
pub const ACK_PUBLISH_MAX_ATTEMPTS: u8 = 12;

// E-paper display (GDEW0213Z16, 3 color, 104x212)
//
//   MOSI → GPIO35     CLK  → GPIO36     MISO → GPIO37
//   CS   → GPIO34     DC   → GPIO33     RST  → GPIO21
//   BUSY → GPIO18

/// Panel width in landscape orientation (pixels).
pub const PANEL_WIDTH: u32 = 212;

/// Panel height in landscape orientation (pixels).
pub const PANEL_HEIGHT: u32 = 104;

/// Characters per line (fixed width font).
pub const CHARS_PER_LINE: usize = 10;

/// Maximum number of text lines per item.
pub const MAX_LINES: usize = 3;

/// Pixel offset from the left edge for the first character.
pub const TEXT_X_OFFSET: i32 = 1;

/// Baseline of the first line (pixels from the top).
pub const TEXT_Y_OFFSET: i32 = 30;

/// Vertical distance between line baselines (pixels).
pub const LINE_HEIGHT: i32 = 32;

// LED ring (WS2812B on GPIO13, power switch on GPIO14)

/// Number of pixels on the ring.
pub const RING_NUM_LEDS: usize = 32;

/// Global brightness (0-255). The ring runs from 3.3 V, keep it low.
pub const RING_BRIGHTNESS: u8 = 8;

/// Beats per minute of the sweep in the cosy phase.
pub const RING_BEAT_COSY: u8 = 12;

/// Beats per minute of the sweep in the aggressive phase.
pub const RING_BEAT_AGGRESSIVE: u8 = 32;

/// Amount every pixel fades toward black per tick (x/256).
pub const RING_FADE_AMOUNT: u8 = 20;

/// Ring color used before the first reminder message arrives.
pub const DEFAULT_RING_COLOR: u32 = 0xFF_0000;

/// Settle time after switching the ring power rail on (ms).
pub const RING_POWER_UP_MS: u64 = 20;

/// Runtime tunables consumed by the control loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Settings {
    /// Radio off-time after a complete update (seconds).
    pub radio_sleep_secs: u64,
    /// Deep-sleep time requested by the sleep button action (seconds).
    pub button_sleep_secs: u64,
    /// Sweep frequency in the cosy phase (beats per minute).
    pub beat_cosy: u8,
    /// Sweep frequency in the aggressive phase (beats per minute).
    pub beat_aggressive: u8,
    /// Per-tick fade toward black (x/256).
    pub fade_amount: u8,
    /// Pacing delay while topics are missing (ms).
    pub settle_delay_ms: u32,
    /// Button gesture to action mapping.
    pub buttons: ButtonMap,
    /// Ack publish retry policy.
    pub ack_retry: RetryPolicy,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            radio_sleep_secs: WIFI_SLEEP_DURATION_SECS,
            button_sleep_secs: BUTTON_SLEEP_DURATION_SECS,
            beat_cosy: RING_BEAT_COSY,
            beat_aggressive: RING_BEAT_AGGRESSIVE,
            fade_amount: RING_FADE_AMOUNT,
            settle_delay_ms: SETTLE_DELAY_MS,
            buttons: ButtonMap::default(),
            ack_retry: RetryPolicy::default(),
        }
    }
}

/// Bounded exponential backoff for the ack publish.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RetryPolicy {
    pub base_ms: u64,
    pub max_ms: u64,
    pub max_attempts: u8,
}

impl RetryPolicy {
    /// Delay before the attempt following `failures` consecutive failures.
    pub fn delay_after(&self, failures: u8) -> u64 {
        let shift = u32::from(failures.saturating_sub(1)).min(16);
        self.base_ms.saturating_mul(1 << shift).min(self.max_ms)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            base_ms: ACK_RETRY_BASE_MS,
            max_ms: ACK_RETRY_MAX_MS,
            max_attempts: ACK_PUBLISH_MAX_ATTEMPTS,
        }
    }
}
