//! The single tracked reminder item.
//!
//! There is exactly one [`Item`] at a time. Text and reminder messages
//! each replace their half of it wholesale; nothing is merged line by
//! line and a rejected message leaves it untouched.

use heapless::{String, Vec};
use smart_leds::RGB8;

use crate::config::{CHARS_PER_LINE, DEFAULT_RING_COLOR, MAX_LINES};

/// One display line, capped at the panel's characters-per-line.
pub type LineText = String<CHARS_PER_LINE>;

/// Per-line text color as sent on the wire.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LineColor {
    /// Wire code `0`, the panel foreground.
    Primary,
    /// Wire code `1`, short alias for the accent (red) ink.
    Accent,
    /// Any other code, passed through to the panel palette.
    Code(u16),
}

impl LineColor {
    /// Wire code that selects the accent ink.
    pub const ACCENT_ALIAS: u16 = 1;

    pub fn from_wire(code: u16) -> Self {
        match code {
            0 => LineColor::Primary,
            Self::ACCENT_ALIAS => LineColor::Accent,
            other => LineColor::Code(other),
        }
    }

    pub fn wire_code(self) -> u16 {
        match self {
            LineColor::Primary => 0,
            LineColor::Accent => Self::ACCENT_ALIAS,
            LineColor::Code(code) => code,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Line {
    pub text: LineText,
    pub color: LineColor,
}

/// 1..=3 decoded display lines.
pub type TextBlock = Vec<Line, MAX_LINES>;

/// Decoded reminder timing. Timestamps are Unix seconds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Reminder {
    pub deadline: u64,
    pub cosy: u64,
    pub aggressive: u64,
    /// `0xRRGGBB`; anything above 24 bits is ignored.
    pub ring_color: u32,
}

/// The currently tracked task/event.
///
/// Intended ordering is `cosy <= aggressive <= deadline`, but nothing
/// enforces it; the phase table is well defined for any ordering.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Item {
    lines: TextBlock,
    pub deadline: u64,
    pub cosy: u64,
    pub aggressive: u64,
    pub ring_color: u32,
}

impl Item {
    /// Zeroed placeholder used before the first message arrives.
    pub const fn placeholder() -> Self {
        Self {
            lines: Vec::new(),
            deadline: 0,
            cosy: 0,
            aggressive: 0,
            ring_color: DEFAULT_RING_COLOR,
        }
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    /// Replace all lines, leaving the timestamps alone.
    pub fn set_text(&mut self, lines: TextBlock) {
        self.lines = lines;
    }

    /// Replace the timing fields and ring color, leaving the text alone.
    pub fn set_reminder(&mut self, reminder: Reminder) {
        self.deadline = reminder.deadline;
        self.cosy = reminder.cosy;
        self.aggressive = reminder.aggressive;
        self.ring_color = reminder.ring_color;
    }

    pub fn ring_rgb(&self) -> RGB8 {
        let [_, r, g, b] = self.ring_color.to_be_bytes();
        RGB8 { r, g, b }
    }
}

impl Default for Item {
    fn default() -> Self {
        Self::placeholder()
    }
}
