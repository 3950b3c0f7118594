//! Placement of 1..=3 text lines on the panel.
//!
//! A single line is centered from its measured bounding box. Two and
//! three lines sit on fixed baselines derived from the vertical offset
//! and line height in [`crate::config`].

use embedded_graphics::mono_font::ascii::FONT_10X20;
use embedded_graphics::mono_font::{MonoFont, MonoTextStyle, MonoTextStyleBuilder};
use embedded_graphics::prelude::*;
use embedded_graphics::text::{Baseline, Text};
use heapless::Vec;

use crate::config::{LINE_HEIGHT, MAX_LINES, TEXT_X_OFFSET, TEXT_Y_OFFSET};
use crate::item::{Line, LineText};
use crate::ui::palette::Ink;

/// Panel font.
pub const FONT: &MonoFont<'static> = &FONT_10X20;

/// Advance of one glyph in [`FONT`].
pub const CHAR_WIDTH: i32 = 10;

pub fn text_style(ink: Ink) -> MonoTextStyle<'static, Ink> {
    MonoTextStyleBuilder::new()
        .font(FONT)
        .text_color(ink)
        .build()
}

/// One line ready to draw.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlacedLine {
    pub text: LineText,
    pub ink: Ink,
    pub origin: Point,
    pub baseline: Baseline,
}

/// Everything needed to draw the current item's text.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Layout {
    lines: Vec<PlacedLine, MAX_LINES>,
}

impl Layout {
    pub fn lines(&self) -> &[PlacedLine] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Lay out `lines` on a panel of `size`. Lines beyond [`MAX_LINES`] are
/// ignored.
pub fn layout(lines: &[Line], size: Size) -> Layout {
    let lines = &lines[..lines.len().min(MAX_LINES)];
    let half = LINE_HEIGHT / 2;

    let placed = lines.iter().enumerate().map(|(row, line)| {
        let (origin, baseline) = match (lines.len(), row) {
            (1, _) => (centered(line.text.as_str(), size), Baseline::Top),
            (2, 0) => (
                Point::new(TEXT_X_OFFSET, TEXT_Y_OFFSET + half - 4),
                Baseline::Alphabetic,
            ),
            (2, _) => (
                Point::new(TEXT_X_OFFSET, TEXT_Y_OFFSET + LINE_HEIGHT + half + 4),
                Baseline::Alphabetic,
            ),
            _ => (
                Point::new(TEXT_X_OFFSET, TEXT_Y_OFFSET + row as i32 * LINE_HEIGHT),
                Baseline::Alphabetic,
            ),
        };
        place(line, origin, baseline)
    });

    Layout {
        lines: placed.collect(),
    }
}

fn place(line: &Line, origin: Point, baseline: Baseline) -> PlacedLine {
    PlacedLine {
        text: line.text.clone(),
        ink: Ink::from(line.color),
        origin,
        baseline,
    }
}

/// Top-left origin that centers `text` on a panel of `size`.
fn centered(text: &str, size: Size) -> Point {
    let bounds = Text::with_baseline(text, Point::zero(), text_style(Ink::Black), Baseline::Top)
        .bounding_box();
    let x = (size.width as i32 - bounds.size.width as i32) / 2 - bounds.top_left.x;
    let y = (size.height as i32 - bounds.size.height as i32) / 2 - bounds.top_left.y;
    Point::new(x, y)
}
