//! Rendering of a [`Layout`] onto any tri-color draw target.
//!
//! The e-paper driver adapter in the firmware implements
//! `DrawTarget<Color = Ink>`; tests use an in-memory canvas.

use embedded_graphics::prelude::*;
use embedded_graphics::text::Text;

use crate::ui::layout::{text_style, Layout};
use crate::ui::palette::Ink;

/// Paper color behind the text.
pub const BACKGROUND: Ink = Ink::White;

/// Clear the target and draw every placed line.
pub fn render<D>(target: &mut D, layout: &Layout) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Ink>,
{
    target.clear(BACKGROUND)?;

    for line in layout.lines() {
        Text::with_baseline(
            line.text.as_str(),
            line.origin,
            text_style(line.ink),
            line.baseline,
        )
        .draw(target)?;
    }

    Ok(())
}

/// Blank page.
pub fn render_blank<D>(target: &mut D) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Ink>,
{
    target.clear(BACKGROUND)
}
