//! Three-ink palette of the e-paper panel.

use embedded_graphics::pixelcolor::raw::RawU2;
use embedded_graphics::pixelcolor::PixelColor;

use crate::item::LineColor;

/// RGB565 codes the line color field uses for the panel inks.
pub const WHITE_CODE: u16 = 0xFFFF;
pub const BLACK_CODE: u16 = 0x0000;
pub const RED_CODE: u16 = 0xF800;

/// One of the three inks a tri-color panel can show.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Ink {
    #[default]
    White,
    Black,
    Red,
}

impl PixelColor for Ink {
    type Raw = RawU2;
}

impl Ink {
    /// Map an RGB565 code to the closest ink. Strongly red codes become
    /// [`Ink::Red`], dark ones [`Ink::Black`], everything else white.
    pub fn from_rgb565(code: u16) -> Self {
        match code {
            WHITE_CODE => return Ink::White,
            BLACK_CODE => return Ink::Black,
            RED_CODE => return Ink::Red,
            _ => {}
        }

        let r = (code >> 11) & 0x1F;
        let g = (code >> 5) & 0x3F;
        let b = code & 0x1F;

        if r >= 0x10 && g < 0x20 && b < 0x10 {
            Ink::Red
        } else if r + g / 2 + b < 48 {
            Ink::Black
        } else {
            Ink::White
        }
    }
}

impl From<LineColor> for Ink {
    fn from(color: LineColor) -> Self {
        match color {
            LineColor::Primary => Ink::Black,
            LineColor::Accent => Ink::Red,
            LineColor::Code(code) => Ink::from_rgb565(code),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_aliases() {
        assert_eq!(Ink::from(LineColor::Primary), Ink::Black);
        assert_eq!(Ink::from(LineColor::Accent), Ink::Red);
        assert_eq!(Ink::from(LineColor::Code(RED_CODE)), Ink::Red);
        assert_eq!(Ink::from(LineColor::Code(WHITE_CODE)), Ink::White);
    }

    #[test]
    fn nearest_ink_for_other_codes() {
        // Dark grey, orange-red, light grey.
        assert_eq!(Ink::from_rgb565(0x2104), Ink::Black);
        assert_eq!(Ink::from_rgb565(0xF900), Ink::Red);
        assert_eq!(Ink::from_rgb565(0xC618), Ink::White);
        // Code 2 is a very dark blue.
        assert_eq!(Ink::from_rgb565(2), Ink::Black);
    }
}
