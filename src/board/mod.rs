//! ESP32-S2 board glue - implements the library's hardware traits.
//!
//! Pin map (Waveshare 2.13" B/C e-paper hat + WS2812 ring):
//!   - E-paper: MOSI 35, CLK 36, CS 34, DC 33, RST 21, BUSY 18
//!   - LED ring: data GPIO13, power switch GPIO14 (active-high)
//!   - Button: GPIO12 (active-low, internal pull-up, deep-sleep wake)
//!   - Status LED: GPIO15

pub mod buttons;
pub mod clock;
pub mod net;
pub mod panel;
pub mod ring;
pub mod sleep;
pub mod sntp;
