//! Host-testable core of the rememberall reminder device.
//!
//! Everything that decides *what* the device does lives here: message
//! decoding, the urgency phase, the LED ring animation, panel layout,
//! button gestures, the radio duty cycle and the control loop tying them
//! together. Hardware is reached only through the traits in [`traits`].
//!
//! Usage: `cargo test` on the host.
//!
//! Note: The embedded binary uses main.rs with #![no_std] and #![no_main]
//! and is only built with `--features embedded`.

#![cfg_attr(not(test), no_std)]

mod fmt;

pub mod ack;
pub mod config;
pub mod controller;
pub mod decoder;
pub mod error;
pub mod item;
pub mod phase;
pub mod power;
pub mod power_logic;
pub mod ring;
pub mod topics;
pub mod traits;
pub mod ui;

pub use controller::{Controller, Hardware, Now, Pacing};
pub use error::{DecodeError, Error};

// ═══════════════════════════════════════════════════════════════════════════
// Unit Tests
// ═══════════════════════════════════════════════════════════════════════════
