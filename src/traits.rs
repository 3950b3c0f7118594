//! Hardware seams consumed by the control loop.
//!
//! The firmware implements these on top of esp-hal, the MQTT task and the
//! e-paper/LED drivers; tests implement them with plain recorders.

use smart_leds::RGB8;

use crate::error::Error;
use crate::topics::{Inbox, Topic};
use crate::ui::layout::Layout;

/// Radio / broker link state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkState {
    /// Radio powered off.
    Down,
    /// Radio on, WiFi or broker session not yet established.
    Connecting,
    /// Subscribed and able to publish.
    Up,
}

/// Pub/sub transport plus radio power control.
pub trait Network {
    fn link(&self) -> LinkState;

    /// Power the radio and start connecting. Must not block.
    fn bring_up(&mut self);

    /// Disconnect and power the radio off. Must not block.
    fn shut_down(&mut self);

    /// Arrival counter for `topic`.
    fn received(&self, topic: Topic) -> u32;

    /// Latest message on `topic`, if any arrived.
    fn fetch(&self, topic: Topic) -> Option<Inbox>;

    /// Queue a publish without waiting for the broker.
    fn try_publish(&mut self, topic: Topic, payload: &[u8], retain: bool) -> Result<(), Error>;
}

/// Bi-stable display. Both calls leave the panel in its low-power hold
/// state.
pub trait Panel {
    fn draw(&mut self, layout: &Layout) -> Result<(), Error>;

    fn blank(&mut self) -> Result<(), Error>;
}

/// Addressable LED ring behind a power switch.
pub trait LedRing {
    fn set_power(&mut self, on: bool);

    fn write(&mut self, frame: &[RGB8]) -> Result<(), Error>;
}

/// Deep sleep. On hardware this never returns (the chip resets on wake).
pub trait Sleeper {
    fn deep_sleep(&mut self, secs: u64);
}
