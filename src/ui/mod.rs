//! User interface subsystem - e-paper panel + one physical button.
//!
//! The panel shows the current item's text; the button drives a small
//! gesture detector whose events map to configurable actions.
//!
//! ## Components
//!
//! - **Display**: tri-color 212×104 e-paper, laid out by [`layout`] and
//!   rendered by [`display`] onto any `embedded-graphics` target
//! - **Button**: single active-low tactile switch, decoded by [`gesture`]
//!   and mapped to actions by [`actions`]

pub mod actions;
pub mod display;
pub mod gesture;
pub mod layout;
pub mod palette;
pub mod refresh;

/// Gestures recognised on the single button.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ButtonEvent {
    Click,
    DoubleClick,
    LongPress,
}
