//! Button gesture → action mapping and the single pending-action slot.
//!
//! Gestures are recognised in the button task; the action they map to is
//! executed later by the main loop. Only the most recent action is kept.

use crate::ui::ButtonEvent;

/// Something the main loop does in response to a gesture.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ButtonAction {
    #[default]
    None,
    /// Deep sleep for the button sleep duration.
    Sleep,
    /// Radio on if off, off (and rescheduled) if on.
    ToggleRadio,
    /// Acknowledge the current item and publish it.
    Acknowledge,
}

/// Which action each gesture triggers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ButtonMap {
    pub click: ButtonAction,
    pub double_click: ButtonAction,
    pub long_press: ButtonAction,
}

impl ButtonMap {
    pub fn action_for(&self, event: ButtonEvent) -> ButtonAction {
        match event {
            ButtonEvent::Click => self.click,
            ButtonEvent::DoubleClick => self.double_click,
            ButtonEvent::LongPress => self.long_press,
        }
    }
}

impl Default for ButtonMap {
    fn default() -> Self {
        Self {
            click: ButtonAction::Sleep,
            double_click: ButtonAction::Acknowledge,
            long_press: ButtonAction::ToggleRadio,
        }
    }
}

/// Holds at most one action waiting for the main loop.
#[derive(Clone, Copy, Debug, Default)]
pub struct PendingAction {
    map: ButtonMap,
    pending: ButtonAction,
}

impl PendingAction {
    pub fn new(map: ButtonMap) -> Self {
        Self {
            map,
            pending: ButtonAction::None,
        }
    }

    /// Record the action for `event`, replacing anything still pending.
    pub fn post(&mut self, event: ButtonEvent) {
        let action = self.map.action_for(event);
        if self.pending != ButtonAction::None && self.pending != action {
            debug!("button action {} replaced", self.pending);
        }
        self.pending = action;
    }

    /// Take the pending action, leaving the slot empty.
    pub fn take(&mut self) -> ButtonAction {
        core::mem::take(&mut self.pending)
    }

    pub fn peek(&self) -> ButtonAction {
        self.pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_mapping() {
        let map = ButtonMap::default();
        assert_eq!(map.action_for(ButtonEvent::Click), ButtonAction::Sleep);
        assert_eq!(map.action_for(ButtonEvent::DoubleClick), ButtonAction::Acknowledge);
        assert_eq!(map.action_for(ButtonEvent::LongPress), ButtonAction::ToggleRadio);
    }

    #[test]
    fn take_runs_once() {
        let mut slot = PendingAction::new(ButtonMap::default());
        slot.post(ButtonEvent::DoubleClick);
        assert_eq!(slot.take(), ButtonAction::Acknowledge);
        assert_eq!(slot.take(), ButtonAction::None);
    }

    #[test]
    fn last_event_wins() {
        let mut slot = PendingAction::new(ButtonMap::default());
        slot.post(ButtonEvent::LongPress);
        slot.post(ButtonEvent::Click);
        assert_eq!(slot.peek(), ButtonAction::Sleep);
        assert_eq!(slot.take(), ButtonAction::Sleep);
    }

    #[test]
    fn remapped_gestures() {
        let map = ButtonMap {
            click: ButtonAction::Acknowledge,
            double_click: ButtonAction::None,
            long_press: ButtonAction::Sleep,
        };
        let mut slot = PendingAction::new(map);
        slot.post(ButtonEvent::DoubleClick);
        assert_eq!(slot.take(), ButtonAction::None);
        slot.post(ButtonEvent::Click);
        assert_eq!(slot.take(), ButtonAction::Acknowledge);
    }
}
