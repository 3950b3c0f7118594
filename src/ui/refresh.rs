//! Coalescing of panel redraw requests.
//!
//! E-paper refreshes are slow and visible, so any number of requests
//! between two flushes collapse into one panel update.

/// What the next panel update shows.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PanelUpdate {
    /// Draw the item's text.
    Draw,
    /// Blank page, item is done.
    Blank,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RefreshGate {
    pending: bool,
}

impl RefreshGate {
    pub const fn new() -> Self {
        Self { pending: false }
    }

    pub fn request(&mut self) {
        self.pending = true;
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Consume the pending request if the display may be updated now.
    ///
    /// `ready` is false until the clock is synced and a reminder has been
    /// decoded this radio session; `finished` selects a blank page over
    /// the item text.
    pub fn take(&mut self, ready: bool, finished: bool) -> Option<PanelUpdate> {
        if !self.pending || !ready {
            return None;
        }
        self.pending = false;
        Some(if finished {
            PanelUpdate::Blank
        } else {
            PanelUpdate::Draw
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requests_coalesce() {
        let mut gate = RefreshGate::new();
        gate.request();
        gate.request();
        assert_eq!(gate.take(true, false), Some(PanelUpdate::Draw));
        assert_eq!(gate.take(true, false), None);
    }

    #[test]
    fn held_until_ready() {
        let mut gate = RefreshGate::new();
        gate.request();
        assert_eq!(gate.take(false, false), None);
        assert!(gate.is_pending());
        assert_eq!(gate.take(true, true), Some(PanelUpdate::Blank));
    }
}
