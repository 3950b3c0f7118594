//! The main control loop, one [`Controller::tick`] per iteration.
//!
//! Each tick, in order:
//!
//! 1. run the pending button action
//! 2. process a new status message (acknowledgement flag)
//! 3. decode new reminder / text messages, once the clock is synced
//! 4. re-evaluate the urgency phase and react to transitions
//! 5. flush a pending panel update
//! 6. advance the LED ring
//! 7. push a queued acknowledgement
//! 8. run the radio duty cycle
//!
//! All hardware goes through the traits in [`crate::traits`], so the
//! whole loop runs on the host against recording fakes.

use embedded_graphics::geometry::Size;

use crate::ack::{AckOrigin, AckPublisher, PublishOutcome};
use crate::config::{Settings, PANEL_HEIGHT, PANEL_WIDTH, RING_NUM_LEDS};
use crate::decoder::{decode_reminder, decode_text, is_ack};
use crate::item::Item;
use crate::phase::{Phase, PhaseTracker, Transition};
use crate::power::{DutyCycle, RadioCommand};
use crate::ring::RingAnimator;
use crate::topics::{Freshness, Topic};
use crate::traits::{LedRing, LinkState, Network, Panel, Sleeper};
use crate::ui::actions::{ButtonAction, PendingAction};
use crate::ui::layout::layout;
use crate::ui::refresh::{PanelUpdate, RefreshGate};
use crate::ui::ButtonEvent;

/// Driver bundle handed to every tick.
pub struct Hardware<N, P, R, S> {
    pub net: N,
    pub panel: P,
    pub ring: R,
    pub sleeper: S,
}

/// Timestamps for one tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Now {
    /// Monotonic milliseconds since boot.
    pub uptime_ms: u64,
    /// Unix seconds, `None` until the first time sync.
    pub epoch: Option<u64>,
}

/// How long the caller should wait before the next tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Pacing {
    Immediate,
    /// Topics still missing, give the transport time to deliver (ms).
    Settle(u32),
}

pub struct Controller<const LEDS: usize = RING_NUM_LEDS> {
    settings: Settings,
    item: Item,
    acknowledged: bool,
    actions: PendingAction,
    freshness: Freshness,
    phase: PhaseTracker,
    refresh: RefreshGate,
    ring: RingAnimator<LEDS>,
    ring_on: bool,
    duty: DutyCycle,
    ack: AckPublisher,
    /// Radio-driven sleep waiting for the session to complete.
    deferred_sleep: Option<u64>,
}

impl<const LEDS: usize> Controller<LEDS> {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            item: Item::placeholder(),
            acknowledged: false,
            actions: PendingAction::new(settings.buttons),
            freshness: Freshness::new(),
            phase: PhaseTracker::new(),
            refresh: RefreshGate::new(),
            ring: RingAnimator::new(),
            ring_on: false,
            duty: DutyCycle::new(settings.radio_sleep_secs),
            ack: AckPublisher::new(),
            deferred_sleep: None,
        }
    }

    /// Record a button gesture. The mapped action runs on the next tick.
    pub fn on_button(&mut self, event: ButtonEvent) {
        self.actions.post(event);
    }

    pub fn item(&self) -> &Item {
        &self.item
    }

    pub fn acknowledged(&self) -> bool {
        self.acknowledged
    }

    pub fn phase(&self) -> Option<Phase> {
        self.phase.current()
    }

    pub fn ring_frame(&self) -> &[smart_leds::RGB8] {
        self.ring.frame()
    }

    pub fn next_radio_start(&self) -> u64 {
        self.duty.next_start()
    }

    /// `false` while the current radio session still waits for topics.
    /// Radio-driven deep sleep is held back until this turns `true`.
    pub fn sleep_allowed(&self) -> bool {
        self.duty.sleep_allowed()
    }

    pub fn ack_pending(&self) -> bool {
        self.ack.is_pending()
    }

    pub fn tick<N, P, R, S>(&mut self, hw: &mut Hardware<N, P, R, S>, now: Now) -> Pacing
    where
        N: Network,
        P: Panel,
        R: LedRing,
        S: Sleeper,
    {
        self.run_action(hw, now);
        self.process_status(&hw.net);

        if now.epoch.is_some() {
            self.process_reminder(&hw.net);
            self.process_text(&hw.net);
        }

        let transition = self.phase.update(now.epoch, &self.item, self.acknowledged);
        self.on_transition(transition, &mut hw.ring);

        self.flush_panel(&mut hw.panel, now.epoch);
        self.animate(&mut hw.ring, now.uptime_ms);

        if let PublishOutcome::Published(AckOrigin::Offline) =
            self.ack.poll(&mut hw.net, &self.settings.ack_retry, now.uptime_ms)
        {
            info!("offline ack delivered, sleep {} s deferred", self.settings.radio_sleep_secs);
            self.deferred_sleep = Some(self.settings.radio_sleep_secs);
        }

        let link = hw.net.link();
        match self.duty.decide(
            link,
            now.epoch,
            self.freshness.all_fresh(),
            self.ack.is_pending(),
        ) {
            RadioCommand::BringUp => self.radio_up(&mut hw.net),
            RadioCommand::ShutDown => hw.net.shut_down(),
            RadioCommand::Hold => {}
        }

        if self.duty.sleep_allowed() {
            if let Some(secs) = self.deferred_sleep.take() {
                info!("session complete, sleeping {} s", secs);
                hw.sleeper.deep_sleep(secs);
            }
        }

        if self.freshness.all_fresh() {
            Pacing::Immediate
        } else {
            Pacing::Settle(self.settings.settle_delay_ms)
        }
    }

    fn run_action<N, P, R, S>(&mut self, hw: &mut Hardware<N, P, R, S>, now: Now)
    where
        N: Network,
        P: Panel,
        R: LedRing,
        S: Sleeper,
    {
        match self.actions.take() {
            ButtonAction::None => {}
            ButtonAction::Sleep => {
                info!("button: sleep {} s", self.settings.button_sleep_secs);
                hw.sleeper.deep_sleep(self.settings.button_sleep_secs);
            }
            ButtonAction::ToggleRadio => {
                match self.duty.toggle(hw.net.link(), now.epoch) {
                    RadioCommand::BringUp => self.radio_up(&mut hw.net),
                    RadioCommand::ShutDown => hw.net.shut_down(),
                    RadioCommand::Hold => {}
                }
            }
            ButtonAction::Acknowledge => {
                self.acknowledged = true;
                let origin = if hw.net.link() == LinkState::Up {
                    AckOrigin::Online
                } else {
                    self.duty.force_start();
                    AckOrigin::Offline
                };
                info!("button: acknowledged ({})", origin);
                self.ack.request(origin, now.uptime_ms);
            }
        }
    }

    fn radio_up<N: Network>(&mut self, net: &mut N) {
        let counters = Topic::ALL.map(|t| net.received(t));
        self.freshness.restart(counters);
        net.bring_up();
    }

    fn process_status<N: Network>(&mut self, net: &N) {
        let received = net.received(Topic::Status);
        if !self.freshness.is_pending(Topic::Status, received) {
            return;
        }
        if let Some(inbox) = net.fetch(Topic::Status) {
            let ack = is_ack(&inbox.payload);
            if !ack && self.ack.is_pending() {
                debug!("status not ack yet, local ack kept while publish pending");
            } else {
                self.acknowledged = ack;
            }
        }
        self.freshness.mark_processed(Topic::Status, received);
    }

    fn process_reminder<N: Network>(&mut self, net: &N) {
        let received = net.received(Topic::Reminder);
        if !self.freshness.is_pending(Topic::Reminder, received) {
            return;
        }
        if let Some(inbox) = net.fetch(Topic::Reminder) {
            match decode_reminder(&inbox.payload) {
                Ok(reminder) => {
                    self.item.set_reminder(reminder);
                    self.phase.arm();
                    debug!("reminder decoded, deadline {}", reminder.deadline);
                }
                Err(e) => warn!("reminder rejected: {}", e),
            }
        }
        self.freshness.mark_processed(Topic::Reminder, received);
    }

    fn process_text<N: Network>(&mut self, net: &N) {
        let received = net.received(Topic::Text);
        if !self.freshness.is_pending(Topic::Text, received) {
            return;
        }
        if let Some(inbox) = net.fetch(Topic::Text) {
            match decode_text(&inbox.payload) {
                Ok(lines) => {
                    debug!("text decoded, {} lines", lines.len());
                    self.item.set_text(lines);
                    self.refresh.request();
                }
                Err(e) => warn!("text rejected: {}", e),
            }
        }
        self.freshness.mark_processed(Topic::Text, received);
    }

    fn on_transition<R: LedRing>(&mut self, transition: Transition, ring: &mut R) {
        match transition {
            Transition::Steady => {}
            Transition::Finished => {
                info!("phase: idle");
                self.ring_power(ring, false);
                self.refresh.request();
            }
            Transition::Started(phase) => {
                info!("phase: {} (start)", phase);
                self.ring_power(ring, true);
                self.refresh.request();
            }
            Transition::Escalated(phase) => {
                info!("phase: {}", phase);
                self.refresh.request();
            }
        }
    }

    fn ring_power<R: LedRing>(&mut self, ring: &mut R, on: bool) {
        self.ring.clear();
        if !on {
            if let Err(e) = ring.write(self.ring.frame()) {
                warn!("ring clear failed: {}", e);
            }
        }
        ring.set_power(on);
        self.ring_on = on;
    }

    fn flush_panel<P: Panel>(&mut self, panel: &mut P, epoch: Option<u64>) {
        let ready = epoch.is_some() && self.freshness.is_fresh(Topic::Reminder);
        let finished = match epoch {
            Some(now) => self.acknowledged || now > self.item.deadline,
            None => false,
        };

        let result = match self.refresh.take(ready, finished) {
            None => return,
            Some(PanelUpdate::Blank) => {
                info!("panel: blank");
                panel.blank()
            }
            Some(PanelUpdate::Draw) => {
                info!("panel: draw {} lines", self.item.line_count());
                panel.draw(&layout(
                    self.item.lines(),
                    Size::new(PANEL_WIDTH, PANEL_HEIGHT),
                ))
            }
        };
        if let Err(e) = result {
            error!("panel update failed: {}", e);
        }
    }

    fn animate<R: LedRing>(&mut self, ring: &mut R, uptime_ms: u64) {
        if !self.ring_on {
            return;
        }
        let bpm = match self.phase.current() {
            Some(Phase::Cosy) => self.settings.beat_cosy,
            _ => self.settings.beat_aggressive,
        };
        self.ring
            .step(bpm, self.item.ring_rgb(), self.settings.fade_amount, uptime_ms);
        if let Err(e) = ring.write(self.ring.frame()) {
            warn!("ring write failed: {}", e);
        }
    }
}

impl Default for Controller<RING_NUM_LEDS> {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}
