//! Integration tests for the rememberall control loop against fake hardware.

use rememberall::config::{Settings, BUTTON_SLEEP_DURATION_SECS, WIFI_SLEEP_DURATION_SECS};
use rememberall::phase::Phase;
use rememberall::topics::{Inbox, Topic};
use rememberall::traits::{LedRing, LinkState, Network, Panel, Sleeper};
use rememberall::ui::layout::Layout;
use rememberall::ui::ButtonEvent;
use rememberall::{Controller, Error, Hardware, Now, Pacing};
use smart_leds::RGB8;

const T0: u64 = 0x6500_0000;

// ════════════════════════════════════════════════════════════════════════════
// Fakes
// ════════════════════════════════════════════════════════════════════════════

#[derive(Default)]
struct FakeNet {
    link: Option<LinkState>,
    inboxes: [Inbox; 3],
    published: Vec<(Topic, Vec<u8>, bool)>,
    bring_ups: u32,
    shut_downs: u32,
    fail_publishes: u32,
}

impl FakeNet {
    fn deliver(&mut self, topic: Topic, payload: &str) {
        self.inboxes[topic.index()]
            .deliver(payload.as_bytes())
            .expect("payload fits");
    }
}

impl Network for FakeNet {
    fn link(&self) -> LinkState {
        self.link.unwrap_or(LinkState::Down)
    }

    fn bring_up(&mut self) {
        self.bring_ups += 1;
        self.link = Some(LinkState::Up);
    }

    fn shut_down(&mut self) {
        self.shut_downs += 1;
        self.link = Some(LinkState::Down);
    }

    fn received(&self, topic: Topic) -> u32 {
        self.inboxes[topic.index()].received
    }

    fn fetch(&self, topic: Topic) -> Option<Inbox> {
        let inbox = &self.inboxes[topic.index()];
        (inbox.received > 0).then(|| inbox.clone())
    }

    fn try_publish(&mut self, topic: Topic, payload: &[u8], retain: bool) -> Result<(), Error> {
        if self.link() != LinkState::Up {
            return Err(Error::NotConnected);
        }
        if self.fail_publishes > 0 {
            self.fail_publishes -= 1;
            return Err(Error::PublishRejected);
        }
        self.published.push((topic, payload.to_vec(), retain));
        Ok(())
    }
}

#[derive(Default)]
struct FakePanel {
    draws: Vec<Layout>,
    blanks: u32,
}

impl Panel for FakePanel {
    fn draw(&mut self, layout: &Layout) -> Result<(), Error> {
        self.draws.push(layout.clone());
        Ok(())
    }

    fn blank(&mut self) -> Result<(), Error> {
        self.blanks += 1;
        Ok(())
    }
}

#[derive(Default)]
struct FakeRing {
    powered: bool,
    last: Vec<RGB8>,
}

impl LedRing for FakeRing {
    fn set_power(&mut self, on: bool) {
        self.powered = on;
    }

    fn write(&mut self, frame: &[RGB8]) -> Result<(), Error> {
        self.last = frame.to_vec();
        Ok(())
    }
}

#[derive(Default)]
struct FakeSleeper {
    sleeps: Vec<u64>,
}

impl Sleeper for FakeSleeper {
    fn deep_sleep(&mut self, secs: u64) {
        self.sleeps.push(secs);
    }
}

struct Rig {
    ctl: Controller,
    hw: Hardware<FakeNet, FakePanel, FakeRing, FakeSleeper>,
    uptime_ms: u64,
}

impl Rig {
    fn new() -> Self {
        Self {
            ctl: Controller::new(Settings::default()),
            hw: Hardware {
                net: FakeNet::default(),
                panel: FakePanel::default(),
                ring: FakeRing::default(),
                sleeper: FakeSleeper::default(),
            },
            uptime_ms: 0,
        }
    }

    fn tick(&mut self, epoch: Option<u64>) -> Pacing {
        self.uptime_ms += 10;
        self.ctl.tick(
            &mut self.hw,
            Now {
                uptime_ms: self.uptime_ms,
                epoch,
            },
        )
    }

    /// Reminder going cosy at `base + 100`, aggressive at `base + 200`
    /// and due at `base + 300`.
    fn deliver_reminder(&mut self, base: u64) {
        let reminder = format!("{:X}|{:X}|{:X}|00FF00", base + 300, base + 100, base + 200);
        self.hw.net.deliver(Topic::Reminder, &reminder);
    }

    fn deliver_item(&mut self, base: u64, status: &str, text: &str) {
        self.hw.net.deliver(Topic::Status, status);
        self.deliver_reminder(base);
        self.hw.net.deliver(Topic::Text, text);
    }

    /// Boot, receive a fresh item at `T0 + 150` and let the radio go down.
    fn synced_session() -> Self {
        let mut rig = Self::new();
        rig.tick(Some(T0 + 150));
        rig.deliver_item(T0, "open", "2|0;Bins|1;out");
        rig.tick(Some(T0 + 150));
        rig
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Radio Session
// ════════════════════════════════════════════════════════════════════════════

#[test]
fn boot_brings_radio_up_and_waits_for_topics() {
    let mut rig = Rig::new();
    let pacing = rig.tick(None);

    assert_eq!(rig.hw.net.bring_ups, 1);
    assert_eq!(pacing, Pacing::Settle(100));
    assert!(!rig.ctl.sleep_allowed());
}

#[test]
fn complete_session_draws_once_and_schedules_next_start() {
    let mut rig = Rig::synced_session();

    assert_eq!(rig.hw.panel.draws.len(), 1);
    assert_eq!(rig.hw.panel.draws[0].lines().len(), 2);
    assert_eq!(rig.hw.panel.blanks, 0);
    assert_eq!(rig.ctl.phase(), Some(Phase::Cosy));
    assert!(rig.hw.ring.powered);

    assert_eq!(rig.hw.net.shut_downs, 1);
    assert_eq!(rig.hw.net.link(), LinkState::Down);
    assert_eq!(rig.ctl.next_radio_start(), T0 + 150 + WIFI_SLEEP_DURATION_SECS);
    assert!(rig.ctl.sleep_allowed());

    for _ in 0..20 {
        assert_eq!(rig.tick(Some(T0 + 160)), Pacing::Immediate);
    }
    assert_eq!(rig.hw.panel.draws.len(), 1);
    assert_eq!(rig.hw.net.bring_ups, 1);
}

#[test]
fn radio_returns_after_sleep_period() {
    let mut rig = Rig::synced_session();
    let next = rig.ctl.next_radio_start();

    rig.tick(Some(next - 1));
    assert_eq!(rig.hw.net.bring_ups, 1);
    rig.tick(Some(next));
    assert_eq!(rig.hw.net.bring_ups, 2);
    assert_eq!(rig.tick(Some(next)), Pacing::Settle(100));
    assert!(!rig.ctl.sleep_allowed());
}

#[test]
fn old_messages_do_not_complete_a_new_session() {
    let mut rig = Rig::synced_session();
    let next = rig.ctl.next_radio_start();

    rig.tick(Some(next));
    assert_eq!(rig.tick(Some(next)), Pacing::Settle(100));
    assert_eq!(rig.hw.net.link(), LinkState::Up);

    rig.deliver_item(next, "open", "1|0;Bins");
    rig.tick(Some(next));
    assert_eq!(rig.hw.net.link(), LinkState::Down);
    assert_eq!(rig.hw.panel.draws.len(), 2);
    assert_eq!(rig.ctl.phase(), Some(Phase::Aggressive));
}

// ════════════════════════════════════════════════════════════════════════════
// Decoding And Display
// ════════════════════════════════════════════════════════════════════════════

#[test]
fn decoding_waits_for_clock_sync() {
    let mut rig = Rig::new();
    rig.tick(None);
    rig.deliver_item(T0, "open", "1|0;Dentist");

    rig.tick(None);
    assert!(rig.hw.panel.draws.is_empty());
    assert_eq!(rig.ctl.item().line_count(), 0);
    assert_eq!(rig.hw.net.link(), LinkState::Up);

    rig.tick(Some(T0 + 250));
    assert_eq!(rig.hw.panel.draws.len(), 1);
    assert_eq!(rig.ctl.item().lines()[0].text.as_str(), "Dentist");
    assert_eq!(rig.ctl.phase(), Some(Phase::Aggressive));
}

#[test]
fn rejected_text_keeps_previous_item() {
    let mut rig = Rig::synced_session();
    let before = rig.ctl.item().clone();

    rig.hw.net.deliver(Topic::Text, "3|0;only one");
    rig.tick(Some(T0 + 160));

    assert_eq!(rig.ctl.item(), &before);
    assert_eq!(rig.hw.panel.draws.len(), 1);
}

#[test]
fn new_text_redraws_without_touching_reminder() {
    let mut rig = Rig::synced_session();
    rig.hw.net.deliver(Topic::Text, "1|1;Vet");
    rig.tick(Some(T0 + 160));

    assert_eq!(rig.hw.panel.draws.len(), 2);
    assert_eq!(rig.ctl.item().deadline, T0 + 300);
    assert_eq!(rig.ctl.item().lines()[0].text.as_str(), "Vet");
}

#[test]
fn escalation_redraws_panel_once() {
    let mut rig = Rig::synced_session();
    assert_eq!(rig.ctl.phase(), Some(Phase::Cosy));
    assert_eq!(rig.hw.panel.draws.len(), 1);

    rig.tick(Some(T0 + 250));
    assert_eq!(rig.ctl.phase(), Some(Phase::Aggressive));
    assert_eq!(rig.hw.panel.draws.len(), 2);

    for epoch in [T0 + 251, T0 + 260, T0 + 299] {
        rig.tick(Some(epoch));
    }
    assert_eq!(rig.ctl.phase(), Some(Phase::Aggressive));
    assert_eq!(rig.hw.panel.draws.len(), 2);
    assert_eq!(rig.hw.panel.blanks, 0);
    assert!(rig.hw.ring.powered);
}

#[test]
fn deadline_blanks_panel_once_and_stops_ring() {
    let mut rig = Rig::synced_session();

    rig.tick(Some(T0 + 250));
    assert_eq!(rig.ctl.phase(), Some(Phase::Aggressive));
    assert_eq!(rig.hw.panel.blanks, 0);

    for _ in 0..5 {
        rig.tick(Some(T0 + 301));
    }
    assert_eq!(rig.ctl.phase(), Some(Phase::Idle));
    assert_eq!(rig.hw.panel.blanks, 1);
    assert_eq!(rig.hw.panel.draws.len(), 2);
    assert!(!rig.hw.ring.powered);
    assert!(rig.hw.ring.last.iter().all(|px| *px == RGB8::default()));
}

#[test]
fn ring_animates_in_item_color() {
    let mut rig = Rig::synced_session();
    rig.tick(Some(T0 + 160));

    let lit: Vec<_> = rig
        .hw
        .ring
        .last
        .iter()
        .filter(|px| **px != RGB8::default())
        .collect();
    assert!(!lit.is_empty());
    assert!(lit.iter().all(|px| px.r == 0 && px.b == 0 && px.g > 0));
}

#[test]
fn status_ack_from_broker_finishes_item() {
    let mut rig = Rig::synced_session();
    rig.hw.net.deliver(Topic::Status, "ack");
    rig.tick(Some(T0 + 160));

    assert!(rig.ctl.acknowledged());
    assert_eq!(rig.ctl.phase(), Some(Phase::Idle));
    assert_eq!(rig.hw.panel.blanks, 1);
}

// ════════════════════════════════════════════════════════════════════════════
// Button Actions
// ════════════════════════════════════════════════════════════════════════════

#[test]
fn click_sleeps_for_button_period() {
    let mut rig = Rig::synced_session();
    rig.ctl.on_button(ButtonEvent::Click);
    rig.tick(Some(T0 + 160));
    assert_eq!(rig.hw.sleeper.sleeps, [BUTTON_SLEEP_DURATION_SECS]);

    rig.tick(Some(T0 + 160));
    assert_eq!(rig.hw.sleeper.sleeps.len(), 1);
}

#[test]
fn long_press_toggles_radio() {
    let mut rig = Rig::synced_session();

    rig.ctl.on_button(ButtonEvent::LongPress);
    rig.tick(Some(T0 + 200));
    assert_eq!(rig.hw.net.bring_ups, 2);
    assert_eq!(rig.hw.net.link(), LinkState::Up);

    rig.ctl.on_button(ButtonEvent::LongPress);
    rig.tick(Some(T0 + 210));
    assert_eq!(rig.hw.net.link(), LinkState::Down);
    assert_eq!(rig.ctl.next_radio_start(), T0 + 210 + WIFI_SLEEP_DURATION_SECS);

    rig.tick(Some(T0 + 220));
    assert_eq!(rig.hw.net.bring_ups, 2);
}

#[test]
fn online_ack_publishes_and_blanks() {
    let mut rig = Rig::new();
    rig.tick(Some(T0 + 150));
    // No status yet, so the session stays open.
    rig.deliver_reminder(T0);
    rig.hw.net.deliver(Topic::Text, "1|0;Dentist");
    rig.tick(Some(T0 + 150));
    assert_eq!(rig.hw.net.link(), LinkState::Up);
    assert_eq!(rig.hw.panel.draws.len(), 1);

    rig.ctl.on_button(ButtonEvent::DoubleClick);
    rig.tick(Some(T0 + 160));

    assert!(rig.ctl.acknowledged());
    assert_eq!(
        rig.hw.net.published,
        [(Topic::Status, b"ack".to_vec(), true)]
    );
    assert_eq!(rig.hw.panel.blanks, 1);
    assert!(rig.hw.sleeper.sleeps.is_empty());
}

#[test]
fn offline_ack_reconnects_publishes_then_sleeps() {
    let mut rig = Rig::synced_session();
    assert_eq!(rig.hw.net.link(), LinkState::Down);

    rig.ctl.on_button(ButtonEvent::DoubleClick);
    rig.tick(Some(T0 + 170));
    assert_eq!(rig.hw.panel.blanks, 1);
    assert_eq!(rig.hw.net.bring_ups, 2);
    assert!(rig.ctl.ack_pending());
    assert!(rig.hw.net.published.is_empty());

    rig.tick(Some(T0 + 171));
    assert_eq!(rig.hw.net.published.len(), 1);
    assert!(!rig.ctl.ack_pending());
    // The reconnect session has not seen its topics yet.
    assert!(!rig.ctl.sleep_allowed());
    assert!(rig.hw.sleeper.sleeps.is_empty());
    assert_eq!(rig.hw.net.link(), LinkState::Up);

    rig.tick(Some(T0 + 172));
    assert!(rig.hw.sleeper.sleeps.is_empty());

    rig.deliver_item(T0, "ack", "2|0;Bins|1;out");
    rig.tick(Some(T0 + 173));
    assert!(rig.ctl.sleep_allowed());
    assert_eq!(rig.hw.sleeper.sleeps, [WIFI_SLEEP_DURATION_SECS]);
    assert_eq!(rig.hw.net.link(), LinkState::Down);
    assert_eq!(rig.ctl.next_radio_start(), T0 + 173 + WIFI_SLEEP_DURATION_SECS);

    rig.tick(Some(T0 + 174));
    assert_eq!(rig.hw.sleeper.sleeps.len(), 1);
}

#[test]
fn button_sleep_is_not_deferred_by_open_session() {
    let mut rig = Rig::new();
    rig.tick(Some(T0 + 150));
    assert!(!rig.ctl.sleep_allowed());

    rig.ctl.on_button(ButtonEvent::Click);
    rig.tick(Some(T0 + 150));
    assert_eq!(rig.hw.sleeper.sleeps, [BUTTON_SLEEP_DURATION_SECS]);
}

#[test]
fn ack_publish_retries_with_backoff() {
    let mut rig = Rig::synced_session();
    rig.hw.net.fail_publishes = 2;

    rig.ctl.on_button(ButtonEvent::DoubleClick);
    rig.tick(Some(T0 + 170));
    rig.tick(Some(T0 + 170));
    assert!(rig.ctl.ack_pending());
    assert_eq!(rig.hw.net.fail_publishes, 1);

    // Link stays up while the ack is queued, even though every topic is done.
    rig.hw.net.deliver(Topic::Status, "open");
    rig.hw.net.deliver(Topic::Reminder, "1|1|1|0");
    rig.hw.net.deliver(Topic::Text, "1|0;x");
    for _ in 0..10 {
        rig.tick(Some(T0 + 170));
    }
    assert_eq!(rig.hw.net.link(), LinkState::Up);
    assert!(rig.ctl.acknowledged());

    for _ in 0..100 {
        rig.tick(Some(T0 + 171));
    }
    assert!(!rig.ctl.ack_pending());
    assert_eq!(rig.hw.net.published.len(), 1);
}
