//! Deep sleep with timer and button wake.
//!
//! The control loop cannot sleep from inside a tick: a queued ack still
//! has to leave through the MQTT task. [`DeepSleeper`] only records the
//! request; the loop then calls [`enter`], which waits for the radio
//! session to wind down before powering off.

use core::time::Duration as CoreDuration;

use defmt::{info, warn};
use embassy_time::{with_timeout, Duration, Timer};
use esp_hal::gpio::RtcPinWithResistors;
use esp_hal::rtc_cntl::sleep::{Ext0WakeupSource, TimerWakeupSource, WakeupLevel};
use esp_hal::rtc_cntl::Rtc;
use rememberall::traits::Sleeper;

use crate::board::net;

/// Upper bound on waiting for the MQTT task to flush and disconnect.
const TEARDOWN_TIMEOUT_SECS: u64 = 5;

/// Lets the last log lines leave the UART.
const FLUSH_MS: u64 = 100;

#[derive(Default)]
pub struct DeepSleeper {
    requested: Option<u64>,
}

impl DeepSleeper {
    pub const fn new() -> Self {
        Self { requested: None }
    }

    pub fn take_request(&mut self) -> Option<u64> {
        self.requested.take()
    }
}

impl Sleeper for DeepSleeper {
    fn deep_sleep(&mut self, secs: u64) {
        info!("Sleep: requested for {} s", secs);
        self.requested = Some(secs);
    }
}

/// Shut the radio down, wait for the session to close, then sleep.
pub async fn enter(rtc: &mut Rtc<'static>, secs: u64) -> ! {
    net::request_shutdown();
    if with_timeout(Duration::from_secs(TEARDOWN_TIMEOUT_SECS), net::wait_idle())
        .await
        .is_err()
    {
        warn!("Sleep: radio teardown timed out");
    }

    // The button task still owns the pin; it never runs again after this.
    let button = unsafe { esp_hal::peripherals::GPIO12::steal() };
    button.rtcio_pullup(true);
    button.rtcio_pulldown(false);

    let timer = TimerWakeupSource::new(CoreDuration::from_secs(secs));
    let ext0 = Ext0WakeupSource::new(button, WakeupLevel::Low);

    info!("Sleep: entering deep sleep for {} s", secs);
    Timer::after(Duration::from_millis(FLUSH_MS)).await;
    rtc.sleep_deep(&[&timer, &ext0])
}
