//! Button polling task.
//!
//! The single button is sampled every few milliseconds and fed to the
//! gesture detector; recognised gestures go to the control loop.

use defmt::{info, warn};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::{Channel, Sender};
use embassy_time::{Duration, Instant, Timer};
use esp_hal::gpio::Input;
use rememberall::ui::gesture::GestureDetector;
use rememberall::ui::ButtonEvent;

/// Sampling period, well below the debounce window.
const POLL_MS: u64 = 10;

pub type ButtonChannel = Channel<CriticalSectionRawMutex, ButtonEvent, 4>;

pub static BUTTON_EVENTS: ButtonChannel = Channel::new();

#[embassy_executor::task]
pub async fn button_task(
    btn: Input<'static>,
    tx: Sender<'static, CriticalSectionRawMutex, ButtonEvent, 4>,
) -> ! {
    let mut detector = GestureDetector::new();

    loop {
        // Active-low.
        if let Some(event) = detector.update(btn.is_low(), Instant::now().as_millis()) {
            info!("Button: {}", event);
            if tx.try_send(event).is_err() {
                warn!("Button: queue full, {} dropped", event);
            }
        }
        Timer::after(Duration::from_millis(POLL_MS)).await;
    }
}
