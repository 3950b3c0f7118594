//! WS2812 ring on the RMT peripheral, behind a power switch.

use defmt::warn;
use embassy_time::Delay;
use embedded_hal::delay::DelayNs;
use esp_hal::gpio::Output;
use esp_hal::Blocking;
use esp_hal_smartled::Ws2812SmartLeds;
use rememberall::config::{RING_BRIGHTNESS, RING_NUM_LEDS, RING_POWER_UP_MS};
use rememberall::traits::LedRing;
use rememberall::Error;
use smart_leds::{brightness, SmartLedsWrite, RGB8};

/// RMT pulse buffer: 24 bits per LED plus the end marker.
pub const RMT_BUFFER_LEN: usize = RING_NUM_LEDS * 24 + 1;

pub type RingDriver = Ws2812SmartLeds<'static, RMT_BUFFER_LEN, Blocking>;

pub struct PoweredRing {
    driver: RingDriver,
    power: Output<'static>,
}

impl PoweredRing {
    pub fn new(driver: RingDriver, mut power: Output<'static>) -> Self {
        power.set_low();
        Self { driver, power }
    }
}

impl LedRing for PoweredRing {
    fn set_power(&mut self, on: bool) {
        if on {
            self.power.set_high();
            // WS2812s ignore data until their supply settles.
            Delay.delay_ms(RING_POWER_UP_MS as u32);
        } else {
            self.power.set_low();
        }
    }

    fn write(&mut self, frame: &[RGB8]) -> Result<(), Error> {
        self.driver
            .write(brightness(frame.iter().copied(), RING_BRIGHTNESS))
            .map_err(|e| {
                warn!("Ring: write failed: {}", defmt::Debug2Format(&e));
                Error::Led
            })
    }
}
