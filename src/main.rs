//! rememberall firmware - ESP32-S2 reminder device.
//!
//! Architecture:
//!   - Control loop (main task) - ticks the `Controller` and mirrors the
//!     link state on the status LED
//!   - Button task - gesture recognition on GPIO12
//!   - Radio task - WiFi, SNTP and the MQTT session, on demand
//!   - Net task - embassy-net stack runner
//!
//! Build-time environment: `WIFI_SSID`, `WIFI_PASS`, `MQTT_BROKER`.

#![no_std]
#![no_main]

mod board;

use defmt::info;
use embassy_executor::Spawner;
use embassy_net::StackResources;
use embassy_time::{Duration, Instant, Timer};
use embedded_hal_bus::spi::ExclusiveDevice;
use esp_backtrace as _;
use esp_hal::clock::CpuClock;
use esp_hal::gpio::{Input, InputConfig, Level, Output, OutputConfig, Pull};
use esp_hal::rmt::Rmt;
use esp_hal::rng::Rng;
use esp_hal::rtc_cntl::Rtc;
use esp_hal::spi::master::{Config as SpiConfig, Spi};
use esp_hal::spi::Mode;
use esp_hal::time::Rate;
use esp_hal::timer::timg::TimerGroup;
use esp_hal_smartled::Ws2812SmartLeds;
use esp_println as _;
use esp_radio::Controller as RadioController;
use rememberall::config::Settings;
use rememberall::traits::{LinkState, Network};
use rememberall::{Controller, Hardware, Now, Pacing};

use board::buttons::{button_task, BUTTON_EVENTS};
use board::net::{net_task, radio_task, MqttNetwork};
use board::panel::EpaperPanel;
use board::ring::{PoweredRing, RMT_BUFFER_LEN};
use board::sleep::{self, DeepSleeper};

esp_bootloader_esp_idf::esp_app_desc!();

macro_rules! mk_static {
    ($t:ty,$val:expr) => {{
        static STATIC_CELL: static_cell::StaticCell<$t> = static_cell::StaticCell::new();
        #[deny(unused_attributes)]
        let x = STATIC_CELL.uninit().write(($val));
        x
    }};
}

/// Loop period once the current session has everything it needs.
const TICK_MS: u64 = 20;

#[esp_rtos::main]
async fn main(spawner: Spawner) -> ! {
    let config = esp_hal::Config::default().with_cpu_clock(CpuClock::max());
    let peripherals = esp_hal::init(config);

    esp_alloc::heap_allocator!(size: 72 * 1024);

    info!(
        "rememberall starting (wake: {})",
        defmt::Debug2Format(&esp_hal::rtc_cntl::wakeup_cause())
    );

    let timg0 = TimerGroup::new(peripherals.TIMG0);
    esp_rtos::start(
        timg0.timer0,
        #[cfg(target_arch = "riscv32")]
        esp_hal::interrupt::software::SoftwareInterruptControl::new(peripherals.SW_INTERRUPT)
            .software_interrupt0,
    );

    // ── Button ──────────────────────────────────────────────────────────
    let button = Input::new(peripherals.GPIO12, InputConfig::default().with_pull(Pull::Up));
    spawner.must_spawn(button_task(button, BUTTON_EVENTS.sender()));

    let mut status_led = Output::new(peripherals.GPIO15, Level::Low, OutputConfig::default());

    // ── E-paper ─────────────────────────────────────────────────────────
    let spi = Spi::new(
        peripherals.SPI2,
        SpiConfig::default()
            .with_frequency(Rate::from_mhz(4))
            .with_mode(Mode::_0),
    )
    .expect("SPI init failed")
    .with_sck(peripherals.GPIO36)
    .with_mosi(peripherals.GPIO35);
    let cs = Output::new(peripherals.GPIO34, Level::High, OutputConfig::default());
    let spi_device = ExclusiveDevice::new_no_delay(spi, cs).expect("SPI device init failed");
    let busy = Input::new(peripherals.GPIO18, InputConfig::default().with_pull(Pull::None));
    let dc = Output::new(peripherals.GPIO33, Level::Low, OutputConfig::default());
    let rst = Output::new(peripherals.GPIO21, Level::High, OutputConfig::default());
    let panel = EpaperPanel::new(spi_device, busy, dc, rst).expect("EPD init failed");

    // ── LED ring ────────────────────────────────────────────────────────
    let rmt = Rmt::new(peripherals.RMT, Rate::from_mhz(80)).expect("failed to initialize RMT");
    let leds = Ws2812SmartLeds::<RMT_BUFFER_LEN, _>::new(rmt.channel0, peripherals.GPIO13)
        .expect("failed to create WS2812 driver");
    let ring_power = Output::new(peripherals.GPIO14, Level::Low, OutputConfig::default());
    let ring = PoweredRing::new(leds, ring_power);

    // ── WiFi / network stack ────────────────────────────────────────────
    let radio = &*mk_static!(
        RadioController<'static>,
        esp_radio::init().expect("failed to init esp-radio")
    );
    let (wifi, interfaces) =
        esp_radio::wifi::new(radio, peripherals.WIFI, Default::default())
            .expect("failed to create wifi");

    let rng = Rng::new();
    let seed = (rng.random() as u64) << 32 | rng.random() as u64;
    let (stack, runner) = embassy_net::new(
        interfaces.sta,
        embassy_net::Config::dhcpv4(Default::default()),
        mk_static!(StackResources<4>, StackResources::<4>::new()),
        seed,
    );
    spawner.must_spawn(net_task(runner));
    spawner.must_spawn(radio_task(wifi, stack));

    let mut rtc = Rtc::new(peripherals.LPWR);

    // ── Control loop ────────────────────────────────────────────────────
    let mut hw = Hardware {
        net: MqttNetwork,
        panel,
        ring,
        sleeper: DeepSleeper::new(),
    };
    let mut controller: Controller = Controller::new(Settings::default());
    info!("Init complete, entering control loop");

    loop {
        while let Ok(event) = BUTTON_EVENTS.try_receive() {
            controller.on_button(event);
        }

        let now = Now {
            uptime_ms: Instant::now().as_millis(),
            epoch: board::clock::now(),
        };
        let pacing = controller.tick(&mut hw, now);

        if hw.net.link() == LinkState::Up {
            status_led.set_high();
        } else {
            status_led.set_low();
        }

        if let Some(secs) = hw.sleeper.take_request() {
            sleep::enter(&mut rtc, secs).await;
        }

        let wait_ms = match pacing {
            Pacing::Immediate => TICK_MS,
            Pacing::Settle(ms) => u64::from(ms).max(TICK_MS),
        };
        Timer::after(Duration::from_millis(wait_ms)).await;
    }
}
