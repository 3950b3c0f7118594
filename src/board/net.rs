//! WiFi + MQTT transport behind the [`Network`] trait.
//!
//! The control loop is synchronous; the radio lives in [`radio_task`].
//! They share:
//!   - `LINK`: current [`LinkState`], written by both sides
//!   - `REQUEST`: up/down commands from the loop
//!   - `INBOXES`: latest payload per topic, filled by the MQTT session
//!   - `OUTBOX`: queued publishes, drained by the MQTT session
//!
//! Build-time environment: `WIFI_SSID`, `WIFI_PASS`, `MQTT_BROKER`
//! (hostname or dotted IPv4, port 1883).

use core::cell::RefCell;
use core::sync::atomic::{AtomicBool, AtomicU8, Ordering};

use defmt::{debug, info, warn, Debug2Format};
use embassy_futures::select::{select, Either};
use embassy_net::dns::DnsQueryType;
use embassy_net::tcp::TcpSocket;
use embassy_net::{Runner, Stack};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::channel::Channel;
use embassy_sync::signal::Signal;
use embassy_time::{with_timeout, Duration, Instant, Timer};
use esp_radio::wifi::{ClientConfig, ModeConfig, WifiController, WifiDevice};
use heapless::Vec;
use rememberall::config::MAX_MESSAGE_LEN;
use rememberall::topics::{Inbox, Topic};
use rememberall::traits::{LinkState, Network};
use rememberall::Error;
use rust_mqtt::client::client::MqttClient;
use rust_mqtt::client::client_config::{ClientConfig as MqttConfig, MqttVersion};
use rust_mqtt::packet::v5::publish_packet::QualityOfService;
use rust_mqtt::packet::v5::reason_codes::ReasonCode;
use rust_mqtt::utils::rng_generator::CountingRng;

use crate::board::{clock, sntp};

const SSID: &str = env!("WIFI_SSID");
const PASSWORD: &str = env!("WIFI_PASS");
const MQTT_BROKER: &str = env!("MQTT_BROKER");
const MQTT_PORT: u16 = 1883;
const MQTT_CLIENT_ID: &str = "rememberall";

const MQTT_BUFFER_LEN: usize = 256;
const TCP_BUFFER_LEN: usize = 1024;
const MQTT_KEEP_ALIVE_SECS: u16 = 60;
const PING_INTERVAL_SECS: u64 = 30;

/// How long one receive may block before the outbox and commands are
/// checked again.
const RECEIVE_POLL_MS: u64 = 100;

const RETRY_DELAY_SECS: u64 = 5;
const SNTP_ATTEMPTS: u8 = 3;

const OUTBOX_DEPTH: usize = 2;

#[derive(Clone, Copy, Debug, PartialEq, Eq, defmt::Format)]
enum RadioRequest {
    Up,
    Down,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, defmt::Format)]
enum SessionError {
    Wifi,
    Clock,
    Dns,
    Tcp,
    Mqtt,
}

struct Outgoing {
    topic: Topic,
    payload: Vec<u8, MAX_MESSAGE_LEN>,
    retain: bool,
}

static LINK: AtomicU8 = AtomicU8::new(LINK_DOWN);
static SESSION_ACTIVE: AtomicBool = AtomicBool::new(false);
static REQUEST: Signal<CriticalSectionRawMutex, RadioRequest> = Signal::new();
static INBOXES: Mutex<CriticalSectionRawMutex, RefCell<[Inbox; 3]>> =
    Mutex::new(RefCell::new([Inbox::new(), Inbox::new(), Inbox::new()]));
static OUTBOX: Channel<CriticalSectionRawMutex, Outgoing, OUTBOX_DEPTH> = Channel::new();

const LINK_DOWN: u8 = 0;
const LINK_CONNECTING: u8 = 1;
const LINK_UP: u8 = 2;

fn set_link(state: LinkState) {
    let raw = match state {
        LinkState::Down => LINK_DOWN,
        LinkState::Connecting => LINK_CONNECTING,
        LinkState::Up => LINK_UP,
    };
    LINK.store(raw, Ordering::Release);
}

fn link() -> LinkState {
    match LINK.load(Ordering::Acquire) {
        LINK_UP => LinkState::Up,
        LINK_CONNECTING => LinkState::Connecting,
        _ => LinkState::Down,
    }
}

/// Ask the radio task to close the session and power the radio off.
pub fn request_shutdown() {
    set_link(LinkState::Down);
    REQUEST.signal(RadioRequest::Down);
}

/// Resolves once no radio session is running.
pub async fn wait_idle() {
    while SESSION_ACTIVE.load(Ordering::Acquire) {
        Timer::after(Duration::from_millis(50)).await;
    }
}

/// Handle used by the control loop.
pub struct MqttNetwork;

impl Network for MqttNetwork {
    fn link(&self) -> LinkState {
        link()
    }

    fn bring_up(&mut self) {
        set_link(LinkState::Connecting);
        REQUEST.signal(RadioRequest::Up);
    }

    fn shut_down(&mut self) {
        request_shutdown();
    }

    fn received(&self, topic: Topic) -> u32 {
        INBOXES.lock(|boxes| boxes.borrow()[topic.index()].received)
    }

    fn fetch(&self, topic: Topic) -> Option<Inbox> {
        INBOXES.lock(|boxes| {
            let inbox = &boxes.borrow()[topic.index()];
            (inbox.received > 0).then(|| inbox.clone())
        })
    }

    fn try_publish(&mut self, topic: Topic, payload: &[u8], retain: bool) -> Result<(), Error> {
        if link() != LinkState::Up {
            return Err(Error::NotConnected);
        }
        let payload = Vec::from_slice(payload).map_err(|_| Error::BufferOverflow)?;
        OUTBOX
            .try_send(Outgoing {
                topic,
                payload,
                retain,
            })
            .map_err(|_| Error::PublishRejected)
    }
}

#[embassy_executor::task]
pub async fn net_task(mut runner: Runner<'static, WifiDevice<'static>>) {
    runner.run().await
}

/// Owns the WiFi controller. Idles with the radio off until the control
/// loop asks for a session.
#[embassy_executor::task]
pub async fn radio_task(mut wifi: WifiController<'static>, stack: Stack<'static>) -> ! {
    loop {
        if REQUEST.wait().await != RadioRequest::Up {
            continue;
        }
        SESSION_ACTIVE.store(true, Ordering::Release);
        info!("Radio: session start");

        run_session(&mut wifi, stack).await;

        wifi_disconnect(&mut wifi).await;
        set_link(LinkState::Down);
        SESSION_ACTIVE.store(false, Ordering::Release);
        info!("Radio: off");
    }
}

/// Connect and serve MQTT until a shutdown is requested, retrying on
/// failure.
async fn run_session(wifi: &mut WifiController<'static>, stack: Stack<'static>) {
    loop {
        match select(connect(wifi, stack), shutdown_requested()).await {
            Either::First(Ok(())) => {}
            Either::First(Err(e)) => {
                warn!("Radio: connect failed: {}", e);
                if retry_or_shutdown().await {
                    return;
                }
                continue;
            }
            Either::Second(()) => return,
        }

        match mqtt_session(stack).await {
            Ok(()) => return,
            Err(e) => {
                warn!("MQTT: session failed: {}", e);
                set_link(LinkState::Connecting);
                if retry_or_shutdown().await {
                    return;
                }
            }
        }
    }
}

async fn shutdown_requested() {
    while REQUEST.wait().await != RadioRequest::Down {}
}

/// Wait out the retry delay. `true` if a shutdown arrived meanwhile.
async fn retry_or_shutdown() -> bool {
    matches!(
        select(
            Timer::after(Duration::from_secs(RETRY_DELAY_SECS)),
            shutdown_requested()
        )
        .await,
        Either::Second(())
    )
}

/// WiFi association, DHCP and a clock sync.
async fn connect(wifi: &mut WifiController<'static>, stack: Stack<'static>) -> Result<(), SessionError> {
    wifi_connect(wifi).await?;
    wait_for_ip(stack).await;

    for attempt in 1..=SNTP_ATTEMPTS {
        match sntp::fetch_unix_time(stack).await {
            Ok(epoch) => {
                clock::set(epoch);
                return Ok(());
            }
            Err(e) => warn!("SNTP: attempt {} failed: {}", attempt, e),
        }
    }
    // A clock from an earlier session is still good enough.
    if clock::now().is_some() {
        Ok(())
    } else {
        Err(SessionError::Clock)
    }
}

async fn wifi_connect(wifi: &mut WifiController<'static>) -> Result<(), SessionError> {
    if !matches!(wifi.is_started(), Ok(true)) {
        let config = ModeConfig::Client(
            ClientConfig::default()
                .with_ssid(SSID.into())
                .with_password(PASSWORD.into()),
        );
        wifi.set_config(&config).map_err(|e| {
            warn!("WiFi: config rejected: {}", Debug2Format(&e));
            SessionError::Wifi
        })?;
        wifi.start_async().await.map_err(|e| {
            warn!("WiFi: start failed: {}", Debug2Format(&e));
            SessionError::Wifi
        })?;
    }

    if matches!(wifi.is_connected(), Ok(true)) {
        return Ok(());
    }
    info!("WiFi: connecting to {}", SSID);
    wifi.connect_async().await.map_err(|e| {
        warn!("WiFi: connect failed: {}", Debug2Format(&e));
        SessionError::Wifi
    })
}

async fn wifi_disconnect(wifi: &mut WifiController<'static>) {
    if let Err(e) = wifi.disconnect_async().await {
        debug!("WiFi: disconnect: {}", Debug2Format(&e));
    }
    if let Err(e) = wifi.stop_async().await {
        debug!("WiFi: stop: {}", Debug2Format(&e));
    }
}

async fn wait_for_ip(stack: Stack<'static>) {
    while !stack.is_link_up() {
        Timer::after(Duration::from_millis(500)).await;
    }
    loop {
        if let Some(config) = stack.config_v4() {
            info!("WiFi: got IP {}", config.address);
            return;
        }
        Timer::after(Duration::from_millis(500)).await;
    }
}

fn mqtt_error(code: ReasonCode) -> SessionError {
    warn!("MQTT: {}", Debug2Format(&code));
    SessionError::Mqtt
}

/// One broker connection: subscribe to every topic, then move messages
/// between the broker and the shared inboxes/outbox.
async fn mqtt_session(stack: Stack<'static>) -> Result<(), SessionError> {
    let addrs = stack
        .dns_query(MQTT_BROKER, DnsQueryType::A)
        .await
        .map_err(|_| SessionError::Dns)?;
    let broker = *addrs.first().ok_or(SessionError::Dns)?;

    let mut tcp_rx = [0u8; TCP_BUFFER_LEN];
    let mut tcp_tx = [0u8; TCP_BUFFER_LEN];
    let mut socket = TcpSocket::new(stack, &mut tcp_rx, &mut tcp_tx);
    socket.set_timeout(Some(Duration::from_secs(u64::from(MQTT_KEEP_ALIVE_SECS))));
    socket.connect((broker, MQTT_PORT)).await.map_err(|e| {
        warn!("MQTT: TCP connect failed: {}", e);
        SessionError::Tcp
    })?;

    let mut config = MqttConfig::new(MqttVersion::MQTTv5, CountingRng(20_000));
    config.add_max_subscribe_qos(QualityOfService::QoS0);
    config.add_client_id(MQTT_CLIENT_ID);
    config.max_packet_size = MQTT_BUFFER_LEN as u32;
    config.keep_alive = MQTT_KEEP_ALIVE_SECS;

    let mut write_buf = [0u8; MQTT_BUFFER_LEN];
    let mut recv_buf = [0u8; MQTT_BUFFER_LEN];
    let mut client = MqttClient::<_, 5, _>::new(
        socket,
        &mut write_buf,
        MQTT_BUFFER_LEN,
        &mut recv_buf,
        MQTT_BUFFER_LEN,
        config,
    );

    client.connect_to_broker().await.map_err(mqtt_error)?;
    for topic in Topic::ALL {
        client.subscribe_to_topic(topic.path()).await.map_err(mqtt_error)?;
    }
    set_link(LinkState::Up);
    info!("MQTT: subscribed to {} topics", Topic::ALL.len());

    let mut last_ping = Instant::now();
    loop {
        flush_outbox(&mut client).await?;

        match REQUEST.try_take() {
            Some(RadioRequest::Down) => {
                // Anything queued just before the shutdown still goes out.
                flush_outbox(&mut client).await?;
                if let Err(code) = client.disconnect().await {
                    debug!("MQTT: disconnect: {}", Debug2Format(&code));
                }
                return Ok(());
            }
            // `bring_up` marked the link as connecting, possibly after a
            // `Down` this session never saw. The session is still live.
            Some(RadioRequest::Up) => set_link(LinkState::Up),
            None => {}
        }

        match with_timeout(Duration::from_millis(RECEIVE_POLL_MS), client.receive_message()).await {
            Ok(Ok((path, payload))) => store(path, payload),
            Ok(Err(code)) => return Err(mqtt_error(code)),
            Err(_) => {
                if last_ping.elapsed() >= Duration::from_secs(PING_INTERVAL_SECS) {
                    client.send_ping().await.map_err(mqtt_error)?;
                    last_ping = Instant::now();
                }
            }
        }
    }
}

async fn flush_outbox(
    client: &mut MqttClient<'_, TcpSocket<'_>, 5, CountingRng>,
) -> Result<(), SessionError> {
    while let Ok(out) = OUTBOX.try_receive() {
        client
            .send_message(out.topic.path(), &out.payload, QualityOfService::QoS0, out.retain)
            .await
            .map_err(mqtt_error)?;
        info!("MQTT: published to {}", out.topic.path());
    }
    Ok(())
}

fn store(path: &str, payload: &[u8]) {
    let Some(topic) = Topic::from_path(path) else {
        debug!("MQTT: ignoring message on {}", path);
        return;
    };
    let result = INBOXES.lock(|boxes| boxes.borrow_mut()[topic.index()].deliver(payload));
    match result {
        Ok(()) => debug!("MQTT: {} ({} bytes)", topic, payload.len()),
        Err(e) => warn!("MQTT: {} dropped: {}", topic, e),
    }
}
