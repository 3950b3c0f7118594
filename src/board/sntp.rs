//! Minimal SNTP client (one request, one reply, no drift correction).

use defmt::{info, warn};
use embassy_net::dns::DnsQueryType;
use embassy_net::udp::{PacketMetadata, UdpSocket};
use embassy_net::Stack;
use embassy_time::{with_timeout, Duration};

const NTP_SERVER: &str = "pool.ntp.org";
const NTP_PORT: u16 = 123;
const NTP_PACKET_LEN: usize = 48;

/// Seconds between 1900-01-01 and 1970-01-01.
const NTP_TO_UNIX_OFFSET: u64 = 2_208_988_800;

const REPLY_TIMEOUT_SECS: u64 = 5;

#[derive(Clone, Copy, Debug, PartialEq, Eq, defmt::Format)]
pub enum SntpError {
    Dns,
    Socket,
    Timeout,
    BadReply,
}

/// Query the pool once and return Unix seconds.
pub async fn fetch_unix_time(stack: Stack<'static>) -> Result<u64, SntpError> {
    let addrs = stack
        .dns_query(NTP_SERVER, DnsQueryType::A)
        .await
        .map_err(|e| {
            warn!("SNTP: DNS lookup failed: {}", e);
            SntpError::Dns
        })?;
    let server = *addrs.first().ok_or(SntpError::Dns)?;

    let mut rx_meta = [PacketMetadata::EMPTY; 1];
    let mut rx_buffer = [0u8; 128];
    let mut tx_meta = [PacketMetadata::EMPTY; 1];
    let mut tx_buffer = [0u8; 128];
    let mut socket = UdpSocket::new(
        stack,
        &mut rx_meta,
        &mut rx_buffer,
        &mut tx_meta,
        &mut tx_buffer,
    );
    socket.bind(0).map_err(|_| SntpError::Socket)?;

    // LI=0, VN=3, Mode=3 (client)
    let mut request = [0u8; NTP_PACKET_LEN];
    request[0] = 0x1B;
    socket
        .send_to(&request, (server, NTP_PORT))
        .await
        .map_err(|_| SntpError::Socket)?;

    let mut reply = [0u8; NTP_PACKET_LEN];
    let (n, _) = with_timeout(
        Duration::from_secs(REPLY_TIMEOUT_SECS),
        socket.recv_from(&mut reply),
    )
    .await
    .map_err(|_| SntpError::Timeout)?
    .map_err(|_| SntpError::Socket)?;

    if n < NTP_PACKET_LEN {
        return Err(SntpError::BadReply);
    }

    // Transmit timestamp, seconds part.
    let secs = u32::from_be_bytes([reply[40], reply[41], reply[42], reply[43]]) as u64;
    let unix = secs.checked_sub(NTP_TO_UNIX_OFFSET).ok_or(SntpError::BadReply)?;
    info!("SNTP: unix time {}", unix);
    Ok(unix)
}
