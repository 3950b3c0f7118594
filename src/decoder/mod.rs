//! Wire-format decoders for the text, reminder and status topics.
//!
//! ## Text (`eventTxt`)
//!
//! ```text
//! N|C1;T1|C2;T2|...|Cn;Tn        1 <= N <= 3
//! ```
//!
//! `Cx` is a decimal color code (`1` = accent alias), `Tx` the line text.
//! Text longer than the panel's characters-per-line is truncated.
//!
//! ## Reminder (`eventReminder`)
//!
//! ```text
//! DEADLINE|COSY|AGGRESSIVE|RRGGBB     all hex, no 0x prefix
//! ```
//!
//! Both decoders are pure: they return a fresh value or an error and
//! never touch the active item themselves.

pub mod tokenizer;

use crate::config::{ACK_TOKEN, MAX_LINES, MAX_MESSAGE_LEN};
use crate::error::DecodeError;
use crate::item::{Line, LineColor, LineText, Reminder, TextBlock};
use tokenizer::{split, MAX_TOKENS};

/// Number of fields in a reminder message.
pub const REMINDER_FIELDS: usize = 4;

fn payload_str(payload: &[u8]) -> Result<&str, DecodeError> {
    if payload.len() > MAX_MESSAGE_LEN {
        return Err(DecodeError::PayloadTooLong);
    }
    core::str::from_utf8(payload).map_err(|_| DecodeError::InvalidUtf8)
}

/// Decode a text message into 1..=3 lines.
pub fn decode_text(payload: &[u8]) -> Result<TextBlock, DecodeError> {
    let msg = payload_str(payload)?;
    let tokens =
        split::<MAX_TOKENS>(msg, '|').map_err(|_| DecodeError::MalformedLineCount)?;

    let declared: usize = tokens[0]
        .parse()
        .map_err(|_| DecodeError::MalformedLineCount)?;
    if !(1..=MAX_LINES).contains(&declared) || declared != tokens.len() - 1 {
        return Err(DecodeError::MalformedLineCount);
    }

    let mut lines = TextBlock::new();
    for segment in &tokens[1..] {
        let line = decode_line(segment)?;
        lines.push(line).map_err(|_| DecodeError::MalformedLineCount)?;
    }
    Ok(lines)
}

fn decode_line(segment: &str) -> Result<Line, DecodeError> {
    let parts = split::<2>(segment, ';').map_err(|_| DecodeError::MalformedLineEntry)?;
    if parts.len() != 2 {
        return Err(DecodeError::MalformedLineEntry);
    }

    let code: u16 = parts[0]
        .parse()
        .map_err(|_| DecodeError::MalformedLineEntry)?;

    let mut text = LineText::new();
    for c in parts[1].chars() {
        if text.push(c).is_err() {
            warn!("line truncated to {} bytes", text.len());
            break;
        }
    }

    Ok(Line {
        text,
        color: LineColor::from_wire(code),
    })
}

/// Decode a reminder message into deadline, thresholds and ring color.
pub fn decode_reminder(payload: &[u8]) -> Result<Reminder, DecodeError> {
    let msg = payload_str(payload)?;
    let tokens =
        split::<MAX_TOKENS>(msg, '|').map_err(|_| DecodeError::TokenCountMismatch)?;
    if tokens.len() != REMINDER_FIELDS {
        return Err(DecodeError::TokenCountMismatch);
    }

    Ok(Reminder {
        deadline: parse_hex(tokens[0])?,
        cosy: parse_hex(tokens[1])?,
        aggressive: parse_hex(tokens[2])?,
        ring_color: parse_hex_u32(tokens[3])?,
    })
}

fn is_hex(token: &str) -> bool {
    !token.is_empty() && token.bytes().all(|b| b.is_ascii_hexdigit())
}

fn parse_hex(token: &str) -> Result<u64, DecodeError> {
    if !is_hex(token) {
        return Err(DecodeError::InvalidNumber);
    }
    u64::from_str_radix(token, 16).map_err(|_| DecodeError::InvalidNumber)
}

fn parse_hex_u32(token: &str) -> Result<u32, DecodeError> {
    if !is_hex(token) {
        return Err(DecodeError::InvalidNumber);
    }
    u32::from_str_radix(token, 16).map_err(|_| DecodeError::InvalidNumber)
}

/// `true` when a status payload marks the current item as acknowledged.
pub fn is_ack(payload: &[u8]) -> bool {
    payload == ACK_TOKEN.as_bytes()
}
