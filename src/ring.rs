//! LED ring "comet" animation.
//!
//! Each step fades the whole ring toward black and adds the item color at
//! a position that swings back and forth on a sine wave. The sweep rate
//! (in beats per minute) is what distinguishes cosy from aggressive.
//!
//! The integer math follows the FastLED conventions (`sin16`, `beat16`,
//! `scale8`) so the motion looks the same as on the usual WS2812
//! firmware.

use smart_leds::RGB8;

const SIN16_BASE: [u16; 8] = [0, 6393, 12539, 18204, 23170, 27245, 30273, 32137];
const SIN16_SLOPE: [u16; 8] = [49, 48, 44, 38, 31, 23, 14, 4];

/// Integer sine. One full period spans the `u16` range and the result is
/// scaled to ±32767.
pub fn sin16(theta: u16) -> i16 {
    let mut offset = (theta & 0x3FFF) >> 3;
    if theta & 0x4000 != 0 {
        offset = 2047 - offset;
    }

    let section = (offset / 256) as usize;
    let b = SIN16_BASE[section];
    let m = SIN16_SLOPE[section];
    let secoffset8 = (offset as u8) / 2;
    let y = (b + m * secoffset8 as u16) as i16;

    if theta & 0x8000 != 0 {
        -y
    } else {
        y
    }
}

/// Sawtooth that wraps the `u16` range `bpm` times per minute.
pub fn beat16(bpm: u8, uptime_ms: u64) -> u16 {
    let bpm88 = (bpm as u64) << 8;
    ((uptime_ms.wrapping_mul(bpm88).wrapping_mul(280)) >> 16) as u16
}

/// Sine wave between `low` and `high` inclusive at `bpm`.
pub fn beatsin16(bpm: u8, low: u16, high: u16, uptime_ms: u64) -> u16 {
    let beat = beat16(bpm, uptime_ms);
    let wave = (sin16(beat) as i32 + 32768) as u32;
    let range = high.saturating_sub(low) as u32;
    low + ((wave * (range + 1)) >> 16) as u16
}

/// `scale8` with the "video-safe" rounding FastLED uses for fades.
fn scale8(value: u8, scale: u8) -> u8 {
    ((value as u16 * (scale as u16 + 1)) >> 8) as u8
}

/// Dim every pixel by `amount`/256.
pub fn fade_to_black_by(frame: &mut [RGB8], amount: u8) {
    let keep = 255 - amount;
    for px in frame.iter_mut() {
        px.r = scale8(px.r, keep);
        px.g = scale8(px.g, keep);
        px.b = scale8(px.b, keep);
    }
}

fn add_saturating(px: &mut RGB8, color: RGB8) {
    px.r = px.r.saturating_add(color.r);
    px.g = px.g.saturating_add(color.g);
    px.b = px.b.saturating_add(color.b);
}

/// Frame buffer for an `N` pixel ring.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RingAnimator<const N: usize> {
    frame: [RGB8; N],
}

impl<const N: usize> RingAnimator<N> {
    pub const fn new() -> Self {
        Self {
            frame: [RGB8 { r: 0, g: 0, b: 0 }; N],
        }
    }

    pub fn clear(&mut self) {
        self.frame = [RGB8::default(); N];
    }

    /// Advance one frame and return the lit position.
    pub fn step(&mut self, bpm: u8, color: RGB8, fade: u8, uptime_ms: u64) -> usize {
        fade_to_black_by(&mut self.frame, fade);
        if N == 0 {
            return 0;
        }
        let pos = beatsin16(bpm, 0, (N - 1) as u16, uptime_ms) as usize;
        add_saturating(&mut self.frame[pos], color);
        pos
    }

    pub fn frame(&self) -> &[RGB8] {
        &self.frame
    }

    pub fn is_dark(&self) -> bool {
        self.frame.iter().all(|px| *px == RGB8::default())
    }
}

impl<const N: usize> Default for RingAnimator<N> {
    fn default() -> Self {
        Self::new()
    }
}
