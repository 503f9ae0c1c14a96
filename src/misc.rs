//! Helpers shared by backends: BCD frequency registers and frequency formatting.
use crate::Freq;

/// Encode the lowest `bcd_len` decimal digits of `freq` as little endian packed BCD.
///
/// The first byte holds the two least significant digits, low nibble first. An odd
/// `bcd_len` leaves the high nibble of the last byte zero.
pub fn to_bcd(freq: u64, bcd_len: usize) -> Vec<u8> {
    let mut out = vec![0u8; bcd_len.div_ceil(2)];
    let mut f = freq;
    for digit in 0..bcd_len {
        let d = (f % 10) as u8;
        f /= 10;
        out[digit / 2] |= if digit % 2 == 0 { d } else { d << 4 };
    }
    out
}

/// Decode `bcd_len` digits of little endian packed BCD.
pub fn from_bcd(bcd: &[u8], bcd_len: usize) -> u64 {
    (0..bcd_len).rev().fold(0u64, |f, digit| {
        let byte = bcd.get(digit / 2).copied().unwrap_or(0);
        let d = if digit % 2 == 0 { byte & 0x0f } else { byte >> 4 };
        f * 10 + d as u64
    })
}

/// Same as [`to_bcd`], most significant byte first.
pub fn to_bcd_be(freq: u64, bcd_len: usize) -> Vec<u8> {
    let mut out = to_bcd(freq, bcd_len);
    out.reverse();
    out
}

/// Same as [`from_bcd`], most significant byte first.
pub fn from_bcd_be(bcd: &[u8], bcd_len: usize) -> u64 {
    let le: Vec<u8> = bcd.iter().rev().copied().collect();
    from_bcd(&le, bcd_len)
}

/// Frequency with a unit picked by magnitude, e.g., `145.55 MHz`.
pub fn format_freq(freq: Freq) -> String {
    let (value, unit) = match freq.abs() {
        f if f >= 1e9 => (freq / 1e9, "GHz"),
        f if f >= 1e6 => (freq / 1e6, "MHz"),
        f if f >= 1e3 => (freq / 1e3, "kHz"),
        _ => (freq, "Hz"),
    };
    let s = format!("{value:.9}");
    let s = s.trim_end_matches('0').trim_end_matches('.');
    format!("{s} {unit}")
}
