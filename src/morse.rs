//! Morse encoding and keying time.
//!
//! Encoded text uses `.` and `-` for elements, a space between characters and ` / ` between
//! words.
use std::time::Duration;

use crate::Error;

/// Length of a dit at 1 WPM, PARIS timing.
const MS_PER_UNIT_AT_1WPM: u64 = 1200;

fn char_to_morse(c: char) -> Option<&'static str> {
    let code = match c.to_ascii_uppercase() {
        'A' => ".-",
        'B' => "-...",
        'C' => "-.-.",
        'D' => "-..",
        'E' => ".",
        'F' => "..-.",
        'G' => "--.",
        'H' => "....",
        'I' => "..",
        'J' => ".---",
        'K' => "-.-",
        'L' => ".-..",
        'M' => "--",
        'N' => "-.",
        'O' => "---",
        'P' => ".--.",
        'Q' => "--.-",
        'R' => ".-.",
        'S' => "...",
        'T' => "-",
        'U' => "..-",
        'V' => "...-",
        'W' => ".--",
        'X' => "-..-",
        'Y' => "-.--",
        'Z' => "--..",
        '0' => "-----",
        '1' => ".----",
        '2' => "..---",
        '3' => "...--",
        '4' => "....-",
        '5' => ".....",
        '6' => "-....",
        '7' => "--...",
        '8' => "---..",
        '9' => "----.",
        '.' => ".-.-.-",
        ',' => "--..--",
        '?' => "..--..",
        '/' => "-..-.",
        '=' => "-...-",
        '+' => ".-.-.",
        '-' => "-....-",
        '@' => ".--.-.",
        _ => return None,
    };
    Some(code)
}

/// Encode `text`, failing with [`Error::InvalidParameter`] on characters without a Morse code.
pub fn encode(text: &str) -> Result<String, Error> {
    let words = text
        .split_whitespace()
        .map(|word| {
            word.chars()
                .map(|c| char_to_morse(c).ok_or(Error::InvalidParameter))
                .collect::<Result<Vec<_>, _>>()
                .map(|codes| codes.join(" "))
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(words.join(" / "))
}

/// Keying time of `encoded` at `wpm`, not counting a trailing word gap.
pub fn duration(encoded: &str, wpm: u32) -> Duration {
    let mut units = 0u64;
    for (w, word) in encoded.split(" / ").enumerate() {
        if w > 0 {
            units += 7;
        }
        for (c, code) in word.split(' ').filter(|c| !c.is_empty()).enumerate() {
            if c > 0 {
                units += 3;
            }
            for (e, element) in code.chars().enumerate() {
                if e > 0 {
                    units += 1;
                }
                units += if element == '-' { 3 } else { 1 };
            }
        }
    }
    Duration::from_millis(units * MS_PER_UNIT_AT_1WPM / wpm.max(1) as u64)
}
