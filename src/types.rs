//! Radio vocabulary shared by the session, the descriptors and the backends.
use serde::Deserialize;
use serde::Serialize;
use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::Error;

/// Frequency in Hz.
pub type Freq = f64;

/// Passband width in Hz.
pub type Width = u32;

/// Passband width asking the backend for the mode's normal filter.
pub const PASSBAND_NORMAL: Width = 0;

macro_rules! named_enum {
    (
        $(#[$meta:meta])*
        $name:ident, unknown = $err:ident {
            $($(#[$vmeta:meta])* $variant:ident => $text:literal,)+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum $name {
            $($(#[$vmeta])* $variant,)+
        }

        impl $name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant,)+];

            /// Symbolic name.
            pub fn name(&self) -> &'static str {
                match self {
                    $($name::$variant => $text,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.name())
            }
        }

        impl FromStr for $name {
            type Err = Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let s = s.trim();
                Self::ALL
                    .iter()
                    .copied()
                    .find(|v| v.name().eq_ignore_ascii_case(s))
                    .ok_or(Error::$err)
            }
        }

        impl TryFrom<&str> for $name {
            type Error = Error;

            fn try_from(s: &str) -> Result<Self, Self::Error> {
                s.parse()
            }
        }

        impl TryFrom<&String> for $name {
            type Error = Error;

            fn try_from(s: &String) -> Result<Self, Self::Error> {
                s.parse()
            }
        }
    };
}

named_enum! {
    /// Addressable oscillator of a rig.
    ///
    /// [`Vfo::Current`] is resolved by the session to whatever
    /// [`Rig::set_vfo`](crate::Rig::set_vfo) selected last.
    Vfo, unknown = InvalidVfo {
        A => "VFOA",
        B => "VFOB",
        C => "VFOC",
        Main => "Main",
        Sub => "Sub",
        Mem => "MEM",
        Current => "currVFO",
    }
}

named_enum! {
    /// Operating mode.
    Mode, unknown = InvalidParameter {
        AM => "AM",
        CW => "CW",
        USB => "USB",
        LSB => "LSB",
        RTTY => "RTTY",
        FM => "FM",
        WFM => "WFM",
        CWR => "CWR",
        RTTYR => "RTTYR",
        AMS => "AMS",
        PktLSB => "PKTLSB",
        PktUSB => "PKTUSB",
        PktFM => "PKTFM",
        FAX => "FAX",
        SAM => "SAM",
        DSB => "DSB",
    }
}

named_enum! {
    /// Settable or readable rig level.
    Level, unknown = NotSupported {
        Preamp => "PREAMP",
        Att => "ATT",
        /// VOX delay in tenths of a second.
        Vox => "VOX",
        Af => "AF",
        Rf => "RF",
        Sql => "SQL",
        IfShift => "IF",
        RfPower => "RFPOWER",
        MicGain => "MICGAIN",
        /// Keyer speed in WPM.
        KeySpd => "KEYSPD",
        Comp => "COMP",
        Agc => "AGC",
        /// Signal strength in dB relative to S9.
        Strength => "STRENGTH",
        Swr => "SWR",
        Alc => "ALC",
    }
}

named_enum! {
    /// On/off rig function.
    Func, unknown = NotSupported {
        Nb => "NB",
        Comp => "COMP",
        Vox => "VOX",
        Tone => "TONE",
        Tsql => "TSQL",
        Fbkin => "FBKIN",
        Anf => "ANF",
        Nr => "NR",
        Lock => "LOCK",
        Mute => "MUTE",
    }
}

impl Level {
    /// Float levels are normalized 0.0..=1.0 unless the model says otherwise.
    pub fn is_float(&self) -> bool {
        matches!(
            self,
            Level::Af
                | Level::Rf
                | Level::Sql
                | Level::RfPower
                | Level::MicGain
                | Level::Comp
                | Level::Swr
                | Level::Alc
        )
    }

    /// Meters can be read but never set.
    pub fn is_read_only(&self) -> bool {
        matches!(self, Level::Strength | Level::Swr | Level::Alc)
    }
}

/// Level value, either integral or floating point depending on the [`Level`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Int(i32),
    Float(f32),
}

impl Value {
    pub fn as_int(&self) -> i32 {
        match *self {
            Value::Int(i) => i,
            Value::Float(f) => f.round() as i32,
        }
    }

    pub fn as_float(&self) -> f32 {
        match *self {
            Value::Int(i) => i as f32,
            Value::Float(f) => f,
        }
    }

    /// Coerce into the representation `level` uses.
    ///
    /// Integers widen into float levels, floats never narrow into integer levels.
    pub fn for_level(self, level: Level) -> Result<Value, Error> {
        match (self, level.is_float()) {
            (Value::Int(i), true) => Ok(Value::Float(i as f32)),
            (Value::Float(_), false) => Err(Error::TypeMismatch),
            (v, _) => Ok(v),
        }
    }

    pub(crate) fn as_f64(&self) -> f64 {
        match *self {
            Value::Int(i) => i as f64,
            Value::Float(f) => f as f64,
        }
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(value)
    }
}

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Value::Float(value)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(v) => write!(f, "{v}"),
        }
    }
}

/// ITU region the rig's band plan follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItuRegion {
    Region1 = 1,
    Region2 = 2,
    Region3 = 3,
}

impl ItuRegion {
    pub fn number(&self) -> u8 {
        *self as u8
    }
}

impl fmt::Display for ItuRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.number())
    }
}

impl FromStr for ItuRegion {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "1" => Ok(ItuRegion::Region1),
            "2" => Ok(ItuRegion::Region2),
            "3" => Ok(ItuRegion::Region3),
            _ => Err(Error::TypeMismatch),
        }
    }
}

/// Snapshot of one VFO, filled in by [`Rig::get_channel`](crate::Rig::get_channel).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Channel {
    pub vfo: Vfo,
    pub freq: Freq,
    pub mode: Mode,
    pub width: Width,
    pub funcs: BTreeSet<Func>,
    pub levels: BTreeMap<Level, Value>,
}

impl Channel {
    /// Empty snapshot addressing `vfo`.
    pub fn new(vfo: Vfo) -> Self {
        Self {
            vfo,
            freq: 0.0,
            mode: Mode::FM,
            width: PASSBAND_NORMAL,
            funcs: BTreeSet::new(),
            levels: BTreeMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_parse_case_insensitive() {
        assert_eq!("cw".parse::<Mode>().unwrap(), Mode::CW);
        assert_eq!("PktUSB".parse::<Mode>().unwrap(), Mode::PktUSB);
        assert_eq!("vfob".parse::<Vfo>().unwrap(), Vfo::B);
        assert_eq!(Level::try_from("VOX").unwrap(), Level::Vox);
        assert_eq!(Func::try_from(" nb ").unwrap(), Func::Nb);
    }

    #[test]
    fn unknown_names() {
        assert_eq!("XYZ".parse::<Mode>(), Err(Error::InvalidParameter));
        assert_eq!("VFOZ".parse::<Vfo>(), Err(Error::InvalidVfo));
        assert_eq!("FOO".parse::<Level>(), Err(Error::NotSupported));
        assert_eq!("FOO".parse::<Func>(), Err(Error::NotSupported));
    }

    #[test]
    fn display_round_trips() {
        for m in Mode::ALL {
            assert_eq!(m.to_string().parse::<Mode>().unwrap(), *m);
        }
        for l in Level::ALL {
            assert_eq!(l.to_string().parse::<Level>().unwrap(), *l);
        }
        assert_eq!(Vfo::Current.to_string(), "currVFO");
    }

    #[test]
    fn value_coercion() {
        assert_eq!(Value::Int(3).for_level(Level::Af), Ok(Value::Float(3.0)));
        assert_eq!(Value::Int(3).for_level(Level::Vox), Ok(Value::Int(3)));
        assert_eq!(
            Value::Float(0.5).for_level(Level::Vox),
            Err(Error::TypeMismatch)
        );
        assert_eq!(Value::Float(4.6).as_int(), 5);
    }

    #[test]
    fn read_only_levels() {
        assert!(Level::Strength.is_read_only());
        assert!(!Level::Vox.is_read_only());
    }

    #[test]
    fn itu_region() {
        assert_eq!("2".parse::<ItuRegion>().unwrap(), ItuRegion::Region2);
        assert_eq!(ItuRegion::Region3.to_string(), "3");
        assert_eq!("4".parse::<ItuRegion>(), Err(Error::TypeMismatch));
    }
}
