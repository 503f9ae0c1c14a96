//! Simulated rig for CI
//!
//! Supports every operation of the session API. State is kept per VFO, nothing touches real
//! hardware.
use std::collections::BTreeMap;
use std::collections::BTreeSet;

use crate::conf::ConfKind;
use crate::conf::ConfParam;
use crate::conf::ConfTable;
use crate::conf::FrontendDefaults;
use crate::morse;
use crate::Channel;
use crate::ConfValue;
use crate::Error;
use crate::Freq;
use crate::Func;
use crate::ItuRegion;
use crate::Level;
use crate::Mode;
use crate::PortSettings;
use crate::PortType;
use crate::Range;
use crate::RangeItem;
use crate::RigBackend;
use crate::RigCaps;
use crate::RigModel;
use crate::RigStatus;
use crate::Token;
use crate::Value;
use crate::Vfo;
use crate::Width;

pub const TOK_MAGIC_CONF: Token = Token::backend(1);
pub const TOK_STATIC_DATA: Token = Token::backend(2);

const DEFAULT_FREQ: Freq = 145_000_000.0;
const DEFAULT_KEYSPD: i32 = 20;

/// Descriptor of the dummy model.
pub fn caps() -> RigCaps {
    let vfos = vec![Vfo::A, Vfo::B];
    let freq = Range::interval(150e3, 6e9);
    RigCaps {
        model: RigModel::DUMMY,
        model_name: "Dummy",
        mfg_name: "Dummy",
        version: "20240709.0",
        copyright: "LGPL",
        status: RigStatus::Stable,
        port_type: PortType::None,
        freq_ranges: vfos.iter().map(|v| (*v, freq.clone())).collect(),
        vfos,
        modes: Mode::ALL.iter().copied().filter(|m| *m != Mode::FAX).collect(),
        filters: vec![
            (Mode::CW, 500),
            (Mode::CWR, 500),
            (Mode::RTTY, 500),
            (Mode::RTTYR, 500),
            (Mode::CW, 2400),
            (Mode::USB, 2400),
            (Mode::LSB, 2400),
            (Mode::PktUSB, 2400),
            (Mode::PktLSB, 2400),
            (Mode::DSB, 5000),
            (Mode::AM, 8000),
            (Mode::AMS, 8000),
            (Mode::SAM, 8000),
            (Mode::FM, 15000),
            (Mode::PktFM, 15000),
            (Mode::WFM, 230000),
        ],
        get_levels: Level::ALL.to_vec(),
        set_levels: Level::ALL
            .iter()
            .copied()
            .filter(|l| !l.is_read_only())
            .collect(),
        level_gran: vec![
            (
                Level::Preamp,
                Range::new(vec![
                    RangeItem::Value(0.0),
                    RangeItem::Value(10.0),
                    RangeItem::Value(20.0),
                ]),
            ),
            (
                Level::Att,
                Range::new(vec![
                    RangeItem::Value(0.0),
                    RangeItem::Value(6.0),
                    RangeItem::Value(12.0),
                    RangeItem::Value(18.0),
                ]),
            ),
            (Level::Vox, Range::new(vec![RangeItem::Step(0.0, 255.0, 1.0)])),
            (Level::KeySpd, Range::new(vec![RangeItem::Step(5.0, 50.0, 1.0)])),
            (Level::IfShift, Range::new(vec![RangeItem::Step(-1200.0, 1200.0, 10.0)])),
            (Level::Agc, Range::new(vec![RangeItem::Step(0.0, 6.0, 1.0)])),
            (Level::Af, Range::interval(0.0, 1.0)),
            (Level::Rf, Range::interval(0.0, 1.0)),
            (Level::Sql, Range::interval(0.0, 1.0)),
            (Level::RfPower, Range::interval(0.0, 1.0)),
            (Level::MicGain, Range::interval(0.0, 1.0)),
            (Level::Comp, Range::interval(0.0, 1.0)),
        ],
        funcs: Func::ALL.to_vec(),
        shared_oscillator: false,
        itu_region: ItuRegion::Region1,
        conf: ConfTable::new(
            FrontendDefaults {
                pathname_required: true,
                timeout_ms: 0,
                retry: 3,
                itu_region: ItuRegion::Region1,
            },
            vec![
                ConfParam::new(TOK_MAGIC_CONF, "magic_conf", "Magic conf", ConfKind::String)
                    .tooltip("Magic parameter, as an example")
                    .default_value("DX")
                    .live(),
                ConfParam::new(TOK_STATIC_DATA, "static_data", "Static data", ConfKind::Checkbutton)
                    .tooltip("Output only static data, no randomization of meter values")
                    .default_value("0"),
            ],
        ),
        new_backend: |caps| -> Box<dyn RigBackend> { Box::new(Dummy::new(caps)) },
    }
}

#[derive(Debug, Clone)]
struct VfoMemory {
    freq: Freq,
    mode: Mode,
    width: Width,
    funcs: BTreeSet<Func>,
    levels: BTreeMap<Level, Value>,
    ptt: bool,
}

impl VfoMemory {
    fn new(caps: &RigCaps) -> Self {
        Self {
            freq: DEFAULT_FREQ,
            mode: Mode::FM,
            width: caps.passband_normal(Mode::FM),
            funcs: BTreeSet::new(),
            levels: BTreeMap::new(),
            ptt: false,
        }
    }
}

/// Dummy Rig
pub struct Dummy {
    caps: &'static RigCaps,
    vfos: BTreeMap<Vfo, VfoMemory>,
    current: Vfo,
    port: Option<PortSettings>,
    magic_conf: String,
    static_data: bool,
    meter_tick: u32,
    sent_morse: Vec<String>,
}

impl Dummy {
    pub fn new(caps: &'static RigCaps) -> Self {
        Self {
            caps,
            vfos: caps.vfos.iter().map(|v| (*v, VfoMemory::new(caps))).collect(),
            current: caps.vfos.first().copied().unwrap_or(Vfo::A),
            port: None,
            magic_conf: "DX".to_string(),
            static_data: false,
            meter_tick: 0,
            sent_morse: Vec::new(),
        }
    }

    pub fn magic_conf(&self) -> &str {
        &self.magic_conf
    }

    pub fn static_data(&self) -> bool {
        self.static_data
    }

    /// Port settings of the last open.
    pub fn port(&self) -> Option<&PortSettings> {
        self.port.as_ref()
    }

    /// Everything keyed with `send_morse` so far, Morse encoded.
    pub fn sent_morse(&self) -> &[String] {
        &self.sent_morse
    }

    fn vfo(&mut self, vfo: Vfo) -> Result<&mut VfoMemory, Error> {
        self.vfos.get_mut(&vfo).ok_or(Error::InvalidVfo)
    }

    fn meter(&mut self, vfo: Vfo, level: Level) -> Result<Value, Error> {
        let tx = self.vfo(vfo)?.ptt;
        let wobble = if self.static_data {
            0
        } else {
            self.meter_tick = self.meter_tick.wrapping_add(1);
            (self.meter_tick % 5) as i32
        };
        let v = match (level, tx) {
            (Level::Strength, false) => Value::Int(-20 + wobble),
            (Level::Strength, true) => Value::Int(0),
            (Level::Swr, false) => Value::Float(1.0),
            (Level::Swr, true) => Value::Float(1.0 + wobble as f32 / 10.0),
            (Level::Alc, false) => Value::Float(0.0),
            (Level::Alc, true) => Value::Float(0.5),
            _ => return Err(Error::NotSupported),
        };
        Ok(v)
    }

    fn stored_level(&mut self, vfo: Vfo, level: Level) -> Result<Value, Error> {
        let v = self.vfo(vfo)?.levels.get(&level).copied();
        Ok(v.unwrap_or(match level {
            Level::KeySpd => Value::Int(DEFAULT_KEYSPD),
            l if l.is_float() => Value::Float(0.0),
            _ => Value::Int(0),
        }))
    }
}

impl RigBackend for Dummy {
    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn open(&mut self, port: &PortSettings) -> Result<(), Error> {
        if port.rig_pathname.is_empty() {
            log::warn!("dummy: empty device path");
            return Err(Error::Io);
        }
        log::debug!("dummy: open {} (magic_conf {})", port.rig_pathname, self.magic_conf);
        self.port = Some(port.clone());
        Ok(())
    }

    fn close(&mut self) -> Result<(), Error> {
        log::debug!("dummy: close");
        for m in self.vfos.values_mut() {
            m.ptt = false;
        }
        self.sent_morse.clear();
        self.port = None;
        Ok(())
    }

    fn set_conf(&mut self, token: Token, value: &ConfValue) -> Result<(), Error> {
        match (token, value) {
            (TOK_MAGIC_CONF, ConfValue::Str(s)) if s.is_empty() => {
                return Err(Error::InvalidParameter)
            }
            (TOK_MAGIC_CONF, ConfValue::Str(s)) => self.magic_conf = s.clone(),
            (TOK_STATIC_DATA, ConfValue::Bool(b)) => self.static_data = *b,
            (TOK_MAGIC_CONF | TOK_STATIC_DATA, _) => return Err(Error::TypeMismatch),
            _ => return Err(Error::InvalidParameter),
        }
        Ok(())
    }

    fn set_freq(&mut self, vfo: Vfo, freq: Freq) -> Result<(), Error> {
        if !self.caps.freq_range(vfo).is_some_and(|r| r.contains(freq)) {
            return Err(Error::OutOfRange);
        }
        self.vfo(vfo)?.freq = freq;
        Ok(())
    }

    fn get_freq(&mut self, vfo: Vfo) -> Result<Freq, Error> {
        Ok(self.vfo(vfo)?.freq)
    }

    fn set_mode(&mut self, vfo: Vfo, mode: Mode, width: Width) -> Result<(), Error> {
        let width = if width == crate::PASSBAND_NORMAL {
            self.caps.passband_normal(mode)
        } else {
            width
        };
        let m = self.vfo(vfo)?;
        m.mode = mode;
        m.width = width;
        Ok(())
    }

    fn get_mode(&mut self, vfo: Vfo) -> Result<(Mode, Width), Error> {
        let m = self.vfo(vfo)?;
        Ok((m.mode, m.width))
    }

    fn set_vfo(&mut self, vfo: Vfo) -> Result<(), Error> {
        self.vfo(vfo)?;
        self.current = vfo;
        Ok(())
    }

    fn get_vfo(&mut self) -> Result<Vfo, Error> {
        Ok(self.current)
    }

    fn set_level(&mut self, vfo: Vfo, level: Level, value: Value) -> Result<(), Error> {
        self.vfo(vfo)?.levels.insert(level, value);
        Ok(())
    }

    fn get_level(&mut self, vfo: Vfo, level: Level) -> Result<Value, Error> {
        if level.is_read_only() {
            self.meter(vfo, level)
        } else {
            self.stored_level(vfo, level)
        }
    }

    fn set_func(&mut self, vfo: Vfo, func: Func, on: bool) -> Result<(), Error> {
        let m = self.vfo(vfo)?;
        if on {
            m.funcs.insert(func);
        } else {
            m.funcs.remove(&func);
        }
        Ok(())
    }

    fn get_func(&mut self, vfo: Vfo, func: Func) -> Result<bool, Error> {
        Ok(self.vfo(vfo)?.funcs.contains(&func))
    }

    fn set_ptt(&mut self, vfo: Vfo, on: bool) -> Result<(), Error> {
        self.vfo(vfo)?.ptt = on;
        Ok(())
    }

    fn get_ptt(&mut self, vfo: Vfo) -> Result<bool, Error> {
        Ok(self.vfo(vfo)?.ptt)
    }

    fn get_channel(&mut self, chan: &mut Channel) -> Result<(), Error> {
        let m = self.vfo(chan.vfo)?;
        chan.freq = m.freq;
        chan.mode = m.mode;
        chan.width = m.width;
        chan.funcs = m.funcs.clone();
        chan.levels = m.levels.clone();
        Ok(())
    }

    fn send_morse(&mut self, vfo: Vfo, text: &str) -> Result<(), Error> {
        let wpm = self.stored_level(vfo, Level::KeySpd)?.as_int().max(1) as u32;
        let encoded = morse::encode(text)?;
        log::info!(
            "dummy: keying '{}' on {} at {} wpm, {:?}",
            encoded,
            vfo,
            wpm,
            morse::duration(&encoded, wpm)
        );
        self.sent_morse.push(encoded);
        Ok(())
    }

    fn get_info(&mut self) -> Result<String, Error> {
        Ok("Nothing much (dummy)".to_string())
    }
}
