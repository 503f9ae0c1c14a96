//! Single oscillator receiver
//!
//! A bare-bones receiver with one local oscillator feeding both VFOs. It implements
//! frequency, mode and AF gain only, every other handler is left to the trait defaults. The
//! oscillator is programmed through a 10 digit BCD register.
use crate::conf::ConfKind;
use crate::conf::ConfParam;
use crate::conf::ConfTable;
use crate::conf::FrontendDefaults;
use crate::misc;
use crate::ConfValue;
use crate::Error;
use crate::Freq;
use crate::ItuRegion;
use crate::Level;
use crate::Mode;
use crate::PortSettings;
use crate::PortType;
use crate::Range;
use crate::RigBackend;
use crate::RigCaps;
use crate::RigModel;
use crate::RigStatus;
use crate::Token;
use crate::Value;
use crate::Vfo;
use crate::Width;

/// Number of leading attempts of every transaction that time out.
pub const TOK_FLAKY: Token = Token::backend(1);

const REGISTER_DIGITS: usize = 10;

pub fn caps() -> RigCaps {
    let vfos = vec![Vfo::A, Vfo::B];
    let freq = Range::interval(500e3, 30e6);
    RigCaps {
        model: RigModel::ARMSTRONG,
        model_name: "Armstrong",
        mfg_name: "Homebrew",
        version: "20240709.0",
        copyright: "LGPL",
        status: RigStatus::Beta,
        port_type: PortType::Serial,
        freq_ranges: vfos.iter().map(|v| (*v, freq.clone())).collect(),
        vfos,
        modes: vec![Mode::AM, Mode::CW],
        filters: vec![(Mode::AM, 6000), (Mode::CW, 1000), (Mode::CW, 300)],
        get_levels: vec![Level::Af],
        set_levels: vec![Level::Af],
        level_gran: vec![(Level::Af, Range::interval(0.0, 1.0))],
        funcs: Vec::new(),
        shared_oscillator: true,
        itu_region: ItuRegion::Region2,
        conf: ConfTable::new(
            FrontendDefaults {
                pathname_required: true,
                timeout_ms: 500,
                retry: 2,
                itu_region: ItuRegion::Region2,
            },
            vec![ConfParam::new(
                TOK_FLAKY,
                "flaky",
                "Flaky link",
                ConfKind::Numeric(Range::interval(0.0, 10.0)),
            )
            .tooltip("Number of timeouts before each command gets through")
            .default_value("0")
            .live()],
        ),
        new_backend: |caps| -> Box<dyn RigBackend> { Box::new(Armstrong::new(caps)) },
    }
}

/// Armstrong Receiver
pub struct Armstrong {
    caps: &'static RigCaps,
    port: Option<PortSettings>,
    flaky: u32,
    attempts: u32,
    osc: Vec<u8>,
    mode: (Mode, Width),
    af: f32,
}

impl Armstrong {
    pub fn new(caps: &'static RigCaps) -> Self {
        Self {
            caps,
            port: None,
            flaky: 0,
            attempts: 0,
            osc: misc::to_bcd(3_560_000, REGISTER_DIGITS),
            mode: (Mode::CW, caps.passband_normal(Mode::CW)),
            af: 0.5,
        }
    }

    /// Raw oscillator register, least significant digits first.
    pub fn register(&self) -> &[u8] {
        &self.osc
    }

    /// Attempts made on the link since the backend was created, including failed ones.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    fn transact<T>(&mut self, mut f: impl FnMut(&mut Self) -> T) -> Result<T, Error> {
        let port = self.port.clone().ok_or(Error::NotOpen)?;
        port.transact(|attempt| {
            self.attempts += 1;
            if attempt < self.flaky {
                Err(Error::Timeout)
            } else {
                Ok(f(self))
            }
        })
    }
}

impl RigBackend for Armstrong {
    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn open(&mut self, port: &PortSettings) -> Result<(), Error> {
        if port.rig_pathname.is_empty() {
            return Err(Error::Io);
        }
        log::debug!(
            "armstrong: open {}, timeout {:?}, {} retries",
            port.rig_pathname,
            port.timeout(),
            port.retry
        );
        self.port = Some(port.clone());
        Ok(())
    }

    fn close(&mut self) -> Result<(), Error> {
        self.port = None;
        Ok(())
    }

    fn set_conf(&mut self, token: Token, value: &ConfValue) -> Result<(), Error> {
        match (token, value.as_int()) {
            (TOK_FLAKY, Some(n)) => {
                self.flaky = u32::try_from(n).or(Err(Error::OutOfRange))?;
                Ok(())
            }
            (TOK_FLAKY, None) => Err(Error::TypeMismatch),
            _ => Err(Error::InvalidParameter),
        }
    }

    fn set_freq(&mut self, vfo: Vfo, freq: Freq) -> Result<(), Error> {
        if !self.caps.freq_range(vfo).is_some_and(|r| r.contains(freq)) {
            return Err(Error::OutOfRange);
        }
        let bcd = misc::to_bcd(freq.round() as u64, REGISTER_DIGITS);
        self.transact(|rx| rx.osc = bcd.clone())
    }

    fn get_freq(&mut self, _vfo: Vfo) -> Result<Freq, Error> {
        self.transact(|rx| misc::from_bcd(&rx.osc, REGISTER_DIGITS) as Freq)
    }

    fn set_mode(&mut self, _vfo: Vfo, mode: Mode, width: Width) -> Result<(), Error> {
        let width = if width == crate::PASSBAND_NORMAL {
            self.caps.passband_normal(mode)
        } else {
            width
        };
        self.transact(|rx| rx.mode = (mode, width))
    }

    fn get_mode(&mut self, _vfo: Vfo) -> Result<(Mode, Width), Error> {
        self.transact(|rx| rx.mode)
    }

    fn set_level(&mut self, _vfo: Vfo, level: Level, value: Value) -> Result<(), Error> {
        match level {
            Level::Af => self.transact(|rx| rx.af = value.as_float()),
            _ => Err(Error::NotSupported),
        }
    }

    fn get_level(&mut self, _vfo: Vfo, level: Level) -> Result<Value, Error> {
        match level {
            Level::Af => self.transact(|rx| Value::Float(rx.af)),
            _ => Err(Error::NotSupported),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Rig;

    fn open(retry: &str, flaky: &str) -> Rig {
        let mut rig = Rig::new(RigModel::ARMSTRONG).unwrap();
        rig.set_conf("rig_pathname", "/dev/ttyUSB0").unwrap();
        rig.set_conf("retry", retry).unwrap();
        rig.set_conf("flaky", flaky).unwrap();
        rig.open().unwrap();
        rig
    }

    #[test]
    fn omitted_handlers_are_not_supported() {
        let mut rig = open("2", "0");
        assert_eq!(rig.set_vfo(Vfo::B), Err(Error::NotSupported));
        assert_eq!(rig.error_status(), Err(Error::NotSupported));
        assert_eq!(rig.get_vfo(), Err(Error::NotSupported));
        assert_eq!(rig.set_ptt(true), Err(Error::NotSupported));
        assert_eq!(rig.get_func(crate::Func::Nb), Err(Error::NotSupported));
        assert_eq!(rig.send_morse(Vfo::A, "73"), Err(Error::NotSupported));
        assert_eq!(rig.channel(Vfo::A), Err(Error::NotSupported));
        assert_eq!(rig.get_level(Level::Strength), Err(Error::NotSupported));
        assert_eq!(rig.set_mode(Vfo::A, Mode::USB, 0), Err(Error::InvalidParameter));
        // session stays usable
        assert!(rig.get_freq(Vfo::A).is_ok());
    }

    #[test]
    fn info_falls_back_to_descriptor() {
        let mut rig = open("2", "0");
        assert_eq!(rig.get_info().unwrap(), "Homebrew Armstrong rev 20240709.0");
        assert_eq!(rig.error_status(), Ok(()));
    }

    #[test]
    fn one_oscillator_for_both_vfos() {
        let mut rig = open("2", "0");
        rig.set_freq(Vfo::A, 7_030_000.0).unwrap();
        assert_eq!(rig.vfo_state(Vfo::B).unwrap().freq, Some(7_030_000.0));
        assert_eq!(rig.get_freq(Vfo::B), Ok(7_030_000.0));
        rig.set_freq(Vfo::B, 14_060_000.0).unwrap();
        assert_eq!(rig.get_freq(Vfo::A), Ok(14_060_000.0));
        assert_eq!(
            rig.backend::<Armstrong>().unwrap().register(),
            [0x00, 0x00, 0x06, 0x14, 0x00]
        );
        assert_eq!(rig.set_freq(Vfo::A, 144e6), Err(Error::OutOfRange));
    }

    #[test]
    fn read_back_updates_both_vfos() {
        let mut rig = open("2", "0");
        assert_eq!(rig.vfo_state(Vfo::B), None);
        let freq = rig.get_freq(Vfo::A).unwrap();
        assert_eq!(rig.vfo_state(Vfo::B).unwrap().freq, Some(freq));
    }

    #[test]
    fn mode_and_af() {
        let mut rig = open("2", "0");
        assert_eq!(rig.get_mode(Vfo::A), Ok((Mode::CW, 1000)));
        rig.set_mode(Vfo::A, Mode::AM, crate::PASSBAND_NORMAL).unwrap();
        assert_eq!(rig.get_mode(Vfo::B), Ok((Mode::AM, 6000)));
        rig.set_level(Level::Af, 1).unwrap();
        assert_eq!(rig.get_level("AF"), Ok(Value::Float(1.0)));
        assert_eq!(rig.set_level(Level::Rf, 0.5f32), Err(Error::NotSupported));
    }

    #[test]
    fn retries_absorb_a_flaky_link() {
        let mut rig = open("3", "2");
        rig.set_freq(Vfo::A, 3_573_000.0).unwrap();
        assert_eq!(rig.backend::<Armstrong>().unwrap().attempts(), 3);
        assert_eq!(rig.get_freq(Vfo::A), Ok(3_573_000.0));
    }

    #[test]
    fn timeout_when_retries_run_out() {
        let mut rig = open("1", "0");
        rig.set_freq(Vfo::A, 3_573_000.0).unwrap();
        rig.set_conf("flaky", "2").unwrap();
        assert_eq!(rig.set_freq(Vfo::A, 7e6), Err(Error::Timeout));
        assert_eq!(rig.error_status(), Err(Error::Timeout));
        assert_eq!(rig.status_code(), Error::Timeout.code());
        rig.set_conf("flaky", "0").unwrap();
        assert_eq!(rig.get_freq(Vfo::A), Ok(3_573_000.0));
    }

    #[test]
    fn region_comes_from_the_model() {
        let rig = open("2", "0");
        assert_eq!(rig.itu_region(), ItuRegion::Region2);
        assert!(rig.conf_params().any(|p| p.name == "flaky" && p.live));
    }
}
