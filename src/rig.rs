use std::any::Any;
use std::collections::BTreeMap;

use crate::conf::ConfParam;
use crate::conf::TOK_ITU_REGION;
use crate::Args;
use crate::Channel;
use crate::ConfKey;
use crate::ConfValue;
use crate::Error;
use crate::Freq;
use crate::Func;
use crate::ItuRegion;
use crate::Level;
use crate::Mode;
use crate::PortSettings;
use crate::RigCaps;
use crate::RigModel;
use crate::Status;
use crate::Token;
use crate::Value;
use crate::Vfo;
use crate::Width;

/// Handler table of a rig model, implemented once per backend.
///
/// The session resolves [`Vfo::Current`] and validates its arguments against the model's
/// [`RigCaps`] before calling into the backend, so handlers always see a concrete VFO the model
/// declares. A backend only overrides the handlers its hardware supports, the defaults report
/// [`Error::NotSupported`].
pub trait RigBackend: Any + Send {
    /// Cast to Any for downcasting.
    fn as_any(&self) -> &dyn Any;

    /// Bring up the connection, called by [`Rig::open`].
    fn open(&mut self, _port: &PortSettings) -> Result<(), Error> {
        Ok(())
    }
    /// Release every resource acquired in `open`.
    fn close(&mut self) -> Result<(), Error> {
        Ok(())
    }
    /// Apply a backend parameter, either before `open` or, for live parameters, while open.
    fn set_conf(&mut self, _token: Token, _value: &ConfValue) -> Result<(), Error> {
        Err(Error::NotSupported)
    }

    //================================ FREQUENCY ============================================
    /// Tune `vfo` to `freq` Hz. The session has not checked `freq` against the model's ranges.
    fn set_freq(&mut self, _vfo: Vfo, _freq: Freq) -> Result<(), Error> {
        Err(Error::NotSupported)
    }
    /// Frequency of `vfo` in Hz.
    fn get_freq(&mut self, _vfo: Vfo) -> Result<Freq, Error> {
        Err(Error::NotSupported)
    }

    //================================ MODE ============================================
    /// `width` of [`PASSBAND_NORMAL`](crate::PASSBAND_NORMAL) selects the mode's normal
    /// passband, see [`RigCaps::passband_normal`].
    fn set_mode(&mut self, _vfo: Vfo, _mode: Mode, _width: Width) -> Result<(), Error> {
        Err(Error::NotSupported)
    }
    /// Mode and passband of `vfo`, the width actually in effect rather than a sentinel.
    fn get_mode(&mut self, _vfo: Vfo) -> Result<(Mode, Width), Error> {
        Err(Error::NotSupported)
    }

    //================================ VFO ============================================
    /// Make `vfo` the rig's selected VFO.
    fn set_vfo(&mut self, _vfo: Vfo) -> Result<(), Error> {
        Err(Error::NotSupported)
    }
    /// Selected VFO, also queried once after `open` to seed the session.
    fn get_vfo(&mut self) -> Result<Vfo, Error> {
        Err(Error::NotSupported)
    }

    //================================ LEVEL / FUNC / PTT ======================================
    /// Set `level` on `vfo`. `value` already has the level's type and lies within its
    /// granularity range.
    fn set_level(&mut self, _vfo: Vfo, _level: Level, _value: Value) -> Result<(), Error> {
        Err(Error::NotSupported)
    }
    /// Read `level` of `vfo`, only called for levels listed in the model's get levels.
    fn get_level(&mut self, _vfo: Vfo, _level: Level) -> Result<Value, Error> {
        Err(Error::NotSupported)
    }
    /// Switch `func` of `vfo` on or off.
    fn set_func(&mut self, _vfo: Vfo, _func: Func, _on: bool) -> Result<(), Error> {
        Err(Error::NotSupported)
    }
    /// Whether `func` of `vfo` is on.
    fn get_func(&mut self, _vfo: Vfo, _func: Func) -> Result<bool, Error> {
        Err(Error::NotSupported)
    }
    /// Key or unkey the transmitter on `vfo`.
    fn set_ptt(&mut self, _vfo: Vfo, _on: bool) -> Result<(), Error> {
        Err(Error::NotSupported)
    }
    /// Whether the transmitter on `vfo` is keyed.
    fn get_ptt(&mut self, _vfo: Vfo) -> Result<bool, Error> {
        Err(Error::NotSupported)
    }

    //================================ MISC ============================================
    /// Fill `chan` for `chan.vfo`.
    fn get_channel(&mut self, _chan: &mut Channel) -> Result<(), Error> {
        Err(Error::NotSupported)
    }
    /// Key `text` as Morse, encoding and timing are up to the backend.
    fn send_morse(&mut self, _vfo: Vfo, _text: &str) -> Result<(), Error> {
        Err(Error::NotSupported)
    }
    /// Free-form status text.
    fn get_info(&mut self) -> Result<String, Error> {
        Err(Error::NotSupported)
    }
}

/// Last known state of one VFO, as seen through this session.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct VfoState {
    pub freq: Option<Freq>,
    pub mode: Option<(Mode, Width)>,
}

enum State {
    Closed,
    Open(PortSettings),
}

/// Session on one rig.
///
/// Configure it while closed, [`open`](Rig::open) it, issue operations, and
/// [`close`](Rig::close) it. Every call, successful or not, overwrites the session's
/// [status](Rig::error_status).
///
/// A session is not shared between threads. To drive a rig from several tasks, move the
/// session into one worker and serialize requests through it.
pub struct Rig {
    caps: &'static RigCaps,
    backend: Box<dyn RigBackend>,
    conf: crate::conf::ConfStore,
    state: State,
    current_vfo: Vfo,
    vfos: BTreeMap<Vfo, VfoState>,
    status: Status,
}

impl Rig {
    /// Create a closed session on `model`.
    pub fn new(model: impl Into<RigModel>) -> Result<Self, Error> {
        let caps = crate::registry::lookup(model.into())?;
        log::debug!("new {} {} session", caps.mfg_name, caps.model_name);
        Ok(Self {
            caps,
            backend: (caps.new_backend)(caps),
            conf: crate::conf::ConfStore::new(),
            state: State::Closed,
            current_vfo: Self::default_vfo(caps),
            vfos: BTreeMap::new(),
            status: Ok(()),
        })
    }

    /// Create a closed session from `key=value` settings.
    ///
    /// The `model` key selects the model by number or name, all other keys are applied with
    /// [`set_conf`](Rig::set_conf).
    pub fn from_args<A: TryInto<Args>>(args: A) -> Result<Self, Error> {
        let mut args: Args = args.try_into().or(Err(Error::InvalidParameter))?;
        let model = args
            .remove("model")
            .ok_or(Error::InvalidParameter)?
            .parse::<RigModel>()?;
        let mut rig = Self::new(model)?;
        for (k, v) in args.iter() {
            rig.set_conf(k, v.as_str())?;
        }
        Ok(rig)
    }

    fn default_vfo(caps: &RigCaps) -> Vfo {
        caps.vfos.first().copied().unwrap_or(Vfo::A)
    }

    /// Descriptor of the session's model.
    pub fn caps(&self) -> &'static RigCaps {
        self.caps
    }
    pub fn model(&self) -> RigModel {
        self.caps.model
    }
    pub fn is_open(&self) -> bool {
        matches!(self.state, State::Open(_))
    }
    /// Port settings the session was opened with, `None` while closed.
    pub fn port(&self) -> Option<&PortSettings> {
        match &self.state {
            State::Open(port) => Some(port),
            State::Closed => None,
        }
    }
    /// Outcome of the most recent call.
    pub fn error_status(&self) -> Status {
        self.status
    }
    /// Outcome of the most recent call as status code, see
    /// [`status_to_string`](crate::status_to_string).
    pub fn status_code(&self) -> i32 {
        crate::status_code(&self.status)
    }
    /// Last known state of `vfo`, updated by successful frequency and mode calls.
    pub fn vfo_state(&self, vfo: Vfo) -> Option<VfoState> {
        self.vfos.get(&vfo).copied()
    }
    /// Try to downcast to the backend implementation `B`.
    pub fn backend<B: RigBackend>(&self) -> Result<&B, Error> {
        self.backend
            .as_any()
            .downcast_ref::<B>()
            .ok_or(Error::NotSupported)
    }

    fn run<T>(
        &mut self,
        op: &str,
        f: impl FnOnce(&mut Rig) -> Result<T, Error>,
    ) -> Result<T, Error> {
        let r = f(self);
        if let Err(e) = &r {
            log::debug!("{} {}: {} failed: {}", self.caps.mfg_name, self.caps.model_name, op, e);
        }
        self.status = r.as_ref().map(|_| ()).map_err(|e| *e);
        r
    }

    fn cache_freq(&mut self, vfo: Vfo, freq: Freq) {
        if self.caps.shared_oscillator {
            for v in self.caps.vfos.iter() {
                self.vfos.entry(*v).or_default().freq = Some(freq);
            }
        } else {
            self.vfos.entry(vfo).or_default().freq = Some(freq);
        }
    }

    fn check_open(&self) -> Result<(), Error> {
        if self.is_open() {
            Ok(())
        } else {
            Err(Error::NotOpen)
        }
    }

    fn resolve_vfo(&self, vfo: Vfo) -> Result<Vfo, Error> {
        let vfo = match vfo {
            Vfo::Current => self.current_vfo,
            v => v,
        };
        if self.caps.has_vfo(vfo) {
            Ok(vfo)
        } else {
            Err(Error::InvalidVfo)
        }
    }

    //================================ LIFECYCLE ============================================
    /// Validate the configuration and bring up the backend.
    ///
    /// Backend parameters with a value are handed to the backend before its open handler runs.
    /// Fails with [`Error::InvalidParameter`] if a required parameter is missing and with
    /// [`Error::BackendInitFailed`] if the backend cannot reach the rig. The session stays
    /// closed on failure.
    pub fn open(&mut self) -> Result<(), Error> {
        self.run("open", |rig| {
            if rig.is_open() {
                return Err(Error::InvalidParameter);
            }
            let missing = rig.conf.missing(&rig.caps.conf);
            if !missing.is_empty() {
                let names: Vec<_> = missing.iter().map(|p| p.name).collect();
                log::warn!("cannot open, missing configuration {:?}", names);
                return Err(Error::InvalidParameter);
            }
            let port = PortSettings::from_args(&rig.conf.to_args(&rig.caps.conf))?;
            let caps = rig.caps;
            for p in caps.conf.iter().filter(|p| !p.token.is_frontend()) {
                if !rig.conf.is_set(p) {
                    continue;
                }
                let value = rig.conf.get(&caps.conf, &p.token.into())?;
                rig.backend.set_conf(p.token, &value).map_err(|e| {
                    log::warn!("backend rejected {}={}: {}", p.name, value, e);
                    Error::BackendInitFailed
                })?;
            }
            rig.backend.open(&port).map_err(|e| {
                log::warn!("{}: backend open failed: {}", port.rig_pathname, e);
                Error::BackendInitFailed
            })?;
            log::info!(
                "opened {} {} on '{}'",
                rig.caps.mfg_name,
                rig.caps.model_name,
                port.rig_pathname
            );
            rig.state = State::Open(port);
            rig.vfos.clear();
            rig.current_vfo = match rig.backend.get_vfo() {
                Ok(v) if rig.caps.has_vfo(v) => v,
                _ => Self::default_vfo(rig.caps),
            };
            Ok(())
        })
    }

    /// Tear down the backend and return to the closed state.
    ///
    /// The session is closed afterwards even if the backend reports an error, which is
    /// still returned. Configuration is kept for the next [`open`](Rig::open).
    pub fn close(&mut self) -> Result<(), Error> {
        self.run("close", |rig| {
            rig.check_open()?;
            let r = rig.backend.close();
            if let Err(e) = &r {
                log::warn!("backend close failed: {}", e);
            }
            rig.state = State::Closed;
            rig.vfos.clear();
            rig.current_vfo = Self::default_vfo(rig.caps);
            r
        })
    }

    //================================ CONFIGURATION ============================================
    /// Write a parameter, addressed by [`Token`] or name.
    ///
    /// Live parameters written while open are applied to the backend right away, everything
    /// else takes effect at the next [`open`](Rig::open).
    pub fn set_conf<K: Into<ConfKey>, V: Into<ConfValue>>(
        &mut self,
        key: K,
        value: V,
    ) -> Result<(), Error> {
        let key = key.into();
        let value = value.into();
        self.run("set_conf", |rig| {
            let (param, value) = rig.conf.validate(&rig.caps.conf, &key, value)?;
            if rig.is_open() {
                if param.live {
                    rig.backend.set_conf(param.token, &value)?;
                } else {
                    log::debug!("{} takes effect on next open", param.name);
                }
            }
            rig.conf.insert(param.token, value);
            Ok(())
        })
    }

    /// Read a parameter, addressed by [`Token`] or name.
    pub fn get_conf<K: Into<ConfKey>>(&mut self, key: K) -> Result<ConfValue, Error> {
        let key = key.into();
        self.run("get_conf", |rig| rig.conf.get(&rig.caps.conf, &key))
    }

    /// Token of the parameter called `name`.
    pub fn token_lookup(&mut self, name: &str) -> Result<Token, Error> {
        self.run("token_lookup", |rig| rig.caps.conf.token(name))
    }

    /// Parameters this model understands.
    pub fn conf_params(&self) -> impl Iterator<Item = &'static ConfParam> {
        let caps: &'static RigCaps = self.caps;
        caps.conf.iter()
    }

    /// ITU region of the rig.
    pub fn itu_region(&self) -> ItuRegion {
        match self.conf.get(&self.caps.conf, &TOK_ITU_REGION.into()) {
            Ok(ConfValue::Region(r)) => r,
            _ => self.caps.itu_region,
        }
    }

    //================================ FREQUENCY ============================================
    /// Tune `vfo` to `freq` Hz.
    pub fn set_freq(&mut self, vfo: Vfo, freq: Freq) -> Result<(), Error> {
        self.run("set_freq", |rig| {
            rig.check_open()?;
            let vfo = rig.resolve_vfo(vfo)?;
            rig.backend.set_freq(vfo, freq)?;
            rig.cache_freq(vfo, freq);
            Ok(())
        })
    }

    /// Frequency of `vfo` in Hz.
    pub fn get_freq(&mut self, vfo: Vfo) -> Result<Freq, Error> {
        self.run("get_freq", |rig| {
            rig.check_open()?;
            let vfo = rig.resolve_vfo(vfo)?;
            let freq = rig.backend.get_freq(vfo)?;
            rig.cache_freq(vfo, freq);
            Ok(freq)
        })
    }

    //================================ MODE ============================================
    /// Set mode and passband of `vfo`, a `width` of [`PASSBAND_NORMAL`](crate::PASSBAND_NORMAL)
    /// selects the mode's normal passband.
    pub fn set_mode(&mut self, vfo: Vfo, mode: Mode, width: Width) -> Result<(), Error> {
        self.run("set_mode", |rig| {
            rig.check_open()?;
            let vfo = rig.resolve_vfo(vfo)?;
            if !rig.caps.has_mode(mode) {
                return Err(Error::InvalidParameter);
            }
            rig.backend.set_mode(vfo, mode, width)?;
            // the backend resolves PASSBAND_NORMAL, cache what it reports
            let actual = rig.backend.get_mode(vfo).unwrap_or((mode, width));
            rig.vfos.entry(vfo).or_default().mode = Some(actual);
            Ok(())
        })
    }

    /// Mode and passband of `vfo`.
    pub fn get_mode(&mut self, vfo: Vfo) -> Result<(Mode, Width), Error> {
        self.run("get_mode", |rig| {
            rig.check_open()?;
            let vfo = rig.resolve_vfo(vfo)?;
            let mode = rig.backend.get_mode(vfo)?;
            rig.vfos.entry(vfo).or_default().mode = Some(mode);
            Ok(mode)
        })
    }

    //================================ VFO ============================================
    /// Select the VFO that [`Vfo::Current`] addresses.
    pub fn set_vfo(&mut self, vfo: Vfo) -> Result<(), Error> {
        self.run("set_vfo", |rig| {
            rig.check_open()?;
            let vfo = rig.resolve_vfo(vfo)?;
            rig.backend.set_vfo(vfo)?;
            rig.current_vfo = vfo;
            Ok(())
        })
    }

    /// Currently selected VFO.
    pub fn get_vfo(&mut self) -> Result<Vfo, Error> {
        self.run("get_vfo", |rig| {
            rig.check_open()?;
            let vfo = rig.backend.get_vfo()?;
            if !rig.caps.has_vfo(vfo) {
                return Err(Error::InvalidVfo);
            }
            rig.current_vfo = vfo;
            Ok(vfo)
        })
    }

    //================================ LEVEL ============================================
    /// Set a level of the current VFO, addressed by [`Level`] or by name.
    pub fn set_level<L: TryInto<Level>, V: Into<Value>>(
        &mut self,
        level: L,
        value: V,
    ) -> Result<(), Error> {
        let level = level.try_into().or(Err(Error::NotSupported));
        let value = value.into();
        self.run("set_level", |rig| {
            rig.check_open()?;
            let level = level?;
            if level.is_read_only() || !rig.caps.has_set_level(level) {
                return Err(Error::NotSupported);
            }
            let value = value.for_level(level)?;
            rig.caps.check_level(level, value.as_f64())?;
            let vfo = rig.current_vfo;
            rig.backend.set_level(vfo, level, value)
        })
    }

    /// Read a level of the current VFO, addressed by [`Level`] or by name.
    pub fn get_level<L: TryInto<Level>>(&mut self, level: L) -> Result<Value, Error> {
        let level = level.try_into().or(Err(Error::NotSupported));
        self.run("get_level", |rig| {
            rig.check_open()?;
            let level = level?;
            if !rig.caps.has_get_level(level) {
                return Err(Error::NotSupported);
            }
            let vfo = rig.current_vfo;
            rig.backend.get_level(vfo, level)
        })
    }

    //================================ FUNC ============================================
    /// Switch a function of the current VFO, addressed by [`Func`] or by name.
    pub fn set_func<F: TryInto<Func>>(&mut self, func: F, on: bool) -> Result<(), Error> {
        let func = func.try_into().or(Err(Error::NotSupported));
        self.run("set_func", |rig| {
            rig.check_open()?;
            let func = func?;
            if !rig.caps.has_func(func) {
                return Err(Error::NotSupported);
            }
            let vfo = rig.current_vfo;
            rig.backend.set_func(vfo, func, on)
        })
    }

    pub fn get_func<F: TryInto<Func>>(&mut self, func: F) -> Result<bool, Error> {
        let func = func.try_into().or(Err(Error::NotSupported));
        self.run("get_func", |rig| {
            rig.check_open()?;
            let func = func?;
            if !rig.caps.has_func(func) {
                return Err(Error::NotSupported);
            }
            let vfo = rig.current_vfo;
            rig.backend.get_func(vfo, func)
        })
    }

    //================================ PTT ============================================
    pub fn set_ptt(&mut self, on: bool) -> Result<(), Error> {
        self.run("set_ptt", |rig| {
            rig.check_open()?;
            let vfo = rig.current_vfo;
            rig.backend.set_ptt(vfo, on)
        })
    }

    pub fn get_ptt(&mut self) -> Result<bool, Error> {
        self.run("get_ptt", |rig| {
            rig.check_open()?;
            let vfo = rig.current_vfo;
            rig.backend.get_ptt(vfo)
        })
    }

    //================================ MISC ============================================
    /// Fill `chan` with the state of `chan.vfo`.
    ///
    /// `chan` is only written if the backend succeeds.
    pub fn get_channel(&mut self, chan: &mut Channel) -> Result<(), Error> {
        self.run("get_channel", |rig| {
            rig.check_open()?;
            let vfo = rig.resolve_vfo(chan.vfo)?;
            let mut snapshot = Channel::new(vfo);
            rig.backend.get_channel(&mut snapshot)?;
            snapshot.vfo = vfo;
            *chan = snapshot;
            Ok(())
        })
    }

    /// Snapshot of `vfo`.
    pub fn channel(&mut self, vfo: Vfo) -> Result<Channel, Error> {
        let mut chan = Channel::new(vfo);
        self.get_channel(&mut chan)?;
        Ok(chan)
    }

    /// Send `text` as Morse on `vfo`.
    pub fn send_morse(&mut self, vfo: Vfo, text: &str) -> Result<(), Error> {
        self.run("send_morse", |rig| {
            rig.check_open()?;
            let vfo = rig.resolve_vfo(vfo)?;
            rig.backend.send_morse(vfo, text)
        })
    }

    /// Free-form status text of the rig.
    ///
    /// Falls back to the descriptor if the backend has nothing to say.
    pub fn get_info(&mut self) -> Result<String, Error> {
        self.run("get_info", |rig| {
            rig.check_open()?;
            match rig.backend.get_info() {
                Ok(info) => Ok(info),
                Err(e) => {
                    log::debug!("get_info: {}, using descriptor", e);
                    Ok(format!(
                        "{} {} rev {}",
                        rig.caps.mfg_name, rig.caps.model_name, rig.caps.version
                    ))
                }
            }
        })
    }
}

impl Drop for Rig {
    fn drop(&mut self) {
        if self.is_open() {
            if let Err(e) = self.backend.close() {
                log::warn!("closing on drop failed: {}", e);
            }
        }
    }
}

impl std::fmt::Debug for Rig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rig")
            .field("model", &self.caps.model)
            .field("open", &self.is_open())
            .field("current_vfo", &self.current_vfo)
            .field("status", &self.status)
            .finish()
    }
}

#[cfg(all(test, feature = "dummy"))]
mod tests {
    use super::*;
    use crate::conf::TOK_PATHNAME;
    use crate::impls::Dummy;

    fn open_dummy() -> Rig {
        let mut rig = Rig::new(RigModel::DUMMY).unwrap();
        rig.set_conf("rig_pathname", "/dev/Rig").unwrap();
        rig.set_conf("retry", "5").unwrap();
        rig.open().unwrap();
        rig
    }

    #[test]
    fn unknown_model() {
        assert_eq!(Rig::new(RigModel::make(42, 42)).err(), Some(Error::UnknownModel));
    }

    #[test]
    fn closed_session_rejects_radio_operations() {
        let mut rig = Rig::new(RigModel::DUMMY).unwrap();
        for _ in 0..2 {
            assert_eq!(rig.set_freq(Vfo::A, 7e6), Err(Error::NotOpen));
            assert_eq!(rig.get_freq(Vfo::A), Err(Error::NotOpen));
            assert_eq!(rig.set_mode(Vfo::A, Mode::CW, 0), Err(Error::NotOpen));
            assert_eq!(rig.get_mode(Vfo::A), Err(Error::NotOpen));
            assert_eq!(rig.set_vfo(Vfo::B), Err(Error::NotOpen));
            assert_eq!(rig.get_vfo(), Err(Error::NotOpen));
            assert_eq!(rig.set_level("VOX", 1), Err(Error::NotOpen));
            assert_eq!(rig.get_level(Level::Vox), Err(Error::NotOpen));
            assert_eq!(rig.set_func(Func::Nb, true), Err(Error::NotOpen));
            assert_eq!(rig.get_ptt(), Err(Error::NotOpen));
            assert_eq!(rig.channel(Vfo::B), Err(Error::NotOpen));
            assert_eq!(rig.send_morse(Vfo::A, "73"), Err(Error::NotOpen));
            assert_eq!(rig.get_info(), Err(Error::NotOpen));
            assert_eq!(rig.close(), Err(Error::NotOpen));
            assert_eq!(rig.error_status(), Err(Error::NotOpen));
            assert!(!rig.is_open());
            assert_eq!(rig.vfo_state(Vfo::A), None);
        }
    }

    #[test]
    fn open_requires_pathname() {
        let mut rig = Rig::new(RigModel::DUMMY).unwrap();
        assert_eq!(rig.open(), Err(Error::InvalidParameter));
        assert!(!rig.is_open());
        assert_eq!(rig.status_code(), Error::InvalidParameter.code());
    }

    #[test]
    fn open_backend_failure() {
        let mut rig = Rig::new(RigModel::DUMMY).unwrap();
        rig.set_conf(TOK_PATHNAME, "").unwrap();
        assert_eq!(rig.open(), Err(Error::BackendInitFailed));
        assert!(!rig.is_open());
    }

    #[test]
    fn open_rejected_backend_param() {
        let mut rig = Rig::new(RigModel::DUMMY).unwrap();
        rig.set_conf("rig_pathname", "/dev/Rig").unwrap();
        rig.set_conf("magic_conf", "").unwrap();
        assert_eq!(rig.open(), Err(Error::BackendInitFailed));
        assert!(!rig.is_open());
        assert!(rig.port().is_none());
        rig.set_conf("magic_conf", "QRP").unwrap();
        rig.open().unwrap();
        assert_eq!(rig.backend::<Dummy>().unwrap().magic_conf(), "QRP");
    }

    #[test]
    fn port_settings_while_open() {
        let mut rig = open_dummy();
        let port = rig.port().unwrap();
        assert_eq!(port.rig_pathname, "/dev/Rig");
        assert_eq!(port.retry, 5);
        rig.close().unwrap();
        assert!(rig.port().is_none());
    }

    #[test]
    fn open_twice_fails_without_side_effect() {
        let mut rig = open_dummy();
        rig.set_freq(Vfo::A, 7_074_000.0).unwrap();
        assert_eq!(rig.open(), Err(Error::InvalidParameter));
        assert!(rig.is_open());
        assert_eq!(rig.get_freq(Vfo::A), Ok(7_074_000.0));
    }

    #[test]
    fn status_tracks_last_call() {
        let mut rig = open_dummy();
        assert_eq!(rig.set_vfo(Vfo::C), Err(Error::InvalidVfo));
        assert_eq!(rig.error_status(), Err(Error::InvalidVfo));
        rig.get_freq(Vfo::A).unwrap();
        assert_eq!(rig.error_status(), Ok(()));
        assert_eq!(rig.status_code(), 0);
        assert_eq!(crate::status_to_string(rig.status_code()), "Command completed successfully");
    }

    #[test]
    fn conf_by_name_and_token() {
        let mut rig = open_dummy();
        let region = rig.get_conf(Token::from_raw(1073741944)).unwrap();
        assert_eq!(region, ConfValue::Region(ItuRegion::Region1));
        assert_eq!(rig.get_conf("rig_pathname").unwrap(), ConfValue::from("/dev/Rig"));
        assert_eq!(rig.get_conf("retry").unwrap(), ConfValue::Int(5));
        let token = rig.token_lookup("retry").unwrap();
        assert_eq!(rig.get_conf(token).unwrap(), ConfValue::Int(5));
        assert_eq!(rig.itu_region(), ItuRegion::Region1);
    }

    #[test]
    fn conf_rejects_undeclared_and_read_only() {
        let mut rig = Rig::new(RigModel::DUMMY).unwrap();
        assert_eq!(rig.set_conf("no_such_thing", "1"), Err(Error::InvalidParameter));
        assert_eq!(rig.get_conf("no_such_thing"), Err(Error::InvalidParameter));
        assert_eq!(rig.set_conf("itu_region", "2"), Err(Error::InvalidParameter));
        assert_eq!(rig.set_conf("retry", "x"), Err(Error::TypeMismatch));
        assert_eq!(rig.get_conf("retry").unwrap(), ConfValue::Int(3));
    }

    #[test]
    fn live_conf_reaches_backend() {
        let mut rig = open_dummy();
        rig.set_conf("magic_conf", "QRP").unwrap();
        assert_eq!(rig.backend::<Dummy>().unwrap().magic_conf(), "QRP");
        assert_eq!(rig.get_conf("magic_conf").unwrap(), ConfValue::from("QRP"));
        // not live, stored for the next open
        rig.set_conf("static_data", "1").unwrap();
        assert_eq!(rig.get_conf("static_data").unwrap(), ConfValue::Bool(true));
    }

    #[test]
    fn live_conf_rejected_keeps_stored_value() {
        let mut rig = open_dummy();
        rig.set_conf("magic_conf", "QRP").unwrap();
        assert_eq!(rig.set_conf("magic_conf", ""), Err(Error::InvalidParameter));
        assert_eq!(rig.error_status(), Err(Error::InvalidParameter));
        assert_eq!(rig.get_conf("magic_conf").unwrap(), ConfValue::from("QRP"));
        assert_eq!(rig.backend::<Dummy>().unwrap().magic_conf(), "QRP");
    }

    #[test]
    fn from_args() {
        let mut rig = Rig::from_args("model=dummy, rig_pathname=/dev/Rig, retry=2").unwrap();
        assert_eq!(rig.model(), RigModel::DUMMY);
        assert_eq!(rig.get_conf("retry").unwrap(), ConfValue::Int(2));
        rig.open().unwrap();
        assert!(Rig::from_args("rig_pathname=/dev/Rig").is_err());
        assert_eq!(Rig::from_args("model=1, bogus=1").err(), Some(Error::InvalidParameter));
    }

    #[test]
    fn vfo_isolation() {
        let mut rig = open_dummy();
        rig.set_freq(Vfo::B, 5_700_000_000.0).unwrap();
        rig.set_vfo(Vfo::B).unwrap();
        assert_eq!(rig.get_freq(Vfo::Current), Ok(5_700_000_000.0));
        rig.set_freq(Vfo::A, 145_550_000.0).unwrap();
        assert_eq!(rig.get_freq(Vfo::B), Ok(5_700_000_000.0));
        assert_eq!(rig.get_freq(Vfo::A), Ok(145_550_000.0));
        assert_eq!(rig.vfo_state(Vfo::B).unwrap().freq, Some(5_700_000_000.0));
    }

    #[test]
    fn current_vfo_addressing() {
        let mut rig = open_dummy();
        assert_eq!(rig.get_vfo(), Ok(Vfo::A));
        rig.set_vfo(Vfo::B).unwrap();
        assert_eq!(rig.get_vfo(), Ok(Vfo::B));
        rig.set_freq(Vfo::Current, 14_074_000.0).unwrap();
        assert_eq!(rig.get_freq(Vfo::B), Ok(14_074_000.0));
        assert_ne!(rig.get_freq(Vfo::A), Ok(14_074_000.0));
    }

    #[test]
    fn out_of_range_frequency() {
        let mut rig = open_dummy();
        let before = rig.get_freq(Vfo::A).unwrap();
        assert_eq!(rig.set_freq(Vfo::A, 10.0), Err(Error::OutOfRange));
        assert_eq!(rig.get_freq(Vfo::A), Ok(before));
    }

    #[test]
    fn mode_and_normal_passband() {
        let mut rig = open_dummy();
        assert_eq!(rig.get_mode(Vfo::Current), Ok((Mode::FM, 15000)));
        rig.set_mode(Vfo::Current, Mode::CW, crate::PASSBAND_NORMAL).unwrap();
        assert_eq!(rig.vfo_state(Vfo::A).unwrap().mode, Some((Mode::CW, 500)));
        assert_eq!(rig.get_mode(Vfo::Current), Ok((Mode::CW, 500)));
        rig.set_mode(Vfo::Current, Mode::USB, 1800).unwrap();
        assert_eq!(rig.get_mode(Vfo::A), Ok((Mode::USB, 1800)));
        assert_eq!(rig.set_mode(Vfo::A, Mode::FAX, 0), Err(Error::InvalidParameter));
        assert_eq!(rig.vfo_state(Vfo::A).unwrap().mode, Some((Mode::USB, 1800)));
    }

    #[test]
    fn levels_by_name_and_enum_agree() {
        let mut rig = open_dummy();
        rig.set_level("VOX", 1).unwrap();
        assert_eq!(rig.get_level("VOX").unwrap().as_int(), 1);
        rig.set_level(Level::Vox, 5).unwrap();
        assert_eq!(rig.get_level(Level::Vox).unwrap().as_int(), 5);
        assert_eq!(rig.get_level("vox").unwrap(), Value::Int(5));
    }

    #[test]
    fn level_errors() {
        let mut rig = open_dummy();
        assert_eq!(rig.set_level("BOGUS", 1), Err(Error::NotSupported));
        assert_eq!(rig.set_level(Level::Strength, 1), Err(Error::NotSupported));
        assert_eq!(rig.set_level(Level::Vox, 0.5f32), Err(Error::TypeMismatch));
        assert_eq!(rig.set_level(Level::Af, 1.5f32), Err(Error::OutOfRange));
        rig.set_level(Level::Af, 0.25f32).unwrap();
        assert_eq!(rig.get_level(Level::Af), Ok(Value::Float(0.25)));
        assert!(rig.get_level(Level::Strength).is_ok());
    }

    #[test]
    fn funcs_and_ptt() {
        let mut rig = open_dummy();
        assert_eq!(rig.get_func(Func::Nb), Ok(false));
        rig.set_func("NB", true).unwrap();
        assert_eq!(rig.get_func(Func::Nb), Ok(true));
        assert_eq!(rig.get_ptt(), Ok(false));
        rig.set_ptt(true).unwrap();
        assert_eq!(rig.get_ptt(), Ok(true));
    }

    #[test]
    fn channel_snapshot() {
        let mut rig = open_dummy();
        rig.set_freq(Vfo::B, 5_700_000_000.0).unwrap();
        rig.set_vfo(Vfo::B).unwrap();
        rig.set_level(Level::Vox, 3).unwrap();
        let mut chan = Channel::new(Vfo::B);
        rig.get_channel(&mut chan).unwrap();
        assert_eq!(chan.vfo, Vfo::B);
        assert_eq!(chan.freq, 5_700_000_000.0);
        assert_eq!(chan.levels.get(&Level::Vox), Some(&Value::Int(3)));

        let mut bad = Channel::new(Vfo::C);
        assert_eq!(rig.get_channel(&mut bad), Err(Error::InvalidVfo));
        assert_eq!(bad, Channel::new(Vfo::C));
    }

    #[test]
    fn morse_and_info() {
        let mut rig = open_dummy();
        rig.send_morse(Vfo::A, "73").unwrap();
        assert_eq!(rig.backend::<Dummy>().unwrap().sent_morse(), ["--... ...--"]);
        assert_eq!(rig.send_morse(Vfo::C, "73"), Err(Error::InvalidVfo));
        assert_eq!(rig.get_info().unwrap(), "Nothing much (dummy)");
    }

    #[test]
    fn close_keeps_conf_and_reopens() {
        let mut rig = open_dummy();
        rig.set_freq(Vfo::A, 7e6).unwrap();
        rig.close().unwrap();
        assert!(!rig.is_open());
        assert_eq!(rig.vfo_state(Vfo::A), None);
        assert_eq!(rig.get_conf("retry").unwrap(), ConfValue::Int(5));
        rig.open().unwrap();
        assert!(rig.is_open());
    }

    #[test]
    fn session_can_move_to_worker() {
        let rig = open_dummy();
        let handle = std::thread::spawn(move || {
            let mut rig = rig;
            rig.set_freq(Vfo::A, 3_573_000.0)?;
            rig.get_freq(Vfo::A)
        });
        assert_eq!(handle.join().unwrap(), Ok(3_573_000.0));
    }
}
