//! Static per-model capability descriptors.
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use crate::conf::ConfTable;
use crate::Error;
use crate::Func;
use crate::ItuRegion;
use crate::Level;
use crate::Mode;
use crate::Range;
use crate::RigBackend;
use crate::Vfo;
use crate::Width;

/// Model number, `backend * 100 + index`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct RigModel(u32);

impl RigModel {
    pub const NONE: RigModel = RigModel(0);
    pub const DUMMY: RigModel = RigModel::make(0, 1);
    pub const ARMSTRONG: RigModel = RigModel::make(0, 3);

    pub const fn make(backend: u32, index: u32) -> Self {
        Self(backend * 100 + index)
    }
    pub const fn number(&self) -> u32 {
        self.0
    }
    pub const fn backend(&self) -> u32 {
        self.0 / 100
    }
}

impl From<u32> for RigModel {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl fmt::Display for RigModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RigModel {
    type Err = Error;

    /// Model number, or the model name of a registered descriptor.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(n) = s.parse::<u32>() {
            return Ok(RigModel(n));
        }
        crate::registry::models()
            .find(|c| c.model_name.eq_ignore_ascii_case(s))
            .map(|c| c.model)
            .ok_or(Error::UnknownModel)
    }
}

/// Maturity of a backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RigStatus {
    Alpha,
    Untested,
    Beta,
    Stable,
}

impl fmt::Display for RigStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RigStatus::Alpha => "Alpha",
            RigStatus::Untested => "Untested",
            RigStatus::Beta => "Beta",
            RigStatus::Stable => "Stable",
        };
        f.write_str(s)
    }
}

/// How the backend reaches the rig.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PortType {
    None,
    Serial,
    Network,
}

/// Everything the library knows about a model without talking to it.
///
/// Descriptors are built once by the [registry](crate::registry) and shared by all sessions
/// on that model.
pub struct RigCaps {
    pub model: RigModel,
    pub model_name: &'static str,
    pub mfg_name: &'static str,
    pub version: &'static str,
    pub copyright: &'static str,
    pub status: RigStatus,
    pub port_type: PortType,
    pub vfos: Vec<Vfo>,
    pub modes: Vec<Mode>,
    /// Passband widths per mode, the first one listed for a mode is its normal width.
    pub filters: Vec<(Mode, Width)>,
    pub get_levels: Vec<Level>,
    pub set_levels: Vec<Level>,
    pub level_gran: Vec<(Level, Range)>,
    pub funcs: Vec<Func>,
    /// Tuning range per VFO.
    pub freq_ranges: Vec<(Vfo, Range)>,
    /// All VFOs are derived from one oscillator, tuning one retunes all.
    pub shared_oscillator: bool,
    pub itu_region: ItuRegion,
    pub conf: ConfTable,
    /// Backend constructor, called once per session.
    pub new_backend: fn(&'static RigCaps) -> Box<dyn RigBackend>,
}

impl RigCaps {
    pub fn has_vfo(&self, vfo: Vfo) -> bool {
        self.vfos.contains(&vfo)
    }
    pub fn has_mode(&self, mode: Mode) -> bool {
        self.modes.contains(&mode)
    }
    pub fn has_get_level(&self, level: Level) -> bool {
        self.get_levels.contains(&level)
    }
    pub fn has_set_level(&self, level: Level) -> bool {
        self.set_levels.contains(&level)
    }
    pub fn has_func(&self, func: Func) -> bool {
        self.funcs.contains(&func)
    }
    pub fn freq_range(&self, vfo: Vfo) -> Option<&Range> {
        self.freq_ranges
            .iter()
            .find(|(v, _)| *v == vfo)
            .map(|(_, r)| r)
    }
    pub fn level_range(&self, level: Level) -> Option<&Range> {
        self.level_gran
            .iter()
            .find(|(l, _)| *l == level)
            .map(|(_, r)| r)
    }
    /// Normal passband of `mode`, 0 if the model declares no filter for it.
    pub fn passband_normal(&self, mode: Mode) -> Width {
        self.filters
            .iter()
            .find(|(m, _)| *m == mode)
            .map(|(_, w)| *w)
            .unwrap_or(0)
    }
    /// Validate a level value against the model's granularity.
    pub fn check_level(&self, level: Level, value: f64) -> Result<(), Error> {
        match self.level_range(level) {
            Some(r) if !r.contains(value) => {
                log::debug!(
                    "{} {} out of range, closest is {:?}",
                    level,
                    value,
                    r.closest(value)
                );
                Err(Error::OutOfRange)
            }
            _ => Ok(()),
        }
    }
}

impl fmt::Debug for RigCaps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RigCaps")
            .field("model", &self.model)
            .field("model_name", &self.model_name)
            .field("mfg_name", &self.mfg_name)
            .field("version", &self.version)
            .field("status", &self.status)
            .finish_non_exhaustive()
    }
}
