//! Configuration parameters.
//!
//! Every model declares the parameters it understands in a [`ConfTable`]: the frontend set
//! shared by all models (device path, delays, retry, ITU region) plus its own backend
//! parameters. A parameter is addressed either by its [`Token`] or by its name; both resolve
//! to the same slot of a session's [`ConfStore`].
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

use crate::Args;
use crate::Error;
use crate::ItuRegion;
use crate::Range;

/// Stable integer handle of a configuration parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Token(i64);

impl Token {
    const FRONTEND: i64 = 1 << 30;

    /// Token of a parameter every model understands.
    pub const fn frontend(n: i64) -> Self {
        Self(n | Self::FRONTEND)
    }
    /// Token of a model specific parameter.
    pub const fn backend(n: i64) -> Self {
        Self(n & !Self::FRONTEND)
    }
    pub const fn from_raw(raw: i64) -> Self {
        Self(raw)
    }
    pub const fn raw(&self) -> i64 {
        self.0
    }
    pub const fn is_frontend(&self) -> bool {
        self.0 & Self::FRONTEND != 0
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

pub const TOK_PATHNAME: Token = Token::frontend(10);
pub const TOK_WRITE_DELAY: Token = Token::frontend(12);
pub const TOK_POST_WRITE_DELAY: Token = Token::frontend(13);
pub const TOK_TIMEOUT: Token = Token::frontend(14);
pub const TOK_RETRY: Token = Token::frontend(15);
pub const TOK_ITU_REGION: Token = Token::frontend(120);

/// Address of a parameter, by token or by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfKey {
    Token(Token),
    Name(String),
}

impl From<Token> for ConfKey {
    fn from(value: Token) -> Self {
        ConfKey::Token(value)
    }
}

impl From<&str> for ConfKey {
    fn from(value: &str) -> Self {
        ConfKey::Name(value.to_string())
    }
}

impl From<String> for ConfKey {
    fn from(value: String) -> Self {
        ConfKey::Name(value)
    }
}

impl From<&String> for ConfKey {
    fn from(value: &String) -> Self {
        ConfKey::Name(value.clone())
    }
}

impl fmt::Display for ConfKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfKey::Token(t) => write!(f, "token {t}"),
            ConfKey::Name(n) => write!(f, "'{n}'"),
        }
    }
}

/// Typed parameter value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ConfValue {
    Str(String),
    Int(i64),
    Bool(bool),
    Region(ItuRegion),
}

impl ConfValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConfValue::Str(s) => Some(s),
            _ => None,
        }
    }
    pub fn as_int(&self) -> Option<i64> {
        match *self {
            ConfValue::Int(i) => Some(i),
            ConfValue::Bool(b) => Some(b as i64),
            ConfValue::Region(r) => Some(r.number() as i64),
            ConfValue::Str(_) => None,
        }
    }
}

impl fmt::Display for ConfValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfValue::Str(s) => f.write_str(s),
            ConfValue::Int(i) => write!(f, "{i}"),
            ConfValue::Bool(b) => write!(f, "{}", *b as u8),
            ConfValue::Region(r) => write!(f, "{r}"),
        }
    }
}

impl From<&str> for ConfValue {
    fn from(value: &str) -> Self {
        ConfValue::Str(value.to_string())
    }
}

impl From<String> for ConfValue {
    fn from(value: String) -> Self {
        ConfValue::Str(value)
    }
}

impl From<i64> for ConfValue {
    fn from(value: i64) -> Self {
        ConfValue::Int(value)
    }
}

impl From<i32> for ConfValue {
    fn from(value: i32) -> Self {
        ConfValue::Int(value as i64)
    }
}

impl From<bool> for ConfValue {
    fn from(value: bool) -> Self {
        ConfValue::Bool(value)
    }
}

impl From<ItuRegion> for ConfValue {
    fn from(value: ItuRegion) -> Self {
        ConfValue::Region(value)
    }
}

/// Declared type of a parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfKind {
    String,
    /// Integer constrained to the range.
    Numeric(Range),
    /// String restricted to a set of options.
    Combo(&'static [&'static str]),
    Checkbutton,
    Region,
}

impl ConfKind {
    /// Validate `value`, parsing strings into the declared type.
    pub fn coerce(&self, value: ConfValue) -> Result<ConfValue, Error> {
        match (self, value) {
            (ConfKind::String, v @ ConfValue::Str(_)) => Ok(v),
            (ConfKind::Numeric(_), ConfValue::Str(s)) => {
                let i = s.trim().parse::<i64>().or(Err(Error::TypeMismatch))?;
                self.coerce(ConfValue::Int(i))
            }
            (ConfKind::Numeric(range), ConfValue::Int(i)) => {
                if range.contains(i as f64) {
                    Ok(ConfValue::Int(i))
                } else {
                    Err(Error::OutOfRange)
                }
            }
            (ConfKind::Combo(options), ConfValue::Str(s)) => {
                if options.contains(&s.as_str()) {
                    Ok(ConfValue::Str(s))
                } else {
                    Err(Error::OutOfRange)
                }
            }
            (ConfKind::Checkbutton, ConfValue::Str(s)) => match s.trim() {
                "0" | "false" | "off" => Ok(ConfValue::Bool(false)),
                "1" | "true" | "on" => Ok(ConfValue::Bool(true)),
                _ => Err(Error::TypeMismatch),
            },
            (ConfKind::Checkbutton, v @ ConfValue::Bool(_)) => Ok(v),
            (ConfKind::Region, ConfValue::Str(s)) => Ok(ConfValue::Region(s.parse()?)),
            (ConfKind::Region, v @ ConfValue::Region(_)) => Ok(v),
            _ => Err(Error::TypeMismatch),
        }
    }

    fn empty(&self) -> ConfValue {
        match self {
            ConfKind::String | ConfKind::Combo(_) => ConfValue::Str(String::new()),
            ConfKind::Numeric(_) => ConfValue::Int(0),
            ConfKind::Checkbutton => ConfValue::Bool(false),
            ConfKind::Region => ConfValue::Region(ItuRegion::Region1),
        }
    }
}

/// Declaration of one parameter.
#[derive(Debug, Clone)]
pub struct ConfParam {
    pub token: Token,
    pub name: &'static str,
    pub label: &'static str,
    pub tooltip: &'static str,
    pub kind: ConfKind,
    pub default: Option<String>,
    /// Must be set before `open` if there is no default.
    pub required: bool,
    /// Forwarded to the backend when written while open.
    pub live: bool,
    pub read_only: bool,
}

impl ConfParam {
    pub fn new(token: Token, name: &'static str, label: &'static str, kind: ConfKind) -> Self {
        Self {
            token,
            name,
            label,
            tooltip: "",
            kind,
            default: None,
            required: false,
            live: false,
            read_only: false,
        }
    }
    pub fn tooltip(mut self, tooltip: &'static str) -> Self {
        self.tooltip = tooltip;
        self
    }
    pub fn default_value(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }
    pub fn live(mut self) -> Self {
        self.live = true;
        self
    }
    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    fn default_or_empty(&self) -> ConfValue {
        self.default
            .as_deref()
            .and_then(|d| self.kind.coerce(ConfValue::from(d)).ok())
            .unwrap_or_else(|| self.kind.empty())
    }
}

/// Frontend defaults a model can tune.
#[derive(Debug, Clone, Copy)]
pub struct FrontendDefaults {
    pub pathname_required: bool,
    pub timeout_ms: i64,
    pub retry: i64,
    pub itu_region: ItuRegion,
}

/// Parameters of one model, resolvable by token and by name.
#[derive(Debug, Clone)]
pub struct ConfTable {
    params: Vec<ConfParam>,
    by_token: HashMap<Token, usize>,
    by_name: HashMap<&'static str, usize>,
}

impl ConfTable {
    /// Frontend parameters followed by `backend` ones.
    ///
    /// Later declarations of an already used token or name are dropped.
    pub fn new(frontend: FrontendDefaults, backend: Vec<ConfParam>) -> Self {
        let mut path =
            ConfParam::new(TOK_PATHNAME, "rig_pathname", "Rig path name", ConfKind::String)
                .tooltip("Path name to the device file of the rig");
        if frontend.pathname_required {
            path = path.required();
        }
        let params = vec![
            path,
            ConfParam::new(
                TOK_WRITE_DELAY,
                "write_delay",
                "Write delay",
                ConfKind::Numeric(Range::interval(0.0, 1000.0)),
            )
            .tooltip("Delay in ms between each byte sent out")
            .default_value("0"),
            ConfParam::new(
                TOK_POST_WRITE_DELAY,
                "post_write_delay",
                "Post write delay",
                ConfKind::Numeric(Range::interval(0.0, 1000.0)),
            )
            .tooltip("Delay in ms between each command sent out")
            .default_value("0"),
            ConfParam::new(
                TOK_TIMEOUT,
                "timeout",
                "Timeout",
                ConfKind::Numeric(Range::interval(0.0, 10000.0)),
            )
            .tooltip("Timeout in ms")
            .default_value(frontend.timeout_ms.to_string()),
            ConfParam::new(
                TOK_RETRY,
                "retry",
                "Retry",
                ConfKind::Numeric(Range::interval(0.0, 10.0)),
            )
            .tooltip("Max number of retry")
            .default_value(frontend.retry.to_string()),
            ConfParam::new(TOK_ITU_REGION, "itu_region", "ITU region", ConfKind::Region)
                .tooltip("ITU region this rig has been purchased in")
                .default_value(frontend.itu_region.to_string())
                .read_only(),
        ];

        let mut table = Self {
            params: Vec::new(),
            by_token: HashMap::new(),
            by_name: HashMap::new(),
        };
        for p in params.into_iter().chain(backend) {
            if table.by_token.contains_key(&p.token) || table.by_name.contains_key(p.name) {
                log::warn!("duplicate configuration parameter {} ({})", p.name, p.token);
                continue;
            }
            table.by_token.insert(p.token, table.params.len());
            table.by_name.insert(p.name, table.params.len());
            table.params.push(p);
        }
        table
    }

    pub fn lookup(&self, key: &ConfKey) -> Result<&ConfParam, Error> {
        let idx = match key {
            ConfKey::Token(t) => self.by_token.get(t),
            ConfKey::Name(n) => self.by_name.get(n.as_str()),
        };
        idx.map(|i| &self.params[*i]).ok_or(Error::InvalidParameter)
    }

    /// Token declared under `name`.
    pub fn token(&self, name: &str) -> Result<Token, Error> {
        self.lookup(&ConfKey::from(name)).map(|p| p.token)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ConfParam> {
        self.params.iter()
    }
}

/// Per-session parameter values.
///
/// Only explicit writes are stored, reads of untouched parameters fall back to the declared
/// default.
#[derive(Debug, Clone, Default)]
pub struct ConfStore {
    values: HashMap<Token, ConfValue>,
}

impl ConfStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve and validate a write without applying it.
    pub fn validate<'a>(
        &self,
        table: &'a ConfTable,
        key: &ConfKey,
        value: ConfValue,
    ) -> Result<(&'a ConfParam, ConfValue), Error> {
        let param = table.lookup(key)?;
        if param.read_only {
            return Err(Error::InvalidParameter);
        }
        let value = param.kind.coerce(value)?;
        Ok((param, value))
    }

    pub fn insert(&mut self, token: Token, value: ConfValue) {
        self.values.insert(token, value);
    }

    pub fn get(&self, table: &ConfTable, key: &ConfKey) -> Result<ConfValue, Error> {
        let param = table.lookup(key)?;
        Ok(self
            .values
            .get(&param.token)
            .cloned()
            .unwrap_or_else(|| param.default_or_empty()))
    }

    /// Value was written or has a default.
    pub fn is_set(&self, param: &ConfParam) -> bool {
        self.values.contains_key(&param.token) || param.default.is_some()
    }

    /// Required parameters that are neither written nor defaulted.
    pub fn missing<'a>(&self, table: &'a ConfTable) -> Vec<&'a ConfParam> {
        table
            .iter()
            .filter(|p| p.required && !self.is_set(p))
            .collect()
    }

    /// Every parameter that has a value, in string form.
    pub fn to_args(&self, table: &ConfTable) -> Args {
        let mut args = Args::new();
        for p in table.iter().filter(|p| self.is_set(p)) {
            let v = self
                .values
                .get(&p.token)
                .cloned()
                .unwrap_or_else(|| p.default_or_empty());
            args.set(p.name, v.to_string());
        }
        args
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> ConfTable {
        ConfTable::new(
            FrontendDefaults {
                pathname_required: true,
                timeout_ms: 200,
                retry: 3,
                itu_region: ItuRegion::Region1,
            },
            vec![
                ConfParam::new(Token::backend(1), "mode", "Mode", ConfKind::Combo(&["a", "b"]))
                    .default_value("a")
                    .live(),
                ConfParam::new(Token::backend(2), "retry", "Dup", ConfKind::String),
            ],
        )
    }

    #[test]
    fn itu_region_token_value() {
        assert_eq!(TOK_ITU_REGION.raw(), 1073741944);
        assert!(TOK_ITU_REGION.is_frontend());
        assert!(!Token::backend(1).is_frontend());
    }

    #[test]
    fn name_and_token_resolve_to_same_slot() {
        let t = table();
        let mut s = ConfStore::new();
        let (p, v) = s
            .validate(&t, &ConfKey::from("retry"), ConfValue::from("5"))
            .unwrap();
        assert_eq!(p.token, TOK_RETRY);
        s.insert(p.token, v);
        assert_eq!(s.get(&t, &TOK_RETRY.into()).unwrap(), ConfValue::Int(5));
        assert_eq!(s.get(&t, &"retry".into()).unwrap(), ConfValue::Int(5));
        assert_eq!(t.token("itu_region").unwrap(), TOK_ITU_REGION);
    }

    #[test]
    fn duplicates_are_dropped() {
        let t = table();
        assert_eq!(t.iter().count(), 7);
        assert!(t.lookup(&Token::backend(2).into()).is_err());
    }

    #[test]
    fn undeclared_keys_fail() {
        let t = table();
        let s = ConfStore::new();
        assert_eq!(
            s.validate(&t, &"nope".into(), ConfValue::from("1")).err(),
            Some(Error::InvalidParameter)
        );
        assert_eq!(
            s.get(&t, &Token::backend(99).into()).err(),
            Some(Error::InvalidParameter)
        );
    }

    #[test]
    fn type_validation() {
        let t = table();
        let s = ConfStore::new();
        assert_eq!(
            s.validate(&t, &"retry".into(), ConfValue::from("many")).err(),
            Some(Error::TypeMismatch)
        );
        assert_eq!(
            s.validate(&t, &"retry".into(), ConfValue::Int(11)).err(),
            Some(Error::OutOfRange)
        );
        assert_eq!(
            s.validate(&t, &"rig_pathname".into(), ConfValue::Int(1)).err(),
            Some(Error::TypeMismatch)
        );
        assert_eq!(
            s.validate(&t, &"mode".into(), ConfValue::from("c")).err(),
            Some(Error::OutOfRange)
        );
        assert_eq!(
            s.validate(&t, &"itu_region".into(), ConfValue::from("2")).err(),
            Some(Error::InvalidParameter)
        );
    }

    #[test]
    fn defaults_and_missing() {
        let t = table();
        let mut s = ConfStore::new();
        assert_eq!(s.get(&t, &"timeout".into()).unwrap(), ConfValue::Int(200));
        assert_eq!(
            s.get(&t, &TOK_ITU_REGION.into()).unwrap(),
            ConfValue::Region(ItuRegion::Region1)
        );
        assert_eq!(s.get(&t, &"rig_pathname".into()).unwrap(), ConfValue::from(""));
        let missing: Vec<_> = s.missing(&t).iter().map(|p| p.name).collect();
        assert_eq!(missing, vec!["rig_pathname"]);

        s.insert(TOK_PATHNAME, ConfValue::from("/dev/rig"));
        assert!(s.missing(&t).is_empty());
        let args = s.to_args(&t);
        assert_eq!(args.get::<String>("rig_pathname").unwrap(), "/dev/rig");
        assert_eq!(args.get::<u32>("retry").unwrap(), 3);
    }
}
