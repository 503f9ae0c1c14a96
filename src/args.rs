use nom::branch::alt;
use nom::bytes::complete::escaped;
use nom::bytes::complete::tag;
use nom::bytes::complete::take_while1;
use nom::character::complete::multispace0;
use nom::character::complete::none_of;
use nom::character::complete::one_of;
use nom::combinator::all_consuming;
use nom::combinator::map;
use nom::error::ParseError;
use nom::multi::separated_list0;
use nom::sequence::delimited;
use nom::sequence::separated_pair;
use nom::IResult;
use serde::Deserialize;
use serde::Serialize;
use std::collections::BTreeMap;
use std::str::FromStr;

use crate::Error;

/// Textual `key=value` settings, e.g., `model=dummy, rig_pathname=/dev/ttyUSB0, retry=5`.
///
/// Values may be quoted with `'` or `"` to include separators or whitespace.
#[derive(Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Args {
    map: BTreeMap<String, String>,
}

impl Args {
    pub fn new() -> Self {
        Self {
            map: BTreeMap::new(),
        }
    }
    /// Parse the value stored under `key`.
    pub fn get<V: FromStr>(&self, key: impl AsRef<str>) -> Result<V, Error> {
        self.map
            .get(key.as_ref())
            .ok_or(Error::InvalidParameter)
            .and_then(|v| v.parse().or(Err(Error::TypeMismatch)))
    }
    pub fn set<K: Into<String>, V: Into<String>>(&mut self, key: K, value: V) -> Option<String> {
        self.map.insert(key.into(), value.into())
    }
    pub fn remove(&mut self, key: impl AsRef<str>) -> Option<String> {
        self.map.remove(key.as_ref())
    }
    pub fn iter(&self) -> std::collections::btree_map::Iter<'_, String, String> {
        self.map.iter()
    }
    pub fn len(&self) -> usize {
        self.map.len()
    }
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
    /// Deserialize into a settings struct, going through JSON.
    ///
    /// All values are strings, so numeric fields need `serde_with::DisplayFromStr`.
    pub fn deserialize<D: for<'a> Deserialize<'a>>(&self) -> Option<D> {
        let s = serde_json::to_string(&self).ok()?;
        serde_json::from_str(&s).ok()
    }
}

impl std::fmt::Debug for Args {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.map.fmt(f)
    }
}

impl std::fmt::Display for Args {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        for (i, (k, v)) in self.iter().enumerate() {
            if i > 0 {
                write!(fmt, ", ")?;
            }
            if v.is_empty() || v.contains(|c: char| ",='\"\\".contains(c) || c.is_whitespace()) {
                let v = v.replace('\\', "\\\\").replace('"', "\\\"");
                write!(fmt, "{}=\"{}\"", k, v)?;
            } else {
                write!(fmt, "{}={}", k, v)?;
            }
        }
        Ok(())
    }
}

fn parse_string<'a, E: ParseError<&'a str>>(input: &'a str) -> IResult<&'a str, String, E> {
    let esc_single = escaped(none_of("\\\'"), '\\', one_of("'\\"));
    let esc_or_empty_single = alt((esc_single, tag("")));
    let esc_double = escaped(none_of("\\\""), '\\', one_of("\"\\"));
    let esc_or_empty_double = alt((esc_double, tag("")));
    let filter = |c: char| c != ',' && c != '=' && !c.is_whitespace();

    delimited(
        multispace0,
        alt((
            map(delimited(tag("'"), esc_or_empty_single, tag("'")), unescape),
            map(delimited(tag("\""), esc_or_empty_double, tag("\"")), unescape),
            map(take_while1(filter), |s: &str| s.to_string()),
        )),
        multispace0,
    )(input)
}

/// Resolve `\x` escapes of a quoted value to `x`.
fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => out.extend(chars.next()),
            c => out.push(c),
        }
    }
    out
}

impl FromStr for Args {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (_, pairs) = all_consuming(delimited(
            multispace0,
            separated_list0(
                delimited(multispace0, tag(","), multispace0),
                separated_pair(
                    parse_string::<nom::error::Error<_>>,
                    delimited(multispace0, tag("="), multispace0),
                    parse_string,
                ),
            ),
            multispace0,
        ))(s)
        .or(Err(Error::InvalidParameter))?;
        Ok(Args {
            map: pairs.into_iter().collect(),
        })
    }
}

impl TryFrom<&str> for Args {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl TryFrom<String> for Args {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl TryFrom<&String> for Args {
    type Error = Error;

    fn try_from(value: &String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<&Args> for Args {
    fn from(value: &Args) -> Self {
        value.clone()
    }
}

impl From<()> for Args {
    fn from(_value: ()) -> Self {
        Args::new()
    }
}
