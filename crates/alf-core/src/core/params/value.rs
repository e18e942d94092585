use serde::de::{Deserializer, MapAccess, Visitor};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;

/// A single simulation parameter value.
///
/// The variants mirror the scalar types a Fortran namelist can hold. String
/// values borrow when they come from the static default tables and own their
/// data when they come from user input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(Cow<'static, str>),
}

impl ParamValue {
    pub const fn str(value: &'static str) -> Self {
        Self::Str(Cow::Borrowed(value))
    }

    /// Renders the value as a Fortran namelist literal.
    ///
    /// Booleans become `.T.`/`.F.`, floats always carry a `d` exponent so the
    /// simulation reads them in double precision, and strings are quoted.
    pub fn to_namelist(&self) -> String {
        match self {
            Self::Bool(true) => ".T.".to_string(),
            Self::Bool(false) => ".F.".to_string(),
            Self::Int(i) => i.to_string(),
            Self::Float(x) => {
                let repr = float_repr(*x);
                if repr.contains('e') {
                    repr.replace('e', "d")
                } else {
                    format!("{}d0", repr)
                }
            }
            Self::Str(s) => format!("\"{}\"", s),
        }
    }

    /// Parses a literal given on the command line (`-S NAME=VALUE`).
    ///
    /// Accepts `true`/`false` and the Fortran spellings `.T.`/`.F.`, integers,
    /// floats (including a Fortran `d` exponent) and quoted or bare strings.
    pub fn parse_literal(raw: &str) -> Self {
        let trimmed = raw.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "true" | ".t." | ".true." => return Self::Bool(true),
            "false" | ".f." | ".false." => return Self::Bool(false),
            _ => {}
        }
        if let Ok(i) = trimmed.parse::<i64>() {
            return Self::Int(i);
        }
        if let Ok(x) = trimmed.parse::<f64>() {
            return Self::Float(x);
        }
        if trimmed.contains(['d', 'D']) {
            if let Ok(x) = trimmed.replace(['d', 'D'], "e").parse::<f64>() {
                return Self::Float(x);
            }
        }
        let unquoted = trimmed
            .strip_prefix('"')
            .and_then(|s| s.strip_suffix('"'))
            .unwrap_or(trimmed);
        Self::Str(Cow::Owned(unquoted.to_string()))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(true) => write!(f, "True"),
            Self::Bool(false) => write!(f, "False"),
            Self::Int(i) => write!(f, "{}", i),
            Self::Float(x) => write!(f, "{}", float_repr(*x)),
            Self::Str(s) => write!(f, "{}", s),
        }
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        Self::Str(Cow::Owned(value.to_string()))
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        Self::Str(Cow::Owned(value))
    }
}

/// Shortest round-trip representation of a float.
///
/// Fixed notation is used for decimal exponents in `-4..16`, scientific
/// notation with a signed two-digit exponent otherwise. Fixed notation always
/// contains a decimal point.
pub(crate) fn float_repr(x: f64) -> String {
    if x.is_nan() {
        return "nan".to_string();
    }
    if x.is_infinite() {
        return if x > 0.0 { "inf" } else { "-inf" }.to_string();
    }

    let sci = format!("{:e}", x);
    let Some((mantissa, exponent)) = sci.split_once('e') else {
        return sci;
    };
    let exponent: i32 = exponent.parse().unwrap_or(0);

    if (-4..16).contains(&exponent) {
        let mut fixed = format!("{}", x);
        if !fixed.contains('.') {
            fixed.push_str(".0");
        }
        fixed
    } else {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!("{}e{}{:02}", mantissa, sign, exponent.abs())
    }
}

/// User-supplied parameter overrides, in the order they were given.
///
/// Order matters: it determines the generated directory name. Deserializing
/// from a TOML table or JSON object keeps document order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Overrides(Vec<(String, ParamValue)>);

impl Overrides {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a value, replacing an earlier entry with the same
    /// (case-insensitive) name in place.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<ParamValue>) {
        let name = name.into();
        let value = value.into();
        match self
            .0
            .iter_mut()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(&name))
        {
            Some(entry) => entry.1 = value,
            None => self.0.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.0
            .iter()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(name))
            .map(|(_, value)| value)
    }

    /// Removes an entry (case-insensitive) and returns its value.
    pub fn take(&mut self, name: &str) -> Option<ParamValue> {
        let pos = self
            .0
            .iter()
            .position(|(existing, _)| existing.eq_ignore_ascii_case(name))?;
        Some(self.0.remove(pos).1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.0.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>, V: Into<ParamValue>> FromIterator<(S, V)> for Overrides {
    fn from_iter<I: IntoIterator<Item = (S, V)>>(iter: I) -> Self {
        let mut overrides = Self::new();
        for (name, value) in iter {
            overrides.set(name, value);
        }
        overrides
    }
}

impl<'de> Deserialize<'de> for Overrides {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct OverridesVisitor;

        impl<'de> Visitor<'de> for OverridesVisitor {
            type Value = Overrides;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a table of parameter names to values")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Overrides, A::Error> {
                let mut overrides = Overrides::new();
                while let Some((name, value)) = map.next_entry::<String, ParamValue>()? {
                    overrides.set(name, value);
                }
                Ok(overrides)
            }
        }

        deserializer.deserialize_map(OverridesVisitor)
    }
}
