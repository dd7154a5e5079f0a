//! USI options: what the engine declares on `usi`, and what `setoption` stored.

use std::collections::BTreeMap;
use std::fmt;
use std::ops::RangeInclusive;

/// Path of an engine-specific option file. Declared for GUI compatibility.
pub const OPTION_FILE: &str = "OptionFile";
/// Forced-mate search horizon in plies.
pub const OPTION_MATE_PLY: &str = "MatePly";
/// Generation budget of the language model, in tokens.
pub const OPTION_MAX_NEW_TOKENS: &str = "MaxNewTokens";

pub const DEFAULT_MAX_NEW_TOKENS: u32 = 10;

/// Accepted `MatePly` values (inclusive).
pub const MATE_PLY_RANGE: RangeInclusive<u32> = 1..=31;
/// Accepted `MaxNewTokens` values (inclusive).
pub const MAX_NEW_TOKENS_RANGE: RangeInclusive<u32> = 1..=256;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OptionKind {
    Spin { default: i64, min: i64, max: i64 },
    String { default: String },
}

/// One `option name ... type ...` line of the handshake.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OptionDecl {
    pub name: String,
    pub kind: OptionKind,
}

impl OptionDecl {
    pub fn spin(name: &str, default: i64, min: i64, max: i64) -> Self {
        Self {
            name: name.to_string(),
            kind: OptionKind::Spin { default, min, max },
        }
    }

    pub fn string(name: &str, default: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: OptionKind::String {
                default: default.to_string(),
            },
        }
    }

    fn spin_in(name: &str, default: u32, range: &RangeInclusive<u32>) -> Self {
        Self::spin(
            name,
            i64::from(default),
            i64::from(*range.start()),
            i64::from(*range.end()),
        )
    }
}

impl fmt::Display for OptionDecl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "option name {} ", self.name)?;
        match &self.kind {
            OptionKind::Spin { default, min, max } => {
                write!(f, "type spin default {default} min {min} max {max}")
            }
            OptionKind::String { default } if default.is_empty() => {
                write!(f, "type string default <empty>")
            }
            OptionKind::String { default } => write!(f, "type string default {default}"),
        }
    }
}

/// Options declared by the engine during the handshake.
///
/// Defaults outside their declared range are clamped into it.
pub fn default_options(mate_horizon: u32, max_new_tokens: u32) -> Vec<OptionDecl> {
    vec![
        OptionDecl::string(OPTION_FILE, ""),
        OptionDecl::spin_in(
            OPTION_MATE_PLY,
            clamp_to(mate_horizon, &MATE_PLY_RANGE),
            &MATE_PLY_RANGE,
        ),
        OptionDecl::spin_in(
            OPTION_MAX_NEW_TOKENS,
            clamp_to(max_new_tokens, &MAX_NEW_TOKENS_RANGE),
            &MAX_NEW_TOKENS_RANGE,
        ),
    ]
}

/// Clamp a spin value into its declared range.
pub fn clamp_to(value: u32, range: &RangeInclusive<u32>) -> u32 {
    value.clamp(*range.start(), *range.end())
}

/// Parse a `setoption` spin value and clamp it into `range`.
///
/// `None` if the value is not a non-negative integer.
pub fn parse_spin(value: &str, range: &RangeInclusive<u32>) -> Option<u32> {
    value.trim().parse::<u32>().ok().map(|v| clamp_to(v, range))
}

/// Values received through `setoption`.
///
/// Unknown names are stored as-is: GUIs send options the engine never
/// declared, and that must not be an error.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EngineOptions {
    values: BTreeMap<String, String>,
}

impl EngineOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, name: &str, value: &str) {
        self.values.insert(name.to_string(), value.to_string());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}
