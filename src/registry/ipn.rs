use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

fn ipn_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(?P<prefix>[0-9]+)(?P<sep>[.-])(?P<rest>[A-Za-z0-9]+)$")
            .expect("IPN pattern must compile")
    })
}

/// A parsed inventory part number such as `663-7891` or `663.1234`.
///
/// A `.` separator marks a dot-number IPN.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Ipn {
    raw: String,
    prefix_len: usize,
    dotted: bool,
}

impl Ipn {
    /// Parse and validate an IPN.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::InvalidIpn` when the input is not
    /// `<digits><'-' or '.'><alphanumerics>`.
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let raw = raw.trim();
        let caps = ipn_pattern()
            .captures(raw)
            .ok_or_else(|| ValidationError::InvalidIpn {
                ipn: raw.to_string(),
            })?;
        let prefix_len = caps.name("prefix").map_or(0, |m| m.end());
        let dotted = caps.name("sep").is_some_and(|m| m.as_str() == ".");
        Ok(Self {
            raw: raw.to_string(),
            prefix_len,
            dotted,
        })
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// The numeric part-type prefix without separator.
    #[must_use]
    pub fn base_prefix(&self) -> &str {
        &self.raw[..self.prefix_len]
    }

    /// Registry key of the dot-number variant (`"663."`), if dotted.
    #[must_use]
    pub fn dot_variant_key(&self) -> Option<String> {
        self.dotted.then(|| format!("{}.", self.base_prefix()))
    }

    #[must_use]
    pub const fn is_dot_number(&self) -> bool {
        self.dotted
    }
}

impl TryFrom<String> for Ipn {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Ipn> for String {
    fn from(ipn: Ipn) -> Self {
        ipn.raw
    }
}

impl fmt::Display for Ipn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Strip the dot-number separator from a registry key (`"663."` → `"663"`).
#[must_use]
pub fn normalize_prefix(prefix: &str) -> String {
    prefix.replace('.', "")
}
