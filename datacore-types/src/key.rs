//! Collection keys.
//!
//! A key is either an integer (auto-assigned or explicit) or a name. Strings
//! that spell a canonical decimal integer normalize to [`Key::Index`], so
//! `Key::from("7") == Key::Index(7)`.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Key {
    Index(i64),
    Name(String),
}

impl Key {
    /// Returns the integer value for index keys.
    #[must_use]
    pub const fn as_index(&self) -> Option<i64> {
        match self {
            Self::Index(i) => Some(*i),
            Self::Name(_) => None,
        }
    }

    /// Returns the name for string keys.
    #[must_use]
    pub fn as_name(&self) -> Option<&str> {
        match self {
            Self::Index(_) => None,
            Self::Name(name) => Some(name),
        }
    }
}

fn canonical_index(s: &str) -> Option<i64> {
    let digits = s.strip_prefix('-').unwrap_or(s);
    let canonical = !digits.is_empty()
        && digits.bytes().all(|b| b.is_ascii_digit())
        && (digits == "0" || !digits.starts_with('0'))
        && s != "-0";
    if canonical { s.parse().ok() } else { None }
}

impl From<i64> for Key {
    fn from(index: i64) -> Self {
        Self::Index(index)
    }
}

impl From<i32> for Key {
    fn from(index: i32) -> Self {
        Self::Index(i64::from(index))
    }
}

impl From<usize> for Key {
    fn from(index: usize) -> Self {
        Self::Index(i64::try_from(index).unwrap_or(i64::MAX))
    }
}

impl From<&str> for Key {
    fn from(name: &str) -> Self {
        match canonical_index(name) {
            Some(index) => Self::Index(index),
            None => Self::Name(name.to_string()),
        }
    }
}

impl From<String> for Key {
    fn from(name: String) -> Self {
        match canonical_index(&name) {
            Some(index) => Self::Index(index),
            None => Self::Name(name),
        }
    }
}

impl From<&String> for Key {
    fn from(name: &String) -> Self {
        Self::from(name.as_str())
    }
}

impl From<&Key> for Key {
    fn from(key: &Key) -> Self {
        key.clone()
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Index(i) => write!(f, "{i}"),
            Self::Name(name) => f.write_str(name),
        }
    }
}
