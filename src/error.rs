//! Error types
//!
//! The simulation itself never fails: fuel or lives running out are phase
//! transitions. The only fallible surface is loading balance data.

use std::fmt;

#[derive(Debug)]
pub enum TuningError {
    /// The JSON document could not be parsed
    Parse(serde_json::Error),
    /// A field parsed but holds an unusable value
    Invalid { field: &'static str, reason: String },
}

impl TuningError {
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

impl fmt::Display for TuningError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(err) => write!(f, "failed to parse tuning: {err}"),
            Self::Invalid { field, reason } => write!(f, "invalid tuning field `{field}`: {reason}"),
        }
    }
}

impl std::error::Error for TuningError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Parse(err) => Some(err),
            Self::Invalid { .. } => None,
        }
    }
}

impl From<serde_json::Error> for TuningError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err)
    }
}
