//! Severity levels and the mapping from façade level names to them.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Application Insights severity scale.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum SeverityLevel {
    Verbose = 0,
    #[default]
    Information = 1,
    Warning = 2,
    Error = 3,
    Critical = 4,
}

impl SeverityLevel {
    /// All levels in ascending order.
    pub const ALL: [SeverityLevel; 5] = [
        Self::Verbose,
        Self::Information,
        Self::Warning,
        Self::Error,
        Self::Critical,
    ];

    /// Numeric value (0-4).
    pub fn as_number(self) -> u8 {
        self as u8
    }

    /// Get the severity name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Verbose => "verbose",
            Self::Information => "information",
            Self::Warning => "warning",
            Self::Error => "error",
            Self::Critical => "critical",
        }
    }

    /// Whether a record at this severity should also be sent as an exception.
    pub fn is_exception_worthy(self) -> bool {
        self >= Self::Error
    }
}

impl std::fmt::Display for SeverityLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Mapping from façade level names to severities.
///
/// The façade's vocabulary is open-ended, so names missing from the map
/// resolve to [`SeverityLevel::Information`] instead of failing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LevelMap {
    levels: HashMap<String, SeverityLevel>,
}

impl LevelMap {
    /// Create an empty map. Every name resolves to `Information`.
    pub fn empty() -> Self {
        Self {
            levels: HashMap::new(),
        }
    }

    /// Add or replace a level mapping.
    pub fn with_level(mut self, name: impl Into<String>, severity: SeverityLevel) -> Self {
        self.levels.insert(name.into(), severity);
        self
    }

    /// Resolve a level name to its severity.
    pub fn resolve(&self, level: &str) -> SeverityLevel {
        self.get(level).unwrap_or_default()
    }

    /// Look up a level name without the fallback.
    pub fn get(&self, level: &str) -> Option<SeverityLevel> {
        self.levels.get(level).copied()
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}

impl Default for LevelMap {
    /// npm levels plus the syslog names collapsed onto the five severities.
    fn default() -> Self {
        use SeverityLevel::*;

        [
            ("error", Error),
            ("warn", Warning),
            ("http", Information),
            ("info", Information),
            ("verbose", Verbose),
            ("debug", Verbose),
            ("silly", Verbose),
            // syslog
            ("emerg", Critical),
            ("alert", Critical),
            ("crit", Critical),
            ("warning", Warning),
            ("notice", Information),
        ]
        .into_iter()
        .collect()
    }
}

impl<K: Into<String>> FromIterator<(K, SeverityLevel)> for LevelMap {
    fn from_iter<I: IntoIterator<Item = (K, SeverityLevel)>>(iter: I) -> Self {
        Self {
            levels: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

impl From<HashMap<String, SeverityLevel>> for LevelMap {
    fn from(levels: HashMap<String, SeverityLevel>) -> Self {
        Self { levels }
    }
}
