//! Interpreter versions and half-open version ranges
//!
//! Range text grammar:
//! - `""` or `"-"`: unbounded
//! - `"3.2"`: exactly 3.2
//! - `"3.2-"`: 3.2 and newer
//! - `"-3.7"`: older than 3.7
//! - `"3.2-3.7"`: from 3.2 up to, but excluding, 3.7

use crate::error::RangeError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Interpreter version as a (major, minor) pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Version {
    pub major: u16,
    pub minor: u16,
}

impl Version {
    pub const fn new(major: u16, minor: u16) -> Self {
        Self { major, minor }
    }

    /// The version right after this one in the same major series
    pub fn next_minor(self) -> Result<Self, RangeError> {
        let minor = self
            .minor
            .checked_add(1)
            .ok_or_else(|| RangeError::NoNextVersion {
                value: self.to_string(),
            })?;
        Ok(Self::new(self.major, minor))
    }
}

impl FromStr for Version {
    type Err = RangeError;

    /// Parses `X.Y`, ignoring any micro component (`3.1.4` is 3.1)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || RangeError::InvalidVersion {
            value: s.to_string(),
        };
        let mut parts = s.trim().splitn(3, '.');
        let major = parse_component(parts.next()).ok_or_else(invalid)?;
        let minor = parse_component(parts.next()).ok_or_else(invalid)?;
        Ok(Self::new(major, minor))
    }
}

fn parse_component(part: Option<&str>) -> Option<u16> {
    let part = part?;
    if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    part.parse().ok()
}

impl TryFrom<String> for Version {
    type Error = RangeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Version> for String {
    fn from(version: Version) -> Self {
        version.to_string()
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// Half-open range `[min, max)` of interpreter versions
///
/// Unbounded sides are `None`. When both bounds are equal the range denotes
/// exactly that one version rather than an empty interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct VersionRange {
    min: Option<Version>,
    max: Option<Version>,
}

impl VersionRange {
    /// Creates a range, rejecting a minimum above the maximum
    pub fn new(min: Option<Version>, max: Option<Version>) -> Result<Self, RangeError> {
        if let (Some(lo), Some(hi)) = (min, max) {
            if lo > hi {
                return Err(RangeError::Inverted {
                    value: format!("{}-{}", lo, hi),
                });
            }
        }
        Ok(Self { min, max })
    }

    /// Range without bounds
    pub const fn unbounded() -> Self {
        Self {
            min: None,
            max: None,
        }
    }

    /// Range holding exactly one version
    pub const fn exact(version: Version) -> Self {
        Self {
            min: Some(version),
            max: Some(version),
        }
    }

    pub fn min(&self) -> Option<Version> {
        self.min
    }

    pub fn max(&self) -> Option<Version> {
        self.max
    }

    pub fn is_unbounded(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }

    /// Returns the single version when the range is degenerate
    pub fn as_exact(&self) -> Option<Version> {
        match (self.min, self.max) {
            (Some(lo), Some(hi)) if lo == hi => Some(lo),
            _ => None,
        }
    }

    pub fn contains(&self, version: Version) -> bool {
        if let Some(exact) = self.as_exact() {
            return version == exact;
        }
        self.min.map_or(true, |lo| version >= lo) && self.max.map_or(true, |hi| version < hi)
    }

    /// Returns the supported versions inside this range, ascending
    pub fn members(&self, supported: &SupportedVersions) -> Vec<Version> {
        supported
            .iter()
            .filter(|version| self.contains(*version))
            .collect()
    }
}

impl FromStr for VersionRange {
    type Err = RangeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();
        let invalid = || RangeError::InvalidRange {
            value: s.to_string(),
        };
        let bound = |part: &str| parse_bound(part).ok_or_else(invalid);

        if text.is_empty() || text == "-" {
            return Ok(Self::unbounded());
        }

        if let Some(max) = text.strip_prefix('-') {
            return Ok(Self {
                min: None,
                max: Some(bound(max)?),
            });
        }

        let range = match text.split_once('-') {
            None => Self::exact(bound(text)?),
            Some((min, "")) => Self {
                min: Some(bound(min)?),
                max: None,
            },
            Some((min, max)) => Self {
                min: Some(bound(min)?),
                max: Some(bound(max)?),
            },
        };

        if let (Some(lo), Some(hi)) = (range.min, range.max) {
            if lo > hi {
                return Err(RangeError::Inverted {
                    value: s.to_string(),
                });
            }
        }
        Ok(range)
    }
}

/// Range bounds are strict `X.Y` pairs, no micro component
fn parse_bound(part: &str) -> Option<Version> {
    let (major, minor) = part.split_once('.')?;
    Some(Version::new(
        parse_component(Some(major))?,
        parse_component(Some(minor))?,
    ))
}

impl fmt::Display for VersionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.min, self.max) {
            (None, None) => write!(f, "-"),
            (Some(lo), Some(hi)) if lo == hi => write!(f, "{}", lo),
            (None, Some(hi)) => write!(f, "-{}", hi),
            (Some(lo), None) => write!(f, "{}-", lo),
            (Some(lo), Some(hi)) => write!(f, "{}-{}", lo, hi),
        }
    }
}

/// Interpreter versions the target distribution ships, one of them the default
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupportedVersions {
    versions: Vec<Version>,
    default: Version,
}

impl SupportedVersions {
    pub fn new(
        versions: impl IntoIterator<Item = Version>,
        default: Version,
    ) -> Result<Self, RangeError> {
        let mut versions: Vec<Version> = versions.into_iter().collect();
        versions.sort();
        versions.dedup();
        if !versions.contains(&default) {
            return Err(RangeError::DefaultNotSupported {
                default: default.to_string(),
            });
        }
        Ok(Self { versions, default })
    }

    pub fn default_version(&self) -> Version {
        self.default
    }

    pub fn contains(&self, version: Version) -> bool {
        self.versions.binary_search(&version).is_ok()
    }

    pub fn iter(&self) -> impl Iterator<Item = Version> + '_ {
        self.versions.iter().copied()
    }

    /// Orders versions for alternatives in a Depends field
    ///
    /// The default comes first (when present), then newer versions ascending,
    /// then older versions descending.
    pub fn debian_order(&self, versions: impl IntoIterator<Item = Version>) -> Vec<Version> {
        let mut sorted: Vec<Version> = versions.into_iter().collect();
        sorted.sort();
        sorted.dedup();
        let (older, mut result): (Vec<Version>, Vec<Version>) =
            sorted.into_iter().partition(|v| *v < self.default);
        result.extend(older.into_iter().rev());
        result
    }
}

impl Default for SupportedVersions {
    fn default() -> Self {
        Self {
            versions: vec![Version::new(3, 1), Version::new(3, 2)],
            default: Version::new(3, 1),
        }
    }
}
