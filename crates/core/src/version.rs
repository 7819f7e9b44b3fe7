//! Source-language version tuples
//!
//! A `VersionTuple` names the language version an annotation applies to,
//! e.g. `4`, `4.2`, or `5.0.1`. A tuple whose components are all zero
//! (`0`, `0.0`, ...) is empty and marks the unversioned default payload.
//!
//! ## Comparison
//!
//! Missing components compare as zero, so `4` and `4.0` are equal. Every
//! empty tuple compares equal to `VersionTuple::empty()` and sorts before
//! every non-empty tuple.
//!
//! ## Deserialization
//!
//! Strings are parsed exactly. Numbers go through `f64`, so a fractional
//! number loses trailing zeros: `4.10` reads as `4.1`. Write such versions
//! as strings (`"4.10"`).

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

/// A version of up to four numeric components (major.minor.subminor.build)
#[derive(Debug, Clone, Copy, Default)]
pub struct VersionTuple {
    major: u32,
    minor: Option<u32>,
    subminor: Option<u32>,
    build: Option<u32>,
}

impl VersionTuple {
    /// The empty version (unversioned)
    pub const fn empty() -> Self {
        VersionTuple {
            major: 0,
            minor: None,
            subminor: None,
            build: None,
        }
    }

    /// Create a version with only a major component
    pub const fn new(major: u32) -> Self {
        VersionTuple {
            major,
            minor: None,
            subminor: None,
            build: None,
        }
    }

    /// Create a `major.minor` version
    pub const fn with_minor(major: u32, minor: u32) -> Self {
        VersionTuple {
            major,
            minor: Some(minor),
            subminor: None,
            build: None,
        }
    }

    /// Create a `major.minor.subminor` version
    pub const fn with_subminor(major: u32, minor: u32, subminor: u32) -> Self {
        VersionTuple {
            major,
            minor: Some(minor),
            subminor: Some(subminor),
            build: None,
        }
    }

    /// Create a `major.minor.subminor.build` version
    pub const fn with_build(major: u32, minor: u32, subminor: u32, build: u32) -> Self {
        VersionTuple {
            major,
            minor: Some(minor),
            subminor: Some(subminor),
            build: Some(build),
        }
    }

    /// Build a version from 1 to 4 components.
    ///
    /// Returns `None` for an empty slice or more than four components.
    pub fn from_components(components: &[u32]) -> Option<Self> {
        match *components {
            [major] => Some(Self::new(major)),
            [major, minor] => Some(Self::with_minor(major, minor)),
            [major, minor, subminor] => Some(Self::with_subminor(major, minor, subminor)),
            [major, minor, subminor, build] => {
                Some(Self::with_build(major, minor, subminor, build))
            }
            _ => None,
        }
    }

    /// Whether this is an empty (unversioned) tuple: every component is zero
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.sort_key() == (0, 0, 0, 0)
    }

    /// Major component
    #[inline]
    pub fn major(&self) -> u32 {
        self.major
    }

    /// Minor component, if present
    #[inline]
    pub fn minor(&self) -> Option<u32> {
        self.minor
    }

    /// Subminor component, if present
    #[inline]
    pub fn subminor(&self) -> Option<u32> {
        self.subminor
    }

    /// Build component, if present
    #[inline]
    pub fn build(&self) -> Option<u32> {
        self.build
    }

    /// Number of components that are present (1 to 4)
    pub fn component_count(&self) -> u8 {
        if self.build.is_some() {
            4
        } else if self.subminor.is_some() {
            3
        } else if self.minor.is_some() {
            2
        } else {
            1
        }
    }

    /// Present components in order, major first
    pub fn components(&self) -> Vec<u32> {
        let mut out = vec![self.major];
        out.extend(self.minor);
        out.extend(self.subminor);
        out.extend(self.build);
        out
    }

    fn sort_key(&self) -> (u32, u32, u32, u32) {
        (
            self.major,
            self.minor.unwrap_or(0),
            self.subminor.unwrap_or(0),
            self.build.unwrap_or(0),
        )
    }
}

impl PartialEq for VersionTuple {
    fn eq(&self, other: &Self) -> bool {
        self.sort_key() == other.sort_key()
    }
}

impl Eq for VersionTuple {}

impl Hash for VersionTuple {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.sort_key().hash(state);
    }
}

impl PartialOrd for VersionTuple {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for VersionTuple {
    fn cmp(&self, other: &Self) -> Ordering {
        self.sort_key().cmp(&other.sort_key())
    }
}

impl fmt::Display for VersionTuple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.major)?;
        for component in [self.minor, self.subminor, self.build].into_iter().flatten() {
            write!(f, ".{}", component)?;
        }
        Ok(())
    }
}

/// Error parsing a version string
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid version '{input}': expected 1 to 4 dot-separated integers")]
pub struct VersionParseError {
    /// The rejected input
    pub input: String,
}

impl FromStr for VersionTuple {
    type Err = VersionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || VersionParseError {
            input: s.to_string(),
        };
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(err());
        }
        let components = trimmed
            .split('.')
            .map(|piece| piece.parse::<u32>().map_err(|_| err()))
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_components(&components).ok_or_else(err)
    }
}

impl Serialize for VersionTuple {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for VersionTuple {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Text(String),
            Number(f64),
        }

        let text = match Repr::deserialize(deserializer)? {
            Repr::Text(text) => text,
            // `Version: 4.2` arrives as a number from most front ends;
            // trailing zeros of the fraction are already gone here
            Repr::Number(n) => n.to_string(),
        };
        text.parse().map_err(serde::de::Error::custom)
    }
}
