//! Schema version parsing and best-fit matching

use std::fmt;
use std::str::FromStr;

/// A MAJOR.MINOR.PATCH schema version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SchemaVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl SchemaVersion {
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Whether two versions share MAJOR.MINOR.
    pub fn same_minor(&self, other: &SchemaVersion) -> bool {
        self.major == other.major && self.minor == other.minor
    }
}

impl fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Declared version string is not MAJOR.MINOR.PATCH
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidVersion(pub String);

impl FromStr for SchemaVersion {
    type Err = InvalidVersion;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split('.');
        let parse = |part: Option<&str>| -> Result<u32, InvalidVersion> {
            let part = part.ok_or_else(|| InvalidVersion(s.to_string()))?;
            if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                return Err(InvalidVersion(s.to_string()));
            }
            part.parse().map_err(|_| InvalidVersion(s.to_string()))
        };

        let major = parse(parts.next())?;
        let minor = parse(parts.next())?;
        let patch = parse(parts.next())?;
        if parts.next().is_some() {
            return Err(InvalidVersion(s.to_string()));
        }

        Ok(SchemaVersion::new(major, minor, patch))
    }
}

/// Find the latest supported version sharing MAJOR.MINOR with the declared
/// version. Used when a report declares a PATCH level that was never
/// vendored: validation proceeds against the closest schema we have.
pub fn latest_patch_match(
    declared: &SchemaVersion,
    supported: &[SchemaVersion],
) -> Option<SchemaVersion> {
    supported
        .iter()
        .filter(|candidate| candidate.same_minor(declared))
        .max()
        .copied()
}
