//! Shared small types used throughout the Nebula workspace.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A semantic version for node/action type compatibility checks.
///
/// Newtype around [`semver::Version`] kept here (rather than re-exporting
/// `semver` directly) so call sites depend on `nebula-core` instead of
/// pinning a `semver` version themselves.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version(semver::Version);

impl Version {
    /// Construct a version from its major/minor/patch components.
    #[must_use]
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self(semver::Version::new(major, minor, patch))
    }

    /// Parse a version from its `major.minor.patch[-pre][+build]` string
    /// form.
    pub fn parse(s: &str) -> Result<Self, semver::Error> {
        Ok(Self(semver::Version::parse(s)?))
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Version {
    type Err = semver::Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for Version {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Version {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// Well-known integration provider identities (spec §4.3's closed set).
///
/// Kept as a string newtype rather than a closed enum at this layer: the
/// *set* of supported providers is closed at the OAuth2 handler / adapter
/// registry level (`nebula-credential-builtin`), but `nebula-core` has no
/// business knowing about providers — it only needs a comparable,
/// loggable identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProviderId(String);

impl ProviderId {
    /// Construct a provider id from its canonical lowercase name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The provider's canonical name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ProviderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProviderId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_id_display() {
        let p = ProviderId::new("github");
        assert_eq!(p.to_string(), "github");
        assert_eq!(p.as_str(), "github");
    }

    #[test]
    fn version_new_displays_dotted() {
        assert_eq!(Version::new(0, 1, 0).to_string(), "0.1.0");
    }

    #[test]
    fn version_parse_roundtrips() {
        let v = Version::parse("1.2.3").unwrap();
        assert_eq!(v, Version::new(1, 2, 3));
    }

    #[test]
    fn version_serde_roundtrip() {
        let v = Version::new(2, 0, 0);
        let json = serde_json::to_string(&v).unwrap();
        assert_eq!(json, "\"2.0.0\"");
        let back: Version = serde_json::from_str(&json).unwrap();
        assert_eq!(back, v);
    }
}
