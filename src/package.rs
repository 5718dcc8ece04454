// src/package.rs

//! Investigation result model
//!
//! An investigation produces a tree of [`PackageResult`] nodes rooted in an
//! [`InvestigationResult`]. Package names compare case-insensitively; the
//! [`PackageKey`] type carries the normalized form used for lookups.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Support classification of a package for the target platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SupportType {
    /// The registry has no record of the package
    NotFound,
    /// The package supports the target platform
    Supported,
    /// The package does not support the target platform
    Unsupported,
    /// Unsupported, but a substitute package is known
    KnownReplacementAvailable,
    /// A root of the investigation with no other classification
    InvestigationTarget,
    /// The registry lookup failed
    Error,
}

impl SupportType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SupportType::NotFound => "not_found",
            SupportType::Supported => "supported",
            SupportType::Unsupported => "unsupported",
            SupportType::KnownReplacementAvailable => "known_replacement_available",
            SupportType::InvestigationTarget => "investigation_target",
            SupportType::Error => "error",
        }
    }

    /// Whether the classification has a resolvable dependency list
    pub fn has_dependencies(&self) -> bool {
        !matches!(self, SupportType::NotFound | SupportType::Error)
    }

    /// Whether the classification is a last-known-good value worth storing
    ///
    /// `Error` is transient and `InvestigationTarget` is a display marker,
    /// neither may replace a stored classification.
    pub fn is_persistable(&self) -> bool {
        !matches!(self, SupportType::Error | SupportType::InvestigationTarget)
    }
}

impl fmt::Display for SupportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SupportType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "not_found" => Ok(SupportType::NotFound),
            "supported" => Ok(SupportType::Supported),
            "unsupported" => Ok(SupportType::Unsupported),
            "known_replacement_available" => Ok(SupportType::KnownReplacementAvailable),
            "investigation_target" => Ok(SupportType::InvestigationTarget),
            "error" => Ok(SupportType::Error),
            _ => Err(format!("Invalid support type: {s}")),
        }
    }
}

/// Case-insensitive identity of a package name
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PackageKey(String);

impl PackageKey {
    pub fn new(name: &str) -> Self {
        Self(name.trim().to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PackageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PackageKey {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// Outcome of investigating a single package, with its dependency subtree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageResult {
    pub package_name: String,
    pub support_type: SupportType,
    /// Failure message, only set when `support_type` is `Error`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Substitute package name, when one is known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replacement: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<PackageResult>,
}

impl PackageResult {
    /// Create a leaf result with the given classification
    pub fn new(package_name: impl Into<String>, support_type: SupportType) -> Self {
        Self {
            package_name: package_name.into(),
            support_type,
            error: None,
            replacement: None,
            dependencies: Vec::new(),
        }
    }

    /// Create an `Error`-classified leaf
    pub fn failed(package_name: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Self::new(package_name, SupportType::Error)
        }
    }

    pub fn key(&self) -> PackageKey {
        PackageKey::new(&self.package_name)
    }

    pub fn was_successful(&self) -> bool {
        self.support_type != SupportType::Error
    }
}

/// Result tree of one investigation run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvestigationResult {
    pub label: String,
    /// One entry per requested root, in caller order
    pub dependencies: Vec<PackageResult>,
}

impl InvestigationResult {
    pub fn new(label: impl Into<String>, dependencies: Vec<PackageResult>) -> Self {
        Self {
            label: label.into(),
            dependencies,
        }
    }

    /// Find the root-level result for a package name
    pub fn root(&self, package_name: &str) -> Option<&PackageResult> {
        let key = PackageKey::new(package_name);
        self.dependencies.iter().find(|result| result.key() == key)
    }

    /// Distinct packages of the whole tree, see [`crate::aggregate::flatten`]
    pub fn distinct_packages(&self) -> Vec<&PackageResult> {
        crate::aggregate::flatten(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_support_type_round_trips_through_str() {
        for support_type in [
            SupportType::NotFound,
            SupportType::Supported,
            SupportType::Unsupported,
            SupportType::KnownReplacementAvailable,
            SupportType::InvestigationTarget,
            SupportType::Error,
        ] {
            assert_eq!(support_type.as_str().parse::<SupportType>(), Ok(support_type));
        }
        assert!("bogus".parse::<SupportType>().is_err());
    }

    #[test]
    fn test_package_key_ignores_case_and_whitespace() {
        assert_eq!(PackageKey::new("Newtonsoft.Json"), PackageKey::new(" newtonsoft.json "));
        assert_ne!(PackageKey::new("a"), PackageKey::new("b"));
    }

    #[test]
    fn test_persistable_and_dependency_flags() {
        assert!(SupportType::Supported.is_persistable());
        assert!(SupportType::NotFound.is_persistable());
        assert!(!SupportType::Error.is_persistable());
        assert!(!SupportType::InvestigationTarget.is_persistable());

        assert!(SupportType::Unsupported.has_dependencies());
        assert!(!SupportType::NotFound.has_dependencies());
        assert!(!SupportType::Error.has_dependencies());
    }

    #[test]
    fn test_root_lookup_is_case_insensitive() {
        let result = InvestigationResult::new(
            "test",
            vec![PackageResult::new("Serilog", SupportType::Supported)],
        );
        assert!(result.root("serilog").is_some());
        assert!(result.root("nlog").is_none());
    }

    #[test]
    fn test_failed_result_carries_message() {
        let result = PackageResult::failed("Foo", "timeout");
        assert_eq!(result.support_type, SupportType::Error);
        assert_eq!(result.error.as_deref(), Some("timeout"));
        assert!(!result.was_successful());
    }
}
