// src/policy.rs

//! Classification policy
//!
//! Turns a registry lookup outcome into a [`SupportType`]. Rules, first
//! match wins:
//!
//! 1. lookup failed: `Error`
//! 2. not in the registry: `NotFound`
//! 3. curated replacement list or registry replacement hint:
//!    `KnownReplacementAvailable`
//! 4. curated unsupported list: `Unsupported`
//! 5. curated supported list or registry-asserted support: `Supported`
//! 6. investigation root: `InvestigationTarget`
//! 7. otherwise: `Unsupported`
//!
//! Curated lists always win over what the registry reports.

use crate::package::{PackageKey, SupportType};
use crate::registry::LookupOutcome;
use serde::Deserialize;
use std::collections::{HashMap, HashSet};

/// Curated package lists, as read from the `[policy]` config section
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PolicyConfig {
    /// Packages known to support the target platform
    #[serde(default)]
    pub supported: Vec<String>,

    /// Packages known not to support it, with no replacement
    #[serde(default)]
    pub unsupported: Vec<String>,

    /// Unsupported packages with a known substitute (name -> replacement)
    ///
    /// An empty replacement means "a replacement exists" without naming it.
    #[serde(default)]
    pub known_replacements: HashMap<String, String>,
}

/// Result of classifying one package
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub support_type: SupportType,
    pub error: Option<String>,
    pub replacement: Option<String>,
}

impl Classification {
    fn of(support_type: SupportType) -> Self {
        Self {
            support_type,
            error: None,
            replacement: None,
        }
    }
}

/// Pure classifier over the curated lists
#[derive(Debug, Clone, Default)]
pub struct ClassificationPolicy {
    supported: HashSet<PackageKey>,
    unsupported: HashSet<PackageKey>,
    replacements: HashMap<PackageKey, Option<String>>,
}

impl ClassificationPolicy {
    pub fn new(config: &PolicyConfig) -> Self {
        let replacements = config
            .known_replacements
            .iter()
            .map(|(name, replacement)| {
                let replacement = replacement.trim();
                let replacement = (!replacement.is_empty()).then(|| replacement.to_string());
                (PackageKey::new(name), replacement)
            })
            .collect();

        Self {
            supported: config.supported.iter().map(|n| PackageKey::new(n)).collect(),
            unsupported: config.unsupported.iter().map(|n| PackageKey::new(n)).collect(),
            replacements,
        }
    }

    /// Classify a package from its lookup outcome
    pub fn classify(&self, name: &str, outcome: &LookupOutcome, is_root: bool) -> Classification {
        let metadata = match outcome {
            LookupOutcome::Failed(message) => {
                return Classification {
                    support_type: SupportType::Error,
                    error: Some(message.clone()),
                    replacement: None,
                };
            }
            LookupOutcome::NotFound => return Classification::of(SupportType::NotFound),
            LookupOutcome::Found(metadata) => metadata,
        };

        let key = PackageKey::new(name);

        if let Some(curated) = self.replacements.get(&key) {
            return Classification {
                replacement: curated.clone().or_else(|| metadata.replacement.clone()),
                ..Classification::of(SupportType::KnownReplacementAvailable)
            };
        }
        if let Some(hint) = &metadata.replacement {
            return Classification {
                replacement: Some(hint.clone()),
                ..Classification::of(SupportType::KnownReplacementAvailable)
            };
        }

        if self.unsupported.contains(&key) {
            return Classification::of(SupportType::Unsupported);
        }

        if self.supported.contains(&key) || metadata.supports_target {
            return Classification::of(SupportType::Supported);
        }

        if is_root {
            return Classification::of(SupportType::InvestigationTarget);
        }

        Classification::of(SupportType::Unsupported)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::PackageMetadata;

    fn policy() -> ClassificationPolicy {
        ClassificationPolicy::new(&PolicyConfig {
            supported: vec!["Curated.Good".to_string()],
            unsupported: vec!["Curated.Bad".to_string()],
            known_replacements: HashMap::from([
                ("Old.Http".to_string(), "New.Http".to_string()),
                ("Old.Unnamed".to_string(), String::new()),
            ]),
        })
    }

    fn found(name: &str) -> LookupOutcome {
        LookupOutcome::Found(PackageMetadata::new(name))
    }

    #[test]
    fn test_error_wins_over_everything() {
        let c = policy().classify("Old.Http", &LookupOutcome::Failed("boom".into()), true);
        assert_eq!(c.support_type, SupportType::Error);
        assert_eq!(c.error.as_deref(), Some("boom"));
    }

    #[test]
    fn test_not_found_wins_over_curated_lists() {
        let c = policy().classify("Curated.Good", &LookupOutcome::NotFound, false);
        assert_eq!(c.support_type, SupportType::NotFound);
        assert_eq!(c.error, None);
    }

    #[test]
    fn test_curated_replacement() {
        let c = policy().classify("old.http", &found("Old.Http"), false);
        assert_eq!(c.support_type, SupportType::KnownReplacementAvailable);
        assert_eq!(c.replacement.as_deref(), Some("New.Http"));

        let c = policy().classify("Old.Unnamed", &found("Old.Unnamed"), false);
        assert_eq!(c.support_type, SupportType::KnownReplacementAvailable);
        assert_eq!(c.replacement, None);
    }

    #[test]
    fn test_registry_replacement_hint() {
        let outcome = LookupOutcome::Found(
            PackageMetadata::new("Legacy").supported().with_replacement("Modern"),
        );
        let c = policy().classify("Legacy", &outcome, false);
        assert_eq!(c.support_type, SupportType::KnownReplacementAvailable);
        assert_eq!(c.replacement.as_deref(), Some("Modern"));
    }

    #[test]
    fn test_curated_unsupported_beats_registry_support() {
        let outcome = LookupOutcome::Found(PackageMetadata::new("Curated.Bad").supported());
        let c = policy().classify("Curated.Bad", &outcome, true);
        assert_eq!(c.support_type, SupportType::Unsupported);
    }

    #[test]
    fn test_supported_by_list_or_registry() {
        let p = policy();
        assert_eq!(
            p.classify("Curated.Good", &found("Curated.Good"), false).support_type,
            SupportType::Supported
        );
        let outcome = LookupOutcome::Found(PackageMetadata::new("Asserted").supported());
        assert_eq!(
            p.classify("Asserted", &outcome, true).support_type,
            SupportType::Supported
        );
    }

    #[test]
    fn test_unclassified_root_is_investigation_target() {
        let p = policy();
        assert_eq!(
            p.classify("MyApp", &found("MyApp"), true).support_type,
            SupportType::InvestigationTarget
        );
        assert_eq!(
            p.classify("MyApp", &found("MyApp"), false).support_type,
            SupportType::Unsupported
        );
    }
}
