// src/aggregate.rs

//! Result aggregation
//!
//! Flattens an investigation tree into the distinct list of packages used by
//! reports and the statistics store.

use crate::package::{InvestigationResult, PackageKey, PackageResult};
use std::collections::HashSet;

/// Distinct packages of a result tree, by case-insensitive name
///
/// Order: every root in caller order, then each root's dependencies in
/// depth-first pre-order. The first occurrence of a name wins.
pub fn flatten(result: &InvestigationResult) -> Vec<&PackageResult> {
    let mut seen: HashSet<PackageKey> = HashSet::new();
    let mut distinct = Vec::new();

    for root in &result.dependencies {
        if seen.insert(root.key()) {
            distinct.push(root);
        }
    }

    for root in &result.dependencies {
        // Explicit stack, children pushed in reverse to pop in declared order
        let mut stack: Vec<&PackageResult> = root.dependencies.iter().rev().collect();
        while let Some(package) = stack.pop() {
            if seen.insert(package.key()) {
                distinct.push(package);
            }
            stack.extend(package.dependencies.iter().rev());
        }
    }

    distinct
}
