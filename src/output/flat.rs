// src/output/flat.rs

//! Flat listing formatter
//!
//! One line per distinct package: the name, three spaces, then a bracketed
//! label or the error text. Investigation targets print the bare name.

use crate::package::{InvestigationResult, PackageResult, SupportType};

/// Render the distinct packages of an investigation, one per line
pub fn format(result: &InvestigationResult) -> String {
    let mut out = String::new();
    for package in result.distinct_packages() {
        format_package(&mut out, package);
    }
    out
}

/// Label appended after a package name, if any
pub fn label(package: &PackageResult) -> Option<&str> {
    match package.support_type {
        SupportType::NotFound => Some("[Not Found]"),
        SupportType::Supported => Some("[Supported]"),
        SupportType::Unsupported => Some("[Unsupported]"),
        SupportType::KnownReplacementAvailable => Some("[Known Replacement Available]"),
        SupportType::InvestigationTarget => None,
        SupportType::Error => Some(package.error.as_deref().unwrap_or("Unknown error")),
    }
}

fn format_package(out: &mut String, package: &PackageResult) {
    out.push_str(&package.package_name);
    if let Some(label) = label(package) {
        out.push_str("   ");
        out.push_str(label);
    }
    out.push('\n');
}
