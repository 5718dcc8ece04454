// src/output/mod.rs

//! Report rendering for investigation results

pub mod flat;

use crate::error::{Error, Result};
use crate::package::InvestigationResult;
use std::str::FromStr;

/// Report format selectable on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Distinct packages, one per line
    Flat,
    /// The full result tree as JSON
    Json,
    /// Distinct packages as a JSON array
    JsonFlat,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "flat" | "text" => Ok(OutputFormat::Flat),
            "json" => Ok(OutputFormat::Json),
            "json-flat" => Ok(OutputFormat::JsonFlat),
            _ => Err(format!("Unknown output format: {s} (expected flat, json or json-flat)")),
        }
    }
}

/// Render a result in the requested format
pub fn render(result: &InvestigationResult, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Flat => Ok(flat::format(result)),
        OutputFormat::Json => serde_json::to_string_pretty(result)
            .map_err(|e| Error::ParseError(format!("Failed to serialize result: {e}"))),
        OutputFormat::JsonFlat => {
            // Children are already listed separately in the flat form
            let distinct: Vec<serde_json::Value> = result
                .distinct_packages()
                .into_iter()
                .map(|package| {
                    serde_json::json!({
                        "package_name": package.package_name,
                        "support_type": package.support_type,
                        "error": package.error,
                        "replacement": package.replacement,
                    })
                })
                .collect();
            serde_json::to_string_pretty(&distinct)
                .map_err(|e| Error::ParseError(format!("Failed to serialize result: {e}")))
        }
    }
}
