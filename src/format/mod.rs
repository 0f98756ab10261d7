//! Output formatters
//!
//! Renders nearby-aircraft results for the command line.

pub mod json;
pub mod text;

use crate::coord::Coordinates;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Information about an output format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormatInfo {
    /// Format name
    pub name: String,
    /// Format description
    pub description: String,
}

/// Trait for output formatters
pub trait OutputFormatter: Send + Sync {
    /// Get the format name
    fn name(&self) -> &str;

    /// Get the format description
    fn description(&self) -> &str;

    /// Format an enriched, sorted aircraft list
    ///
    /// # Arguments
    /// * `center` - Point the search was made around
    /// * `aircraft` - Records as returned by the proxy pipeline
    fn format(&self, center: Coordinates, aircraft: &[Value]) -> Result<String>;
}

/// Get a formatter by name
pub fn get_formatter(name: &str) -> Option<Box<dyn OutputFormatter>> {
    match name.to_lowercase().as_str() {
        "json" => Some(Box::new(json::JsonFormatter)),
        "text" => Some(Box::new(text::TextFormatter)),
        _ => None,
    }
}

/// List all available formatters
pub fn available_formats() -> Vec<FormatInfo> {
    vec![
        FormatInfo {
            name: "json".to_string(),
            description: "The /planes response body".to_string(),
        },
        FormatInfo {
            name: "text".to_string(),
            description: "One aircraft per line, nearest first".to_string(),
        },
    ]
}
