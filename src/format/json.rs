//! JSON output formatter

use crate::coord::Coordinates;
use crate::error::Result;
use crate::format::OutputFormatter;
use serde_json::{json, Value};

/// JSON formatter - same shape as the `/planes` response, pretty-printed
pub struct JsonFormatter;

impl OutputFormatter for JsonFormatter {
    fn name(&self) -> &str {
        "json"
    }

    fn description(&self) -> &str {
        "The /planes response body"
    }

    fn format(&self, _center: Coordinates, aircraft: &[Value]) -> Result<String> {
        Ok(serde_json::to_string_pretty(&json!({ "ac": aircraft }))?)
    }
}
