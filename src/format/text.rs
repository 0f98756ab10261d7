//! Human-readable text output formatter

use crate::coord::Coordinates;
use crate::error::Result;
use crate::format::OutputFormatter;
use serde_json::Value;

/// Text formatter - one line per aircraft
pub struct TextFormatter;

/// Render a field for display, `-` when absent
fn field(record: &Value, key: &str) -> String {
    match record.get(key) {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Null) | None => "-".to_string(),
        Some(other) => other.to_string(),
    }
}

impl OutputFormatter for TextFormatter {
    fn name(&self) -> &str {
        "text"
    }

    fn description(&self) -> &str {
        "One aircraft per line, nearest first"
    }

    fn format(&self, center: Coordinates, aircraft: &[Value]) -> Result<String> {
        let mut output = String::new();

        output.push_str(&format!(
            "Aircraft near ({:.4}, {:.4}): {}\n\n",
            center.lat,
            center.lng,
            aircraft.len()
        ));
        output.push_str(&format!(
            "{:<10} {:<8} {:>9} {:>8}\n",
            "FLIGHT", "HEX", "DIST(nm)", "ALT(ft)"
        ));

        for record in aircraft {
            let dist = record
                .get("dist")
                .and_then(Value::as_f64)
                .map(|d| format!("{:.2}", d))
                .unwrap_or_else(|| "-".to_string());

            output.push_str(&format!(
                "{:<10} {:<8} {:>9} {:>8}\n",
                field(record, "flight"),
                field(record, "hex"),
                dist,
                field(record, "alt_baro"),
            ));
        }

        Ok(output)
    }
}
