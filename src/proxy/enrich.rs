//! Distance enrichment and ordering of aircraft records
//!
//! Records are kept as raw JSON so that provider fields we do not know about
//! pass through untouched.

use crate::coord::Coordinates;
use serde_json::Value;
use std::cmp::Ordering;

/// Field added to each record that has a position
pub const DIST_FIELD: &str = "dist";

/// Position of a record, if it has numeric `lat` and `lon` fields
pub fn position(record: &Value) -> Option<Coordinates> {
    let lat = record.get("lat")?.as_f64()?;
    let lon = record.get("lon")?.as_f64()?;
    Some(Coordinates::new(lat, lon))
}

/// Set `dist` (nautical miles from `origin`) on a positioned record
///
/// Returns the distance, or None when the record has no usable position.
pub fn annotate(origin: Coordinates, record: &mut Value) -> Option<f64> {
    let dist = origin.distance_to(position(record)?);
    record
        .as_object_mut()?
        .insert(DIST_FIELD.to_string(), Value::from(dist));
    Some(dist)
}

/// Ascending distance, records without one last
fn by_distance(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Annotate every record with its distance from `origin` and sort nearest first
///
/// The sort is stable: equal distances, and records without a position, keep
/// their input order.
pub fn enrich(origin: Coordinates, aircraft: Vec<Value>) -> Vec<Value> {
    let mut keyed: Vec<(Option<f64>, Value)> = aircraft
        .into_iter()
        .map(|mut record| (annotate(origin, &mut record), record))
        .collect();

    keyed.sort_by(|a, b| by_distance(a.0, b.0));

    keyed.into_iter().map(|(_, record)| record).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use serde_json::json;

    fn ids(records: &[Value]) -> Vec<i64> {
        records.iter().map(|r| r["id"].as_i64().unwrap()).collect()
    }

    #[test]
    fn test_position_requires_both_fields() {
        assert!(position(&json!({"lat": 1.0, "lon": 2.0})).is_some());
        assert!(position(&json!({"lat": 1.0})).is_none());
        assert!(position(&json!({"lon": 2.0})).is_none());
        assert!(position(&json!({"lat": "1.0", "lon": 2.0})).is_none());
        assert!(position(&json!("not an object")).is_none());
    }

    #[test]
    fn test_stable_order_for_ties_and_missing() {
        let origin = Coordinates::new(0.0, 0.0);
        // ids 1 and 3 sit at the same spot; 2 and 4 have no position
        let input = vec![
            json!({"id": 1, "lat": 0.0, "lon": 0.1}),
            json!({"id": 2}),
            json!({"id": 3, "lat": 0.0, "lon": 0.1}),
            json!({"id": 4}),
        ];

        let sorted = enrich(origin, input);

        assert_eq!(ids(&sorted), vec![1, 3, 2, 4]);
        assert!(sorted[2].get("dist").is_none());
        assert!(sorted[3].get("dist").is_none());
    }

    #[test]
    fn test_sorts_ascending() {
        let origin = Coordinates::new(40.0, -74.0);
        let input = vec![
            json!({"id": 1, "lat": 41.0, "lon": -74.0}),
            json!({"id": 2, "lat": 40.1, "lon": -74.0}),
            json!({"id": 3}),
            json!({"id": 4, "lat": 40.5, "lon": -74.0}),
        ];

        let sorted = enrich(origin, input);

        assert_eq!(ids(&sorted), vec![2, 4, 1, 3]);
        let dists: Vec<f64> = sorted[..3].iter().map(|r| r["dist"].as_f64().unwrap()).collect();
        assert!(dists.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_pass_through_fields_unchanged() {
        let origin = Coordinates::new(40.0, -74.0);
        let record = json!({
            "hex": "a1b2c3",
            "lat": 40.01,
            "lon": -74.0,
            "alt_baro": "ground",
            "nav_modes": ["autopilot", "tcas"],
            "emergency": null,
            "mlat": [],
            "gs": 123.4,
            "extra": {"nested": true}
        });

        let sorted = enrich(origin, vec![record.clone()]);
        let out = sorted[0].as_object().unwrap();

        for (key, value) in record.as_object().unwrap() {
            assert_eq!(&out[key], value, "field {} changed", key);
        }
        assert_abs_diff_eq!(out["dist"].as_f64().unwrap(), 0.6, epsilon = 0.01);
        assert_eq!(out.keys().last().map(String::as_str), Some("dist"));
    }

    #[test]
    fn test_non_object_entries_kept_last() {
        let origin = Coordinates::new(0.0, 0.0);
        let sorted = enrich(origin, vec![json!(7), json!({"lat": 0.0, "lon": 0.0})]);
        assert_eq!(sorted[0]["dist"], json!(0.0));
        assert_eq!(sorted[1], json!(7));
    }

    #[test]
    fn test_empty_input() {
        assert!(enrich(Coordinates::new(0.0, 0.0), Vec::new()).is_empty());
    }
}
