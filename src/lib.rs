//! skywatch: aircraft proximity proxy
//!
//! A small HTTP service that asks an aircraft-tracking provider for traffic
//! around a point, annotates each aircraft with its great-circle distance from
//! the caller and returns the list nearest first. Every client is held to an
//! hourly and a monthly request quota.
//!
//! ## Features
//!
//! - Haversine distance in nautical miles
//! - Multi-window quota with in-memory or Redis counters
//! - Stable nearest-first ordering that keeps unknown provider fields intact
//! - HTTP API + CLI interface
//!
//! ## Quick Start
//!
//! ```rust
//! use skywatch::coord::{haversine_nm, Coordinates};
//! use skywatch::proxy::enrich::enrich;
//! use serde_json::json;
//!
//! let jfk = Coordinates::new(40.6413, -73.7781);
//! let lga = Coordinates::new(40.7769, -73.8740);
//! println!("{:.1} nm", haversine_nm(jfk, lga));
//!
//! let sorted = enrich(jfk, vec![json!({"flight": "AB2"}), json!({"lat": 40.7, "lon": -73.8})]);
//! assert!(sorted[0].get("dist").is_some());
//! ```

pub mod cli;
pub mod config;
pub mod constants;
pub mod coord;
pub mod error;
pub mod format;
pub mod proxy;
pub mod quota;
pub mod server;
pub mod upstream;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export commonly used types
pub use config::Config;
pub use coord::Coordinates;
pub use error::{Error, Result};
pub use proxy::{PlanesQuery, PlanesResponse, ProxyError, ProxyHandler};
pub use quota::{ClientIdentity, Decision, QuotaGuard};
