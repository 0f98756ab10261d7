//! Centralized constants for the skywatch crate
//!
//! This module consolidates constants that are used across multiple modules
//! to avoid duplication and ensure consistency.

/// Geographic constants
pub mod geo {
    /// Mean Earth radius in nautical miles
    pub const EARTH_RADIUS_NM: f64 = 3440.065;
}

/// External API endpoints
pub mod api {
    /// ADS-B Exchange on RapidAPI
    pub const ADSB_EXCHANGE_URL: &str = "https://adsbexchange-com1.p.rapidapi.com";

    /// Value sent in the `x-rapidapi-host` header
    pub const ADSB_EXCHANGE_HOST: &str = "adsbexchange-com1.p.rapidapi.com";

    /// Header carrying the RapidAPI key
    pub const RAPIDAPI_KEY_HEADER: &str = "x-rapidapi-key";

    /// Header carrying the RapidAPI host
    pub const RAPIDAPI_HOST_HEADER: &str = "x-rapidapi-host";
}

/// Quota window settings
pub mod quota {
    /// One hour
    pub const HOURLY_WINDOW_SECS: u64 = 3600;

    /// One calendar month, approximated as 730 hours
    pub const MONTHLY_WINDOW_SECS: u64 = 730 * 3600;

    /// Identity used when the peer address is not available
    pub const UNKNOWN_IDENTITY: &str = "unknown";
}

/// User-facing messages returned by the `/planes` endpoint
pub mod messages {
    pub const MISSING_COORDINATES: &str = "Please provide both 'lat' and 'lon' parameters";

    pub const RATE_LIMIT_ERROR: &str = "Rate limit exceeded";

    pub const RATE_LIMIT_MESSAGE: &str =
        "You have reached the maximum number of allowed requests. Please try again later.";

    pub const UPSTREAM_FAILED: &str = "Upstream request failed";
}
