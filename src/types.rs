//! Common types and enums for geotrim.

use std::fmt;

/// Status codes returned by the geocoding service.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GeocodeStatus {
    /// At least one location was found
    Ok,
    /// Well-formed query that matched nothing
    ZeroResults,
    /// Billing or daily quota problem
    OverDailyLimit,
    /// Request rate exceeded
    OverQueryLimit,
    /// Key rejected or API not enabled
    RequestDenied,
    /// Query missing or malformed
    InvalidRequest,
    /// Server-side error, may succeed on retry
    UnknownError,
    /// Any status code not listed above
    Other(String),
}

impl GeocodeStatus {
    /// Wire representation of the status.
    pub fn as_str(&self) -> &str {
        match self {
            GeocodeStatus::Ok => "OK",
            GeocodeStatus::ZeroResults => "ZERO_RESULTS",
            GeocodeStatus::OverDailyLimit => "OVER_DAILY_LIMIT",
            GeocodeStatus::OverQueryLimit => "OVER_QUERY_LIMIT",
            GeocodeStatus::RequestDenied => "REQUEST_DENIED",
            GeocodeStatus::InvalidRequest => "INVALID_REQUEST",
            GeocodeStatus::UnknownError => "UNKNOWN_ERROR",
            GeocodeStatus::Other(code) => code,
        }
    }

    /// Parse a wire status code. Unknown codes are kept verbatim.
    pub fn from_code(code: &str) -> Self {
        match code {
            "OK" => GeocodeStatus::Ok,
            "ZERO_RESULTS" => GeocodeStatus::ZeroResults,
            "OVER_DAILY_LIMIT" => GeocodeStatus::OverDailyLimit,
            "OVER_QUERY_LIMIT" => GeocodeStatus::OverQueryLimit,
            "REQUEST_DENIED" => GeocodeStatus::RequestDenied,
            "INVALID_REQUEST" => GeocodeStatus::InvalidRequest,
            "UNKNOWN_ERROR" => GeocodeStatus::UnknownError,
            other => GeocodeStatus::Other(other.to_string()),
        }
    }

    /// Whether the status should stop truncation for the current address.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, GeocodeStatus::Ok | GeocodeStatus::ZeroResults)
    }
}

impl fmt::Display for GeocodeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    /// Latitude
    pub lat: f64,
    /// Longitude
    pub lng: f64,
}

impl Coordinates {
    /// Create a new coordinate pair.
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.lat, self.lng)
    }
}

/// Outcome of a single geocoding query.
#[derive(Debug, Clone, PartialEq)]
pub struct GeocodeResult {
    /// Location of the first result, if any
    pub coordinates: Option<Coordinates>,
    /// Status reported by the service
    pub status: GeocodeStatus,
}

impl GeocodeResult {
    /// A successful match at the given location.
    pub fn found(lat: f64, lng: f64) -> Self {
        Self {
            coordinates: Some(Coordinates::new(lat, lng)),
            status: GeocodeStatus::Ok,
        }
    }

    /// A result carrying only a status and no location.
    pub fn status_only(status: GeocodeStatus) -> Self {
        Self {
            coordinates: None,
            status,
        }
    }

    /// Whether the query produced a usable location.
    pub fn is_match(&self) -> bool {
        self.status == GeocodeStatus::Ok && self.coordinates.is_some()
    }
}
