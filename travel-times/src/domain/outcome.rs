//! Per-trip routing outcomes.

use std::fmt;

/// Duration text recorded for failed trips.
pub const ERROR_DURATION: &str = "Erreur";

/// Distance text recorded for failed trips.
pub const ERROR_DISTANCE: &str = "-";

/// Marker contained in every successful status summary.
///
/// Downstream spreadsheets filter successes with a substring match on it.
pub const SUCCESS_MARKER: &str = "OK";

/// How routing one trip ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TripStatus {
    /// Both the response and the origin/destination element were OK.
    Success { traffic_aware: bool },

    /// The service answered but found no route for this pair.
    RouteNotFound { reason: String },

    /// The service answered with a non-OK top-level status.
    ApiError { reason: String },

    /// The request never produced a usable answer (network, timeout,
    /// malformed departure time, undecodable body).
    TransportError { reason: String },
}

impl TripStatus {
    /// Whether this is a success.
    pub fn is_success(&self) -> bool {
        matches!(self, TripStatus::Success { .. })
    }

    /// The failure reason, if any.
    pub fn reason(&self) -> Option<&str> {
        match self {
            TripStatus::Success { .. } => None,
            TripStatus::RouteNotFound { reason }
            | TripStatus::ApiError { reason }
            | TripStatus::TransportError { reason } => Some(reason),
        }
    }
}

/// Human-readable status, as written to the `Statut` column.
impl fmt::Display for TripStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TripStatus::Success {
                traffic_aware: true,
            } => write!(f, "✅ {SUCCESS_MARKER} (avec trafic)"),
            TripStatus::Success {
                traffic_aware: false,
            } => write!(f, "✅ {SUCCESS_MARKER}"),
            TripStatus::RouteNotFound { reason } => write!(f, "❌ Trajet introuvable: {reason}"),
            TripStatus::ApiError { reason } => write!(f, "❌ Erreur API: {reason}"),
            TripStatus::TransportError { reason } => write!(f, "❌ {reason}"),
        }
    }
}

/// The result of routing one trip.
///
/// Created once per trip and never modified afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TripOutcome {
    duration_text: String,
    distance_text: String,
    status: TripStatus,
}

impl TripOutcome {
    /// A successful route.
    pub fn success(
        duration_text: impl Into<String>,
        distance_text: impl Into<String>,
        traffic_aware: bool,
    ) -> Self {
        Self {
            duration_text: duration_text.into(),
            distance_text: distance_text.into(),
            status: TripStatus::Success { traffic_aware },
        }
    }

    /// No route exists between origin and destination.
    pub fn route_not_found(reason: impl Into<String>) -> Self {
        Self::failure(TripStatus::RouteNotFound {
            reason: reason.into(),
        })
    }

    /// The service rejected the request.
    pub fn api_error(reason: impl Into<String>) -> Self {
        Self::failure(TripStatus::ApiError {
            reason: reason.into(),
        })
    }

    /// The request could not be carried out.
    pub fn transport_error(reason: impl Into<String>) -> Self {
        Self::failure(TripStatus::TransportError {
            reason: reason.into(),
        })
    }

    fn failure(status: TripStatus) -> Self {
        Self {
            duration_text: ERROR_DURATION.to_string(),
            distance_text: ERROR_DISTANCE.to_string(),
            status,
        }
    }

    pub fn duration_text(&self) -> &str {
        &self.duration_text
    }

    pub fn distance_text(&self) -> &str {
        &self.distance_text
    }

    pub fn status(&self) -> &TripStatus {
        &self.status
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}
