//! Distance Matrix API response DTOs.
//!
//! These types map directly to the Distance Matrix JSON response. Fields
//! are `Option` or defaulted because the service omits them rather than
//! sending nulls (durations and distances are absent on failed elements,
//! `duration_in_traffic` only appears for traffic-aware driving queries).

use serde::Deserialize;

/// Top-level response of a distance matrix request.
#[derive(Debug, Clone, Deserialize)]
pub struct DistanceMatrixResponse {
    /// Overall status ("OK", "REQUEST_DENIED", "OVER_QUERY_LIMIT", ...).
    pub status: String,

    /// Explanation accompanying a non-OK status.
    pub error_message: Option<String>,

    /// Origins as geocoded by the service.
    #[serde(default)]
    pub origin_addresses: Vec<String>,

    /// Destinations as geocoded by the service.
    #[serde(default)]
    pub destination_addresses: Vec<String>,

    /// One row per origin.
    #[serde(default)]
    pub rows: Vec<MatrixRow>,
}

impl DistanceMatrixResponse {
    /// The element for the first origin and first destination.
    ///
    /// Trips are always sent as a single pair, so this is the only element.
    pub fn first_element(&self) -> Option<&MatrixElement> {
        self.rows.first()?.elements.first()
    }
}

/// One origin's results, one element per destination.
#[derive(Debug, Clone, Deserialize)]
pub struct MatrixRow {
    #[serde(default)]
    pub elements: Vec<MatrixElement>,
}

/// Result for a single origin/destination pair.
#[derive(Debug, Clone, Deserialize)]
pub struct MatrixElement {
    /// Element status ("OK", "NOT_FOUND", "ZERO_RESULTS", ...).
    pub status: String,

    /// Baseline travel time.
    pub duration: Option<TextValue>,

    /// Travel distance.
    pub distance: Option<TextValue>,

    /// Travel time under predicted traffic.
    pub duration_in_traffic: Option<TextValue>,
}

/// A localized text with its underlying numeric value.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TextValue {
    /// Human-readable value, localized per the request language.
    pub text: String,

    /// Seconds for durations, metres for distances.
    #[serde(default)]
    pub value: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_traffic_response() {
        let json = r#"{
            "destination_addresses": ["Champ de Mars, 5 Av. Anatole France, 75007 Paris, France"],
            "origin_addresses": ["10 Rue de Rivoli, 75004 Paris, France"],
            "rows": [{
                "elements": [{
                    "distance": {"text": "5,6 km", "value": 5623},
                    "duration": {"text": "19 minutes", "value": 1134},
                    "duration_in_traffic": {"text": "24 minutes", "value": 1452},
                    "status": "OK"
                }]
            }],
            "status": "OK"
        }"#;

        let response: DistanceMatrixResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.status, "OK");
        assert_eq!(response.origin_addresses.len(), 1);

        let element = response.first_element().unwrap();
        assert_eq!(element.status, "OK");
        assert_eq!(element.distance.as_ref().unwrap().value, 5623);
        assert_eq!(
            element.duration_in_traffic.as_ref().unwrap().text,
            "24 minutes"
        );
    }

    #[test]
    fn deserialize_denied_response() {
        let json = r#"{
            "destination_addresses": [],
            "origin_addresses": [],
            "rows": [],
            "status": "REQUEST_DENIED",
            "error_message": "The provided API key is invalid."
        }"#;

        let response: DistanceMatrixResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.status, "REQUEST_DENIED");
        assert_eq!(
            response.error_message.as_deref(),
            Some("The provided API key is invalid.")
        );
        assert!(response.first_element().is_none());
    }

    #[test]
    fn deserialize_minimal_response() {
        let response: DistanceMatrixResponse =
            serde_json::from_str(r#"{"status": "INVALID_REQUEST"}"#).unwrap();
        assert!(response.rows.is_empty());
        assert!(response.error_message.is_none());
    }

    #[test]
    fn deserialize_failed_element() {
        let json = r#"{"status": "OK", "rows": [{"elements": [{"status": "ZERO_RESULTS"}]}]}"#;
        let response: DistanceMatrixResponse = serde_json::from_str(json).unwrap();
        let element = response.first_element().unwrap();
        assert_eq!(element.status, "ZERO_RESULTS");
        assert!(element.duration.is_none());
        assert!(element.distance.is_none());
    }
}
