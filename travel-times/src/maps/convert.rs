//! Classification of Distance Matrix responses into trip outcomes.

use crate::domain::TripOutcome;

use super::types::DistanceMatrixResponse;

const STATUS_OK: &str = "OK";

/// Map a decoded response to the outcome of its trip.
///
/// - top-level status not OK: API error carrying the status (and the
///   service's explanation, when given)
/// - element status not OK: route not found carrying the element status
/// - both OK: success, preferring the traffic-adjusted duration when the
///   response carries one; the distance is always the baseline distance
///
/// A response that claims success but lacks the fields needed to report it
/// is treated as a transport error.
pub fn classify_response(response: &DistanceMatrixResponse) -> TripOutcome {
    if response.status != STATUS_OK {
        let reason = match response.error_message.as_deref() {
            Some(msg) if !msg.is_empty() => format!("{} ({msg})", response.status),
            _ => response.status.clone(),
        };
        return TripOutcome::api_error(reason);
    }

    let Some(element) = response.first_element() else {
        return TripOutcome::transport_error("réponse incomplète: aucun trajet renvoyé");
    };

    if element.status != STATUS_OK {
        return TripOutcome::route_not_found(element.status.clone());
    }

    let (Some(duration), Some(distance)) = (&element.duration, &element.distance) else {
        return TripOutcome::transport_error("réponse incomplète: durée ou distance manquante");
    };

    match &element.duration_in_traffic {
        Some(in_traffic) => TripOutcome::success(&in_traffic.text, &distance.text, true),
        None => TripOutcome::success(&duration.text, &distance.text, false),
    }
}
