//! Transport mode labels.
//!
//! Spreadsheets carry a free-text French label (`VOITURE`, `TRANSPORTS`,
//! `VELO`, `MARCHE`). The routing service only understands four canonical
//! identifiers, so every label is mapped onto one of them.

use std::fmt;

/// A canonical transport mode understood by the routing service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TravelMode {
    #[default]
    Driving,
    Transit,
    Bicycling,
    Walking,
}

impl TravelMode {
    /// All canonical modes.
    pub const ALL: [TravelMode; 4] = [
        TravelMode::Driving,
        TravelMode::Transit,
        TravelMode::Bicycling,
        TravelMode::Walking,
    ];

    /// Match a spreadsheet label, ignoring case.
    ///
    /// Returns `None` for labels outside the fixed table. Surrounding
    /// whitespace is significant: `" VELO"` is not recognized.
    ///
    /// # Examples
    ///
    /// ```
    /// use travel_times::domain::TravelMode;
    ///
    /// assert_eq!(TravelMode::recognize("velo"), Some(TravelMode::Bicycling));
    /// assert_eq!(TravelMode::recognize("BATEAU"), None);
    /// ```
    pub fn recognize(label: &str) -> Option<Self> {
        match label.to_uppercase().as_str() {
            "VOITURE" => Some(TravelMode::Driving),
            "TRANSPORTS" => Some(TravelMode::Transit),
            "VELO" => Some(TravelMode::Bicycling),
            "MARCHE" => Some(TravelMode::Walking),
            _ => None,
        }
    }

    /// Map any label to a canonical mode, falling back to driving.
    ///
    /// This never fails: unknown labels silently resolve to
    /// [`TravelMode::Driving`].
    pub fn from_label(label: &str) -> Self {
        Self::recognize(label).unwrap_or_default()
    }

    /// The identifier sent to the routing service.
    pub fn as_api_str(&self) -> &'static str {
        match self {
            TravelMode::Driving => "driving",
            TravelMode::Transit => "transit",
            TravelMode::Bicycling => "bicycling",
            TravelMode::Walking => "walking",
        }
    }

    /// Whether the routing service can apply a traffic model to this mode.
    pub fn supports_traffic(&self) -> bool {
        matches!(self, TravelMode::Driving)
    }
}

impl fmt::Display for TravelMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_api_str())
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn normalization_is_total(label in ".*") {
            let mode = TravelMode::from_label(&label);
            prop_assert!(TravelMode::ALL.contains(&mode));
        }

        #[test]
        fn normalization_ignores_case(label in "[a-zA-Z]{0,12}") {
            prop_assert_eq!(
                TravelMode::from_label(&label.to_lowercase()),
                TravelMode::from_label(&label.to_uppercase())
            );
        }

        #[test]
        fn unrecognized_means_driving(label in "[a-zA-Z ]{0,12}") {
            if TravelMode::recognize(&label).is_none() {
                prop_assert_eq!(TravelMode::from_label(&label), TravelMode::Driving);
            }
        }
    }
}
