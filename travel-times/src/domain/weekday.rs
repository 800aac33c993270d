//! Bilingual weekday names.

use chrono::Weekday;

/// French and English weekday names, Monday first.
const WEEKDAY_NAMES: [(&str, &str, Weekday); 7] = [
    ("lundi", "monday", Weekday::Mon),
    ("mardi", "tuesday", Weekday::Tue),
    ("mercredi", "wednesday", Weekday::Wed),
    ("jeudi", "thursday", Weekday::Thu),
    ("vendredi", "friday", Weekday::Fri),
    ("samedi", "saturday", Weekday::Sat),
    ("dimanche", "sunday", Weekday::Sun),
];

/// Look up a weekday by its French or English name.
///
/// Matching ignores case and surrounding whitespace. Returns `None` for
/// blank or unknown names.
///
/// # Examples
///
/// ```
/// use chrono::Weekday;
/// use travel_times::domain::parse_weekday;
///
/// assert_eq!(parse_weekday("Lundi"), Some(Weekday::Mon));
/// assert_eq!(parse_weekday(" WEDNESDAY "), Some(Weekday::Wed));
/// assert_eq!(parse_weekday("Funday"), None);
/// ```
pub fn parse_weekday(name: &str) -> Option<Weekday> {
    let name = name.trim().to_lowercase();
    if name.is_empty() {
        return None;
    }
    WEEKDAY_NAMES
        .iter()
        .find(|(fr, en, _)| *fr == name || *en == name)
        .map(|(_, _, day)| *day)
}
