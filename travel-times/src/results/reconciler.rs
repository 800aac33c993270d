//! Accumulation of per-trip results.

use crate::domain::{TripOutcome, TripRequest};
use crate::input::TripRow;

use super::preview::PreviewRow;

/// A completed trip: the input row plus its outcome.
///
/// Never modified once recorded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultRow {
    /// 1-based position in the input file.
    pub row: usize,
    /// Raw input values, aligned with the input header.
    pub fields: Vec<String>,
    pub request: TripRequest,
    pub outcome: TripOutcome,
}

impl ResultRow {
    /// Pair an input row with its outcome.
    pub fn new(input: TripRow, outcome: TripOutcome) -> Self {
        Self {
            row: input.row,
            fields: input.fields,
            request: input.request,
            outcome,
        }
    }
}

/// Totals for a batch so far.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    pub total: usize,
    pub success: usize,
    pub errors: usize,
}

/// Ordered collection of completed trips with running counts.
///
/// Rows are kept in the order they are recorded, which is the input file
/// order. Only whole trips are ever recorded.
#[derive(Debug, Clone, Default)]
pub struct Reconciler {
    headers: Vec<String>,
    rows: Vec<ResultRow>,
    success_count: usize,
}

impl Reconciler {
    /// Create an empty reconciler for a file with the given header.
    pub fn new(headers: Vec<String>) -> Self {
        Self {
            headers,
            rows: Vec::new(),
            success_count: 0,
        }
    }

    /// Append a completed trip.
    pub fn record(&mut self, row: ResultRow) -> &ResultRow {
        if row.outcome.is_success() {
            self.success_count += 1;
        }
        self.rows.push(row);
        &self.rows[self.rows.len() - 1]
    }

    /// Input column names.
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Recorded rows, in input order.
    pub fn rows(&self) -> &[ResultRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows whose outcome is a success.
    pub fn success_count(&self) -> usize {
        self.success_count
    }

    /// Rows whose outcome is anything but a success.
    pub fn error_count(&self) -> usize {
        self.rows.len() - self.success_count
    }

    pub fn summary(&self) -> Summary {
        Summary {
            total: self.len(),
            success: self.success_count(),
            errors: self.error_count(),
        }
    }

    /// Failed rows, in input order.
    pub fn failures(&self) -> impl Iterator<Item = &ResultRow> {
        self.rows.iter().filter(|r| !r.outcome.is_success())
    }

    /// Display rows with long texts truncated.
    pub fn preview(&self) -> Vec<PreviewRow> {
        self.rows.iter().map(PreviewRow::from_result).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(n: usize, outcome: TripOutcome) -> ResultRow {
        ResultRow {
            row: n,
            fields: vec![format!("O{n}"), format!("D{n}"), "VOITURE".into()],
            request: TripRequest::new(format!("O{n}"), format!("D{n}"), "VOITURE"),
            outcome,
        }
    }

    #[test]
    fn counts_successes_and_errors() {
        let mut reconciler = Reconciler::new(vec!["Origine".into()]);
        reconciler.record(row(1, TripOutcome::success("5 min", "1 km", false)));
        reconciler.record(row(2, TripOutcome::api_error("REQUEST_DENIED")));
        reconciler.record(row(3, TripOutcome::success("7 min", "2 km", true)));
        reconciler.record(row(4, TripOutcome::transport_error("timeout")));
        reconciler.record(row(5, TripOutcome::route_not_found("NOT_FOUND")));

        assert_eq!(
            reconciler.summary(),
            Summary {
                total: 5,
                success: 2,
                errors: 3
            }
        );
    }

    #[test]
    fn preserves_order() {
        let mut reconciler = Reconciler::default();
        for n in 1..=4 {
            reconciler.record(row(n, TripOutcome::success("1 min", "1 km", false)));
        }
        let order: Vec<_> = reconciler.rows().iter().map(|r| r.row).collect();
        assert_eq!(order, [1, 2, 3, 4]);
    }

    #[test]
    fn failures_in_order() {
        let mut reconciler = Reconciler::default();
        reconciler.record(row(1, TripOutcome::transport_error("a")));
        reconciler.record(row(2, TripOutcome::success("1 min", "1 km", false)));
        reconciler.record(row(3, TripOutcome::route_not_found("b")));

        let failed: Vec<_> = reconciler.failures().map(|r| r.row).collect();
        assert_eq!(failed, [1, 3]);
    }

    #[test]
    fn record_returns_appended_row() {
        let mut reconciler = Reconciler::default();
        let recorded = reconciler.record(row(7, TripOutcome::api_error("X")));
        assert_eq!(recorded.row, 7);
    }

    #[test]
    fn success_is_decided_by_variant_not_text() {
        // A failure reason mentioning "OK" must not count as a success.
        let mut reconciler = Reconciler::default();
        reconciler.record(row(1, TripOutcome::api_error("NOT OK")));
        assert_eq!(reconciler.success_count(), 0);
        assert_eq!(reconciler.error_count(), 1);
    }

    #[test]
    fn empty_summary() {
        let reconciler = Reconciler::new(Vec::new());
        assert!(reconciler.is_empty());
        assert_eq!(reconciler.summary(), Summary::default());
        assert!(reconciler.preview().is_empty());
    }

    #[test]
    fn from_trip_row() {
        let input = TripRow {
            row: 2,
            fields: vec!["A".into(), "B".into(), "MARCHE".into()],
            request: TripRequest::new("A", "B", "MARCHE"),
        };
        let result = ResultRow::new(input, TripOutcome::success("30 min", "2 km", false));
        assert_eq!(result.row, 2);
        assert_eq!(result.fields[2], "MARCHE");
    }
}
