//! Sequential batch processing of trip files.
//!
//! Trips are routed one at a time, in file order. After each trip the
//! result is recorded, observers are notified, and the [`Pacer`] waits
//! before the next request to stay under the routing service's rate limit.
//! Cancelling stops further requests; results recorded so far stay usable.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use chrono::{DateTime, TimeZone};

use crate::domain::{ResolvedQuery, TravelMode, TripOutcome, TripRequest, parse_weekday};
use crate::input::TripTable;
use crate::maps::TripRouter;
use crate::results::{Reconciler, ResultRow};

/// Pause between trips in the interactive front end.
const DEFAULT_DELAY: Duration = Duration::from_millis(500);

/// Configuration for a batch run.
#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// Pause after each completed trip.
    pub delay: Duration,
}

impl BatchConfig {
    /// Create a configuration with the given pause between trips.
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    /// Set the pause between trips in milliseconds.
    pub fn with_delay_ms(mut self, ms: u64) -> Self {
        self.delay = Duration::from_millis(ms);
        self
    }
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            delay: DEFAULT_DELAY,
        }
    }
}

/// Fixed-delay throttle between routing requests.
#[derive(Debug, Clone)]
pub struct Pacer {
    delay: Duration,
}

impl Pacer {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    /// Wait out the delay.
    pub async fn pause(&self) {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
    }
}

/// Shared flag asking a running batch to stop.
///
/// Cloning yields a handle to the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the batch to stop before its next trip.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Cancel on the first interrupt, then wait for a second one.
    ///
    /// `interrupt` resolves once per signal. Returns `true` when a second
    /// interrupt arrives (the caller should exit without waiting for the
    /// trip in flight) and `false` if signals can no longer be received.
    pub async fn cancel_on_interrupt<F, Fut>(&self, mut interrupt: F) -> bool
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = std::io::Result<()>>,
    {
        if let Err(e) = interrupt().await {
            tracing::warn!(error = %e, "cannot listen for interrupts");
            return false;
        }
        tracing::info!("interrupt received, stopping after the current trip");
        self.cancel();

        interrupt().await.is_ok()
    }
}

/// Progress passed to observers after each recorded trip.
#[derive(Debug, Clone, Copy)]
pub struct BatchProgress<'a> {
    /// Results so far, the latest trip last.
    pub results: &'a Reconciler,
    /// Number of trips in the batch.
    pub total: usize,
}

impl BatchProgress<'_> {
    /// Trips completed so far.
    pub fn done(&self) -> usize {
        self.results.len()
    }
}

/// The end state of a batch.
#[derive(Debug, Clone)]
pub struct BatchReport {
    pub results: Reconciler,
    /// Trips in the input file.
    pub total: usize,
    /// True when the batch stopped before routing every trip.
    pub cancelled: bool,
}

/// Resolve and route one trip.
///
/// Never fails: a malformed departure time becomes a transport error
/// outcome without any request being sent. Unknown transport modes and
/// weekday names are logged and fall back silently.
pub async fn route_trip<R, Tz>(router: &R, request: &TripRequest, now: &DateTime<Tz>) -> TripOutcome
where
    R: TripRouter,
    Tz: TimeZone,
{
    if TravelMode::recognize(&request.mode_label).is_none() {
        tracing::warn!(label = %request.mode_label, "unknown transport mode, using driving");
    }
    if let Some(weekday) = request.weekday() {
        if parse_weekday(weekday).is_none() {
            tracing::warn!(weekday, "unknown weekday, using today");
        }
    }

    match ResolvedQuery::resolve(request, now) {
        Ok(query) => router.route(&query).await,
        Err(e) => {
            tracing::warn!(error = %e, "invalid departure time");
            TripOutcome::transport_error(e.to_string())
        }
    }
}

/// Route every trip of `table`, in order.
///
/// `clock` supplies the current time for each trip. `on_progress` runs
/// after every recorded trip, so a front end can redraw its table.
pub async fn run_batch<R, Tz, C, F>(
    router: &R,
    table: TripTable,
    config: &BatchConfig,
    cancel: &CancelFlag,
    clock: C,
    mut on_progress: F,
) -> BatchReport
where
    R: TripRouter,
    Tz: TimeZone,
    C: Fn() -> DateTime<Tz>,
    F: FnMut(BatchProgress<'_>),
{
    let total = table.len();
    let (headers, rows) = table.into_parts();
    let mut results = Reconciler::new(headers);
    let pacer = Pacer::new(config.delay);
    let mut cancelled = false;

    tracing::info!(trips = total, "starting batch");

    for input in rows {
        if cancel.is_cancelled() {
            cancelled = true;
            tracing::info!(done = results.len(), total, "batch cancelled");
            break;
        }

        let now = clock();
        let outcome = route_trip(router, &input.request, &now).await;
        tracing::debug!(row = input.row, status = %outcome.status(), "trip routed");

        results.record(ResultRow::new(input, outcome));
        on_progress(BatchProgress {
            results: &results,
            total,
        });

        pacer.pause().await;
    }

    let summary = results.summary();
    tracing::info!(
        total = summary.total,
        success = summary.success,
        errors = summary.errors,
        "batch finished"
    );

    BatchReport {
        results,
        total,
        cancelled,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TripStatus;
    use crate::maps::{MockMapsClient, MockReply};
    use chrono::{Datelike, FixedOffset, Timelike, Weekday};

    const TRAFFIC_RESPONSE: &str = r#"{
        "status": "OK",
        "rows": [{"elements": [{
            "status": "OK",
            "duration": {"text": "19 minutes", "value": 1134},
            "duration_in_traffic": {"text": "24 minutes", "value": 1452},
            "distance": {"text": "5,6 km", "value": 5623}
        }]}]
    }"#;

    const PLAIN_RESPONSE: &str = r#"{
        "status": "OK",
        "rows": [{"elements": [{
            "status": "OK",
            "duration": {"text": "12 minutes", "value": 720},
            "distance": {"text": "3 km", "value": 3000}
        }]}]
    }"#;

    /// Wednesday 2025-01-15 10:00 at UTC+1.
    fn wednesday() -> DateTime<FixedOffset> {
        FixedOffset::east_opt(3600)
            .unwrap()
            .with_ymd_and_hms(2025, 1, 15, 10, 0, 0)
            .unwrap()
    }

    fn no_delay() -> BatchConfig {
        BatchConfig::new(Duration::ZERO)
    }

    fn table(csv: &str) -> TripTable {
        TripTable::from_bytes(csv.as_bytes()).unwrap()
    }

    #[test]
    fn config_defaults() {
        assert_eq!(BatchConfig::default().delay, Duration::from_millis(500));
        assert_eq!(
            BatchConfig::default().with_delay_ms(200).delay,
            Duration::from_millis(200)
        );
    }

    #[test]
    fn cancel_flag_is_shared() {
        let flag = CancelFlag::new();
        let handle = flag.clone();
        assert!(!flag.is_cancelled());
        handle.cancel();
        assert!(flag.is_cancelled());
    }

    /// Interrupts fed through a channel; a closed channel is a failed listener.
    fn channel_interrupts() -> (
        tokio::sync::mpsc::UnboundedSender<()>,
        impl FnMut() -> std::pin::Pin<Box<dyn Future<Output = std::io::Result<()>> + Send>>,
    ) {
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
        let rx = Arc::new(tokio::sync::Mutex::new(rx));
        let next = move || {
            let rx = Arc::clone(&rx);
            Box::pin(async move {
                rx.lock()
                    .await
                    .recv()
                    .await
                    .ok_or_else(|| std::io::Error::from(std::io::ErrorKind::BrokenPipe))
            }) as std::pin::Pin<Box<dyn Future<Output = std::io::Result<()>> + Send>>
        };
        (tx, next)
    }

    #[tokio::test]
    async fn first_interrupt_cancels_second_forces_exit() {
        let (tx, interrupts) = channel_interrupts();
        let flag = CancelFlag::new();
        let listener = tokio::spawn({
            let flag = flag.clone();
            async move { flag.cancel_on_interrupt(interrupts).await }
        });

        tx.send(()).unwrap();
        while !flag.is_cancelled() {
            tokio::task::yield_now().await;
        }
        assert!(!listener.is_finished());

        tx.send(()).unwrap();
        assert!(listener.await.unwrap());
    }

    #[tokio::test]
    async fn closed_listener_never_forces_exit() {
        let (tx, interrupts) = channel_interrupts();
        drop(tx);

        let flag = CancelFlag::new();
        assert!(!flag.cancel_on_interrupt(interrupts).await);
        assert!(!flag.is_cancelled());
    }

    #[tokio::test]
    async fn monday_driving_scenario() {
        let router = MockMapsClient::new();
        router
            .insert_json("10 Rue de Rivoli, Paris", "Tour Eiffel, Paris", TRAFFIC_RESPONSE)
            .await
            .unwrap();

        let request = TripRequest::new("10 Rue de Rivoli, Paris", "Tour Eiffel, Paris", "VOITURE")
            .with_clock("08:00")
            .with_weekday("Lundi");
        let outcome = route_trip(&router, &request, &wednesday()).await;

        assert_eq!(
            outcome.status(),
            &TripStatus::Success {
                traffic_aware: true
            }
        );
        assert_eq!(outcome.duration_text(), "24 minutes");
        assert_eq!(outcome.distance_text(), "5,6 km");

        let queries = router.queries().await;
        assert_eq!(queries.len(), 1);
        let query = &queries[0];
        assert_eq!(query.mode, TravelMode::Driving);
        assert!(query.use_traffic_model);
        let local = query.departure.unwrap().with_timezone(wednesday().offset());
        assert_eq!(local.weekday(), Weekday::Mon);
        assert_eq!(local.date_naive(), wednesday().date_naive() + chrono::Days::new(5));
        assert_eq!((local.hour(), local.minute()), (8, 0));
    }

    #[tokio::test]
    async fn unknown_mode_routes_as_driving() {
        let router = MockMapsClient::new();
        router.insert_json("A", "B", PLAIN_RESPONSE).await.unwrap();

        let request = TripRequest::new("A", "B", "BATEAU");
        let outcome = route_trip(&router, &request, &wednesday()).await;

        assert!(outcome.is_success());
        assert_eq!(router.queries().await[0].mode, TravelMode::Driving);
    }

    #[tokio::test]
    async fn malformed_clock_sends_no_request() {
        let router = MockMapsClient::new();
        let request = TripRequest::new("A", "B", "VOITURE").with_clock("8h");
        let outcome = route_trip(&router, &request, &wednesday()).await;

        assert!(matches!(
            outcome.status(),
            TripStatus::TransportError { .. }
        ));
        assert_eq!(router.call_count().await, 0);
    }

    #[tokio::test]
    async fn failing_trip_does_not_stop_batch() {
        let router = MockMapsClient::new();
        router.insert_json("A", "B", PLAIN_RESPONSE).await.unwrap();
        router
            .insert("C", "D", MockReply::Failure("connection reset".into()))
            .await;
        router.insert_json("E", "F", PLAIN_RESPONSE).await.unwrap();

        let trips = table(
            "Origine,Destination,Mode de transport,Heure de départ\n\
             A,B,VOITURE,\n\
             C,D,VOITURE,\n\
             G,H,VOITURE,25:00\n\
             E,F,VOITURE,\n",
        );
        let report = run_batch(&router, trips, &no_delay(), &CancelFlag::new(), wednesday, |_| {}).await;

        assert!(!report.cancelled);
        assert_eq!(report.total, 4);
        let rows = report.results.rows();
        assert_eq!(rows.len(), 4);
        assert!(rows[0].outcome.is_success());
        assert_eq!(rows[1].outcome.status().reason(), Some("connection reset"));
        assert!(!rows[2].outcome.is_success());
        assert!(rows[3].outcome.is_success());
        assert_eq!(report.results.success_count(), 2);
        assert_eq!(report.results.error_count(), 2);

        // The malformed row never reached the router.
        assert_eq!(router.call_count().await, 3);
    }

    #[tokio::test]
    async fn observer_sees_every_row_in_order() {
        let router = MockMapsClient::new();
        let trips = table("Origine,Destination,Mode de transport\nA,B,VELO\nC,D,MARCHE\nE,F,TRANSPORTS\n");

        let mut seen = Vec::new();
        run_batch(&router, trips, &no_delay(), &CancelFlag::new(), wednesday, |progress| {
            let last = progress.results.rows().last().unwrap();
            seen.push((progress.done(), progress.total, last.row));
        })
        .await;

        assert_eq!(seen, [(1, 3, 1), (2, 3, 2), (3, 3, 3)]);
    }

    #[tokio::test]
    async fn cancel_stops_further_requests() {
        let router = MockMapsClient::new();
        let trips = table("Origine,Destination,Mode de transport\nA,B,VELO\nC,D,VELO\nE,F,VELO\n");
        let cancel = CancelFlag::new();

        let report = run_batch(&router, trips, &no_delay(), &cancel, wednesday, |progress| {
            if progress.done() == 1 {
                cancel.cancel();
            }
        })
        .await;

        assert!(report.cancelled);
        assert_eq!(report.results.len(), 1);
        assert_eq!(router.call_count().await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn pacer_waits_after_each_trip() {
        let router = MockMapsClient::new();
        let trips = table("Origine,Destination,Mode de transport\nA,B,VELO\nC,D,VELO\n");
        let config = BatchConfig::default().with_delay_ms(300);

        let start = tokio::time::Instant::now();
        run_batch(&router, trips, &config, &CancelFlag::new(), wednesday, |_| {}).await;

        assert!(start.elapsed() >= Duration::from_millis(600));
    }
}
