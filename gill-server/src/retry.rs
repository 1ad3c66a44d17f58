//! Retry scheduling with exponential backoff.
//!
//! When a request finds no candidates up front, matching is retried on a
//! fixed exponential schedule (2s, 4s, 8s, no jitter). The one-shot
//! auto-retry timer and the periodic stale-request monitor both return
//! cancellable handles; cancelling twice is a no-op.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{info, warn};

use crate::domain::{MatchingStatus, RequestId};
use crate::orchestrator::MatchingOrchestrator;
use crate::ports::{ChatService, MatchStore, Notifier};

/// Delay before a scheduled one-shot retry fires.
pub const DEFAULT_AUTO_RETRY_TIMEOUT: Duration = Duration::from_secs(30);

/// Sweep period of the stale-request monitor.
pub const DEFAULT_MONITOR_INTERVAL: Duration = Duration::from_secs(60);

/// Age at which a still-pending request is considered stale.
pub const DEFAULT_STALE_AFTER: Duration = Duration::from_secs(120);

/// Backoff tuning.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    pub max_retries: u32,
    pub base_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_secs(2),
        }
    }
}

/// Summary of a finished retry loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryOutcome {
    pub success: bool,
    pub attempts: u32,
    pub found_matches: usize,
}

/// A cancellable background timer.
pub struct TimerHandle {
    task: JoinHandle<()>,
}

impl TimerHandle {
    /// Stop the timer. Idempotent; cancelling a fired timer is a no-op.
    pub fn cancel(&self) {
        self.task.abort();
    }
}

/// Retry matching for a request with exponential backoff.
///
/// Each attempt runs a full match lookup; the first attempt that yields a
/// candidate marks the request matched and returns. Attempt errors are
/// logged and treated as empty results. Exhaustion marks the request
/// `no-match` and reports failure. Sleeps happen only between attempts,
/// never after the last one.
pub async fn retry_matching_with_backoff<S, N, C>(
    orchestrator: &MatchingOrchestrator<S, N, C>,
    request_id: &RequestId,
    config: &RetryConfig,
) -> RetryOutcome
where
    S: MatchStore,
    N: Notifier,
    C: ChatService,
{
    for attempt in 1..=config.max_retries {
        let found = match orchestrator
            .find_matches_for_request(request_id, orchestrator.default_top_n())
            .await
        {
            Ok(matches) => matches.len(),
            Err(err) => {
                warn!(request = %request_id, attempt, %err, "matching attempt failed");
                0
            }
        };

        if found > 0 {
            if let Err(err) = orchestrator
                .mark_matching_status(request_id, MatchingStatus::Matched)
                .await
            {
                warn!(request = %request_id, %err, "failed to record matched status");
            }
            info!(request = %request_id, attempt, found, "retry succeeded");
            return RetryOutcome {
                success: true,
                attempts: attempt,
                found_matches: found,
            };
        }

        if attempt < config.max_retries {
            let delay = config.base_delay * 2u32.pow(attempt - 1);
            info!(request = %request_id, attempt, ?delay, "no matches, backing off");
            sleep(delay).await;
        }
    }

    if let Err(err) = orchestrator
        .mark_matching_status(request_id, MatchingStatus::NoMatch)
        .await
    {
        warn!(request = %request_id, %err, "failed to record no-match status");
    }
    info!(request = %request_id, attempts = config.max_retries, "retries exhausted");
    RetryOutcome {
        success: false,
        attempts: config.max_retries,
        found_matches: 0,
    }
}

/// Fire one backoff retry for a request after a timeout.
pub fn schedule_auto_retry<S, N, C>(
    orchestrator: Arc<MatchingOrchestrator<S, N, C>>,
    request_id: RequestId,
    timeout: Duration,
    config: RetryConfig,
) -> TimerHandle
where
    S: MatchStore + 'static,
    N: Notifier + 'static,
    C: ChatService + 'static,
{
    let task = tokio::spawn(async move {
        sleep(timeout).await;
        retry_matching_with_backoff(&orchestrator, &request_id, &config).await;
    });
    TimerHandle { task }
}

/// Periodically sweep for stale pending requests and re-trigger matching.
///
/// The first sweep happens one full interval after start, not immediately.
pub fn start_matching_status_monitor<S, N, C>(
    orchestrator: Arc<MatchingOrchestrator<S, N, C>>,
    interval: Duration,
    stale_after: Duration,
    config: RetryConfig,
) -> TimerHandle
where
    S: MatchStore + 'static,
    N: Notifier + 'static,
    C: ChatService + 'static,
{
    let task = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        // The immediate first tick would sweep before anything can be stale
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let stale = match orchestrator.stale_pending_requests(stale_after).await {
                Ok(stale) => stale,
                Err(err) => {
                    warn!(%err, "stale request sweep failed");
                    continue;
                }
            };
            if !stale.is_empty() {
                info!(count = stale.len(), "re-triggering matching for stale requests");
            }
            for request_id in stale {
                retry_matching_with_backoff(&orchestrator, &request_id, &config).await;
            }
        }
    });
    TimerHandle { task }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::ManualClock;
    use crate::domain::{
        DaySet, DeliveryRequest, GeoPoint, GillerRoute, Line, MatchingStatus, PackageSize,
        RequestStatus, RouteTime, Station, StationId, TimeWindow, UserId,
    };
    use crate::graph::StationGraph;
    use crate::orchestrator::MatchingConfig;
    use crate::ports::{InMemoryChat, InMemoryStore, RecordingNotifier};
    use chrono::NaiveDate;
    use tokio::time::Instant;

    fn station(name: &str) -> Station {
        Station {
            id: StationId::new(name),
            name: name.to_string(),
            location: GeoPoint::new(37.5, 127.0),
            lines: vec![Line::new("2", "2호선")],
        }
    }

    fn monday_route(giller: &str) -> GillerRoute {
        GillerRoute {
            giller_id: UserId::new(giller),
            giller_name: format!("길러-{giller}"),
            start_station: station("서울역"),
            end_station: station("강남역"),
            departure_time: RouteTime::parse("08:00").unwrap(),
            days: DaySet::from_days(&[1]).unwrap(),
            rating: 4.0,
            total_deliveries: 10,
            completed_deliveries: 9,
            active: true,
        }
    }

    fn request(id: &str) -> DeliveryRequest {
        DeliveryRequest {
            request_id: RequestId::new(id),
            requester_id: UserId::new("u1"),
            pickup_station_name: "서울역".to_string(),
            delivery_station_name: "강남역".to_string(),
            pickup_window: TimeWindow {
                start: RouteTime::parse("08:15").unwrap(),
                end: RouteTime::parse("09:15").unwrap(),
            },
            delivery_deadline: RouteTime::parse("18:00").unwrap(),
            preferred_days: DaySet::weekdays(),
            package_size: PackageSize::Small,
            package_weight_kg: 1.0,
            status: RequestStatus::Pending,
            matching_status: MatchingStatus::Pending,
            created_at: monday_morning(),
        }
    }

    // 2025-06-02 is a Monday
    fn monday_morning() -> chrono::NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 6, 2)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap()
    }

    struct Harness {
        store: Arc<InMemoryStore>,
        clock: Arc<ManualClock>,
        orchestrator:
            Arc<MatchingOrchestrator<InMemoryStore, RecordingNotifier, InMemoryChat>>,
    }

    fn harness() -> Harness {
        let store = Arc::new(InMemoryStore::new());
        let clock = Arc::new(ManualClock::starting_at(monday_morning()));
        let orchestrator = Arc::new(MatchingOrchestrator::new(
            store.clone(),
            Arc::new(RecordingNotifier::new()),
            Arc::new(InMemoryChat::new()),
            Arc::new(StationGraph::new()),
            clock.clone(),
            MatchingConfig::default(),
        ));
        Harness {
            store,
            clock,
            orchestrator,
        }
    }

    async fn matching_status(store: &InMemoryStore, id: &str) -> MatchingStatus {
        store
            .request(&RequestId::new(id))
            .await
            .unwrap()
            .unwrap()
            .matching_status
    }

    #[tokio::test(start_paused = true)]
    async fn backs_off_between_attempts_and_marks_no_match() {
        let h = harness();
        h.store.seed_request(request("r1")).await;

        let started = Instant::now();
        let outcome = retry_matching_with_backoff(
            &h.orchestrator,
            &RequestId::new("r1"),
            &RetryConfig::default(),
        )
        .await;
        let elapsed = started.elapsed();

        assert!(!outcome.success);
        assert_eq!(outcome.attempts, 3);
        assert_eq!(outcome.found_matches, 0);

        // 2s + 4s between the three attempts, no sleep after the last
        assert!(elapsed >= Duration::from_secs(6), "elapsed {elapsed:?}");
        assert!(elapsed < Duration::from_secs(8), "elapsed {elapsed:?}");

        assert_eq!(matching_status(&h.store, "r1").await, MatchingStatus::NoMatch);
    }

    #[tokio::test(start_paused = true)]
    async fn first_attempt_success_does_not_sleep() {
        let h = harness();
        h.store.seed_request(request("r1")).await;
        h.store.seed_route(monday_route("g1")).await;

        let started = Instant::now();
        let outcome = retry_matching_with_backoff(
            &h.orchestrator,
            &RequestId::new("r1"),
            &RetryConfig::default(),
        )
        .await;

        assert!(outcome.success);
        assert_eq!(outcome.attempts, 1);
        assert_eq!(outcome.found_matches, 1);
        assert_eq!(started.elapsed(), Duration::ZERO);
        assert_eq!(matching_status(&h.store, "r1").await, MatchingStatus::Matched);
    }

    #[tokio::test(start_paused = true)]
    async fn attempt_errors_are_swallowed_until_exhaustion() {
        let h = harness();
        h.store.seed_request(request("r1")).await;
        // First two attempts hit an unavailable store, the third succeeds
        h.store.seed_route(monday_route("g1")).await;
        h.store.fail_next(2);

        let outcome = retry_matching_with_backoff(
            &h.orchestrator,
            &RequestId::new("r1"),
            &RetryConfig::default(),
        )
        .await;

        assert!(outcome.success);
        assert_eq!(outcome.attempts, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn auto_retry_fires_after_the_timeout() {
        let h = harness();
        h.store.seed_request(request("r1")).await;
        h.store.seed_route(monday_route("g1")).await;

        let _handle = schedule_auto_retry(
            h.orchestrator.clone(),
            RequestId::new("r1"),
            DEFAULT_AUTO_RETRY_TIMEOUT,
            RetryConfig::default(),
        );

        sleep(Duration::from_secs(29)).await;
        assert_eq!(matching_status(&h.store, "r1").await, MatchingStatus::Pending);

        sleep(Duration::from_secs(2)).await;
        assert_eq!(matching_status(&h.store, "r1").await, MatchingStatus::Matched);
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_timer_never_fires_and_cancel_is_idempotent() {
        let h = harness();
        h.store.seed_request(request("r1")).await;
        h.store.seed_route(monday_route("g1")).await;

        let handle = schedule_auto_retry(
            h.orchestrator.clone(),
            RequestId::new("r1"),
            DEFAULT_AUTO_RETRY_TIMEOUT,
            RetryConfig::default(),
        );
        handle.cancel();
        handle.cancel();

        sleep(Duration::from_secs(60)).await;
        assert_eq!(matching_status(&h.store, "r1").await, MatchingStatus::Pending);
    }

    #[tokio::test(start_paused = true)]
    async fn monitor_sweeps_stale_requests() {
        let h = harness();
        h.store.seed_request(request("r1")).await;
        h.store.seed_route(monday_route("g1")).await;
        // Old enough to be stale by the injected clock
        h.clock.advance(chrono::Duration::minutes(5));

        let handle = start_matching_status_monitor(
            h.orchestrator.clone(),
            DEFAULT_MONITOR_INTERVAL,
            DEFAULT_STALE_AFTER,
            RetryConfig::default(),
        );

        sleep(Duration::from_secs(61)).await;
        assert_eq!(matching_status(&h.store, "r1").await, MatchingStatus::Matched);
        handle.cancel();
    }
}
