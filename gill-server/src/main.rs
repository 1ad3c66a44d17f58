use std::sync::Arc;
use std::time::Duration;

use tracing::info;
use tracing_subscriber::EnvFilter;

use gill_server::cache::SystemClock;
use gill_server::domain::{
    DaySet, DeliveryRequest, GeoPoint, GillerRoute, Line, MatchingStatus, PackageSize, RequestId,
    RequestStatus, RouteTime, Station, StationId, TimeWindow, TravelEdge, UserId,
};
use gill_server::graph::StationGraph;
use gill_server::orchestrator::{MatchingConfig, MatchingOrchestrator};
use gill_server::ports::{InMemoryChat, InMemoryStore, LoggingNotifier};
use gill_server::retry::{retry_matching_with_backoff, RetryConfig};
use gill_server::validator::RouteValidator;

fn station(id: &str, name: &str, lines: &[&str]) -> Station {
    Station {
        id: StationId::new(id),
        name: name.to_string(),
        location: GeoPoint::new(37.55, 126.97),
        lines: lines
            .iter()
            .map(|l| Line::new(*l, format!("{l}호선")))
            .collect(),
    }
}

fn seoul_graph() -> StationGraph {
    StationGraph::from_parts(
        vec![
            station("133", "서울역", &["1", "4"]),
            station("132", "시청", &["1", "2"]),
            station("222", "강남역", &["2"]),
            station("239", "홍대입구", &["2"]),
        ],
        vec![
            TravelEdge::new("133", "132", 120, "1"),
            TravelEdge::new("132", "133", 120, "1"),
            TravelEdge::new("132", "222", 900, "2"),
            TravelEdge::new("222", "132", 900, "2"),
            TravelEdge::new("132", "239", 480, "2"),
            TravelEdge::new("239", "132", 480, "2"),
        ],
    )
}

fn demo_route(giller: &str, name: &str, start: Station, end: Station) -> GillerRoute {
    GillerRoute {
        giller_id: UserId::new(giller),
        giller_name: name.to_string(),
        start_station: start,
        end_station: end,
        departure_time: RouteTime::parse("08:00").expect("valid time"),
        days: DaySet::all(),
        rating: 4.5,
        total_deliveries: 12,
        completed_deliveries: 11,
        active: true,
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let graph = Arc::new(seoul_graph());
    let clock = Arc::new(SystemClock);
    let store = Arc::new(InMemoryStore::new());
    let request_id = RequestId::new("demo-request");

    store
        .seed_request(DeliveryRequest {
            request_id: request_id.clone(),
            requester_id: UserId::new("requester-1"),
            pickup_station_name: "서울역".to_string(),
            delivery_station_name: "강남역".to_string(),
            pickup_window: TimeWindow {
                start: RouteTime::parse("08:15").expect("valid time"),
                end: RouteTime::parse("09:15").expect("valid time"),
            },
            delivery_deadline: RouteTime::parse("18:00").expect("valid time"),
            preferred_days: DaySet::all(),
            package_size: PackageSize::Small,
            package_weight_kg: 1.2,
            status: RequestStatus::Pending,
            matching_status: MatchingStatus::Pending,
            created_at: chrono::Local::now().naive_local(),
        })
        .await;
    store
        .seed_route(demo_route(
            "giller-1",
            "김민수",
            station("133", "서울역", &["1", "4"]),
            station("222", "강남역", &["2"]),
        ))
        .await;
    store
        .seed_route(demo_route(
            "giller-2",
            "이서연",
            station("239", "홍대입구", &["2"]),
            station("132", "시청", &["1", "2"]),
        ))
        .await;

    let validator = RouteValidator::new(graph.clone());
    let validation =
        validator.validate_route_input("서울역", "강남역", "08:00", &DaySet::weekdays());
    info!(
        valid = validation.is_valid,
        warnings = validation.warnings.len(),
        "route validated"
    );

    let orchestrator = Arc::new(MatchingOrchestrator::new(
        store.clone(),
        Arc::new(LoggingNotifier),
        Arc::new(InMemoryChat::new()),
        graph,
        clock,
        MatchingConfig::default(),
    ));

    let matches = orchestrator
        .find_matches_for_request(&request_id, 5)
        .await
        .expect("demo request is seeded");
    for result in &matches {
        info!(
            giller = %result.giller_id,
            score = result.total_score,
            reasons = ?result.reasons,
            "candidate"
        );
    }

    let created = orchestrator
        .process_matching_for_request(&request_id)
        .await
        .expect("processing succeeds against the in-memory store");
    info!(created, "match records persisted");

    if created > 0 {
        let outcome = orchestrator
            .accept_request(&request_id, &UserId::new("giller-1"))
            .await
            .expect("accept succeeds against the in-memory store");
        info!(success = outcome.success, message = %outcome.message, "accept");
    }

    // Retire the gillers so the next request finds no candidates and the
    // backoff path runs to exhaustion
    store.set_route_active(&UserId::new("giller-1"), false).await;
    store.set_route_active(&UserId::new("giller-2"), false).await;
    orchestrator.invalidate_route_cache();

    let unmatched = RequestId::new("unmatched-request");
    store
        .seed_request(DeliveryRequest {
            request_id: unmatched.clone(),
            requester_id: UserId::new("requester-2"),
            pickup_station_name: "부산역".to_string(),
            delivery_station_name: "해운대역".to_string(),
            pickup_window: TimeWindow {
                start: RouteTime::parse("10:00").expect("valid time"),
                end: RouteTime::parse("11:00").expect("valid time"),
            },
            delivery_deadline: RouteTime::parse("20:00").expect("valid time"),
            preferred_days: DaySet::weekend(),
            package_size: PackageSize::Medium,
            package_weight_kg: 3.0,
            status: RequestStatus::Pending,
            matching_status: MatchingStatus::Pending,
            created_at: chrono::Local::now().naive_local(),
        })
        .await;

    let retry_config = RetryConfig {
        max_retries: 2,
        base_delay: Duration::from_millis(200),
    };
    let outcome = retry_matching_with_backoff(&orchestrator, &unmatched, &retry_config).await;
    info!(
        success = outcome.success,
        attempts = outcome.attempts,
        "retry finished"
    );
}
