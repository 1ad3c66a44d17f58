//! Transfer matching.
//!
//! Bridges a delivery request and a giller route that share no full route
//! overlap but do share an endpoint station: the giller rides their own
//! route, hands over or picks up at the shared station, and the package
//! continues along the request's segment. Pricing is KRW with a flat
//! transfer bonus and a tiered subway fare.

use std::sync::Arc;

use chrono::NaiveDateTime;
use tracing::debug;

use crate::domain::{
    DeliveryRequest, GillerRoute, MatchId, MatchStatus, Station, TransferMatchRecord,
    TransferPossibility, TransferPricing,
};
use crate::graph::StationGraph;
use crate::ports::{MatchStore, StoreError};

/// Walking buffer added at the handover station, in minutes.
pub const WALK_BUFFER_MINS: i64 = 3;

/// Default cap on extra minutes the giller will accept.
pub const DEFAULT_MAX_DETOUR_MINS: i64 = 15;

/// Flat bonus paid on top of the base fee for a transfer match, in KRW.
pub const TRANSFER_BONUS_KRW: u32 = 1000;

/// Share of the net fee paid out to the giller.
const GILLER_EARNING_RATE: f32 = 0.9;

/// Error from transfer matching.
#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    /// The two routes cannot be bridged; persisting would be meaningless.
    #[error("환승 매칭이 불가능한 경로입니다")]
    NotPossible,

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Travel time lookup for a named route segment, in minutes.
///
/// Injectable so the matcher's contract stays fixed while the lookup
/// improves: the default is a fixed duration, the graph-backed source
/// answers from real pathfinding.
pub trait SegmentTimeSource: Send + Sync {
    fn segment_minutes(&self, from_name: &str, to_name: &str) -> i64;
}

/// Fixed segment duration regardless of the endpoints.
#[derive(Debug, Clone, Copy)]
pub struct FixedSegmentTime(pub i64);

impl Default for FixedSegmentTime {
    fn default() -> Self {
        Self(30)
    }
}

impl SegmentTimeSource for FixedSegmentTime {
    fn segment_minutes(&self, _from_name: &str, _to_name: &str) -> i64 {
        self.0
    }
}

/// Segment durations from the pathfinding engine, by station name.
///
/// Falls back to a fixed duration when a station is absent from the graph
/// or the segment is unreachable.
pub struct GraphSegmentTime {
    graph: Arc<StationGraph>,
    fallback_mins: i64,
}

impl GraphSegmentTime {
    pub fn new(graph: Arc<StationGraph>) -> Self {
        Self {
            graph,
            fallback_mins: FixedSegmentTime::default().0,
        }
    }
}

impl SegmentTimeSource for GraphSegmentTime {
    fn segment_minutes(&self, from_name: &str, to_name: &str) -> i64 {
        let segment = self
            .graph
            .station_by_name(from_name)
            .zip(self.graph.station_by_name(to_name))
            .and_then(|(from, to)| self.graph.calculate_eta(&from.id, &to.id));

        match segment {
            Some(eta) => eta.minutes as i64,
            None => self.fallback_mins,
        }
    }
}

/// Evaluates whether a request can piggyback on a giller route through a
/// shared endpoint station.
pub struct TransferMatcher<T: SegmentTimeSource> {
    segments: T,
    max_detour_mins: i64,
}

impl Default for TransferMatcher<FixedSegmentTime> {
    fn default() -> Self {
        Self::new(FixedSegmentTime::default())
    }
}

impl<T: SegmentTimeSource> TransferMatcher<T> {
    pub fn new(segments: T) -> Self {
        Self {
            segments,
            max_detour_mins: DEFAULT_MAX_DETOUR_MINS,
        }
    }

    pub fn with_max_detour(mut self, mins: i64) -> Self {
        self.max_detour_mins = mins;
        self
    }

    /// Check whether the giller can carry the request via a shared station.
    ///
    /// The transfer station is any station appearing in both routes'
    /// endpoint sets. No shared endpoint means no transfer. When one is
    /// found, the giller's detour is the walking buffer plus the request
    /// segment; the transfer holds when that detour fits the cap.
    pub fn check_transfer(
        &self,
        request: &DeliveryRequest,
        route: &GillerRoute,
    ) -> TransferPossibility {
        let Some(transfer_station) = shared_endpoint(request, route) else {
            return TransferPossibility::impossible();
        };

        let original_mins = self
            .segments
            .segment_minutes(&route.start_station.name, &route.end_station.name);
        let request_mins = self.segments.segment_minutes(
            &request.pickup_station_name,
            &request.delivery_station_name,
        );

        let transfer_mins = original_mins + WALK_BUFFER_MINS + request_mins;
        let additional_mins = transfer_mins - original_mins;
        let can_transfer = additional_mins <= self.max_detour_mins;

        debug!(
            station = %transfer_station.name,
            additional_mins,
            can_transfer,
            "transfer check"
        );

        TransferPossibility {
            can_transfer,
            transfer_station: Some(transfer_station),
            additional_time_mins: additional_mins,
            total_travel_time_mins: transfer_mins,
        }
    }

    /// Persist a transfer match for a feasible transfer check.
    pub async fn create_transfer_match(
        &self,
        store: &dyn MatchStore,
        request: &DeliveryRequest,
        route: &GillerRoute,
        possibility: &TransferPossibility,
        base_fee: u32,
        now: NaiveDateTime,
    ) -> Result<TransferMatchRecord, TransferError> {
        let station = match &possibility.transfer_station {
            Some(station) if possibility.can_transfer => station,
            _ => return Err(TransferError::NotPossible),
        };

        let record = TransferMatchRecord {
            match_id: MatchId::for_pair(&request.request_id, &route.giller_id),
            request_id: request.request_id.clone(),
            giller_id: route.giller_id.clone(),
            transfer_station_id: station.id.clone(),
            pricing: transfer_pricing(base_fee, possibility.total_travel_time_mins),
            status: MatchStatus::Pending,
            created_at: now,
        };
        store.create_transfer_match(&record).await?;
        Ok(record)
    }
}

/// Fee breakdown for a transfer of the given total travel time.
pub fn transfer_pricing(base_fee: u32, total_travel_time_mins: i64) -> TransferPricing {
    let subway_fee = match total_travel_time_mins {
        ..=30 => 1400,
        31..=50 => 1600,
        _ => 1800,
    };
    let total_fee = base_fee + TRANSFER_BONUS_KRW;
    let giller_earning =
        (total_fee.saturating_sub(subway_fee) as f32 * GILLER_EARNING_RATE) as u32;

    TransferPricing {
        base_fee,
        transfer_bonus: TRANSFER_BONUS_KRW,
        subway_fee,
        total_fee,
        giller_earning,
    }
}

/// A station in both routes' endpoint sets, if any.
///
/// The giller route carries full station data; the request only carries
/// names, so matching is by name and the giller's station is returned.
fn shared_endpoint(request: &DeliveryRequest, route: &GillerRoute) -> Option<Station> {
    let request_names = [
        request.pickup_station_name.as_str(),
        request.delivery_station_name.as_str(),
    ];

    [&route.start_station, &route.end_station]
        .into_iter()
        .find(|station| request_names.contains(&station.name.as_str()))
        .cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        DaySet, GeoPoint, Line, MatchingStatus, PackageSize, RequestId, RequestStatus, RouteTime,
        StationId, TimeWindow, TravelEdge, UserId,
    };
    use crate::ports::InMemoryStore;

    fn station(id: &str, name: &str) -> Station {
        Station {
            id: StationId::new(id),
            name: name.to_string(),
            location: GeoPoint::new(37.5, 127.0),
            lines: vec![Line::new("2", "2호선")],
        }
    }

    fn request(pickup: &str, delivery: &str) -> DeliveryRequest {
        DeliveryRequest {
            request_id: RequestId::new("r1"),
            requester_id: UserId::new("u1"),
            pickup_station_name: pickup.to_string(),
            delivery_station_name: delivery.to_string(),
            pickup_window: TimeWindow {
                start: RouteTime::parse("08:00").unwrap(),
                end: RouteTime::parse("09:00").unwrap(),
            },
            delivery_deadline: RouteTime::parse("18:00").unwrap(),
            preferred_days: DaySet::weekdays(),
            package_size: PackageSize::Small,
            package_weight_kg: 1.0,
            status: RequestStatus::Pending,
            matching_status: MatchingStatus::Pending,
            created_at: chrono::NaiveDate::from_ymd_opt(2025, 6, 2)
                .unwrap()
                .and_hms_opt(8, 0, 0)
                .unwrap(),
        }
    }

    fn route(start: Station, end: Station) -> GillerRoute {
        GillerRoute {
            giller_id: UserId::new("g1"),
            giller_name: "김민수".to_string(),
            start_station: start,
            end_station: end,
            departure_time: RouteTime::parse("08:00").unwrap(),
            days: DaySet::weekdays(),
            rating: 4.5,
            total_deliveries: 10,
            completed_deliveries: 9,
            active: true,
        }
    }

    #[test]
    fn no_shared_endpoint_is_impossible() {
        let matcher = TransferMatcher::default();
        let request = request("서울역", "강남역");
        let route = route(station("131", "종각"), station("202", "을지로"));

        let result = matcher.check_transfer(&request, &route);
        assert!(!result.can_transfer);
        assert!(result.transfer_station.is_none());
        assert_eq!(result.additional_time_mins, 0);
    }

    #[test]
    fn fixed_durations_exceed_the_default_detour_cap() {
        // 3-minute walk + 30-minute request segment is over the 15-minute
        // cap, so the default source never approves a transfer.
        let matcher = TransferMatcher::default();
        let request = request("서울역", "강남역");
        let route = route(station("133", "서울역"), station("131", "종각"));

        let result = matcher.check_transfer(&request, &route);
        assert!(!result.can_transfer);
        assert_eq!(
            result.transfer_station.as_ref().map(|s| s.name.as_str()),
            Some("서울역")
        );
        assert_eq!(result.additional_time_mins, 33);
    }

    #[test]
    fn short_request_segment_within_cap() {
        let matcher = TransferMatcher::new(FixedSegmentTime(10));
        let request = request("서울역", "강남역");
        let route = route(station("202", "을지로"), station("222", "강남역"));

        let result = matcher.check_transfer(&request, &route);
        assert!(result.can_transfer);
        assert_eq!(result.additional_time_mins, 13);
        assert_eq!(result.total_travel_time_mins, 10 + 3 + 10);
        assert_eq!(
            result.transfer_station.map(|s| s.name),
            Some("강남역".to_string())
        );
    }

    #[test]
    fn tighter_detour_cap_rejects() {
        let matcher = TransferMatcher::new(FixedSegmentTime(10)).with_max_detour(5);
        let request = request("서울역", "강남역");
        let route = route(station("202", "을지로"), station("222", "강남역"));

        let result = matcher.check_transfer(&request, &route);
        assert!(!result.can_transfer);
        assert!(result.transfer_station.is_some());
    }

    #[test]
    fn graph_backed_segment_times() {
        let graph = Arc::new(StationGraph::from_parts(
            vec![station("133", "서울역"), station("222", "강남역")],
            vec![TravelEdge::new("133", "222", 300, "2")],
        ));
        let source = GraphSegmentTime::new(graph);

        assert_eq!(source.segment_minutes("서울역", "강남역"), 5);
        // Unreachable in reverse, falls back
        assert_eq!(source.segment_minutes("강남역", "서울역"), 30);
        assert_eq!(source.segment_minutes("없는역", "강남역"), 30);
    }

    #[test]
    fn subway_fee_tiers() {
        assert_eq!(transfer_pricing(2000, 30).subway_fee, 1400);
        assert_eq!(transfer_pricing(2000, 31).subway_fee, 1600);
        assert_eq!(transfer_pricing(2000, 50).subway_fee, 1600);
        assert_eq!(transfer_pricing(2000, 51).subway_fee, 1800);
    }

    #[test]
    fn pricing_breakdown() {
        let pricing = transfer_pricing(2000, 25);
        assert_eq!(pricing.base_fee, 2000);
        assert_eq!(pricing.transfer_bonus, 1000);
        assert_eq!(pricing.total_fee, 3000);
        assert_eq!(pricing.subway_fee, 1400);
        // (3000 - 1400) * 0.9
        assert_eq!(pricing.giller_earning, 1440);
    }

    #[test]
    fn earning_never_underflows() {
        let pricing = transfer_pricing(0, 60);
        assert_eq!(pricing.total_fee, 1000);
        assert_eq!(pricing.giller_earning, 0);
    }

    #[tokio::test]
    async fn feasible_transfer_is_persisted_pending() {
        let store = InMemoryStore::new();
        let matcher = TransferMatcher::new(FixedSegmentTime(10));
        let request = request("서울역", "강남역");
        let route = route(station("133", "서울역"), station("131", "종각"));

        let possibility = matcher.check_transfer(&request, &route);
        assert!(possibility.can_transfer);

        let now = chrono::NaiveDate::from_ymd_opt(2025, 6, 2)
            .unwrap()
            .and_hms_opt(8, 30, 0)
            .unwrap();
        let record = matcher
            .create_transfer_match(&store, &request, &route, &possibility, 2000, now)
            .await
            .unwrap();

        assert_eq!(record.match_id.as_str(), "m-r1-g1");
        assert_eq!(record.status, MatchStatus::Pending);
        assert_eq!(record.transfer_station_id.as_str(), "133");
        assert_eq!(store.transfer_match_count().await, 1);
    }

    #[tokio::test]
    async fn infeasible_transfer_is_rejected() {
        let store = InMemoryStore::new();
        let matcher = TransferMatcher::default();
        let request = request("서울역", "강남역");
        let route = route(station("131", "종각"), station("202", "을지로"));

        let possibility = matcher.check_transfer(&request, &route);
        let now = chrono::NaiveDate::from_ymd_opt(2025, 6, 2)
            .unwrap()
            .and_hms_opt(8, 30, 0)
            .unwrap();
        let err = matcher
            .create_transfer_match(&store, &request, &route, &possibility, 2000, now)
            .await
            .unwrap_err();

        assert!(matches!(err, TransferError::NotPossible));
        assert_eq!(store.transfer_match_count().await, 0);
    }
}
