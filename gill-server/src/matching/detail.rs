//! Presentation-level match decoration.
//!
//! Component scores and route metrics shown to the requester alongside a
//! ranked match. None of this participates in the ranking invariant: the
//! order of matches is fixed by the additive score in [`super::score`].

use crate::domain::{
    CongestionLevel, DeliveryRequest, GillerRoute, MatchResult, RouteDetails,
};
use crate::graph::StationGraph;

use super::score::{hour_distance, stations_match};

/// Weights for the presentation total. Sum to 1.
#[derive(Debug, Clone, Copy)]
pub struct ScoreWeights {
    pub route: f32,
    pub time: f32,
    pub rating: f32,
    pub completion: f32,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            route: 0.35,
            time: 0.25,
            rating: 0.20,
            completion: 0.20,
        }
    }
}

/// Route metrics from the pathfinding engine for the giller's own route.
///
/// `None` when the route's stations are absent from the graph or
/// unconnected; the match is still presentable without them.
pub fn route_details_for(graph: &StationGraph, route: &GillerRoute) -> Option<RouteDetails> {
    let path = graph.shortest_path(&route.start_station.id, &route.end_station.id)?;
    Some(RouteDetails {
        travel_time_secs: path.total_secs,
        transfer_count: path.transfer_count,
        express_available: graph.path_express_available(&path.path),
        congestion: CongestionLevel::from_hour(route.departure_time.hour()),
    })
}

/// Build the decorated match for one ranked candidate.
pub fn detailed_result(
    request: &DeliveryRequest,
    route: &GillerRoute,
    route_details: Option<RouteDetails>,
    weights: &ScoreWeights,
) -> MatchResult {
    let exact_stations = stations_match(request, route);
    let route_match_score = if exact_stations {
        100.0
    } else if route.start_station.name == request.pickup_station_name
        || route.end_station.name == request.delivery_station_name
    {
        50.0
    } else {
        0.0
    };

    let time_match_score = match hour_distance(request, route) {
        0 => 100.0,
        1 => 70.0,
        2 => 30.0,
        _ => 0.0,
    };

    let rating_score = (route.rating.clamp(0.0, 5.0) / 5.0) * 100.0;
    let completion_rate_score = route.completion_rate() * 100.0;

    let total_score = weights.route * route_match_score
        + weights.time * time_match_score
        + weights.rating * rating_score
        + weights.completion * completion_rate_score;

    let mut reasons = Vec::new();
    if exact_stations {
        reasons.push("경로가 요청 구간과 일치합니다".to_string());
    }
    if route.days.intersects(&request.preferred_days) {
        reasons.push("선호 요일에 운행하는 경로입니다".to_string());
    }
    if hour_distance(request, route) <= 1 {
        reasons.push("출발 시간이 픽업 시간대와 가깝습니다".to_string());
    }
    if reasons.is_empty() {
        reasons.push(super::REASON_BASIC.to_string());
    }

    MatchResult {
        giller_id: route.giller_id.clone(),
        giller_name: route.giller_name.clone(),
        route_match_score,
        time_match_score,
        rating_score,
        completion_rate_score,
        total_score,
        route_details,
        reasons,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TravelEdge;
    use crate::matching::test_support::{request, route, station};

    #[test]
    fn component_scores_for_exact_match() {
        let request = request("서울역", "강남역", "08:00", &[1]);
        let mut candidate = route("g1", "서울역", "강남역", "08:00", &[1, 2, 3, 4, 5]);
        candidate.rating = 5.0;
        candidate.total_deliveries = 10;
        candidate.completed_deliveries = 10;

        let result = detailed_result(&request, &candidate, None, &ScoreWeights::default());

        assert_eq!(result.route_match_score, 100.0);
        assert_eq!(result.time_match_score, 100.0);
        assert_eq!(result.rating_score, 100.0);
        assert_eq!(result.completion_rate_score, 100.0);
        assert!((result.total_score - 100.0).abs() < 1e-5);
        assert!(!result.reasons.is_empty());
    }

    #[test]
    fn partial_endpoint_scores_half() {
        let request = request("서울역", "강남역", "08:00", &[1]);
        let candidate = route("g1", "서울역", "역삼역", "11:00", &[6]);

        let result = detailed_result(&request, &candidate, None, &ScoreWeights::default());
        assert_eq!(result.route_match_score, 50.0);
        assert_eq!(result.time_match_score, 0.0);
    }

    #[test]
    fn zero_history_scores_zero_completion() {
        let request = request("서울역", "강남역", "08:00", &[1]);
        let mut candidate = route("g1", "가역", "나역", "20:00", &[6]);
        candidate.total_deliveries = 0;
        candidate.completed_deliveries = 0;

        let result = detailed_result(&request, &candidate, None, &ScoreWeights::default());
        assert_eq!(result.completion_rate_score, 0.0);
        assert_eq!(result.reasons, vec![super::super::REASON_BASIC.to_string()]);
    }

    #[test]
    fn details_come_from_the_graph() {
        let mut graph = StationGraph::new();
        graph.add_station(station("서울역"));
        graph.add_station(station("강남역"));
        graph.add_edge(TravelEdge::new("서울역", "강남역", 1200, "2"));

        let candidate = route("g1", "서울역", "강남역", "08:00", &[1]);
        let details = route_details_for(&graph, &candidate).unwrap();

        assert_eq!(details.travel_time_secs, 1200);
        assert_eq!(details.transfer_count, 0);
        assert!(!details.express_available);
        assert_eq!(details.congestion, CongestionLevel::High);

        // Unconnected route: no details, not an error
        let reversed = route("g1", "강남역", "서울역", "08:00", &[1]);
        assert!(route_details_for(&graph, &reversed).is_none());
    }
}
