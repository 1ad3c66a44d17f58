//! Additive match scoring.
//!
//! Pure and deterministic: no I/O, no clock. The orchestrator applies the
//! day-of-availability filter before calling in; scoring itself only
//! compares request attributes against route attributes.

use crate::domain::{DeliveryRequest, GillerRoute, MatchScore};

/// Every candidate starts here.
pub const BASE_SCORE: u32 = 50;

/// Bonus for an exact pickup/delivery station match.
const STATION_MATCH_BONUS: u32 = 30;

/// Bonus when the route runs on one of the request's preferred days.
const DAY_MATCH_BONUS: u32 = 10;

/// Bonus when the departure hour is within one hour of the pickup hour.
const TIME_MATCH_BONUS: u32 = 10;

/// Scores at or above this are flagged as high-quality matches.
pub const HIGH_SCORE_THRESHOLD: u32 = 70;

pub const REASON_HIGH: &str = "높은 매칭 점수";
pub const REASON_BASIC: &str = "기본 매칭";

/// Default number of matches returned to callers.
pub const DEFAULT_TOP_LIMIT: usize = 10;

/// Score all candidate routes against a request, best first.
///
/// The sort is stable: candidates with equal scores keep their input
/// order, so repeated calls over the same data rank identically.
pub fn score_candidates(request: &DeliveryRequest, routes: &[GillerRoute]) -> Vec<MatchScore> {
    let mut scores: Vec<MatchScore> = routes.iter().map(|r| score_route(request, r)).collect();
    scores.sort_by(|a, b| b.total_score.cmp(&a.total_score));
    scores
}

/// Score candidates keeping each score paired with the route it came from.
///
/// Same ranking as [`score_candidates`]. Callers that need to know which
/// route produced a score use this: a giller may register several routes,
/// so the giller id alone does not identify the scored route.
pub fn rank_routes(
    request: &DeliveryRequest,
    routes: Vec<GillerRoute>,
) -> Vec<(MatchScore, GillerRoute)> {
    let mut ranked: Vec<(MatchScore, GillerRoute)> = routes
        .into_iter()
        .map(|route| (score_route(request, &route), route))
        .collect();
    ranked.sort_by(|a, b| b.0.total_score.cmp(&a.0.total_score));
    ranked
}

/// Truncate to the best `limit` matches.
///
/// Sorts (stable) before truncating, so the result is a prefix of the
/// descending-score order even for unsorted input. Short inputs are
/// returned whole.
pub fn top_matches(mut scores: Vec<MatchScore>, limit: usize) -> Vec<MatchScore> {
    scores.sort_by(|a, b| b.total_score.cmp(&a.total_score));
    scores.truncate(limit);
    scores
}

fn score_route(request: &DeliveryRequest, route: &GillerRoute) -> MatchScore {
    let mut total = BASE_SCORE;

    if stations_match(request, route) {
        total += STATION_MATCH_BONUS;
    }
    if route.days.intersects(&request.preferred_days) {
        total += DAY_MATCH_BONUS;
    }
    if hour_distance(request, route) <= 1 {
        total += TIME_MATCH_BONUS;
    }

    let reason = if total >= HIGH_SCORE_THRESHOLD {
        REASON_HIGH
    } else {
        REASON_BASIC
    };

    MatchScore {
        giller_id: route.giller_id.clone(),
        total_score: total,
        reason,
    }
}

pub(crate) fn stations_match(request: &DeliveryRequest, route: &GillerRoute) -> bool {
    route.start_station.name == request.pickup_station_name
        && route.end_station.name == request.delivery_station_name
}

pub(crate) fn hour_distance(request: &DeliveryRequest, route: &GillerRoute) -> u8 {
    let route_hour = route.departure_time.hour();
    let request_hour = request.pickup_window.start.hour();
    route_hour.abs_diff(request_hour)
}
