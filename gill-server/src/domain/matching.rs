//! Match scoring results and persisted match records.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::{MatchId, RequestId, UserId};

/// A ranked candidate score from the matching engine.
///
/// This is the ranking output: ordering is defined by `total_score` alone,
/// with ties keeping candidate input order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchScore {
    pub giller_id: UserId,
    pub total_score: u32,
    pub reason: &'static str,
}

/// Congestion heuristic for a departure hour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CongestionLevel {
    Low,
    Medium,
    High,
}

impl CongestionLevel {
    /// Rush hours are congested, midday is quiet, everything else in between.
    pub fn from_hour(hour: u8) -> Self {
        match hour {
            7..=8 | 18..=19 => Self::High,
            10..=15 => Self::Low,
            _ => Self::Medium,
        }
    }
}

/// Route metrics surfaced for display alongside a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteDetails {
    pub travel_time_secs: u32,
    pub transfer_count: u32,
    pub express_available: bool,
    pub congestion: CongestionLevel,
}

/// A fully decorated match, computed per request and never persisted
/// directly; the top N are materialized into [`MatchRecord`]s.
///
/// The component scores and weighted total are presentation-adjacent and
/// do not participate in the ranking invariant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchResult {
    pub giller_id: UserId,
    pub giller_name: String,
    pub route_match_score: f32,
    pub time_match_score: f32,
    pub rating_score: f32,
    pub completion_rate_score: f32,
    pub total_score: f32,
    pub route_details: Option<RouteDetails>,
    pub reasons: Vec<String>,
}

/// Status of a persisted match record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    Pending,
    Accepted,
    Declined,
}

/// A persisted match between a request and a giller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub match_id: MatchId,
    pub request_id: RequestId,
    pub giller_id: UserId,
    pub match_score: u32,
    pub status: MatchStatus,
    pub created_at: NaiveDateTime,
    pub declined_at: Option<NaiveDateTime>,
}

impl MatchRecord {
    pub fn pending(
        request_id: RequestId,
        giller_id: UserId,
        match_score: u32,
        created_at: NaiveDateTime,
    ) -> Self {
        Self {
            match_id: MatchId::for_pair(&request_id, &giller_id),
            request_id,
            giller_id,
            match_score,
            status: MatchStatus::Pending,
            created_at,
            declined_at: None,
        }
    }
}
