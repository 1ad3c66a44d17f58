//! Delivery request data and lifecycle states.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::{DaySet, RequestId, RouteTime, UserId};

/// Package size tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PackageSize {
    Small,
    Medium,
    Large,
}

/// Request lifecycle state.
///
/// `pending → matched → accepted → in_progress → completed`, with
/// `cancelled` reachable from any pre-completion state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    Pending,
    Matched,
    Accepted,
    InProgress,
    Completed,
    Cancelled,
}

impl RequestStatus {
    /// A giller may only accept while the request is still being matched.
    pub fn can_accept(&self) -> bool {
        matches!(self, Self::Pending | Self::Matched)
    }

    pub fn can_cancel(&self) -> bool {
        !matches!(self, Self::Completed | Self::Cancelled)
    }
}

/// Outcome of the asynchronous matching process for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchingStatus {
    #[serde(rename = "pending")]
    Pending,
    #[serde(rename = "matched")]
    Matched,
    #[serde(rename = "no-match")]
    NoMatch,
}

/// A pickup time window, inclusive on both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: RouteTime,
    pub end: RouteTime,
}

/// A crowd-sourced delivery request.
///
/// Created once by a requester; immutable once matching begins except for
/// the status fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryRequest {
    pub request_id: RequestId,
    pub requester_id: UserId,
    pub pickup_station_name: String,
    pub delivery_station_name: String,
    pub pickup_window: TimeWindow,
    pub delivery_deadline: RouteTime,
    pub preferred_days: DaySet,
    pub package_size: PackageSize,
    pub package_weight_kg: f32,
    pub status: RequestStatus,
    pub matching_status: MatchingStatus,
    pub created_at: NaiveDateTime,
}
