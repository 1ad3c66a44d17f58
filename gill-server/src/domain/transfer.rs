//! Transfer-matching results and pricing.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::{MatchId, MatchStatus, RequestId, Station, StationId, UserId};

/// Whether two routes can be bridged through a shared station.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransferPossibility {
    pub can_transfer: bool,
    pub transfer_station: Option<Station>,
    /// Extra minutes on top of the giller's own route.
    pub additional_time_mins: i64,
    /// Total travel time of the bridged journey, in minutes.
    pub total_travel_time_mins: i64,
}

impl TransferPossibility {
    /// No shared station between the two routes.
    pub fn impossible() -> Self {
        Self {
            can_transfer: false,
            transfer_station: None,
            additional_time_mins: 0,
            total_travel_time_mins: 0,
        }
    }
}

/// Fee breakdown for a transfer match, in KRW.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferPricing {
    pub base_fee: u32,
    pub transfer_bonus: u32,
    pub subway_fee: u32,
    pub total_fee: u32,
    pub giller_earning: u32,
}

/// A persisted transfer match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferMatchRecord {
    pub match_id: MatchId,
    pub request_id: RequestId,
    pub giller_id: UserId,
    pub transfer_station_id: StationId,
    pub pricing: TransferPricing,
    pub status: MatchStatus,
    pub created_at: NaiveDateTime,
}
