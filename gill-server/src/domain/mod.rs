//! Domain types for the courier matching core.
//!
//! These are the validated data model types shared by the pathfinding,
//! scoring, and orchestration layers. Reference data (stations, travel
//! edges) is immutable once loaded; giller routes and delivery requests
//! are owned by their respective services and read-only to the matching
//! core except for status transitions.

mod ids;
mod matching;
mod request;
mod route;
mod station;
mod time;
mod transfer;

pub use ids::{ChannelId, MatchId, RequestId, UserId};
pub use matching::{
    CongestionLevel, MatchRecord, MatchResult, MatchScore, MatchStatus, RouteDetails,
};
pub use request::{DeliveryRequest, MatchingStatus, PackageSize, RequestStatus, TimeWindow};
pub use route::GillerRoute;
pub use station::{GeoPoint, Line, LineId, Station, StationId, TravelEdge};
pub use time::{DayError, DaySet, RouteTime, TimeError};
pub use transfer::{TransferMatchRecord, TransferPossibility, TransferPricing};
