//! Giller route data.

use serde::{Deserialize, Serialize};

use super::{DaySet, RouteTime, Station, UserId};

/// A commuter's registered subway route.
///
/// Owned by the giller and managed through route management; the matching
/// core treats routes as read-only candidates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GillerRoute {
    pub giller_id: UserId,
    pub giller_name: String,
    pub start_station: Station,
    pub end_station: Station,
    pub departure_time: RouteTime,
    pub days: DaySet,
    /// Giller rating in [0, 5].
    pub rating: f32,
    pub total_deliveries: u32,
    pub completed_deliveries: u32,
    /// Inactive routes are excluded from matching.
    pub active: bool,
}

impl GillerRoute {
    /// Fraction of deliveries completed, in [0, 1]. Zero history scores zero.
    pub fn completion_rate(&self) -> f32 {
        if self.total_deliveries == 0 {
            0.0
        } else {
            self.completed_deliveries as f32 / self.total_deliveries as f32
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{GeoPoint, Line, StationId};

    fn station(id: &str, name: &str) -> Station {
        Station {
            id: StationId::new(id),
            name: name.to_string(),
            location: GeoPoint::new(37.5, 127.0),
            lines: vec![Line::new("2", "2호선")],
        }
    }

    fn route(total: u32, completed: u32) -> GillerRoute {
        GillerRoute {
            giller_id: UserId::new("g1"),
            giller_name: "김민수".to_string(),
            start_station: station("133", "서울역"),
            end_station: station("222", "강남역"),
            departure_time: RouteTime::parse("08:00").unwrap(),
            days: DaySet::weekdays(),
            rating: 4.5,
            total_deliveries: total,
            completed_deliveries: completed,
            active: true,
        }
    }

    #[test]
    fn completion_rate() {
        assert_eq!(route(0, 0).completion_rate(), 0.0);
        assert_eq!(route(10, 5).completion_rate(), 0.5);
        assert_eq!(route(4, 4).completion_rate(), 1.0);
    }
}
