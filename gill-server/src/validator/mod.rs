//! Route input validation and travel-time estimation.
//!
//! Validation separates hard errors (unknown station, identical endpoints,
//! empty day set, malformed time) from soft heuristics that flag a low
//! matching likelihood but never block submission. The travel-time
//! estimator prefers the pathfinding engine and falls back to a
//! straight-line distance estimate, so it never hard-fails on missing
//! graph data.

use std::sync::Arc;

use tracing::debug;

use crate::domain::{DaySet, RouteTime};
use crate::graph::StationGraph;

/// Rush-hour windows in minutes from midnight: 07:00-09:00 and 18:00-20:00.
const RUSH_WINDOWS: [(u16, u16); 2] = [(7 * 60, 9 * 60), (18 * 60, 20 * 60)];

/// Off-peak window with long headways: 10:00-15:59.
const OFF_PEAK: (u16, u16) = (10 * 60, 16 * 60 - 1);

/// Average in-network speed assumed by the fallback estimator, km/h.
const FALLBACK_SPEED_KMH: f64 = 40.0;

/// The fallback estimate never goes below this, in minutes.
const MIN_ESTIMATE_MINS: u32 = 10;

/// Stations in the commercial core where commute-hour demand for couriers
/// far outstrips supply.
const CENTRAL_STATIONS: [&str; 6] = ["서울역", "시청", "강남역", "홍대입구", "여의도", "종로3가"];

/// Result of validating route input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteValidation {
    pub is_valid: bool,
    /// Hard invariant violations; any entry blocks submission.
    pub errors: Vec<String>,
    /// Soft heuristics; never block submission.
    pub warnings: Vec<String>,
}

/// Stateless validation over the station reference data.
pub struct RouteValidator {
    graph: Arc<StationGraph>,
}

impl RouteValidator {
    pub fn new(graph: Arc<StationGraph>) -> Self {
        Self { graph }
    }

    /// Validate route creation input.
    pub fn validate_route_input(
        &self,
        start_name: &str,
        end_name: &str,
        departure: &str,
        days: &DaySet,
    ) -> RouteValidation {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        let start = self.graph.station_by_name(start_name);
        let end = self.graph.station_by_name(end_name);

        if start.is_none() {
            errors.push(format!("출발역을 찾을 수 없습니다: {start_name}"));
        }
        if end.is_none() {
            errors.push(format!("도착역을 찾을 수 없습니다: {end_name}"));
        }
        if start_name == end_name {
            errors.push("출발역과 도착역이 같습니다".to_string());
        }
        if days.is_empty() {
            errors.push("요일을 하나 이상 선택해 주세요".to_string());
        }

        match RouteTime::parse(departure) {
            Err(_) => errors.push("출발 시간 형식이 올바르지 않습니다 (HH:mm)".to_string()),
            Ok(time) => {
                let mins = time.minutes_from_midnight();

                if !in_rush_hour(mins) {
                    warnings.push(
                        "출퇴근 시간대(07:00-09:00, 18:00-20:00) 밖이라 매칭 확률이 낮을 수 있습니다"
                            .to_string(),
                    );
                }
                if time.hour() < 5 || time.hour() >= 23 {
                    warnings.push("지하철 운행 시간이 아닐 수 있습니다".to_string());
                }
                if days.has_weekday() && days.has_weekend() {
                    warnings
                        .push("평일과 주말이 섞여 있으면 매칭 확률이 낮아질 수 있습니다".to_string());
                }
                if (OFF_PEAK.0..=OFF_PEAK.1).contains(&mins) {
                    warnings.push("낮 시간대(10:00-16:00)는 배차 간격이 깁니다".to_string());
                }
                if let (Some(start), Some(end)) = (start, end) {
                    let both_central = is_central(&start.name) && is_central(&end.name);
                    if both_central && in_rush_hour(mins) && days.has_weekday() {
                        warnings.push(
                            "출퇴근 시간대 도심 구간은 매칭 확률이 낮습니다".to_string(),
                        );
                    }
                }
            }
        }

        debug!(
            start = start_name,
            end = end_name,
            errors = errors.len(),
            warnings = warnings.len(),
            "route input validated"
        );

        RouteValidation {
            is_valid: errors.is_empty(),
            errors,
            warnings,
        }
    }

    /// Estimate travel time in minutes between two stations by name.
    ///
    /// Uses the pathfinding engine when both stations and a path exist;
    /// otherwise falls back to straight-line distance at an assumed average
    /// speed, floored at ten minutes. A station missing from the reference
    /// data entirely yields the floor.
    pub fn estimate_travel_time(&self, start_name: &str, end_name: &str) -> u32 {
        let start = self.graph.station_by_name(start_name);
        let end = self.graph.station_by_name(end_name);

        let (Some(start), Some(end)) = (start, end) else {
            return MIN_ESTIMATE_MINS;
        };

        if let Some(eta) = self.graph.calculate_eta(&start.id, &end.id) {
            return eta.minutes.max(1);
        }

        let km = start.location.distance_km(&end.location);
        let minutes = (km / FALLBACK_SPEED_KMH * 60.0).round() as u32;
        minutes.max(MIN_ESTIMATE_MINS)
    }
}

fn in_rush_hour(minutes_from_midnight: u16) -> bool {
    RUSH_WINDOWS
        .iter()
        .any(|(start, end)| (*start..=*end).contains(&minutes_from_midnight))
}

fn is_central(name: &str) -> bool {
    CENTRAL_STATIONS.contains(&name)
}
