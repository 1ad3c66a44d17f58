//! Station and travel-edge reference data.
//!
//! Loaded once per session and never mutated afterwards. The travel-edge
//! graph is directed; travel times may differ by direction.

use std::fmt;

use serde::{Deserialize, Serialize};

/// An opaque station identifier from the reference data set.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StationId(String);

impl StationId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for StationId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A subway line identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LineId(String);

impl LineId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Fallback line for edges whose stations share no listed line.
    pub fn unknown() -> Self {
        Self("unknown".to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for LineId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A WGS84 coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    /// Kilometres per degree of latitude (and, approximately, longitude at
    /// Seoul's latitude).
    pub const KM_PER_DEGREE: f64 = 111.0;

    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Straight-line distance in kilometres using the flat-earth
    /// approximation. Adequate at metro-network scale.
    pub fn distance_km(&self, other: &GeoPoint) -> f64 {
        let dlat = self.lat - other.lat;
        let dlng = self.lng - other.lng;
        (dlat * dlat + dlng * dlng).sqrt() * Self::KM_PER_DEGREE
    }
}

/// A line a station is served by.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Line {
    pub line_id: LineId,
    pub line_name: String,
}

impl Line {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            line_id: LineId::new(id),
            line_name: name.into(),
        }
    }
}

/// A subway station.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Station {
    pub id: StationId,
    pub name: String,
    pub location: GeoPoint,
    pub lines: Vec<Line>,
}

impl Station {
    pub fn line_ids(&self) -> impl Iterator<Item = &LineId> {
        self.lines.iter().map(|l| &l.line_id)
    }

    pub fn serves_line(&self, line: &LineId) -> bool {
        self.lines.iter().any(|l| &l.line_id == line)
    }
}

/// A directed travel-time edge between adjacent stations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TravelEdge {
    pub from: StationId,
    pub to: StationId,
    /// Travel time on a normal service, in seconds.
    pub normal_secs: u32,
    /// Travel time on an express service, if one runs this segment.
    pub express_secs: Option<u32>,
    /// Transfers implied by riding this edge (0 for plain segments).
    #[serde(default)]
    pub transfer_count: u32,
    /// Lines serving this edge; the first entry is authoritative.
    pub line_ids: Vec<LineId>,
}

impl TravelEdge {
    pub fn new(
        from: impl Into<String>,
        to: impl Into<String>,
        normal_secs: u32,
        line: impl Into<String>,
    ) -> Self {
        Self {
            from: StationId::new(from),
            to: StationId::new(to),
            normal_secs,
            express_secs: None,
            transfer_count: 0,
            line_ids: vec![LineId::new(line)],
        }
    }

    pub fn with_express(mut self, express_secs: u32) -> Self {
        self.express_secs = Some(express_secs);
        self
    }
}
