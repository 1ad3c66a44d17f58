//! Station graph storage.

use std::collections::HashMap;

use crate::domain::{Station, StationId, TravelEdge};

/// The subway network: stations plus directed travel-time edges.
///
/// Loaded once per session. The graph may be asymmetric when travel times
/// differ by direction; an edge A→B does not imply B→A.
#[derive(Debug, Clone, Default)]
pub struct StationGraph {
    stations: HashMap<StationId, Station>,
    by_name: HashMap<String, StationId>,
    edges: HashMap<StationId, Vec<TravelEdge>>,
}

impl StationGraph {
    /// Create an empty graph. Queries against an empty graph return no
    /// results rather than failing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph from reference data in one pass.
    pub fn from_parts(stations: Vec<Station>, edges: Vec<TravelEdge>) -> Self {
        let mut graph = Self::new();
        for station in stations {
            graph.add_station(station);
        }
        for edge in edges {
            graph.add_edge(edge);
        }
        graph
    }

    pub fn add_station(&mut self, station: Station) {
        self.by_name.insert(station.name.clone(), station.id.clone());
        self.stations.insert(station.id.clone(), station);
    }

    pub fn add_edge(&mut self, edge: TravelEdge) {
        self.edges.entry(edge.from.clone()).or_default().push(edge);
    }

    pub fn station(&self, id: &StationId) -> Option<&Station> {
        self.stations.get(id)
    }

    pub fn station_by_name(&self, name: &str) -> Option<&Station> {
        self.by_name.get(name).and_then(|id| self.stations.get(id))
    }

    pub fn contains(&self, id: &StationId) -> bool {
        self.stations.contains_key(id)
    }

    pub fn edges_from(&self, id: &StationId) -> &[TravelEdge] {
        self.edges.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn station_ids(&self) -> impl Iterator<Item = &StationId> {
        self.stations.keys()
    }

    pub fn station_count(&self) -> usize {
        self.stations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }

    /// The directed edge between two adjacent stations, if any.
    pub fn edge_between(&self, from: &StationId, to: &StationId) -> Option<&TravelEdge> {
        self.edges_from(from).iter().find(|e| &e.to == to)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{GeoPoint, Line};

    fn station(id: &str, name: &str) -> Station {
        Station {
            id: StationId::new(id),
            name: name.to_string(),
            location: GeoPoint::new(37.5, 127.0),
            lines: vec![Line::new("2", "2호선")],
        }
    }

    #[test]
    fn lookup_by_id_and_name() {
        let graph = StationGraph::from_parts(
            vec![station("222", "강남역"), station("223", "역삼역")],
            vec![TravelEdge::new("222", "223", 120, "2")],
        );

        assert_eq!(graph.station_count(), 2);
        assert_eq!(graph.station(&StationId::new("222")).unwrap().name, "강남역");
        assert_eq!(graph.station_by_name("역삼역").unwrap().id.as_str(), "223");
        assert!(graph.station_by_name("없는역").is_none());
    }

    #[test]
    fn edges_are_directed() {
        let graph = StationGraph::from_parts(
            vec![station("222", "강남역"), station("223", "역삼역")],
            vec![TravelEdge::new("222", "223", 120, "2")],
        );

        assert_eq!(graph.edges_from(&StationId::new("222")).len(), 1);
        assert!(graph.edges_from(&StationId::new("223")).is_empty());
        assert!(graph
            .edge_between(&StationId::new("223"), &StationId::new("222"))
            .is_none());
    }

    #[test]
    fn empty_graph() {
        let graph = StationGraph::new();
        assert!(graph.is_empty());
        assert!(graph.station_by_name("강남역").is_none());
        assert!(graph.edges_from(&StationId::new("222")).is_empty());
    }
}
