//! Dijkstra shortest paths with transfer counting.
//!
//! Classic Dijkstra over the directed travel-edge graph with an
//! unvisited-set scan for the minimum tentative distance. O(V²) per query,
//! which is fine at metro-network scale (~500 stations); the loop exits
//! early once the target is settled.

use std::collections::{HashMap, HashSet};

use crate::domain::{LineId, StationId};

use super::StationGraph;

/// A shortest path between two stations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathResult {
    pub total_secs: u32,
    pub path: Vec<StationId>,
    pub transfer_count: u32,
}

/// An arrival estimate with the path as station names for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Eta {
    pub minutes: u32,
    pub stations: Vec<String>,
    pub transfer_count: u32,
}

impl StationGraph {
    /// Find the fastest route between two stations.
    ///
    /// Returns `None` when either endpoint is absent (including the empty,
    /// not-yet-initialized graph) or no path exists.
    pub fn shortest_path(&self, from: &StationId, to: &StationId) -> Option<PathResult> {
        if !self.contains(from) || !self.contains(to) {
            return None;
        }
        if from == to {
            return Some(PathResult {
                total_secs: 0,
                path: vec![from.clone()],
                transfer_count: 0,
            });
        }

        let mut dist: HashMap<StationId, u64> = HashMap::new();
        let mut prev: HashMap<StationId, StationId> = HashMap::new();
        let mut unvisited: HashSet<StationId> = self.station_ids().cloned().collect();
        dist.insert(from.clone(), 0);

        loop {
            // Scan for the unvisited station with the smallest tentative
            // distance. No finite candidate means the rest is unreachable.
            let current = unvisited
                .iter()
                .filter_map(|id| dist.get(id).map(|d| (id.clone(), *d)))
                .min_by_key(|(_, d)| *d)?;

            let (current_id, current_dist) = current;
            if &current_id == to {
                break;
            }
            unvisited.remove(&current_id);

            for edge in self.edges_from(&current_id) {
                if !unvisited.contains(&edge.to) {
                    continue;
                }
                let candidate = current_dist + edge.normal_secs as u64;
                if dist.get(&edge.to).is_none_or(|&d| candidate < d) {
                    dist.insert(edge.to.clone(), candidate);
                    prev.insert(edge.to.clone(), current_id.clone());
                }
            }
        }

        let total_secs = u32::try_from(*dist.get(to)?).ok()?;

        // Reconstruct the path from the predecessor map.
        let mut path = vec![to.clone()];
        let mut cursor = to;
        while let Some(p) = prev.get(cursor) {
            path.push(p.clone());
            cursor = p;
        }
        path.reverse();
        if path.first() != Some(from) {
            return None;
        }

        let transfer_count = self.count_transfers(&path);

        Some(PathResult {
            total_secs,
            path,
            transfer_count,
        })
    }

    /// Travel-time estimate in minutes with the path as station names.
    pub fn calculate_eta(&self, from: &StationId, to: &StationId) -> Option<Eta> {
        let result = self.shortest_path(from, to)?;
        let stations = result
            .path
            .iter()
            .map(|id| {
                self.station(id)
                    .map(|s| s.name.clone())
                    .unwrap_or_else(|| id.to_string())
            })
            .collect();

        Some(Eta {
            minutes: result.total_secs.div_ceil(60),
            stations,
            transfer_count: result.transfer_count,
        })
    }

    /// Count line changes along a reconstructed path.
    ///
    /// The first common line between consecutive stations anchors the
    /// current line; a transfer is counted only when the anchored line is
    /// no longer shared. An empty line intersection (data gap between
    /// adjacent stations) continues the current line rather than counting
    /// a spurious transfer.
    fn count_transfers(&self, path: &[StationId]) -> u32 {
        let mut transfers = 0;
        let mut current: Option<LineId> = None;

        for pair in path.windows(2) {
            let common = self.common_lines(&pair[0], &pair[1]);

            if common.is_empty() {
                // Trust the edge's authoritative line when the stations
                // share none; stay on the current line otherwise.
                if current.is_none() {
                    current = Some(self.edge_line(&pair[0], &pair[1]));
                }
                continue;
            }

            match &current {
                None => current = Some(common[0].clone()),
                Some(line) if common.contains(line) => {}
                Some(_) => {
                    transfers += 1;
                    current = Some(common[0].clone());
                }
            }
        }

        transfers
    }

    /// True when every edge along the path offers an express service.
    pub fn path_express_available(&self, path: &[StationId]) -> bool {
        if path.len() < 2 {
            return false;
        }
        path.windows(2).all(|pair| {
            self.edge_between(&pair[0], &pair[1])
                .is_some_and(|e| e.express_secs.is_some())
        })
    }

    /// Lines shared by two stations, in the first station's listing order.
    fn common_lines(&self, a: &StationId, b: &StationId) -> Vec<LineId> {
        match (self.station(a), self.station(b)) {
            (Some(a), Some(b)) => a
                .line_ids()
                .filter(|line| b.serves_line(line))
                .cloned()
                .collect(),
            _ => Vec::new(),
        }
    }

    fn edge_line(&self, from: &StationId, to: &StationId) -> LineId {
        self.edge_between(from, to)
            .and_then(|e| e.line_ids.first().cloned())
            .unwrap_or_else(LineId::unknown)
    }
}
