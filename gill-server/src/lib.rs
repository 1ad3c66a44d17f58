//! Subway courier matching server.
//!
//! Matches crowd-sourced delivery requests against commuters ("gillers")
//! who carry packages along their registered subway routes: shortest-path
//! queries over the station graph, additive match scoring, transfer
//! bridging through shared stations, and an orchestration layer that
//! persists matches, notifies candidates, and retries with backoff.

pub mod cache;
pub mod domain;
pub mod graph;
pub mod matching;
pub mod orchestrator;
pub mod ports;
pub mod retry;
pub mod transfer;
pub mod validator;
