//! Matching engine: pure scoring and ranking of candidate routes.
//!
//! The ranking invariant lives in [`score`]: an additive score with a
//! stable descending sort. [`detail`] decorates ranked candidates with
//! presentation-level component scores and route metrics for display.

mod detail;
mod score;

pub use detail::{detailed_result, route_details_for, ScoreWeights};
pub use score::{
    rank_routes, score_candidates, top_matches, BASE_SCORE, DEFAULT_TOP_LIMIT,
    HIGH_SCORE_THRESHOLD, REASON_BASIC, REASON_HIGH,
};

#[cfg(test)]
pub(crate) use score::test_support;
