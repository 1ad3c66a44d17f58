//! Matching orchestration.
//!
//! Drives a request through the matching state machine: `pending` requests
//! are ranked against active giller routes, the top candidates become
//! persisted match records with a notification each, and a giller's accept
//! or decline settles the outcome. Each attempt is a sequential pipeline
//! (fetch, filter, score, persist, notify); async fan-out is used only to
//! overlap the persist and notify I/O, never for shared mutable state.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use chrono::Datelike;
use futures::future::join_all;
use serde_json::json;
use tracing::{debug, info, warn};

use crate::cache::{Clock, TtlCache};
use crate::domain::{
    ChannelId, DeliveryRequest, GillerRoute, MatchRecord, MatchResult, MatchScore, MatchStatus,
    MatchingStatus, RequestId, RequestStatus, UserId,
};
use crate::graph::StationGraph;
use crate::matching::{detailed_result, rank_routes, route_details_for, ScoreWeights};
use crate::ports::{ChatService, MatchStore, Notification, Notifier, StoreError};

const ROUTE_CACHE_KEY: &str = "routes:active";

/// Error from an orchestration operation.
#[derive(Debug, thiserror::Error)]
pub enum OrchestratorError {
    /// Matching was asked about a request that does not exist.
    #[error("요청을 찾을 수 없습니다: {0}")]
    RequestNotFound(RequestId),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Outcome of a guarded state transition.
///
/// Business-rule rejections (already matched, no such match offer) are
/// routine caller branches, so they come back as a value rather than an
/// error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionOutcome {
    pub success: bool,
    pub message: String,
}

impl ActionOutcome {
    fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    fn rejected(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

/// Orchestrator tuning knobs.
#[derive(Debug, Clone)]
pub struct MatchingConfig {
    /// Matches returned by a lookup.
    pub default_top_n: usize,
    /// Matches materialized and notified per processing pass.
    pub process_top_n: usize,
    pub route_cache_ttl: Duration,
    pub weights: ScoreWeights,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            default_top_n: 5,
            process_top_n: 3,
            route_cache_ttl: Duration::from_secs(60),
            weights: ScoreWeights::default(),
        }
    }
}

/// Coordinates matching across the store, notifier, and chat ports.
pub struct MatchingOrchestrator<S, N, C> {
    store: Arc<S>,
    notifier: Arc<N>,
    chat: Arc<C>,
    graph: Arc<StationGraph>,
    clock: Arc<dyn Clock>,
    route_cache: TtlCache<Vec<GillerRoute>>,
    config: MatchingConfig,
}

impl<S, N, C> MatchingOrchestrator<S, N, C>
where
    S: MatchStore,
    N: Notifier,
    C: ChatService,
{
    pub fn new(
        store: Arc<S>,
        notifier: Arc<N>,
        chat: Arc<C>,
        graph: Arc<StationGraph>,
        clock: Arc<dyn Clock>,
        config: MatchingConfig,
    ) -> Self {
        let route_cache = TtlCache::new(config.route_cache_ttl, clock.clone());
        Self {
            store,
            notifier,
            chat,
            graph,
            clock,
            route_cache,
            config,
        }
    }

    /// Rank active routes against a request and decorate the best.
    ///
    /// Idempotent over unchanged backing data: routes are filtered to
    /// today's weekday, scored by the pure matching engine, and decorated
    /// with component scores and pathfinding details for display.
    pub async fn find_matches_for_request(
        &self,
        request_id: &RequestId,
        top_n: usize,
    ) -> Result<Vec<MatchResult>, OrchestratorError> {
        let (request, ranked) = self.ranked_candidates(request_id, top_n).await?;

        Ok(ranked
            .iter()
            .map(|(_, route)| {
                let details = route_details_for(&self.graph, route);
                detailed_result(&request, route, details, &self.config.weights)
            })
            .collect())
    }

    /// Materialize the top candidates into match records and notify them.
    ///
    /// Returns the number of matches created; zero is a valid outcome
    /// meaning no candidates, not an error. Store failures propagate,
    /// notification failures are logged and swallowed.
    pub async fn process_matching_for_request(
        &self,
        request_id: &RequestId,
    ) -> Result<usize, OrchestratorError> {
        let (request, ranked) = self
            .ranked_candidates(request_id, self.config.process_top_n)
            .await?;

        if ranked.is_empty() {
            info!(request = %request_id, "no matching candidates");
            return Ok(0);
        }

        let now = self.clock.now();
        let records: Vec<MatchRecord> = ranked
            .iter()
            .map(|(score, route)| {
                MatchRecord::pending(
                    request.request_id.clone(),
                    route.giller_id.clone(),
                    score.total_score,
                    now,
                )
            })
            .collect();

        for result in join_all(records.iter().map(|r| self.store.create_match(r))).await {
            result?;
        }

        let deliveries = join_all(records.iter().map(|record| {
            let notification = Notification {
                title: "새로운 배송 요청".to_string(),
                body: format!(
                    "{} → {} 배송 요청이 회원님의 경로와 일치합니다",
                    request.pickup_station_name, request.delivery_station_name
                ),
                data: json!({
                    "requestId": request.request_id,
                    "matchId": record.match_id,
                }),
            };
            self.notifier.notify(&record.giller_id, notification)
        }))
        .await;
        for (record, delivery) in records.iter().zip(deliveries) {
            if let Err(err) = delivery {
                warn!(giller = %record.giller_id, %err, "match notification failed");
            }
        }

        self.store
            .update_request_status(request_id, RequestStatus::Matched)
            .await?;
        self.store
            .update_matching_status(request_id, MatchingStatus::Matched)
            .await?;

        info!(request = %request_id, matches = records.len(), "matching processed");
        Ok(records.len())
    }

    /// A giller accepts a match offer.
    ///
    /// Legal only while the request is still `pending` or `matched`; any
    /// later state comes back as a rejected outcome without touching the
    /// match record. On success the requester-giller chat channel is
    /// ensured exactly once, keyed deterministically by the request id.
    pub async fn accept_request(
        &self,
        request_id: &RequestId,
        giller_id: &UserId,
    ) -> Result<ActionOutcome, OrchestratorError> {
        let request = self.load_request(request_id).await?;

        if !request.status.can_accept() {
            return Ok(ActionOutcome::rejected(
                "이미 매칭이 진행 중인 요청입니다",
            ));
        }

        let Some(mut record) = self.store.match_for(request_id, giller_id).await? else {
            return Ok(ActionOutcome::rejected("해당 매칭 제안을 찾을 수 없습니다"));
        };

        record.status = MatchStatus::Accepted;
        self.store.update_match(&record).await?;
        self.store
            .update_request_status(request_id, RequestStatus::Accepted)
            .await?;

        let channel = ChannelId::for_request(request_id);
        let chat_result = async {
            self.chat
                .ensure_channel(&channel, &request.requester_id, giller_id)
                .await?;
            self.chat
                .post_system_message(&channel, "매칭이 완료되었습니다. 배송 세부사항을 논의해 주세요.")
                .await
        }
        .await;
        if let Err(err) = chat_result {
            warn!(%channel, %err, "chat channel setup failed");
        }

        info!(request = %request_id, giller = %giller_id, "match accepted");
        Ok(ActionOutcome::ok("매칭이 수락되었습니다"))
    }

    /// A giller declines a match offer.
    pub async fn decline_request(
        &self,
        request_id: &RequestId,
        giller_id: &UserId,
    ) -> Result<ActionOutcome, OrchestratorError> {
        let Some(mut record) = self.store.match_for(request_id, giller_id).await? else {
            return Ok(ActionOutcome::rejected("해당 매칭 제안을 찾을 수 없습니다"));
        };

        record.status = MatchStatus::Declined;
        record.declined_at = Some(self.clock.now());
        self.store.update_match(&record).await?;

        info!(request = %request_id, giller = %giller_id, "match declined");
        Ok(ActionOutcome::ok("매칭을 거절했습니다"))
    }

    /// The requester cancels a request.
    ///
    /// Legal from any non-terminal state; completed or already-cancelled
    /// requests come back as a rejected outcome.
    pub async fn cancel_request(
        &self,
        request_id: &RequestId,
    ) -> Result<ActionOutcome, OrchestratorError> {
        let request = self.load_request(request_id).await?;

        if !request.status.can_cancel() {
            return Ok(ActionOutcome::rejected(
                "이미 종료된 요청은 취소할 수 없습니다",
            ));
        }

        self.store
            .update_request_status(request_id, RequestStatus::Cancelled)
            .await?;

        info!(request = %request_id, "request cancelled");
        Ok(ActionOutcome::ok("요청이 취소되었습니다"))
    }

    /// Record the final matching outcome for a request.
    pub async fn mark_matching_status(
        &self,
        request_id: &RequestId,
        status: MatchingStatus,
    ) -> Result<(), OrchestratorError> {
        self.store.update_matching_status(request_id, status).await?;
        Ok(())
    }

    /// Requests still unresolved after the given age.
    pub async fn stale_pending_requests(
        &self,
        older_than: Duration,
    ) -> Result<Vec<RequestId>, OrchestratorError> {
        let age = chrono::Duration::from_std(older_than).unwrap_or(chrono::Duration::MAX);
        let cutoff = self
            .clock
            .now()
            .checked_sub_signed(age)
            .unwrap_or(chrono::NaiveDateTime::MIN);
        Ok(self.store.pending_requests_older_than(cutoff).await?)
    }

    /// Drop the cached route list, forcing a fresh read on the next match.
    pub fn invalidate_route_cache(&self) {
        self.route_cache.clear(ROUTE_CACHE_KEY);
    }

    pub fn default_top_n(&self) -> usize {
        self.config.default_top_n
    }

    async fn load_request(
        &self,
        request_id: &RequestId,
    ) -> Result<DeliveryRequest, OrchestratorError> {
        self.store
            .request(request_id)
            .await?
            .ok_or_else(|| OrchestratorError::RequestNotFound(request_id.clone()))
    }

    async fn ranked_candidates(
        &self,
        request_id: &RequestId,
        top_n: usize,
    ) -> Result<(DeliveryRequest, Vec<(MatchScore, GillerRoute)>), OrchestratorError> {
        let request = self.load_request(request_id).await?;
        let routes = self.active_routes_cached().await?;

        // Sunday maps to 7
        let today = self.clock.now().weekday().number_from_monday() as u8;
        let candidates: Vec<GillerRoute> = routes
            .into_iter()
            .filter(|route| route.days.contains(today))
            .collect();
        debug!(request = %request_id, today, candidates = candidates.len(), "ranking candidates");

        // A giller may register several routes; ranking keeps each score
        // paired with its own route, and only the giller's best-ranked
        // route survives (match records are one per (request, giller)).
        let mut seen = HashSet::new();
        let mut ranked = rank_routes(&request, candidates);
        ranked.retain(|(score, _)| seen.insert(score.giller_id.clone()));
        ranked.truncate(top_n);

        Ok((request, ranked))
    }

    async fn active_routes_cached(&self) -> Result<Vec<GillerRoute>, OrchestratorError> {
        if let Some(routes) = self.route_cache.get(ROUTE_CACHE_KEY) {
            return Ok(routes);
        }
        let routes = self.store.active_routes().await?;
        self.route_cache.set(ROUTE_CACHE_KEY, routes.clone());
        Ok(routes)
    }
}
