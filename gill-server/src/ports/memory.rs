//! In-memory port implementations.
//!
//! Back the demo binary and every orchestrator test. The store keeps all
//! collections behind one async mutex; fidelity to a real document store
//! matters more than throughput here.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;
use chrono::NaiveDateTime;
use tokio::sync::Mutex;

use crate::domain::{
    ChannelId, DeliveryRequest, GillerRoute, MatchId, MatchRecord, MatchingStatus, RequestId,
    RequestStatus, TransferMatchRecord, UserId,
};

use super::chat::{ChatError, ChatService};
use super::notify::{Notification, Notifier, NotifyError};
use super::store::{MatchStore, StoreError};

#[derive(Default)]
struct StoreState {
    requests: HashMap<RequestId, DeliveryRequest>,
    routes: Vec<GillerRoute>,
    matches: HashMap<MatchId, MatchRecord>,
    transfer_matches: Vec<TransferMatchRecord>,
}

/// In-memory [`MatchStore`].
///
/// `fail_next` injects transient [`StoreError::Unavailable`] failures: each
/// read or write decrements it and fails while it is positive, which is how
/// the retry tests exercise the backoff path.
#[derive(Default)]
pub struct InMemoryStore {
    state: Mutex<StoreState>,
    fail_next: AtomicU32,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn seed_request(&self, request: DeliveryRequest) {
        let mut state = self.state.lock().await;
        state.requests.insert(request.request_id.clone(), request);
    }

    pub async fn seed_route(&self, route: GillerRoute) {
        self.state.lock().await.routes.push(route);
    }

    /// Make the next `n` store operations fail with `Unavailable`.
    pub fn fail_next(&self, n: u32) {
        self.fail_next.store(n, Ordering::SeqCst);
    }

    /// Flip the active flag on all of a giller's routes.
    pub async fn set_route_active(&self, giller: &UserId, active: bool) {
        let mut state = self.state.lock().await;
        for route in state.routes.iter_mut().filter(|r| &r.giller_id == giller) {
            route.active = active;
        }
    }

    pub async fn match_record(&self, id: &MatchId) -> Option<MatchRecord> {
        self.state.lock().await.matches.get(id).cloned()
    }

    pub async fn match_count(&self) -> usize {
        self.state.lock().await.matches.len()
    }

    pub async fn transfer_match_count(&self) -> usize {
        self.state.lock().await.transfer_matches.len()
    }

    fn check_available(&self) -> Result<(), StoreError> {
        let remaining = self
            .fail_next
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .unwrap_or(0);
        if remaining > 0 {
            Err(StoreError::Unavailable("injected failure".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl MatchStore for InMemoryStore {
    async fn request(&self, id: &RequestId) -> Result<Option<DeliveryRequest>, StoreError> {
        self.check_available()?;
        Ok(self.state.lock().await.requests.get(id).cloned())
    }

    async fn update_request_status(
        &self,
        id: &RequestId,
        status: RequestStatus,
    ) -> Result<(), StoreError> {
        self.check_available()?;
        let mut state = self.state.lock().await;
        let request = state.requests.get_mut(id).ok_or_else(|| StoreError::NotFound {
            collection: "requests",
            id: id.to_string(),
        })?;
        request.status = status;
        Ok(())
    }

    async fn update_matching_status(
        &self,
        id: &RequestId,
        status: MatchingStatus,
    ) -> Result<(), StoreError> {
        self.check_available()?;
        let mut state = self.state.lock().await;
        let request = state.requests.get_mut(id).ok_or_else(|| StoreError::NotFound {
            collection: "requests",
            id: id.to_string(),
        })?;
        request.matching_status = status;
        Ok(())
    }

    async fn active_routes(&self) -> Result<Vec<GillerRoute>, StoreError> {
        self.check_available()?;
        let state = self.state.lock().await;
        Ok(state.routes.iter().filter(|r| r.active).cloned().collect())
    }

    async fn create_match(&self, record: &MatchRecord) -> Result<(), StoreError> {
        self.check_available()?;
        let mut state = self.state.lock().await;
        state.matches.insert(record.match_id.clone(), record.clone());
        Ok(())
    }

    async fn match_for(
        &self,
        request: &RequestId,
        giller: &UserId,
    ) -> Result<Option<MatchRecord>, StoreError> {
        self.check_available()?;
        let id = MatchId::for_pair(request, giller);
        Ok(self.state.lock().await.matches.get(&id).cloned())
    }

    async fn update_match(&self, record: &MatchRecord) -> Result<(), StoreError> {
        self.check_available()?;
        let mut state = self.state.lock().await;
        if !state.matches.contains_key(&record.match_id) {
            return Err(StoreError::NotFound {
                collection: "matches",
                id: record.match_id.to_string(),
            });
        }
        state.matches.insert(record.match_id.clone(), record.clone());
        Ok(())
    }

    async fn create_transfer_match(
        &self,
        record: &TransferMatchRecord,
    ) -> Result<(), StoreError> {
        self.check_available()?;
        self.state.lock().await.transfer_matches.push(record.clone());
        Ok(())
    }

    async fn pending_requests_older_than(
        &self,
        cutoff: NaiveDateTime,
    ) -> Result<Vec<RequestId>, StoreError> {
        self.check_available()?;
        let state = self.state.lock().await;
        Ok(state
            .requests
            .values()
            .filter(|r| {
                r.status == RequestStatus::Pending
                    && r.matching_status == MatchingStatus::Pending
                    && r.created_at < cutoff
            })
            .map(|r| r.request_id.clone())
            .collect())
    }
}

/// Notifier that records every delivery for assertions.
#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<(UserId, Notification)>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn sent(&self) -> Vec<(UserId, Notification)> {
        self.sent.lock().await.clone()
    }

    pub async fn sent_count(&self) -> usize {
        self.sent.lock().await.len()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, user: &UserId, notification: Notification) -> Result<(), NotifyError> {
        self.sent.lock().await.push((user.clone(), notification));
        Ok(())
    }
}

/// In-memory [`ChatService`] that counts channel creations.
#[derive(Default)]
pub struct InMemoryChat {
    channels: Mutex<HashMap<ChannelId, Vec<String>>>,
    creations: AtomicU32,
}

impl InMemoryChat {
    pub fn new() -> Self {
        Self::default()
    }

    /// How many times a channel was actually created, not merely ensured.
    pub fn creation_count(&self) -> u32 {
        self.creations.load(Ordering::SeqCst)
    }

    pub async fn messages(&self, channel: &ChannelId) -> Vec<String> {
        self.channels
            .lock()
            .await
            .get(channel)
            .cloned()
            .unwrap_or_default()
    }
}

#[async_trait]
impl ChatService for InMemoryChat {
    async fn ensure_channel(
        &self,
        channel: &ChannelId,
        _requester: &UserId,
        _giller: &UserId,
    ) -> Result<(), ChatError> {
        let mut channels = self.channels.lock().await;
        if !channels.contains_key(channel) {
            channels.insert(channel.clone(), Vec::new());
            self.creations.fetch_add(1, Ordering::SeqCst);
        }
        Ok(())
    }

    async fn post_system_message(&self, channel: &ChannelId, text: &str) -> Result<(), ChatError> {
        let mut channels = self.channels.lock().await;
        let messages = channels
            .get_mut(channel)
            .ok_or_else(|| ChatError(format!("no such channel: {channel}")))?;
        messages.push(text.to_string());
        Ok(())
    }
}
