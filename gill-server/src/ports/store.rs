//! Document store port.

use async_trait::async_trait;
use chrono::NaiveDateTime;

use crate::domain::{
    DeliveryRequest, GillerRoute, MatchRecord, MatchingStatus, RequestId, RequestStatus,
    TransferMatchRecord, UserId,
};

/// Error from the document store.
#[derive(Debug, Clone, thiserror::Error)]
pub enum StoreError {
    /// The store could not be reached; transient, retried by the scheduler.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// A write targeted a document that does not exist.
    #[error("document not found: {collection}/{id}")]
    NotFound {
        collection: &'static str,
        id: String,
    },
}

/// The document store as the matching core sees it.
///
/// The store is the single source of truth; the core coordinates through
/// it with fresh reads rather than in-memory shared state, and tolerates
/// benign lost updates between read and write.
#[async_trait]
pub trait MatchStore: Send + Sync {
    /// Fetch a delivery request by id. `None` when absent.
    async fn request(&self, id: &RequestId) -> Result<Option<DeliveryRequest>, StoreError>;

    async fn update_request_status(
        &self,
        id: &RequestId,
        status: RequestStatus,
    ) -> Result<(), StoreError>;

    async fn update_matching_status(
        &self,
        id: &RequestId,
        status: MatchingStatus,
    ) -> Result<(), StoreError>;

    /// All routes currently flagged active.
    async fn active_routes(&self) -> Result<Vec<GillerRoute>, StoreError>;

    async fn create_match(&self, record: &MatchRecord) -> Result<(), StoreError>;

    /// The match record for a (request, giller) pair, if one exists.
    async fn match_for(
        &self,
        request: &RequestId,
        giller: &UserId,
    ) -> Result<Option<MatchRecord>, StoreError>;

    async fn update_match(&self, record: &MatchRecord) -> Result<(), StoreError>;

    async fn create_transfer_match(&self, record: &TransferMatchRecord)
        -> Result<(), StoreError>;

    /// Requests still pending with matching not yet resolved, created
    /// before the cutoff. Used by the periodic monitor sweep.
    async fn pending_requests_older_than(
        &self,
        cutoff: NaiveDateTime,
    ) -> Result<Vec<RequestId>, StoreError>;
}
