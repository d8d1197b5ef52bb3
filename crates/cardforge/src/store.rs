//! Durable-store boundary.
//!
//! The authoritative state of a live match is the in-memory room — the
//! durable copy only records boundary facts: that a room came into being,
//! and how a match ended. The gateway invokes these hooks outside any room
//! critical section, so a slow store never stalls gameplay.

use cardforge_protocol::RoomId;
use cardforge_room::MatchResult;

/// External persistence collaborator. Implement against your document
/// store; failures are the implementation's to handle (retry, log, drop) —
/// the gateway does not interpret them.
pub trait MatchStore: Send + Sync + 'static {
    /// A room was created.
    fn room_created(&self, room_id: RoomId) -> impl std::future::Future<Output = ()> + Send;

    /// A match finished with the given winner and round scores.
    fn match_finished(
        &self,
        room_id: RoomId,
        result: MatchResult,
    ) -> impl std::future::Future<Output = ()> + Send;
}

/// Store that records nothing. The default for tests and for deployments
/// that keep no durable history.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopStore;

impl MatchStore for NoopStore {
    async fn room_created(&self, _room_id: RoomId) {}

    async fn match_finished(&self, _room_id: RoomId, _result: MatchResult) {}
}
