//! Room registry: the process-wide mapping from room id to live room.
//!
//! An explicit object owned by the gateway — created at startup, torn down
//! at shutdown, no ambient global. The registry is the only component that
//! creates or destroys rooms, and "an empty room is deleted" is enforced
//! here as a hard rule on every membership-reducing reply, not as a
//! best-effort sweep.

use std::collections::HashMap;

use cardforge_protocol::{PlayerId, RoomId};

use crate::room::spawn_room;
use crate::{GameConfig, RoomError, RoomHandle};

/// Default command channel size for room actors.
const DEFAULT_CHANNEL_SIZE: usize = 64;

/// Tracks every live room.
pub struct RoomRegistry {
    rooms: HashMap<RoomId, RoomHandle>,
    config: GameConfig,
}

impl RoomRegistry {
    /// Creates an empty registry.
    pub fn new(config: GameConfig) -> Self {
        Self {
            rooms: HashMap::new(),
            config,
        }
    }

    /// Returns the room with this id, creating an empty shell if it does
    /// not exist (idempotent). The boolean reports whether a room was
    /// created by this call.
    pub fn create_or_get(&mut self, room_id: &RoomId) -> (RoomHandle, bool) {
        if let Some(handle) = self.rooms.get(room_id) {
            return (handle.clone(), false);
        }
        let handle = spawn_room(room_id.clone(), self.config.clone(), DEFAULT_CHANNEL_SIZE);
        self.rooms.insert(room_id.clone(), handle.clone());
        tracing::info!(%room_id, "room created");
        (handle, true)
    }

    /// Looks up a live room.
    pub fn get(&self, room_id: &RoomId) -> Option<RoomHandle> {
        self.rooms.get(room_id).cloned()
    }

    /// Removes a player from a room; deletes the room if it empties.
    pub async fn leave(
        &mut self,
        room_id: &RoomId,
        player_id: PlayerId,
    ) -> Result<(), RoomError> {
        let handle = self
            .get(room_id)
            .ok_or_else(|| RoomError::NotFound(room_id.clone()))?;
        let remaining = handle.leave(player_id).await?;
        if remaining == 0 {
            self.destroy(room_id).await;
        }
        Ok(())
    }

    /// Reports a dropped connection; deletes the room if it empties. The
    /// player's seat data survives inside the room for as long as the room
    /// does.
    pub async fn disconnect(
        &mut self,
        room_id: &RoomId,
        player_id: PlayerId,
    ) -> Result<(), RoomError> {
        let handle = self
            .get(room_id)
            .ok_or_else(|| RoomError::NotFound(room_id.clone()))?;
        let remaining = handle.disconnect(player_id).await?;
        if remaining == 0 {
            self.destroy(room_id).await;
        }
        Ok(())
    }

    /// Shuts a room down and forgets it.
    async fn destroy(&mut self, room_id: &RoomId) {
        if let Some(handle) = self.rooms.remove(room_id) {
            let _ = handle.shutdown().await;
            tracing::info!(%room_id, "room destroyed (empty)");
        }
    }

    /// Number of live rooms.
    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    /// Ids of all live rooms.
    pub fn room_ids(&self) -> Vec<RoomId> {
        self.rooms.keys().cloned().collect()
    }
}

impl Default for RoomRegistry {
    fn default() -> Self {
        Self::new(GameConfig::default())
    }
}
