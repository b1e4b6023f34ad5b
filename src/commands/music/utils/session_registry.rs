//! Process-wide map from guild to its playback session.
//!
//! Each guild owns a slot guarded by its own async mutex. Holding a
//! [`RoomGuard`] serialises every read-modify-write on that guild, including
//! the awaits in between, while other guilds proceed untouched.

use dashmap::DashMap;
use serenity::model::id::GuildId;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

type Slot<S> = Arc<Mutex<Option<S>>>;

/// Registry holding at most one session per guild
pub struct SessionRegistry<S> {
    rooms: DashMap<GuildId, Slot<S>>,
}

impl<S> Default for SessionRegistry<S> {
    fn default() -> Self {
        Self {
            rooms: DashMap::new(),
        }
    }
}

impl<S: Send + 'static> SessionRegistry<S> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lock the slot for a guild, creating an empty one if needed
    pub async fn room(&self, guild_id: GuildId) -> RoomGuard<S> {
        // Clone the Arc out so the DashMap shard lock is released before awaiting.
        // The clone is taken under the shard lock, so `prune` sees it.
        let slot = self.rooms.entry(guild_id).or_default().clone();
        RoomGuard {
            guard: slot.lock_owned().await,
        }
    }

    /// Drop the slot for a guild if it is empty and nobody else references it
    pub fn prune(&self, guild_id: GuildId) {
        self.rooms.remove_if(&guild_id, |_, slot| {
            // Any outstanding clone may be about to lock and fill the slot
            Arc::strong_count(slot) == 1
                && slot.try_lock().map(|s| s.is_none()).unwrap_or(false)
        });
    }

    /// Number of guilds that currently have a live session
    pub async fn active_rooms(&self) -> usize {
        let slots: Vec<Slot<S>> = self.rooms.iter().map(|e| e.value().clone()).collect();
        let mut count = 0;
        for slot in slots {
            if slot.lock().await.is_some() {
                count += 1;
            }
        }
        count
    }

    pub async fn contains(&self, guild_id: GuildId) -> bool {
        let slot = match self.rooms.get(&guild_id) {
            Some(slot) => slot.value().clone(),
            None => return false,
        };
        slot.lock().await.is_some()
    }
}

/// Exclusive access to one guild's session slot
pub struct RoomGuard<S> {
    guard: OwnedMutexGuard<Option<S>>,
}

impl<S> RoomGuard<S> {
    pub fn get(&self) -> Option<&S> {
        self.guard.as_ref()
    }

    pub fn get_mut(&mut self) -> Option<&mut S> {
        self.guard.as_mut()
    }

    /// Store a session, returning the one it replaced
    pub fn set(&mut self, session: S) -> Option<S> {
        self.guard.replace(session)
    }

    pub fn delete(&mut self) -> Option<S> {
        self.guard.take()
    }
}
