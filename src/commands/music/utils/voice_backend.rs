use dashmap::DashMap;
use serenity::all::Context;
use serenity::async_trait;
use serenity::model::id::{ChannelId, GuildId, UserId};
use serenity::prelude::Mutex as SerenityMutex;
use songbird::tracks::{Track, TrackHandle};
use songbird::{Call, Event, Songbird, TrackEvent};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::event_handlers::{TrackEndNotifier, TrackEnded};
use super::media_source::create_input_from_url;
use super::music_manager::{MusicError, MusicResult};

/// Voice side of playback: the connection to a channel and the audio sink
/// that streams a track into it.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VoiceBackend: Send + Sync {
    /// Connect to a voice channel of a guild
    async fn join(&self, guild_id: GuildId, channel_id: ChannelId) -> MusicResult<()>;

    /// Drop the guild's voice connection, if any
    async fn leave(&self, guild_id: GuildId) -> MusicResult<()>;

    /// Start streaming `url`, replacing the guild's current track only once
    /// the new stream is playable. `generation` tags the track's end event.
    /// Fails with [`MusicError::NotConnected`] when the voice connection is gone.
    async fn play(&self, guild_id: GuildId, url: &str, generation: u64) -> MusicResult<()>;

    /// Halt whatever is playing for the guild
    async fn stop(&self, guild_id: GuildId) -> MusicResult<()>;
}

/// [`VoiceBackend`] on top of songbird
pub struct SongbirdBackend {
    songbird: Arc<Songbird>,
    http_client: reqwest::Client,
    fetch_timeout: Duration,
    events: mpsc::UnboundedSender<TrackEnded>,
    tracks: DashMap<GuildId, TrackHandle>,
}

impl SongbirdBackend {
    pub fn new(
        songbird: Arc<Songbird>,
        http_client: reqwest::Client,
        fetch_timeout: Duration,
        events: mpsc::UnboundedSender<TrackEnded>,
    ) -> Self {
        Self {
            songbird,
            http_client,
            fetch_timeout,
            events,
            tracks: DashMap::new(),
        }
    }

    fn call(&self, guild_id: GuildId) -> MusicResult<Arc<SerenityMutex<Call>>> {
        self.songbird.get(guild_id).ok_or(MusicError::NotConnected)
    }

    fn attach_notifier(&self, handle: &TrackHandle, guild_id: GuildId, generation: u64) {
        let notifier = TrackEndNotifier {
            guild_id,
            generation,
            events: self.events.clone(),
        };

        for event in [TrackEvent::End, TrackEvent::Error] {
            if let Err(e) = handle.add_event(Event::Track(event), notifier.clone()) {
                warn!(
                    "Failed to watch {:?} of track {} for guild {}: {}",
                    event, generation, guild_id, e
                );
            }
        }
    }
}

#[async_trait]
impl VoiceBackend for SongbirdBackend {
    async fn join(&self, guild_id: GuildId, channel_id: ChannelId) -> MusicResult<()> {
        self.songbird
            .join(guild_id, channel_id)
            .await
            .map_err(|e| MusicError::JoinError(e.to_string()))?;

        info!("Joined voice channel {} in guild {}", channel_id, guild_id);
        Ok(())
    }

    async fn leave(&self, guild_id: GuildId) -> MusicResult<()> {
        self.tracks.remove(&guild_id);

        if self.songbird.get(guild_id).is_none() {
            return Ok(());
        }

        self.songbird
            .remove(guild_id)
            .await
            .map_err(|e| MusicError::JoinError(e.to_string()))?;

        info!("Left voice channel in guild {}", guild_id);
        Ok(())
    }

    async fn play(&self, guild_id: GuildId, url: &str, generation: u64) -> MusicResult<()> {
        let call = self.call(guild_id)?;
        let input = create_input_from_url(&self.http_client, url);

        // Load the new track paused next to the old one so a broken link
        // never interrupts what is already playing
        let handle = {
            let mut handler = call.lock().await;
            // Kicked or moved out by someone else; the driver would play into nothing
            if handler.current_connection().is_none() {
                return Err(MusicError::NotConnected);
            }
            handler.play(Track::from(input).pause())
        };

        match tokio::time::timeout(self.fetch_timeout, handle.make_playable_async()).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                let _ = handle.stop();
                return Err(MusicError::PlaybackError(format!(
                    "could not open {}: {}",
                    url, e
                )));
            }
            Err(_) => {
                let _ = handle.stop();
                return Err(MusicError::PlaybackError(format!(
                    "timed out after {}s opening {}",
                    self.fetch_timeout.as_secs(),
                    url
                )));
            }
        }

        self.attach_notifier(&handle, guild_id, generation);

        if let Some((_, previous)) = self.tracks.remove(&guild_id) {
            if let Err(e) = previous.stop() {
                debug!("Previous track for guild {} already gone: {}", guild_id, e);
            }
        }

        if let Err(e) = handle.play() {
            let _ = handle.stop();
            return Err(MusicError::PlaybackError(e.to_string()));
        }
        self.tracks.insert(guild_id, handle);

        Ok(())
    }

    async fn stop(&self, guild_id: GuildId) -> MusicResult<()> {
        if let Some((_, handle)) = self.tracks.remove(&guild_id) {
            if let Err(e) = handle.stop() {
                debug!("Track for guild {} already stopped: {}", guild_id, e);
            }
        }

        if let Ok(call) = self.call(guild_id) {
            call.lock().await.stop();
        }

        Ok(())
    }
}

/// Get the voice channel ID that the user is currently in
pub fn user_voice_channel(
    ctx: &Context,
    guild_id: GuildId,
    user_id: UserId,
) -> Option<ChannelId> {
    let guild = ctx.cache.guild(guild_id)?;
    guild
        .voice_states
        .get(&user_id)
        .and_then(|voice_state| voice_state.channel_id)
}
