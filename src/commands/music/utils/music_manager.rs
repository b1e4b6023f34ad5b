use dashmap::DashMap;
use serenity::model::id::{ChannelId, GuildId, MessageId};
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;
use tracing::{debug, error, info, warn};

use super::embedded_messages::ControlSurface;
use super::event_handlers::TrackEnded;
use super::media_source::MediaUrl;
use super::play_queue::{Boundary, EndReason, Navigation, PlayQueue, Transition};
use super::session_registry::SessionRegistry;
use super::voice_backend::{SongbirdBackend, VoiceBackend};

/// Errors that can occur during music operations
#[derive(Error, Debug)]
pub enum MusicError {
    #[error("Not in a guild")]
    NotInGuild,

    #[error("Invalid media link: {0}")]
    InvalidInput(String),

    #[error("User is not in a voice channel")]
    UserNotInVoiceChannel,

    #[error("Failed to join voice channel: {0}")]
    JoinError(String),

    #[error("Not connected to a voice channel")]
    NotConnected,

    #[error("Playback error: {0}")]
    PlaybackError(String),

    #[error("Nothing is playing in this server")]
    NoActiveSession,

    #[error("Already at the {0} track")]
    BoundaryNavigation(Boundary),

    #[error("Track {index} is outside a queue of {len}")]
    TrackOutOfRange { index: usize, len: usize },

    #[error("Unknown control: {0}")]
    UnknownControl(String),
}

impl MusicError {
    /// Text shown to the member whose request failed
    pub fn user_message(&self) -> String {
        match self {
            MusicError::InvalidInput(reason) => format!("Send a direct media link: {}", reason),
            MusicError::UserNotInVoiceChannel => "Join a voice channel first!".to_string(),
            MusicError::NotConnected => {
                "I lost my voice connection. Press 🔁 Replay to reconnect.".to_string()
            }
            MusicError::JoinError(_)
            | MusicError::PlaybackError(_)
            | MusicError::TrackOutOfRange { .. } => {
                "Something went wrong while playing the track.".to_string()
            }
            MusicError::BoundaryNavigation(Boundary::First) => {
                "This is already the first track.".to_string()
            }
            MusicError::BoundaryNavigation(Boundary::Last) => {
                "This is already the last track.".to_string()
            }
            other => other.to_string(),
        }
    }

    /// Whether only the invoking member should see the reply
    pub fn is_ephemeral(&self) -> bool {
        !matches!(
            self,
            MusicError::InvalidInput(_)
                | MusicError::UserNotInVoiceChannel
                | MusicError::JoinError(_)
                | MusicError::PlaybackError(_)
        )
    }

    /// Failures caused by the voice/media side rather than by the request
    pub fn is_connection_failure(&self) -> bool {
        matches!(
            self,
            MusicError::JoinError(_)
                | MusicError::NotConnected
                | MusicError::PlaybackError(_)
                | MusicError::TrackOutOfRange { .. }
        )
    }
}

/// Result type for music operations
pub type MusicResult<T> = Result<T, MusicError>;

/// The message that carries a guild's control buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlMessage {
    pub channel_id: ChannelId,
    pub message_id: MessageId,
}

/// Live playback state for one guild.
///
/// The voice connection and the playing track are owned by the backend and
/// keyed by guild; a session only exists while both are held.
#[derive(Debug, Clone)]
pub struct Session {
    pub queue: PlayQueue,
    pub voice_channel: ChannelId,
    pub control_message: Option<ControlMessage>,
    generation: u64,
}

impl Session {
    /// Generation tag of the track that is currently playing
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Map a track-end event onto the session. Events from tracks that were
    /// replaced by next/prev/replay carry an older generation and are ignored.
    pub fn transition(&self, generation: u64, reason: EndReason) -> Transition {
        if generation != self.generation {
            return Transition::Ignore;
        }
        self.queue.after_track_end(reason)
    }
}

/// Outcome of a `!play` command
#[derive(Debug)]
pub enum Enqueued {
    /// A new session was created and the first track started
    Started { surface: ControlSurface },
    /// The track joined an existing queue; playback was not interrupted
    Appended {
        position: usize,
        track: String,
        surface: ControlSurface,
        control_message: Option<ControlMessage>,
    },
}

/// Surface to publish after a track-end event
#[derive(Debug)]
pub struct SurfaceUpdate {
    pub control_message: Option<ControlMessage>,
    pub surface: ControlSurface,
}

pub type MusicController = PlaybackController<SongbirdBackend>;

/// Drives the queue of every guild: starts tracks, follows completions and
/// applies button presses.
pub struct PlaybackController<B> {
    backend: B,
    sessions: SessionRegistry<Session>,
    // Queues of sessions stopped by a member, kept so `replay` can rebuild them
    retired: DashMap<GuildId, PlayQueue>,
    media_prefix: String,
    generations: AtomicU64,
}

impl<B: VoiceBackend> PlaybackController<B> {
    pub fn new(backend: B, media_prefix: impl Into<String>) -> Self {
        Self {
            backend,
            sessions: SessionRegistry::new(),
            retired: DashMap::new(),
            media_prefix: media_prefix.into(),
            generations: AtomicU64::new(0),
        }
    }

    pub fn sessions(&self) -> &SessionRegistry<Session> {
        &self.sessions
    }

    /// Snapshot of a guild's live session
    pub async fn session(&self, guild_id: GuildId) -> Option<Session> {
        let snapshot = self.sessions.room(guild_id).await.get().cloned();
        self.sessions.prune(guild_id);
        snapshot
    }

    pub fn has_retired_queue(&self, guild_id: GuildId) -> bool {
        self.retired.contains_key(&guild_id)
    }

    /// Handle `!play <url>`: start a session or append to the running one
    pub async fn enqueue(
        &self,
        guild_id: GuildId,
        voice_channel: Option<ChannelId>,
        raw_url: Option<&str>,
    ) -> MusicResult<Enqueued> {
        let url = MediaUrl::parse(raw_url.unwrap_or_default(), &self.media_prefix)?;

        let mut room = self.sessions.room(guild_id).await;
        if let Some(session) = room.get_mut() {
            let position = session.queue.push(url.as_str());
            info!(
                "Appended {} to queue for guild {} at position {}",
                url, guild_id, position
            );
            return Ok(Enqueued::Appended {
                position,
                track: url.to_string(),
                surface: ControlSurface::playing(&session.queue),
                control_message: session.control_message,
            });
        }

        let Some(voice_channel) = voice_channel else {
            drop(room);
            self.sessions.prune(guild_id);
            return Err(MusicError::UserNotInVoiceChannel);
        };

        let queue = PlayQueue::new(url.as_str());
        match self.open_session(guild_id, voice_channel, queue, None).await {
            Ok(session) => {
                let surface = ControlSurface::playing(&session.queue);
                room.set(session);
                self.retired.remove(&guild_id);
                Ok(Enqueued::Started { surface })
            }
            Err(err) => {
                drop(room);
                self.sessions.prune(guild_id);
                Err(err)
            }
        }
    }

    /// Make `message` the guild's control message. Returns the message it
    /// replaced, whose buttons are now stale.
    pub async fn attach_control_message(
        &self,
        guild_id: GuildId,
        message: ControlMessage,
    ) -> Option<ControlMessage> {
        let mut room = self.sessions.room(guild_id).await;
        let replaced = match room.get_mut() {
            Some(session) => session
                .control_message
                .replace(message)
                .filter(|previous| *previous != message),
            None => {
                debug!(
                    "No session for guild {} to attach a control message to",
                    guild_id
                );
                None
            }
        };
        drop(room);
        self.sessions.prune(guild_id);
        replaced
    }

    /// Halt playback, leave the voice channel and drop the session
    pub async fn stop(&self, guild_id: GuildId) -> MusicResult<ControlSurface> {
        let mut room = self.sessions.room(guild_id).await;
        let session = room.delete().ok_or(MusicError::NoActiveSession)?;

        if let Err(e) = self.backend.stop(guild_id).await {
            warn!("Failed to stop track for guild {}: {}", guild_id, e);
        }
        self.release(guild_id).await;

        info!(
            "Stopped playback for guild {} at track {}/{}",
            guild_id,
            session.queue.current_index() + 1,
            session.queue.len()
        );

        let surface = ControlSurface::stopped(&session.queue);
        self.retired.insert(guild_id, session.queue);
        drop(room);
        self.sessions.prune(guild_id);

        Ok(surface)
    }

    /// Move one track forward or back
    pub async fn navigate(
        &self,
        guild_id: GuildId,
        navigation: Navigation,
    ) -> MusicResult<ControlSurface> {
        let mut room = self.sessions.room(guild_id).await;
        let session = room.get_mut().ok_or(MusicError::NoActiveSession)?;

        let index = session.queue.target(navigation)?;
        self.resolve_and_play(guild_id, session, index).await?;

        Ok(ControlSurface::playing(&session.queue))
    }

    /// Restart the current track, rebuilding a stopped session if needed.
    ///
    /// A live session whose voice connection was lost rejoins `voice_channel`
    /// (or the channel it was playing in) before restarting.
    pub async fn replay(
        &self,
        guild_id: GuildId,
        voice_channel: Option<ChannelId>,
        control_message: Option<ControlMessage>,
    ) -> MusicResult<ControlSurface> {
        let mut room = self.sessions.room(guild_id).await;

        if let Some(session) = room.get_mut() {
            let index = session.queue.current_index();
            match self.resolve_and_play(guild_id, session, index).await {
                Ok(()) => {}
                Err(MusicError::NotConnected) => {
                    let channel = voice_channel.unwrap_or(session.voice_channel);
                    warn!(
                        "Voice connection for guild {} was lost; rejoining channel {}",
                        guild_id, channel
                    );
                    self.backend.join(guild_id, channel).await?;
                    session.voice_channel = channel;
                    self.resolve_and_play(guild_id, session, index).await?;
                }
                Err(err) => return Err(err),
            }
            if control_message.is_some() {
                session.control_message = control_message;
            }
            return Ok(ControlSurface::playing(&session.queue));
        }

        let rebuilt = match self.retired.get(&guild_id) {
            Some(queue) => match voice_channel {
                Some(voice_channel) => Ok((queue.clone(), voice_channel)),
                None => Err(MusicError::UserNotInVoiceChannel),
            },
            None => Err(MusicError::NoActiveSession),
        };
        let (queue, voice_channel) = match rebuilt {
            Ok(parts) => parts,
            Err(err) => {
                drop(room);
                self.sessions.prune(guild_id);
                return Err(err);
            }
        };

        match self
            .open_session(guild_id, voice_channel, queue, control_message)
            .await
        {
            Ok(session) => {
                let surface = ControlSurface::playing(&session.queue);
                room.set(session);
                self.retired.remove(&guild_id);
                Ok(surface)
            }
            Err(err) => {
                drop(room);
                self.sessions.prune(guild_id);
                Err(err)
            }
        }
    }

    /// Current surface of a live session
    pub async fn surface(&self, guild_id: GuildId) -> MusicResult<ControlSurface> {
        let surface = self
            .sessions
            .room(guild_id)
            .await
            .get()
            .map(|session| ControlSurface::playing(&session.queue));
        self.sessions.prune(guild_id);
        surface.ok_or(MusicError::NoActiveSession)
    }

    /// Follow a finished (or failed) track: advance, or tear the session down
    /// once the queue is exhausted.
    pub async fn on_track_end(&self, ended: TrackEnded) -> Option<SurfaceUpdate> {
        let guild_id = ended.guild_id;
        let mut room = self.sessions.room(guild_id).await;

        if room.get().is_none() {
            debug!(
                "Ignoring end of track {} for guild {}: no session",
                ended.generation, guild_id
            );
            drop(room);
            self.sessions.prune(guild_id);
            return None;
        }
        let session = room.get_mut()?;

        let transition = session.transition(ended.generation, ended.reason);
        debug!(
            "Track {} ended ({:?}) for guild {}: {:?}",
            ended.generation, ended.reason, guild_id, transition
        );

        let update = match transition {
            Transition::Ignore => return None,
            Transition::Advance(index) => {
                match self.resolve_and_play(guild_id, session, index).await {
                    Ok(()) => {
                        return Some(SurfaceUpdate {
                            control_message: session.control_message,
                            surface: ControlSurface::playing(&session.queue),
                        });
                    }
                    Err(err) => {
                        error!("Failed to advance queue for guild {}: {}", guild_id, err);
                        let session = room.delete()?;
                        self.release(guild_id).await;
                        SurfaceUpdate {
                            control_message: session.control_message,
                            surface: ControlSurface::failed(&session.queue),
                        }
                    }
                }
            }
            Transition::Teardown { failed } => {
                let session = room.delete()?;
                self.release(guild_id).await;
                info!("Queue finished for guild {}", guild_id);
                let surface = if failed {
                    ControlSurface::failed(&session.queue)
                } else {
                    ControlSurface::completed(&session.queue)
                };
                SurfaceUpdate {
                    control_message: session.control_message,
                    surface,
                }
            }
        };

        self.retired.remove(&guild_id);
        drop(room);
        self.sessions.prune(guild_id);
        Some(update)
    }

    /// Join the member's channel and start the current entry of `queue`.
    /// Nothing is left behind when either step fails.
    async fn open_session(
        &self,
        guild_id: GuildId,
        voice_channel: ChannelId,
        queue: PlayQueue,
        control_message: Option<ControlMessage>,
    ) -> MusicResult<Session> {
        self.backend.join(guild_id, voice_channel).await?;

        let index = queue.current_index();
        let mut session = Session {
            queue,
            voice_channel,
            control_message,
            generation: 0,
        };

        if let Err(err) = self.resolve_and_play(guild_id, &mut session, index).await {
            self.release(guild_id).await;
            return Err(err);
        }

        info!(
            "Created session for guild {} in channel {}",
            guild_id, voice_channel
        );
        Ok(session)
    }

    /// Start the entry at `index`. The session only changes once the backend
    /// reports the track as playing.
    async fn resolve_and_play(
        &self,
        guild_id: GuildId,
        session: &mut Session,
        index: usize,
    ) -> MusicResult<()> {
        let url = session
            .queue
            .get(index)
            .ok_or(MusicError::TrackOutOfRange {
                index,
                len: session.queue.len(),
            })?
            .to_owned();

        let generation = self.generations.fetch_add(1, Ordering::Relaxed) + 1;
        self.backend.play(guild_id, &url, generation).await?;

        session.queue.set_current(index)?;
        session.generation = generation;

        info!(
            "Playing track {}/{} for guild {}: {}",
            index + 1,
            session.queue.len(),
            guild_id,
            url
        );
        Ok(())
    }

    async fn release(&self, guild_id: GuildId) {
        if let Err(e) = self.backend.leave(guild_id).await {
            warn!("Failed to leave voice channel for guild {}: {}", guild_id, e);
        }
    }
}
