use serenity::all::{GuildId, Http};
use serenity::async_trait;
use songbird::tracks::PlayMode;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::embedded_messages;
use super::music_manager::PlaybackController;
use super::play_queue::EndReason;
use super::voice_backend::VoiceBackend;

/// A track of some guild stopped producing audio
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackEnded {
    pub guild_id: GuildId,
    pub generation: u64,
    pub reason: EndReason,
}

/// Songbird event handler forwarding the end of a track to the controller
#[derive(Clone)]
pub struct TrackEndNotifier {
    pub guild_id: GuildId,
    pub generation: u64,
    pub events: mpsc::UnboundedSender<TrackEnded>,
}

impl TrackEndNotifier {
    /// Forward the end of this notifier's track to the controller
    pub fn notify(&self, reason: EndReason) {
        let ended = TrackEnded {
            guild_id: self.guild_id,
            generation: self.generation,
            reason,
        };
        if self.events.send(ended).is_err() {
            warn!(
                "Track event channel closed; dropping end of track {} for guild {}",
                self.generation, self.guild_id
            );
        }
    }
}

/// A track that ended in an error state failed; anything else finished
pub fn end_reason<'a>(modes: impl IntoIterator<Item = &'a PlayMode>) -> EndReason {
    if modes
        .into_iter()
        .any(|mode| matches!(mode, PlayMode::Errored(_)))
    {
        EndReason::Errored
    } else {
        EndReason::Finished
    }
}

#[async_trait]
impl songbird::EventHandler for TrackEndNotifier {
    async fn act(&self, ctx: &songbird::EventContext<'_>) -> Option<songbird::Event> {
        if let songbird::EventContext::Track(track_list) = ctx {
            self.notify(end_reason(track_list.iter().map(|(state, _)| &state.playing)));
        }
        None
    }
}

/// Feed track-end events into the controller and publish the surfaces it
/// produces. Runs until every sender is gone.
pub async fn pump_track_events<B: VoiceBackend + 'static>(
    controller: Arc<PlaybackController<B>>,
    http: Arc<Http>,
    mut events: mpsc::UnboundedReceiver<TrackEnded>,
) {
    info!("Track event pump started");

    while let Some(ended) = events.recv().await {
        debug!("Received {:?}", ended);
        let controller = Arc::clone(&controller);
        let http = Arc::clone(&http);

        // Guilds are independent; the controller serialises events per guild
        tokio::spawn(async move {
            let Some(update) = controller.on_track_end(ended).await else {
                return;
            };
            match update.control_message {
                Some(message) => {
                    let published =
                        embedded_messages::publish(&http, message, &update.surface).await;
                    if let Err(e) = published {
                        warn!(
                            "Failed to update control message for guild {}: {}",
                            ended.guild_id, e
                        );
                    }
                }
                None => debug!("Guild {} has no control message to update", ended.guild_id),
            }
        });
    }

    info!("Track event pump stopped");
}
