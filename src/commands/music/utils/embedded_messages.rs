use poise::CreateReply;
use serenity::all::{
    CreateActionRow, CreateEmbed, CreateInteractionResponseFollowup, EditInteractionResponse,
    EditMessage, Http,
};

use super::button_controls::{self, ControlButton};
use super::media_source::track_label;
use super::music_manager::{ControlMessage, MusicError};
use super::play_queue::PlayQueue;
use crate::Error;
use tracing::warn;

/// Most tracks listed in a queue summary
const MAX_LISTED_TRACKS: usize = 15;

const COLOR_PLAYING: u32 = 0x00ff00;
const COLOR_STOPPED: u32 = 0xffa500;
const COLOR_ERROR: u32 = 0xff0000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceState {
    Playing,
    Stopped,
    Completed,
    Failed,
    /// The controls now live on a newer message
    Moved,
}

/// What a control message shows: a title, the queue summary and its buttons
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlSurface {
    pub state: SurfaceState,
    pub summary: String,
    pub buttons: Vec<ControlButton>,
}

impl ControlSurface {
    pub fn playing(queue: &PlayQueue) -> Self {
        Self {
            state: SurfaceState::Playing,
            summary: queue_summary(queue),
            buttons: button_controls::playing_buttons(queue),
        }
    }

    pub fn stopped(queue: &PlayQueue) -> Self {
        Self {
            state: SurfaceState::Stopped,
            summary: format!(
                "{}\n\nPress 🔁 Replay to start again.",
                queue_summary(queue)
            ),
            buttons: button_controls::stopped_buttons(),
        }
    }

    pub fn completed(queue: &PlayQueue) -> Self {
        let plural = if queue.len() == 1 { "" } else { "s" };
        Self {
            state: SurfaceState::Completed,
            summary: format!("Played {} track{}.", queue.len(), plural),
            buttons: Vec::new(),
        }
    }

    pub fn failed(queue: &PlayQueue) -> Self {
        Self {
            state: SurfaceState::Failed,
            summary: format!(
                "Could not play `{}`. Playback has ended.",
                track_label(queue.current_track())
            ),
            buttons: Vec::new(),
        }
    }

    pub fn moved() -> Self {
        Self {
            state: SurfaceState::Moved,
            summary: "The player controls moved to a newer message.".to_string(),
            buttons: Vec::new(),
        }
    }

    pub fn title(&self) -> &'static str {
        match self.state {
            SurfaceState::Playing => "🎶 Now Playing",
            SurfaceState::Stopped => "🛑 Stopped",
            SurfaceState::Completed => "✅ Queue Complete",
            SurfaceState::Failed => "🚫 Playback Error",
            SurfaceState::Moved => "↪️ Controls Moved",
        }
    }

    fn color(&self) -> u32 {
        match self.state {
            SurfaceState::Playing | SurfaceState::Completed => COLOR_PLAYING,
            SurfaceState::Stopped | SurfaceState::Moved => COLOR_STOPPED,
            SurfaceState::Failed => COLOR_ERROR,
        }
    }

    pub fn embed(&self) -> CreateEmbed {
        CreateEmbed::new()
            .title(self.title())
            .description(&self.summary)
            .color(self.color())
    }

    pub fn components(&self) -> Vec<CreateActionRow> {
        button_controls::create_control_rows(&self.buttons)
    }

    /// A new message showing this surface
    pub fn reply(&self) -> CreateReply {
        CreateReply::default()
            .embed(self.embed())
            .components(self.components())
    }

    /// An edit turning an existing message into this surface
    pub fn edit(&self) -> EditMessage {
        EditMessage::new()
            .embed(self.embed())
            .components(self.components())
    }

    /// Redraw the message whose button was pressed
    pub fn edit_response(&self) -> EditInteractionResponse {
        EditInteractionResponse::new()
            .embed(self.embed())
            .components(self.components())
    }
}

/// `Track current/total` followed by one line per track, the active one marked
pub fn queue_summary(queue: &PlayQueue) -> String {
    let current = queue.current_index();
    let total = queue.len();

    let start = current
        .saturating_sub(MAX_LISTED_TRACKS / 2)
        .min(total.saturating_sub(MAX_LISTED_TRACKS));
    let end = (start + MAX_LISTED_TRACKS).min(total);

    let mut summary = format!("**Track {}/{}**\n", current + 1, total);
    if start > 0 {
        summary.push_str(&format!("… {} earlier\n", start));
    }
    for (index, url) in queue.tracks().iter().enumerate().take(end).skip(start) {
        let marker = if index == current { "▶️" } else { "▫️" };
        summary.push_str(&format!("{} {}. `{}`\n", marker, index + 1, track_label(url)));
    }
    if end < total {
        summary.push_str(&format!("… and {} more\n", total - end));
    }

    summary.trim_end().to_string()
}

/// Push a surface onto an existing control message
pub async fn publish(
    http: &Http,
    message: ControlMessage,
    surface: &ControlSurface,
) -> Result<(), Error> {
    message
        .channel_id
        .edit_message(http, message.message_id, surface.edit())
        .await?;
    Ok(())
}

/// Strip the buttons from a control message that has been replaced
pub async fn retire(http: &Http, message: ControlMessage) {
    if let Err(e) = publish(http, message, &ControlSurface::moved()).await {
        warn!(
            "Failed to retire control message {} in channel {}: {}",
            message.message_id, message.channel_id, e
        );
    }
}

/// Create an embed for when a track joined a running queue
pub fn added_to_queue(position: usize, url: &str) -> CreateReply {
    CreateReply::default().embed(
        CreateEmbed::new()
            .title("🎵 Added to Queue")
            .description(format!("`{}`", track_label(url)))
            .field("Position", format!("`#{}`", position), true)
            .color(COLOR_PLAYING),
    )
}

/// Reply to a failed command
pub fn error_reply(err: &MusicError) -> CreateReply {
    CreateReply::default()
        .embed(error_embed(err))
        .ephemeral(err.is_ephemeral())
}

/// Followup to a failed button press
pub fn error_followup(err: &MusicError) -> CreateInteractionResponseFollowup {
    CreateInteractionResponseFollowup::new()
        .embed(error_embed(err))
        .ephemeral(err.is_ephemeral())
}

fn error_embed(err: &MusicError) -> CreateEmbed {
    let title = match err {
        MusicError::BoundaryNavigation(_) | MusicError::NoActiveSession => "⛔ Not Possible",
        MusicError::UserNotInVoiceChannel => "🔊 Join a Voice Channel",
        _ => "❌ Error",
    };

    CreateEmbed::new()
        .title(title)
        .description(err.user_message())
        .color(COLOR_ERROR)
}
