use super::*;
use crate::commands::music::utils::{
    embedded_messages,
    music_manager::{ControlMessage, Enqueued, MusicError},
    voice_backend::user_voice_channel,
};
use tracing::{info, warn};

/// Play a media file, or add it to the queue if something is already playing
#[poise::command(prefix_command, guild_only, category = "Music")]
pub async fn play(
    ctx: Context<'_>,
    #[description = "Direct link to a media file"] url: Option<String>,
) -> CommandResult {
    let guild_id = ctx.guild_id().ok_or(MusicError::NotInGuild)?;
    info!(
        "Received play command from {} in guild {}: {:?}",
        ctx.author().name,
        guild_id,
        url
    );

    let voice_channel = user_voice_channel(ctx.serenity_context(), guild_id, ctx.author().id);
    let controller = &ctx.data().controller;

    // Opening the stream can take a while; show that we're on it
    ctx.defer_or_broadcast().await?;

    match controller
        .enqueue(guild_id, voice_channel, url.as_deref())
        .await
    {
        Ok(Enqueued::Started { surface }) => {
            let reply = ctx.send(surface.reply()).await?;
            let message = reply.message().await?;
            controller
                .attach_control_message(
                    guild_id,
                    ControlMessage {
                        channel_id: message.channel_id,
                        message_id: message.id,
                    },
                )
                .await;
        }
        Ok(Enqueued::Appended {
            position,
            track,
            surface,
            control_message,
        }) => {
            ctx.send(embedded_messages::added_to_queue(position, &track))
                .await?;

            if let Some(message) = control_message {
                if let Err(e) = embedded_messages::publish(ctx.http(), message, &surface).await {
                    warn!(
                        "Failed to refresh control message for guild {}: {}",
                        guild_id, e
                    );
                }
            }
        }
        Err(err) => {
            if err.is_connection_failure() {
                warn!("Play failed for guild {}: {}", guild_id, err);
            } else {
                info!("Rejected play in guild {}: {}", guild_id, err);
            }
            ctx.send(embedded_messages::error_reply(&err)).await?;
        }
    }

    Ok(())
}
