use super::*;
use crate::commands::music::utils::{
    embedded_messages,
    music_manager::{ControlMessage, MusicError},
};

/// Show the current queue with its controls
#[poise::command(prefix_command, guild_only, category = "Music")]
pub async fn queue(ctx: Context<'_>) -> CommandResult {
    let guild_id = ctx.guild_id().ok_or(MusicError::NotInGuild)?;
    let controller = &ctx.data().controller;

    let surface = match controller.surface(guild_id).await {
        Ok(surface) => surface,
        Err(err) => {
            ctx.send(embedded_messages::error_reply(&err)).await?;
            return Ok(());
        }
    };

    // The freshly posted message takes over as the control message
    let reply = ctx.send(surface.reply()).await?;
    let message = reply.message().await?;
    let replaced = controller
        .attach_control_message(
            guild_id,
            ControlMessage {
                channel_id: message.channel_id,
                message_id: message.id,
            },
        )
        .await;
    if let Some(previous) = replaced {
        embedded_messages::retire(ctx.http(), previous).await;
    }

    Ok(())
}
