use ::serenity::all::{ComponentInteraction, GuildId};
use poise::serenity_prelude::Context;
use tracing::{info, warn};

use super::button_controls::ControlAction;
use super::embedded_messages::{self, ControlSurface};
use super::music_manager::{ControlMessage, MusicController, MusicError, MusicResult};
use super::play_queue::Navigation;
use super::voice_backend::user_voice_channel;

type ButtonInteractionResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

/// Handle a press on one of the control buttons
pub async fn handle_interaction(
    ctx: &Context,
    interaction: &ComponentInteraction,
    controller: &MusicController,
) -> ButtonInteractionResult {
    // Acknowledge right away; fetching the next track may take longer than
    // Discord waits for a response
    interaction.defer(ctx).await?;

    let outcome = match interaction.guild_id {
        Some(guild_id) => {
            // The pressed message becomes the control message; an older one
            // would otherwise keep showing live buttons
            let pressed = ControlMessage {
                channel_id: interaction.channel_id,
                message_id: interaction.message.id,
            };
            if let Some(previous) = controller.attach_control_message(guild_id, pressed).await {
                embedded_messages::retire(&ctx.http, previous).await;
            }
            apply_action(ctx, interaction, controller, guild_id, pressed).await
        }
        None => Err(MusicError::NotInGuild),
    };

    match outcome {
        Ok(surface) => {
            interaction
                .edit_response(&ctx.http, surface.edit_response())
                .await?;
        }
        Err(err) => {
            if err.is_connection_failure() {
                warn!(
                    "Button {} failed in guild {:?}: {}",
                    interaction.data.custom_id, interaction.guild_id, err
                );
            }
            interaction
                .create_followup(&ctx.http, embedded_messages::error_followup(&err))
                .await?;
        }
    }

    Ok(())
}

async fn apply_action(
    ctx: &Context,
    interaction: &ComponentInteraction,
    controller: &MusicController,
    guild_id: GuildId,
    pressed: ControlMessage,
) -> MusicResult<ControlSurface> {
    let action: ControlAction = interaction.data.custom_id.parse()?;
    info!(
        "{} pressed {:?} in guild {}",
        interaction.user.name, action, guild_id
    );

    match action {
        ControlAction::Stop => controller.stop(guild_id).await,
        ControlAction::Next => controller.navigate(guild_id, Navigation::Next).await,
        ControlAction::Previous => controller.navigate(guild_id, Navigation::Previous).await,
        ControlAction::Replay => {
            let voice_channel = user_voice_channel(ctx, guild_id, interaction.user.id);
            controller
                .replay(guild_id, voice_channel, Some(pressed))
                .await
        }
    }
}
