use serenity::all::ComponentInteraction;
use serenity::async_trait;
use serenity::model::application::Interaction;
use serenity::model::gateway::Ready;
use serenity::prelude::*;
use std::sync::Arc;
use tracing::{debug, error, info};

use crate::commands::music::utils::button_controls::ControlAction;
use crate::commands::music::utils::component_handlers;
use crate::commands::music::utils::music_manager::MusicController;

pub struct Handler {
    pub controller: Arc<MusicController>,
}

#[async_trait]
impl serenity::prelude::EventHandler for Handler {
    async fn ready(&self, _ctx: Context, ready: Ready) {
        info!(
            "{} is connected to {} guild(s)",
            ready.user.name,
            ready.guilds.len()
        );
    }

    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        if let Interaction::Component(component) = interaction {
            if component.data.custom_id.parse::<ControlAction>().is_ok() {
                self.control_interaction(&ctx, &component).await;
            } else {
                debug!("Ignoring component {}", component.data.custom_id);
            }
        }
    }
}

impl Handler {
    /// Handle presses on the playback control buttons
    async fn control_interaction(&self, ctx: &Context, component: &ComponentInteraction) {
        if let Err(e) =
            component_handlers::handle_interaction(ctx, component, &self.controller).await
        {
            error!("Error handling component interaction: {}", e);
        }
    }
}
