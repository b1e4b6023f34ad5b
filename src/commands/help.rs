use crate::{CommandResult, Context};

/// Show the available commands, or details about one of them
#[poise::command(prefix_command, category = "General")]
pub async fn help(
    ctx: Context<'_>,
    #[description = "Specific command to show help about"] command: Option<String>,
) -> CommandResult {
    let prefix = ctx.data().config.command_prefix.clone();
    poise::builtins::help(
        ctx,
        command.as_deref(),
        poise::builtins::HelpConfiguration {
            extra_text_at_bottom: &format!(
                "Type {prefix}help <command> for more info on a command. \
                 Use the buttons under the player to stop, skip or replay."
            ),
            ..Default::default()
        },
    )
    .await
    .map_err(|e| e.into())
}
