use dotenv::dotenv;
use poise::serenity_prelude as serenity;
use rusty_jukebox::commands::{self, music::utils::event_handlers::pump_track_events};
use rusty_jukebox::commands::music::utils::{
    music_manager::MusicController, voice_backend::SongbirdBackend,
};
use rusty_jukebox::{Data, Error, config::Config, events::Handler};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Initialize logging with debug level for our crate
    FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("rusty_jukebox=debug,warn")),
        )
        .with_thread_ids(true)
        .with_line_number(true)
        .with_file(true)
        .with_target(true)
        .with_ansi(true)
        .pretty()
        .init();

    dotenv().ok();

    let config = Arc::new(Config::from_env()?);
    info!("Starting with {}", config.summary());

    let intents = serenity::GatewayIntents::non_privileged()
        | serenity::GatewayIntents::MESSAGE_CONTENT
        | serenity::GatewayIntents::GUILD_VOICE_STATES;

    // Voice manager shared by the gateway client and the playback backend
    let songbird = songbird::Songbird::serenity();
    let (track_events, track_events_rx) = mpsc::unbounded_channel();
    let backend = SongbirdBackend::new(
        Arc::clone(&songbird),
        reqwest::Client::new(),
        config.fetch_timeout,
        track_events,
    );
    let controller = Arc::new(MusicController::new(
        backend,
        config.media_url_prefix.clone(),
    ));

    let data = Data {
        controller: Arc::clone(&controller),
        config: Arc::clone(&config),
    };
    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: commands::all_commands(),
            prefix_options: poise::PrefixFrameworkOptions {
                prefix: Some(config.command_prefix.clone()),
                ..Default::default()
            },
            ..Default::default()
        })
        .setup(move |_ctx, ready, _framework| {
            Box::pin(async move {
                info!("Logged in as {}", ready.user.name);
                Ok(data)
            })
        })
        .build();

    let mut client = serenity::ClientBuilder::new(&config.discord_token, intents)
        .event_handler(Handler {
            controller: Arc::clone(&controller),
        })
        .voice_manager_arc(songbird)
        .framework(framework)
        .await?;

    tokio::spawn(pump_track_events(
        Arc::clone(&controller),
        client.http.clone(),
        track_events_rx,
    ));

    client.start().await.map_err(Into::into)
}
