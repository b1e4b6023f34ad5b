//! Mock implementations for external dependencies
//! This module contains mock objects used for testing

use async_trait::async_trait;
use mockall::mock;
use rusty_jukebox::commands::music::utils::music_manager::{MusicError, MusicResult};
use rusty_jukebox::commands::music::utils::voice_backend::VoiceBackend;
use serenity::model::id::{ChannelId, GuildId};
use std::sync::{Arc, Mutex};

mock! {
    pub Backend {}

    #[async_trait]
    impl VoiceBackend for Backend {
        async fn join(&self, guild_id: GuildId, channel_id: ChannelId) -> MusicResult<()>;
        async fn leave(&self, guild_id: GuildId) -> MusicResult<()>;
        async fn play(&self, guild_id: GuildId, url: &str, generation: u64) -> MusicResult<()>;
        async fn stop(&self, guild_id: GuildId) -> MusicResult<()>;
    }
}

/// Something the controller asked the voice side to do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoiceCall {
    Join(GuildId, ChannelId),
    Leave(GuildId),
    Play(GuildId, String, u64),
    Stop(GuildId),
}

/// Shared record of every backend call, in order
#[derive(Clone, Default)]
pub struct VoiceLog(Arc<Mutex<Vec<VoiceCall>>>);

impl VoiceLog {
    fn push(&self, call: VoiceCall) {
        self.0.lock().unwrap().push(call);
    }

    pub fn calls(&self) -> Vec<VoiceCall> {
        self.0.lock().unwrap().clone()
    }

    pub fn joins(&self, guild_id: GuildId) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, VoiceCall::Join(g, _) if *g == guild_id))
            .count()
    }

    /// Links handed to `play` for a guild, successful or not
    pub fn played(&self, guild_id: GuildId) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                VoiceCall::Play(g, url, _) if g == guild_id => Some(url),
                _ => None,
            })
            .collect()
    }

    /// Generation of the most recent `play` for a guild
    pub fn last_generation(&self, guild_id: GuildId) -> u64 {
        self.calls()
            .iter()
            .rev()
            .find_map(|call| match call {
                VoiceCall::Play(g, _, generation) if *g == guild_id => Some(*generation),
                _ => None,
            })
            .expect("no track was played")
    }

    /// Whether the guild's last join has not been followed by a leave
    pub fn is_connected(&self, guild_id: GuildId) -> bool {
        self.calls()
            .iter()
            .rev()
            .find_map(|call| match call {
                VoiceCall::Join(g, _) if *g == guild_id => Some(true),
                VoiceCall::Leave(g) if *g == guild_id => Some(false),
                _ => None,
            })
            .unwrap_or(false)
    }
}

/// Backend that records every call; `play` fails for the given links
pub fn recording_backend(failing: &[&str]) -> (MockBackend, VoiceLog) {
    let log = VoiceLog::default();
    let failing: Vec<String> = failing.iter().map(|url| url.to_string()).collect();
    let mut backend = MockBackend::new();

    let calls = log.clone();
    backend.expect_join().returning(move |guild_id, channel_id| {
        calls.push(VoiceCall::Join(guild_id, channel_id));
        Ok(())
    });

    let calls = log.clone();
    backend.expect_leave().returning(move |guild_id| {
        calls.push(VoiceCall::Leave(guild_id));
        Ok(())
    });

    let calls = log.clone();
    backend.expect_stop().returning(move |guild_id| {
        calls.push(VoiceCall::Stop(guild_id));
        Ok(())
    });

    let calls = log.clone();
    backend
        .expect_play()
        .returning(move |guild_id, url, generation| {
            calls.push(VoiceCall::Play(guild_id, url.to_string(), generation));
            if failing.iter().any(|bad| bad == url) {
                Err(MusicError::PlaybackError(format!("404 for {}", url)))
            } else {
                Ok(())
            }
        });

    (backend, log)
}
