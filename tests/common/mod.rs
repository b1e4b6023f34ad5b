//! Common test utilities, fixtures, and mocks
//! This module contains shared functionality used across different test categories

pub mod mocks;

use std::sync::Arc;

use rusty_jukebox::commands::music::utils::music_manager::PlaybackController;

use mocks::{MockBackend, VoiceLog};

/// Controller over a recording backend on which the given tracks fail to open
pub fn controller_failing_on(
    failing: &[&str],
) -> (Arc<PlaybackController<MockBackend>>, VoiceLog) {
    crate::test_utils::init();
    let (backend, log) = mocks::recording_backend(failing);
    let controller = PlaybackController::new(backend, fixtures::MEDIA_PREFIX);
    (Arc::new(controller), log)
}

/// Controller over a recording backend on which every track plays
pub fn controller() -> (Arc<PlaybackController<MockBackend>>, VoiceLog) {
    controller_failing_on(&[])
}
