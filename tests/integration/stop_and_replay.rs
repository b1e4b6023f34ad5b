use assert_matches::assert_matches;
use pretty_assertions::assert_eq;
use rusty_jukebox::commands::music::utils::{
    button_controls::ControlAction,
    embedded_messages::SurfaceState,
    event_handlers::TrackEnded,
    music_manager::MusicError,
    play_queue::{EndReason, Navigation},
};

use crate::common::controller;
use crate::common::fixtures::*;
use crate::common::mocks::VoiceCall;

#[tokio::test]
async fn stop_releases_the_connection_and_removes_the_session() {
    let (controller, log) = controller();
    for url in [TRACK_A, TRACK_B] {
        controller
            .enqueue(room(), Some(voice_channel()), Some(url))
            .await
            .unwrap();
    }

    let surface = controller.stop(room()).await.unwrap();

    assert_eq!(surface.state, SurfaceState::Stopped);
    let actions: Vec<ControlAction> = surface.buttons.iter().map(|b| b.action).collect();
    assert_eq!(actions, vec![ControlAction::Replay]);
    assert!(controller.session(room()).await.is_none());
    assert_eq!(controller.sessions().active_rooms().await, 0);
    assert!(!log.is_connected(room()));
    let calls = log.calls();
    assert_eq!(
        &calls[calls.len() - 2..],
        &[VoiceCall::Stop(room()), VoiceCall::Leave(room())]
    );
}

#[tokio::test]
async fn buttons_after_stop_report_no_session() {
    let (controller, _) = controller();
    controller
        .enqueue(room(), Some(voice_channel()), Some(TRACK_A))
        .await
        .unwrap();
    controller.stop(room()).await.unwrap();

    assert_matches!(
        controller.navigate(room(), Navigation::Next).await,
        Err(MusicError::NoActiveSession)
    );
    assert_matches!(controller.stop(room()).await, Err(MusicError::NoActiveSession));
}

#[tokio::test]
async fn replay_after_stop_rebuilds_the_session_where_it_was() {
    let (controller, log) = controller();
    for url in [TRACK_A, TRACK_B, TRACK_C] {
        controller
            .enqueue(room(), Some(voice_channel()), Some(url))
            .await
            .unwrap();
    }
    controller.navigate(room(), Navigation::Next).await.unwrap();
    controller.stop(room()).await.unwrap();

    let surface = controller
        .replay(room(), Some(voice_channel()), Some(control_message()))
        .await
        .unwrap();

    assert_eq!(surface.state, SurfaceState::Playing);
    assert!(surface.summary.starts_with("**Track 2/3**"));
    let session = controller.session(room()).await.unwrap();
    assert_eq!(session.queue.tracks(), &[TRACK_A, TRACK_B, TRACK_C]);
    assert_eq!(session.queue.current_index(), 1);
    assert_eq!(session.control_message, Some(control_message()));
    assert_eq!(log.joins(room()), 2);
    assert!(log.is_connected(room()));
    assert_eq!(log.played(room()).last().unwrap(), TRACK_B);
    assert!(!controller.has_retired_queue(room()));
}

#[tokio::test]
async fn replay_on_a_live_session_restarts_the_current_track() {
    let (controller, log) = controller();
    controller
        .enqueue(room(), Some(voice_channel()), Some(TRACK_A))
        .await
        .unwrap();
    let first = log.last_generation(room());

    controller.replay(room(), None, None).await.unwrap();

    assert_eq!(log.played(room()), vec![TRACK_A, TRACK_A]);
    assert_eq!(log.joins(room()), 1);

    // The replaced track's end event must not advance or end anything
    let update = controller
        .on_track_end(TrackEnded {
            guild_id: room(),
            generation: first,
            reason: EndReason::Finished,
        })
        .await;
    assert!(update.is_none());
    assert!(controller.session(room()).await.is_some());
}

#[tokio::test]
async fn a_new_play_after_stop_discards_the_stopped_queue() {
    let (controller, _) = controller();
    for url in [TRACK_A, TRACK_B] {
        controller
            .enqueue(room(), Some(voice_channel()), Some(url))
            .await
            .unwrap();
    }
    controller.stop(room()).await.unwrap();

    controller
        .enqueue(room(), Some(voice_channel()), Some(TRACK_C))
        .await
        .unwrap();

    assert!(!controller.has_retired_queue(room()));
    assert_eq!(controller.session(room()).await.unwrap().queue.tracks(), &[TRACK_C]);
}

#[tokio::test]
async fn nothing_to_replay_once_the_queue_completed() {
    let (controller, log) = controller();
    controller
        .enqueue(room(), Some(voice_channel()), Some(TRACK_A))
        .await
        .unwrap();
    controller
        .on_track_end(TrackEnded {
            guild_id: room(),
            generation: log.last_generation(room()),
            reason: EndReason::Finished,
        })
        .await
        .unwrap();

    assert_matches!(
        controller.replay(room(), Some(voice_channel()), None).await,
        Err(MusicError::NoActiveSession)
    );
}
