use pretty_assertions::assert_eq;
use rusty_jukebox::commands::music::utils::play_queue::Navigation;
use std::sync::Arc;

use crate::common::controller;
use crate::common::fixtures::*;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn simultaneous_plays_share_one_session() {
    let (controller, log) = controller();

    let handles: Vec<_> = (0..16)
        .map(|n| {
            let controller = Arc::clone(&controller);
            tokio::spawn(async move {
                let url = track(&format!("{n}.mp3"));
                controller
                    .enqueue(room(), Some(voice_channel()), Some(url.as_str()))
                    .await
            })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let session = controller.session(room()).await.unwrap();
    assert_eq!(session.queue.len(), 16);
    assert_eq!(session.queue.current_index(), 0);
    assert_eq!(log.joins(room()), 1);
    assert_eq!(log.played(room()).len(), 1);
    assert_eq!(controller.sessions().active_rooms().await, 1);
}

#[tokio::test]
async fn rooms_do_not_affect_each_other() {
    let (controller, log) = controller();
    for guild in [room(), other_room()] {
        for url in [TRACK_A, TRACK_B] {
            controller
                .enqueue(guild, Some(voice_channel()), Some(url))
                .await
                .unwrap();
        }
    }
    assert_eq!(controller.sessions().active_rooms().await, 2);

    controller.navigate(room(), Navigation::Next).await.unwrap();
    controller.stop(room()).await.unwrap();

    let other = controller.session(other_room()).await.unwrap();
    assert_eq!(other.queue.current_index(), 0);
    assert!(log.is_connected(other_room()));
    assert!(!log.is_connected(room()));
    assert_eq!(controller.sessions().active_rooms().await, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn racing_next_presses_never_leave_the_queue() {
    let (controller, _) = controller();
    for url in [TRACK_A, TRACK_B, TRACK_C] {
        controller
            .enqueue(room(), Some(voice_channel()), Some(url))
            .await
            .unwrap();
    }

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let controller = Arc::clone(&controller);
            tokio::spawn(async move { controller.navigate(room(), Navigation::Next).await })
        })
        .collect();
    let mut moved = 0;
    for handle in handles {
        if handle.await.unwrap().is_ok() {
            moved += 1;
        }
    }

    assert_eq!(moved, 2);
    assert_eq!(controller.session(room()).await.unwrap().queue.current_index(), 2);
}
