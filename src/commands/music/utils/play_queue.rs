//! The per-guild track list and the decision logic that runs when a track ends.
//!
//! Nothing in here touches Discord or songbird, so every navigation rule and
//! every advance/teardown decision can be exercised directly in tests.

use std::fmt;

use super::music_manager::{MusicError, MusicResult};

/// Direction of a `next`/`prev` button press
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    Next,
    Previous,
}

/// Which end of the queue a navigation request ran into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Boundary {
    First,
    Last,
}

impl fmt::Display for Boundary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Boundary::First => f.write_str("first"),
            Boundary::Last => f.write_str("last"),
        }
    }
}

/// Why songbird reported the end of a track
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndReason {
    Finished,
    Errored,
}

/// What the controller has to do after a track-end event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// The event belongs to a track that is no longer current
    Ignore,
    /// Play the entry at this index
    Advance(usize),
    /// Nothing left to play; release the connection and drop the session
    Teardown { failed: bool },
}

/// Ordered list of track URLs plus the index of the active entry.
///
/// Entries are only ever appended, and `current` always points at an
/// existing entry because a queue cannot be built empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayQueue {
    tracks: Vec<String>,
    current: usize,
}

// A queue is never empty, so there is no `is_empty` next to `len`
#[allow(clippy::len_without_is_empty)]
impl PlayQueue {
    pub fn new(first: impl Into<String>) -> Self {
        Self {
            tracks: vec![first.into()],
            current: 0,
        }
    }

    /// Append a track at the tail and return its 1-based position
    pub fn push(&mut self, url: impl Into<String>) -> usize {
        self.tracks.push(url.into());
        self.tracks.len()
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current_track(&self) -> &str {
        &self.tracks[self.current]
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.tracks.get(index).map(String::as_str)
    }

    pub fn tracks(&self) -> &[String] {
        &self.tracks
    }

    pub fn is_first(&self) -> bool {
        self.current == 0
    }

    pub fn is_last(&self) -> bool {
        self.current + 1 >= self.tracks.len()
    }

    /// Move the active entry. Out-of-range indices are rejected and leave the
    /// queue untouched.
    pub fn set_current(&mut self, index: usize) -> MusicResult<()> {
        if index >= self.tracks.len() {
            return Err(MusicError::TrackOutOfRange {
                index,
                len: self.tracks.len(),
            });
        }
        self.current = index;
        Ok(())
    }

    /// Index a navigation would land on, without moving anything
    pub fn target(&self, navigation: Navigation) -> MusicResult<usize> {
        match navigation {
            Navigation::Next if self.is_last() => {
                Err(MusicError::BoundaryNavigation(Boundary::Last))
            }
            Navigation::Next => Ok(self.current + 1),
            Navigation::Previous if self.is_first() => {
                Err(MusicError::BoundaryNavigation(Boundary::First))
            }
            Navigation::Previous => Ok(self.current - 1),
        }
    }

    /// Decide what follows the end of the active track
    pub fn after_track_end(&self, reason: EndReason) -> Transition {
        if self.is_last() {
            Transition::Teardown {
                failed: reason == EndReason::Errored,
            }
        } else {
            Transition::Advance(self.current + 1)
        }
    }
}
