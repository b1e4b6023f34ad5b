//! End-to-end behaviour of the playback controller against a recording
//! voice backend

mod concurrency;
mod stop_and_replay;
