// Export music utilities
pub mod button_controls;
pub mod component_handlers;
pub mod embedded_messages;
pub mod event_handlers;
pub mod media_source;
pub mod music_manager;
pub mod play_queue;
pub mod session_registry;
pub mod voice_backend;
