use serenity::all::{ButtonStyle, CreateActionRow, CreateButton, ReactionType};
use std::str::FromStr;

use super::music_manager::MusicError;
use super::play_queue::PlayQueue;

/// The buttons under a control message, identified by their custom id
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlAction {
    Previous,
    Stop,
    Next,
    Replay,
}

impl ControlAction {
    pub fn custom_id(self) -> &'static str {
        match self {
            ControlAction::Previous => "prev",
            ControlAction::Stop => "stop",
            ControlAction::Next => "next",
            ControlAction::Replay => "replay",
        }
    }

    fn emoji(self) -> &'static str {
        match self {
            ControlAction::Previous => "⏮️",
            ControlAction::Stop => "⏹️",
            ControlAction::Next => "⏭️",
            ControlAction::Replay => "🔁",
        }
    }

    fn label(self) -> &'static str {
        match self {
            ControlAction::Previous => "Prev",
            ControlAction::Stop => "Stop",
            ControlAction::Next => "Next",
            ControlAction::Replay => "Replay",
        }
    }

    fn style(self) -> ButtonStyle {
        match self {
            ControlAction::Stop => ButtonStyle::Danger,
            ControlAction::Replay => ButtonStyle::Primary,
            ControlAction::Previous | ControlAction::Next => ButtonStyle::Secondary,
        }
    }
}

impl FromStr for ControlAction {
    type Err = MusicError;

    fn from_str(custom_id: &str) -> Result<Self, Self::Err> {
        match custom_id {
            "prev" => Ok(ControlAction::Previous),
            "stop" => Ok(ControlAction::Stop),
            "next" => Ok(ControlAction::Next),
            "replay" => Ok(ControlAction::Replay),
            other => Err(MusicError::UnknownControl(other.to_string())),
        }
    }
}

/// A button as it should be rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlButton {
    pub action: ControlAction,
    pub disabled: bool,
}

/// Buttons while a queue is playing; prev/next are greyed out at the ends
pub fn playing_buttons(queue: &PlayQueue) -> Vec<ControlButton> {
    vec![
        ControlButton {
            action: ControlAction::Previous,
            disabled: queue.is_first(),
        },
        ControlButton {
            action: ControlAction::Stop,
            disabled: false,
        },
        ControlButton {
            action: ControlAction::Next,
            disabled: queue.is_last(),
        },
        ControlButton {
            action: ControlAction::Replay,
            disabled: false,
        },
    ]
}

/// After a stop only a replay makes sense
pub fn stopped_buttons() -> Vec<ControlButton> {
    vec![ControlButton {
        action: ControlAction::Replay,
        disabled: false,
    }]
}

/// Creates the action row for a set of buttons
pub fn create_control_rows(buttons: &[ControlButton]) -> Vec<CreateActionRow> {
    if buttons.is_empty() {
        return Vec::new();
    }

    let buttons = buttons
        .iter()
        .map(|button| {
            CreateButton::new(button.action.custom_id())
                .emoji(ReactionType::Unicode(button.action.emoji().to_string()))
                .style(button.action.style())
                .label(button.action.label())
                .disabled(button.disabled)
        })
        .collect();

    vec![CreateActionRow::Buttons(buttons)]
}
