//! Keyboard shortcut routing.

use crate::error::{EditError, EditResult};
use crate::timeline::Timeline;

/// A key press as delivered by the host.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyInput {
    pub key: String,
    pub ctrl: bool,
    pub meta: bool,
    pub shift: bool,
    /// Focus is inside a text field; shortcuts must not fire.
    pub in_text_input: bool,
}

impl KeyInput {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Self::default()
        }
    }

    pub fn with_ctrl(mut self) -> Self {
        self.ctrl = true;
        self
    }
}

/// Edit commands reachable from the keyboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditCommand {
    Split,
    Copy,
    Paste,
    Delete,
}

/// What a command did.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandOutcome {
    Split { left: String, right: String },
    Copied(usize),
    Pasted(Vec<String>),
    Deleted(usize),
}

/// Map a key press to a command.
pub fn route_key(input: &KeyInput) -> Option<EditCommand> {
    if input.in_text_input {
        return None;
    }
    let modifier = input.ctrl || input.meta;
    match input.key.to_ascii_lowercase().as_str() {
        "s" if !modifier => Some(EditCommand::Split),
        "c" if modifier => Some(EditCommand::Copy),
        "v" if modifier => Some(EditCommand::Paste),
        "delete" | "backspace" => Some(EditCommand::Delete),
        _ => None,
    }
}

impl Timeline {
    /// Run a command against the playhead position.
    pub fn apply_command(
        &mut self,
        command: EditCommand,
        current_time: f64,
    ) -> EditResult<CommandOutcome> {
        let outcome = match command {
            EditCommand::Split => {
                let (left, right) = self.split(current_time)?;
                CommandOutcome::Split { left, right }
            }
            EditCommand::Copy => CommandOutcome::Copied(self.copy()?),
            EditCommand::Paste => CommandOutcome::Pasted(self.paste(current_time)?),
            EditCommand::Delete => CommandOutcome::Deleted(self.delete_selected()?),
        };
        tracing::debug!(?command, current_time, "Applied edit command");
        Ok(outcome)
    }

    /// Delete whatever is selected.
    pub fn delete_selected(&mut self) -> EditResult<usize> {
        if let Some(first) = self.selection.overlays().first().cloned() {
            return self.remove_overlay(&first);
        }
        let clips = self.selection.clips().to_vec();
        if clips.is_empty() {
            return Err(EditError::NothingSelected);
        }
        self.delete_clips(&clips)?;
        Ok(clips.len())
    }
}
