//! Keyboard shortcuts: key input to board commands.

use crate::commands::BoardCommand;

/// A key event as delivered by the host window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyInput {
    /// Key name, e.g. `"Z"`, `"Backspace"`, `"Space"`.
    pub key: String,
    pub ctrl: bool,
    pub shift: bool,
    /// True on key down, false on key up.
    pub pressed: bool,
}

impl KeyInput {
    pub fn down(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ctrl: false,
            shift: false,
            pressed: true,
        }
    }

    pub fn up(key: impl Into<String>) -> Self {
        Self {
            pressed: false,
            ..Self::down(key)
        }
    }

    pub fn with_ctrl(mut self) -> Self {
        self.ctrl = true;
        self
    }

    pub fn with_shift(mut self) -> Self {
        self.shift = true;
        self
    }

    /// The command bound to this key event, if any.
    pub fn command(&self) -> Option<BoardCommand> {
        let key = self.key.to_ascii_lowercase();
        if key == "space" {
            // Held space pans the view; release returns to editing.
            return Some(BoardCommand::SetPanning {
                active: self.pressed,
            });
        }
        if !self.pressed {
            return None;
        }
        let command = match (key.as_str(), self.ctrl, self.shift) {
            ("z", true, false) => BoardCommand::Undo,
            ("z", true, true) | ("y", true, false) => BoardCommand::Redo,
            ("a", true, false) => BoardCommand::SelectAll,
            ("c", true, false) => BoardCommand::CopySelected,
            ("delete" | "backspace", false, false) => BoardCommand::DeleteSelected,
            ("escape", false, false) => BoardCommand::ClearSelection,
            _ => return None,
        };
        Some(command)
    }
}

/// A keyboard shortcut definition.
#[derive(Debug, Clone)]
pub struct Shortcut {
    pub key: &'static str,
    pub ctrl: bool,
    pub shift: bool,
    pub description: &'static str,
}

impl Shortcut {
    pub const fn new(key: &'static str, ctrl: bool, shift: bool, description: &'static str) -> Self {
        Self {
            key,
            ctrl,
            shift,
            description,
        }
    }

    /// Format the shortcut for display (e.g., "Ctrl+Z").
    pub fn format(&self) -> String {
        let mut parts = Vec::new();
        if self.ctrl {
            parts.push("Ctrl");
        }
        if self.shift {
            parts.push("Shift");
        }
        parts.push(self.key);
        parts.join("+")
    }

    /// The key-down event this shortcut describes.
    pub fn input(&self) -> KeyInput {
        KeyInput {
            key: self.key.to_string(),
            ctrl: self.ctrl,
            shift: self.shift,
            pressed: true,
        }
    }
}

/// Registry of all keyboard shortcuts.
pub struct ShortcutRegistry;

impl ShortcutRegistry {
    pub fn all() -> Vec<Shortcut> {
        vec![
            Shortcut::new("Z", true, false, "Undo"),
            Shortcut::new("Z", true, true, "Redo"),
            Shortcut::new("Y", true, false, "Redo"),
            Shortcut::new("A", true, false, "Select all objects"),
            Shortcut::new("C", true, false, "Copy selected objects"),
            Shortcut::new("Delete", false, false, "Delete selected objects"),
            Shortcut::new("Backspace", false, false, "Delete selected objects"),
            Shortcut::new("Escape", false, false, "Clear selection"),
            Shortcut::new("Space", false, false, "Hold to pan the board"),
        ]
    }

    /// Human-readable shortcut table.
    pub fn help_text() -> String {
        let mut text = String::from("Keyboard shortcuts:\n");
        for shortcut in Self::all() {
            text.push_str(&format!("  {:20} {}\n", shortcut.format(), shortcut.description));
        }
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_undo_redo_keys() {
        assert_eq!(KeyInput::down("z").with_ctrl().command(), Some(BoardCommand::Undo));
        assert_eq!(
            KeyInput::down("Z").with_ctrl().with_shift().command(),
            Some(BoardCommand::Redo)
        );
        assert_eq!(KeyInput::down("Y").with_ctrl().command(), Some(BoardCommand::Redo));
        assert_eq!(KeyInput::down("Z").command(), None);
    }

    #[test]
    fn test_delete_keys() {
        assert_eq!(
            KeyInput::down("Backspace").command(),
            Some(BoardCommand::DeleteSelected)
        );
        assert_eq!(
            KeyInput::down("Delete").command(),
            Some(BoardCommand::DeleteSelected)
        );
        assert_eq!(KeyInput::up("Backspace").command(), None);
    }

    #[test]
    fn test_space_toggles_panning() {
        assert_eq!(
            KeyInput::down("Space").command(),
            Some(BoardCommand::SetPanning { active: true })
        );
        assert_eq!(
            KeyInput::up("Space").command(),
            Some(BoardCommand::SetPanning { active: false })
        );
    }

    #[test]
    fn test_every_registered_shortcut_is_bound() {
        for shortcut in ShortcutRegistry::all() {
            assert!(
                shortcut.input().command().is_some(),
                "{} has no command",
                shortcut.format()
            );
        }
    }

    #[test]
    fn test_format() {
        assert_eq!(Shortcut::new("Z", true, true, "Redo").format(), "Ctrl+Shift+Z");
        assert!(ShortcutRegistry::help_text().contains("Backspace"));
    }
}
