//! Board commands and the ordered queue that feeds them to a board.
//!
//! Input sources (keyboard, clipboard, window resizes, toolbar clicks) never
//! touch the board directly. They push [`BoardCommand`]s onto a
//! [`CommandQueue`], and the event loop drains the queue into the board in
//! arrival order.

use crate::board::{Board, BoardError};
use crate::history::HistoryError;
use crate::objects::{BoardObject, ObjectId, SerializableColor};
use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fs;
use std::path::PathBuf;

/// A discrete editing request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum BoardCommand {
    AddObject { object: BoardObject },
    Select { id: ObjectId },
    AddToSelection { id: ObjectId },
    SelectAll,
    ClearSelection,
    DeleteSelected,
    CopySelected,
    MoveSelected { dx: f64, dy: f64 },
    SetStrokeColor { color: SerializableColor },
    SetStrokeWidth { width: f64 },
    EditText { id: ObjectId, content: String },
    PasteImage {
        data_url: String,
        #[serde(default)]
        at: Option<Point>,
    },
    /// Upload an image file from disk.
    ImportImage {
        path: PathBuf,
        #[serde(default)]
        at: Option<Point>,
    },
    BringToFront { id: ObjectId },
    SendToBack { id: ObjectId },
    Undo,
    Redo,
    Clean,
    PurgeObjectHistory { id: ObjectId },
    RemoveHistoryPoint { index: usize },
    SetPanning { active: bool },
    Pan { dx: f64, dy: f64 },
    Resize { width: f64, height: f64 },
}

/// What applying a command did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    /// The board changed.
    Applied,
    /// Valid command with nothing to act on (e.g. delete with an empty selection).
    Unchanged,
    /// A history boundary was hit; safe to ignore.
    Ignored(HistoryError),
}

impl CommandOutcome {
    fn from_flag(changed: bool) -> Self {
        if changed {
            CommandOutcome::Applied
        } else {
            CommandOutcome::Unchanged
        }
    }

    fn from_history(result: Result<(), HistoryError>) -> Self {
        match result {
            Ok(()) => CommandOutcome::Applied,
            Err(err) => CommandOutcome::Ignored(err),
        }
    }
}

impl BoardCommand {
    /// Apply this command to `board`.
    pub fn apply(self, board: &mut Board) -> Result<CommandOutcome, BoardError> {
        let outcome = match self {
            BoardCommand::AddObject { object } => {
                board.add_object(object);
                CommandOutcome::Applied
            }
            BoardCommand::Select { id } => CommandOutcome::from_flag(board.select(id)),
            BoardCommand::AddToSelection { id } => {
                CommandOutcome::from_flag(board.add_to_selection(id))
            }
            BoardCommand::SelectAll => CommandOutcome::from_flag(board.select_all()),
            BoardCommand::ClearSelection => {
                board.clear_selection();
                CommandOutcome::Applied
            }
            BoardCommand::DeleteSelected => CommandOutcome::from_flag(board.delete_selected() > 0),
            BoardCommand::CopySelected => {
                CommandOutcome::from_flag(!board.copy_selected().is_empty())
            }
            BoardCommand::MoveSelected { dx, dy } => {
                CommandOutcome::from_flag(board.move_selected(Vec2::new(dx, dy)))
            }
            BoardCommand::SetStrokeColor { color } => {
                CommandOutcome::from_flag(board.set_stroke_color(color))
            }
            BoardCommand::SetStrokeWidth { width } => {
                CommandOutcome::from_flag(board.set_stroke_width(width))
            }
            BoardCommand::EditText { id, content } => {
                board.edit_text(id, content)?;
                CommandOutcome::Applied
            }
            BoardCommand::PasteImage { data_url, at } => {
                board.paste_image(&data_url, at)?;
                CommandOutcome::Applied
            }
            BoardCommand::ImportImage { path, at } => {
                let bytes = fs::read(&path)?;
                board.import_image(&bytes, at)?;
                CommandOutcome::Applied
            }
            BoardCommand::BringToFront { id } => CommandOutcome::from_flag(board.bring_to_front(id)),
            BoardCommand::SendToBack { id } => CommandOutcome::from_flag(board.send_to_back(id)),
            BoardCommand::Undo => CommandOutcome::from_history(board.undo()),
            BoardCommand::Redo => CommandOutcome::from_history(board.redo()),
            BoardCommand::Clean => {
                board.clean();
                CommandOutcome::Applied
            }
            BoardCommand::PurgeObjectHistory { id } => {
                CommandOutcome::from_flag(board.purge_object_history(id) > 0)
            }
            BoardCommand::RemoveHistoryPoint { index } => {
                CommandOutcome::from_history(board.remove_history_point(index))
            }
            BoardCommand::SetPanning { active } => {
                board.set_panning(active);
                CommandOutcome::Applied
            }
            BoardCommand::Pan { dx, dy } => CommandOutcome::from_flag(board.pan(Vec2::new(dx, dy))),
            BoardCommand::Resize { width, height } => {
                board.resize(width, height);
                CommandOutcome::Applied
            }
        };
        Ok(outcome)
    }
}

/// FIFO queue of pending commands.
#[derive(Debug, Default)]
pub struct CommandQueue {
    pending: VecDeque<BoardCommand>,
}

impl CommandQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a JSON array of commands into a queue.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let commands: Vec<BoardCommand> = serde_json::from_str(json)?;
        Ok(commands.into_iter().collect())
    }

    pub fn push(&mut self, command: BoardCommand) {
        self.pending.push_back(command);
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Apply every pending command to `board`, in order.
    ///
    /// A failing command does not stop the ones queued after it. Each result
    /// is returned in queue order.
    pub fn drain_into(&mut self, board: &mut Board) -> Vec<Result<CommandOutcome, BoardError>> {
        let mut results = Vec::with_capacity(self.pending.len());
        while let Some(command) = self.pending.pop_front() {
            let result = command.apply(board);
            match &result {
                Ok(CommandOutcome::Ignored(reason)) => log::debug!("Command ignored: {}", reason),
                Ok(_) => {}
                Err(err) => log::warn!("Command failed: {}", err),
            }
            results.push(result);
        }
        results
    }
}

impl FromIterator<BoardCommand> for CommandQueue {
    fn from_iter<I: IntoIterator<Item = BoardCommand>>(iter: I) -> Self {
        Self {
            pending: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Size;

    fn rect() -> BoardObject {
        BoardObject::rectangle(Point::new(0.0, 0.0), Size::new(10.0, 10.0))
    }

    #[test]
    fn test_commands_apply_in_order() {
        let mut board = Board::default();
        let object = rect();
        let id = object.id;

        let mut queue = CommandQueue::new();
        queue.push(BoardCommand::AddObject { object });
        queue.push(BoardCommand::Select { id });
        queue.push(BoardCommand::DeleteSelected);
        queue.push(BoardCommand::Undo);
        assert_eq!(queue.len(), 4);

        let results = queue.drain_into(&mut board);
        assert!(queue.is_empty());
        assert!(results.iter().all(|r| matches!(r, Ok(CommandOutcome::Applied))));
        assert_eq!(board.len(), 1);
        assert!(board.object(id).is_some());
    }

    #[test]
    fn test_history_boundaries_are_ignored() {
        let mut board = Board::default();
        let mut queue: CommandQueue = [BoardCommand::Undo, BoardCommand::Redo].into_iter().collect();

        let results = queue.drain_into(&mut board);
        assert!(matches!(
            results[0],
            Ok(CommandOutcome::Ignored(HistoryError::NoPreviousState))
        ));
        assert!(matches!(
            results[1],
            Ok(CommandOutcome::Ignored(HistoryError::NoNextState))
        ));
    }

    #[test]
    fn test_failure_does_not_stop_queue() {
        let mut board = Board::default();
        let mut queue: CommandQueue = [
            BoardCommand::PasteImage {
                data_url: "garbage".to_string(),
                at: None,
            },
            BoardCommand::AddObject { object: rect() },
            BoardCommand::DeleteSelected,
        ]
        .into_iter()
        .collect();

        let results = queue.drain_into(&mut board);
        assert!(matches!(results[0], Err(BoardError::Image(_))));
        assert!(matches!(results[1], Ok(CommandOutcome::Applied)));
        assert!(matches!(results[2], Ok(CommandOutcome::Unchanged)));
        assert_eq!(board.len(), 1);
    }

    #[test]
    fn test_from_json_script() {
        let json = r#"[
            {"command": "add_object", "object": {
                "id": "6a0f3e52-5f8e-4f0e-9a3e-2b1c4d5e6f70",
                "kind": {"type": "text", "origin": {"x": 1.0, "y": 2.0}, "content": "hi", "font_size": 20.0}
            }},
            {"command": "select_all"},
            {"command": "move_selected", "dx": 3.0, "dy": 0.0},
            {"command": "resize", "width": 1024.0, "height": 768.0}
        ]"#;
        let mut queue = CommandQueue::from_json(json).unwrap();
        assert_eq!(queue.len(), 4);

        let mut board = Board::default();
        queue.drain_into(&mut board);
        assert_eq!(board.objects()[0].bounds().x0, 4.0);
        assert_eq!(board.viewport(), Size::new(1024.0, 768.0));
        assert_eq!(board.history().len(), 2);
    }

    #[test]
    fn test_select_all_while_panning_is_unchanged() {
        let mut board = Board::default();
        let mut queue: CommandQueue = [
            BoardCommand::AddObject { object: rect() },
            BoardCommand::SetPanning { active: true },
            BoardCommand::SelectAll,
            BoardCommand::Pan { dx: 12.0, dy: 0.0 },
            BoardCommand::SetPanning { active: false },
            BoardCommand::SelectAll,
            BoardCommand::Pan { dx: 1.0, dy: 1.0 },
        ]
        .into_iter()
        .collect();

        let results = queue.drain_into(&mut board);
        assert!(matches!(results[2], Ok(CommandOutcome::Unchanged)));
        assert!(matches!(results[3], Ok(CommandOutcome::Applied)));
        assert!(matches!(results[5], Ok(CommandOutcome::Applied)));
        assert!(matches!(results[6], Ok(CommandOutcome::Unchanged)));
        assert_eq!(board.selection().len(), 1);
        assert_eq!(board.viewport_transform().translation(), Vec2::new(12.0, 0.0));
    }

    #[test]
    fn test_import_image_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("upload.png");
        fs::write(&path, crate::image::blank_png(64, 32)).unwrap();

        let mut board = Board::default();
        let mut queue: CommandQueue = [
            BoardCommand::ImportImage {
                path: path.clone(),
                at: Some(Point::new(10.0, 20.0)),
            },
            BoardCommand::ImportImage {
                path: dir.path().join("missing.png"),
                at: None,
            },
        ]
        .into_iter()
        .collect();

        let results = queue.drain_into(&mut board);
        assert!(matches!(results[0], Ok(CommandOutcome::Applied)));
        assert!(matches!(results[1], Err(BoardError::Io(_))));

        assert_eq!(board.len(), 1);
        let bounds = board.objects()[0].bounds();
        assert_eq!((bounds.x0, bounds.y0), (10.0, 20.0));
        assert_eq!(bounds.size(), Size::new(64.0, 32.0));
        assert_eq!(board.selection(), &[board.objects()[0].id]);
    }

    #[test]
    fn test_command_json_names() {
        let json = serde_json::to_value(BoardCommand::MoveSelected { dx: 1.0, dy: 2.0 }).unwrap();
        assert_eq!(json["command"], "move_selected");
        assert_eq!(
            serde_json::from_str::<BoardCommand>(r#"{"command": "undo"}"#).unwrap(),
            BoardCommand::Undo
        );
    }
}
