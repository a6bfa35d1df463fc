//! The list of open board documents.
//!
//! One board is current at a time. Each board keeps its own undo history
//! while it stays open, so switching away and back does not lose it.

use crate::board::{Board, UNTITLED};
use crate::config::BoardConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Document list errors.
#[derive(Debug, Error)]
pub enum FilesError {
    #[error("Document not found: {0}")]
    NotFound(String),
    #[error("Cannot delete the last document")]
    LastDocument,
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Open documents plus the id of the current one. Never empty.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardFiles {
    boards: Vec<Board>,
    current: String,
    #[serde(skip)]
    config: BoardConfig,
}

impl Default for BoardFiles {
    fn default() -> Self {
        Self::new(BoardConfig::default())
    }
}

impl BoardFiles {
    /// Start with a single untitled board.
    pub fn new(config: BoardConfig) -> Self {
        let board = Board::new(config.clone());
        Self {
            current: board.id.clone(),
            boards: vec![board],
            config,
        }
    }

    pub fn boards(&self) -> &[Board] {
        &self.boards
    }

    pub fn len(&self) -> usize {
        self.boards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boards.is_empty()
    }

    pub fn current_id(&self) -> &str {
        &self.current
    }

    pub fn current(&self) -> &Board {
        &self.boards[self.current_index()]
    }

    pub fn current_mut(&mut self) -> &mut Board {
        let index = self.current_index();
        &mut self.boards[index]
    }

    pub fn get(&self, id: &str) -> Option<&Board> {
        self.boards.iter().find(|board| board.id == id)
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.boards.iter().position(|board| board.id == id)
    }

    fn current_index(&self) -> usize {
        self.position(&self.current).unwrap_or(0)
    }

    /// Create a new empty board and make it current.
    pub fn add(&mut self, name: impl Into<String>) -> String {
        let mut board = Board::new(self.config.clone());
        board.name = name.into();
        let id = board.id.clone();
        log::info!("Created board '{}' ({})", board.name, id);
        self.boards.push(board);
        self.current = id.clone();
        id
    }

    /// Make `id` the current board.
    pub fn switch(&mut self, id: &str) -> Result<(), FilesError> {
        if self.position(id).is_none() {
            return Err(FilesError::NotFound(id.to_string()));
        }
        self.current = id.to_string();
        log::debug!("Switched to board {}", id);
        Ok(())
    }

    pub fn rename(&mut self, id: &str, name: impl Into<String>) -> Result<(), FilesError> {
        let board = self
            .boards
            .iter_mut()
            .find(|board| board.id == id)
            .ok_or_else(|| FilesError::NotFound(id.to_string()))?;
        board.name = name.into();
        Ok(())
    }

    /// Close a board. Deleting the current board makes its neighbour current.
    pub fn delete(&mut self, id: &str) -> Result<Board, FilesError> {
        let index = self
            .position(id)
            .ok_or_else(|| FilesError::NotFound(id.to_string()))?;
        if self.boards.len() == 1 {
            return Err(FilesError::LastDocument);
        }
        let removed = self.boards.remove(index);
        if self.current == removed.id {
            let next = index.min(self.boards.len() - 1);
            self.current = self.boards[next].id.clone();
        }
        log::info!("Deleted board '{}' ({})", removed.name, removed.id);
        Ok(removed)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Restore a saved document list. Every board reopens with a fresh
    /// history; an empty list gets one untitled board.
    pub fn from_json(json: &str, config: BoardConfig) -> Result<Self, FilesError> {
        let saved: BoardFiles = serde_json::from_str(json)?;
        let boards: Vec<Board> = saved
            .boards
            .into_iter()
            .map(|board| board.reopen(config.clone()))
            .collect();
        if boards.is_empty() {
            return Ok(Self::new(config));
        }

        let mut files = Self {
            boards,
            current: saved.current,
            config,
        };
        if files.position(&files.current).is_none() {
            log::warn!("Saved current board {} is missing, using the first", files.current);
            files.current = files.boards[0].id.clone();
        }
        Ok(files)
    }

    /// Save the list as JSON, creating parent directories as needed.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), FilesError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.to_json()?)?;
        log::info!("Saved {} boards to {}", self.boards.len(), path.display());
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>, config: BoardConfig) -> Result<Self, FilesError> {
        let json = fs::read_to_string(path.as_ref())?;
        Self::from_json(&json, config)
    }

    /// Names of all boards, in list order.
    pub fn titles(&self) -> Vec<&str> {
        self.boards
            .iter()
            .map(|board| match board.name.as_str() {
                "" => UNTITLED,
                name => name,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objects::BoardObject;
    use kurbo::{Point, Size, Vec2};

    fn rect() -> BoardObject {
        BoardObject::rectangle(Point::ZERO, Size::new(10.0, 10.0))
    }

    #[test]
    fn test_starts_with_one_board() {
        let files = BoardFiles::default();
        assert_eq!(files.len(), 1);
        assert_eq!(files.current().id, files.current_id());
        assert_eq!(files.titles(), vec![UNTITLED]);
    }

    #[test]
    fn test_add_and_switch() {
        let mut files = BoardFiles::default();
        let first = files.current_id().to_string();
        files.current_mut().add_object(rect());

        let second = files.add("Sketch");
        assert_eq!(files.current_id(), second);
        assert!(files.current().is_empty());

        files.switch(&first).unwrap();
        assert_eq!(files.current().len(), 1);
        // History survives switching.
        files.current_mut().undo().unwrap();
        assert!(files.current().is_empty());

        assert!(matches!(files.switch("nope"), Err(FilesError::NotFound(_))));
        assert_eq!(files.current_id(), first);
    }

    #[test]
    fn test_rename() {
        let mut files = BoardFiles::default();
        let id = files.current_id().to_string();
        files.rename(&id, "Plan").unwrap();
        assert_eq!(files.titles(), vec!["Plan"]);

        files.rename(&id, "").unwrap();
        assert_eq!(files.titles(), vec![UNTITLED]);
        assert!(matches!(files.rename("nope", "x"), Err(FilesError::NotFound(_))));
    }

    #[test]
    fn test_delete_moves_to_neighbour() {
        let mut files = BoardFiles::default();
        let a = files.current_id().to_string();
        let b = files.add("B");
        let c = files.add("C");

        files.switch(&b).unwrap();
        files.delete(&b).unwrap();
        assert_eq!(files.current_id(), c);

        files.delete(&c).unwrap();
        assert_eq!(files.current_id(), a);

        assert!(matches!(files.delete(&a), Err(FilesError::LastDocument)));
        assert!(matches!(files.delete("nope"), Err(FilesError::NotFound(_))));
        assert_eq!(files.len(), 1);
    }

    #[test]
    fn test_delete_other_keeps_current() {
        let mut files = BoardFiles::default();
        let a = files.current_id().to_string();
        let b = files.add("B");
        files.delete(&a).unwrap();
        assert_eq!(files.current_id(), b);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("files").join("boards.json");

        let mut files = BoardFiles::default();
        files.current_mut().add_object(rect());
        let second = files.add("Second");
        {
            let board = files.current_mut();
            board.add_object(rect());
            board.add_object(rect());
            board.set_panning(true);
            board.pan(Vec2::new(15.0, 5.0));
            board.set_panning(false);
        }
        files.save(&path).unwrap();

        let mut loaded = BoardFiles::load(&path, BoardConfig::default()).unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded.current_id(), second);
        assert_eq!(loaded.current().len(), 2);
        assert_eq!(
            loaded.current().viewport_transform().translation(),
            Vec2::new(15.0, 5.0)
        );
        // Reopened boards cannot be undone past their saved content.
        assert!(loaded.current_mut().undo().is_err());
        assert_eq!(loaded.current().len(), 2);
    }

    #[test]
    fn test_from_json_repairs_list() {
        let empty = BoardFiles::from_json(r#"{"boards": [], "current": "x"}"#, BoardConfig::default())
            .unwrap();
        assert_eq!(empty.len(), 1);

        let stale = r#"{
            "boards": [{"id": "a", "name": "A", "objects": []}],
            "current": "gone"
        }"#;
        let files = BoardFiles::from_json(stale, BoardConfig::default()).unwrap();
        assert_eq!(files.current_id(), "a");

        assert!(matches!(
            BoardFiles::from_json("[]", BoardConfig::default()),
            Err(FilesError::Serialization(_))
        ));
    }
}
