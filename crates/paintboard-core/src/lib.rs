//! Paintboard Core Library
//!
//! Undo/redo history, document model and document list for the paintboard
//! drawing board.

pub mod board;
pub mod commands;
pub mod config;
pub mod files;
pub mod history;
pub mod image;
pub mod objects;
pub mod shortcuts;

pub use board::{Board, BoardError, BoardSnapshot, EditAction, TimelineEntry};
pub use commands::{BoardCommand, CommandOutcome, CommandQueue};
pub use config::{BoardConfig, ConfigError};
pub use files::{BoardFiles, FilesError};
pub use history::{EachOrder, HistoryError, HistoryStack};
pub use image::{ImageData, ImageError, ImageFormat};
pub use objects::{BoardObject, ObjectId, ObjectKind, ObjectStyle, SerializableColor};
pub use shortcuts::{KeyInput, Shortcut, ShortcutRegistry};
