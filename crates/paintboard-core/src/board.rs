//! Board document and editing operations.
//!
//! A [`Board`] holds the live objects (back to front), the selection and the
//! viewport. Every committed edit records a [`BoardSnapshot`] of the whole
//! object list into the board's [`HistoryStack`]; undo and redo restore the
//! snapshot the cursor lands on, or the blank board when it moves before the
//! first one.

use crate::config::BoardConfig;
use crate::history::{EachOrder, HistoryError, HistoryStack};
use crate::image::{ImageData, ImageError};
use crate::objects::{BoardObject, ObjectId, SerializableColor};
use kurbo::{Affine, Point, Size, Vec2};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;
use uuid::Uuid;

/// Name given to new boards.
pub const UNTITLED: &str = "Untitled";

/// The kind of edit that produced a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditAction {
    Load,
    Add,
    Delete,
    Copy,
    Move,
    Style,
    Text,
    PasteImage,
    Reorder,
}

impl EditAction {
    pub fn label(&self) -> &'static str {
        match self {
            EditAction::Load => "Load document",
            EditAction::Add => "Add object",
            EditAction::Delete => "Delete",
            EditAction::Copy => "Copy",
            EditAction::Move => "Move",
            EditAction::Style => "Change style",
            EditAction::Text => "Edit text",
            EditAction::PasteImage => "Paste image",
            EditAction::Reorder => "Reorder",
        }
    }
}

/// Board state after a committed edit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardSnapshot {
    pub action: EditAction,
    /// The object the edit was about, when there was exactly one.
    pub target: Option<ObjectId>,
    /// All objects, back to front.
    pub objects: Vec<BoardObject>,
}

/// One applied step of the edit timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimelineEntry {
    pub index: usize,
    pub action: EditAction,
    pub target: Option<ObjectId>,
}

/// Board errors.
#[derive(Debug, Error)]
pub enum BoardError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Image error: {0}")]
    Image(#[from] ImageError),
    #[error("Unknown object: {0}")]
    UnknownObject(ObjectId),
    #[error("Object {0} is not a text object")]
    NotText(ObjectId),
}

/// A drawing board document with its editing session state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Board {
    /// Unique document identifier.
    pub id: String,
    /// Document name.
    pub name: String,
    /// Objects in draw order (back to front).
    objects: Vec<BoardObject>,
    /// Pan/zoom transform of the view, saved when a pan gesture ends.
    #[serde(default)]
    viewport_transform: Affine,
    /// Transform of the pan gesture in progress.
    #[serde(skip)]
    pending_transform: Option<Affine>,
    #[serde(skip)]
    selection: Vec<ObjectId>,
    #[serde(skip)]
    viewport: Size,
    /// Space held: the view pans and objects cannot be selected.
    #[serde(skip)]
    panning: bool,
    #[serde(skip)]
    config: BoardConfig,
    #[serde(skip)]
    history: HistoryStack<BoardSnapshot>,
}

impl Default for Board {
    fn default() -> Self {
        Self::new(BoardConfig::default())
    }
}

fn history_for(config: &BoardConfig) -> HistoryStack<BoardSnapshot> {
    match config.max_history {
        Some(max) => HistoryStack::with_capacity_limit(Vec::new(), max),
        None => HistoryStack::default(),
    }
}

fn single_target(ids: &[ObjectId]) -> Option<ObjectId> {
    match ids {
        [id] => Some(*id),
        _ => None,
    }
}

impl Board {
    /// Create an empty board.
    pub fn new(config: BoardConfig) -> Self {
        let history = history_for(&config);
        Self::with_history(config, history)
    }

    /// Create a board around an existing history. The live objects start as
    /// the history's current snapshot.
    pub fn with_history(config: BoardConfig, history: HistoryStack<BoardSnapshot>) -> Self {
        let objects = history
            .current()
            .map(|snapshot| snapshot.objects.clone())
            .unwrap_or_default();
        Self {
            id: Uuid::new_v4().to_string(),
            name: UNTITLED.to_string(),
            objects,
            viewport_transform: Affine::IDENTITY,
            pending_transform: None,
            selection: Vec::new(),
            viewport: Size::new(config.viewport_width, config.viewport_height),
            panning: false,
            config,
            history,
        }
    }

    /// Objects in draw order (back to front).
    pub fn objects(&self) -> &[BoardObject] {
        &self.objects
    }

    pub fn object(&self, id: ObjectId) -> Option<&BoardObject> {
        self.objects.iter().find(|object| object.id == id)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn selection(&self) -> &[ObjectId] {
        &self.selection
    }

    pub fn history(&self) -> &HistoryStack<BoardSnapshot> {
        &self.history
    }

    pub fn config(&self) -> &BoardConfig {
        &self.config
    }

    pub fn viewport(&self) -> Size {
        self.viewport
    }

    pub fn is_panning(&self) -> bool {
        self.panning
    }

    /// The view transform, including a pan gesture in progress.
    pub fn view_transform(&self) -> Affine {
        self.pending_transform.unwrap_or(self.viewport_transform)
    }

    /// The last saved view transform.
    pub fn viewport_transform(&self) -> Affine {
        self.viewport_transform
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo() && !self.at_undo_floor()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    fn position(&self, id: ObjectId) -> Option<usize> {
        self.objects.iter().position(|object| object.id == id)
    }

    /// Undo stops at the first snapshot when it is the opened document, or
    /// when older snapshots have been evicted.
    fn at_undo_floor(&self) -> bool {
        if self.history.step() != Some(0) {
            return false;
        }
        self.history.evicted() > 0
            || self
                .history
                .current()
                .is_some_and(|snapshot| snapshot.action == EditAction::Load)
    }

    fn record(&mut self, action: EditAction, target: Option<ObjectId>) {
        self.history.add(BoardSnapshot {
            action,
            target,
            objects: self.objects.clone(),
        });
        log::debug!(
            "Recorded '{}' at history step {:?}",
            action.label(),
            self.history.step()
        );
    }

    fn restore(&mut self, objects: Vec<BoardObject>) {
        self.objects = objects;
        let objects = &self.objects;
        self.selection
            .retain(|id| objects.iter().any(|object| object.id == *id));
    }

    /// Add an object on top of the others.
    pub fn add_object(&mut self, object: BoardObject) -> ObjectId {
        let id = object.id;
        log::debug!("Adding {} {}", object.kind_name(), id);
        self.objects.push(object);
        self.record(EditAction::Add, Some(id));
        id
    }

    /// Select a single object. Returns false while panning or for unknown ids.
    pub fn select(&mut self, id: ObjectId) -> bool {
        if self.panning || self.position(id).is_none() {
            return false;
        }
        self.selection.clear();
        self.selection.push(id);
        true
    }

    pub fn add_to_selection(&mut self, id: ObjectId) -> bool {
        if self.panning || self.position(id).is_none() {
            return false;
        }
        if !self.selection.contains(&id) {
            self.selection.push(id);
        }
        true
    }

    /// Select every object. Returns false while panning or on an empty board.
    pub fn select_all(&mut self) -> bool {
        if self.panning {
            return false;
        }
        self.selection = self.objects.iter().map(|object| object.id).collect();
        !self.selection.is_empty()
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// Delete the selected objects. Returns how many were removed.
    pub fn delete_selected(&mut self) -> usize {
        if self.selection.is_empty() {
            return 0;
        }
        let selected = std::mem::take(&mut self.selection);
        let before = self.objects.len();
        self.objects.retain(|object| !selected.contains(&object.id));
        let removed = before - self.objects.len();
        if removed > 0 {
            self.record(EditAction::Delete, single_target(&selected));
        }
        removed
    }

    /// Duplicate the selected objects, offset by the configured copy offset,
    /// and select the copies.
    pub fn copy_selected(&mut self) -> Vec<ObjectId> {
        let offset = Vec2::new(self.config.copy_offset, self.config.copy_offset);
        let copies: Vec<BoardObject> = self
            .objects
            .iter()
            .filter(|object| self.selection.contains(&object.id))
            .map(|object| object.duplicate(offset))
            .collect();
        if copies.is_empty() {
            return Vec::new();
        }
        let ids: Vec<ObjectId> = copies.iter().map(|object| object.id).collect();
        self.objects.extend(copies);
        self.selection = ids.clone();
        self.record(EditAction::Copy, single_target(&ids));
        ids
    }

    fn update_selected<F>(&mut self, action: EditAction, mut update: F) -> bool
    where
        F: FnMut(&mut BoardObject),
    {
        let mut touched = Vec::new();
        for object in self
            .objects
            .iter_mut()
            .filter(|object| self.selection.contains(&object.id))
        {
            update(object);
            touched.push(object.id);
        }
        if touched.is_empty() {
            return false;
        }
        self.record(action, single_target(&touched));
        true
    }

    pub fn move_selected(&mut self, delta: Vec2) -> bool {
        if delta == Vec2::ZERO {
            return false;
        }
        self.update_selected(EditAction::Move, |object| object.translate(delta))
    }

    pub fn set_stroke_color(&mut self, color: SerializableColor) -> bool {
        self.update_selected(EditAction::Style, |object| object.style.stroke = color)
    }

    pub fn set_stroke_width(&mut self, width: f64) -> bool {
        let width = width.max(0.0);
        self.update_selected(EditAction::Style, |object| object.style.stroke_width = width)
    }

    /// Replace the content of a text object.
    pub fn edit_text(&mut self, id: ObjectId, content: impl Into<String>) -> Result<(), BoardError> {
        let object = self
            .objects
            .iter_mut()
            .find(|object| object.id == id)
            .ok_or(BoardError::UnknownObject(id))?;
        if !object.set_text(content) {
            return Err(BoardError::NotText(id));
        }
        self.record(EditAction::Text, Some(id));
        Ok(())
    }

    /// Insert an image from a data URL (clipboard paste or file upload).
    pub fn paste_image(&mut self, data_url: &str, at: Option<Point>) -> Result<ObjectId, BoardError> {
        let image = ImageData::from_data_url(data_url)?;
        Ok(self.insert_image(image, at))
    }

    /// Insert an image from encoded file bytes.
    pub fn import_image(&mut self, bytes: &[u8], at: Option<Point>) -> Result<ObjectId, BoardError> {
        let image = ImageData::from_bytes(bytes)?;
        Ok(self.insert_image(image, at))
    }

    /// Place an image, scaled down to fit the viewport. Without an explicit
    /// position it is centered in the viewport. The new image is selected.
    pub fn insert_image(&mut self, image: ImageData, at: Option<Point>) -> ObjectId {
        let mut object = BoardObject::image(Point::ZERO, image);
        object.fit_within(self.viewport);
        let size = object.bounds().size();
        let origin = at.unwrap_or_else(|| {
            Point::new(
                (self.viewport.width - size.width) / 2.0,
                (self.viewport.height - size.height) / 2.0,
            )
        });
        object.translate(origin.to_vec2());

        let id = object.id;
        log::info!("Inserted {}x{} image at {:?}", size.width, size.height, origin);
        self.objects.push(object);
        self.selection = vec![id];
        self.record(EditAction::PasteImage, Some(id));
        id
    }

    /// Bring an object to the front. Returns false if unknown or already there.
    pub fn bring_to_front(&mut self, id: ObjectId) -> bool {
        let Some(pos) = self.position(id) else {
            return false;
        };
        if pos + 1 == self.objects.len() {
            return false;
        }
        let object = self.objects.remove(pos);
        self.objects.push(object);
        self.record(EditAction::Reorder, Some(id));
        true
    }

    /// Send an object to the back. Returns false if unknown or already there.
    pub fn send_to_back(&mut self, id: ObjectId) -> bool {
        let Some(pos) = self.position(id) else {
            return false;
        };
        if pos == 0 {
            return false;
        }
        let object = self.objects.remove(pos);
        self.objects.insert(0, object);
        self.record(EditAction::Reorder, Some(id));
        true
    }

    /// Step back one edit.
    pub fn undo(&mut self) -> Result<(), HistoryError> {
        if !self.can_undo() {
            return Err(HistoryError::NoPreviousState);
        }
        let objects = self
            .history
            .undo()
            .map(|snapshot| snapshot.objects.clone())
            .unwrap_or_default();
        self.restore(objects);
        log::info!("Undo to history step {:?}", self.history.step());
        Ok(())
    }

    /// Re-apply the next edit.
    pub fn redo(&mut self) -> Result<(), HistoryError> {
        let Some(snapshot) = self.history.redo() else {
            return Err(HistoryError::NoNextState);
        };
        let objects = snapshot.objects.clone();
        self.restore(objects);
        log::info!("Redo to history step {:?}", self.history.step());
        Ok(())
    }

    /// Drop every snapshot recorded for edits of `id`. The live board is not
    /// changed. Returns the number of dropped snapshots.
    pub fn purge_object_history(&mut self, id: ObjectId) -> usize {
        let removed = self.history.delete(|snapshot| snapshot.target, &Some(id));
        log::debug!("Purged {} history entries for {}", removed, id);
        removed
    }

    /// Drop a single point of the timeline. The live board is not changed.
    pub fn remove_history_point(&mut self, index: usize) -> Result<(), HistoryError> {
        self.history.delete_at(index).map(|_| ())
    }

    /// Reset to an empty board with no history.
    pub fn clean(&mut self) {
        self.objects.clear();
        self.selection.clear();
        self.history.clean();
        log::info!("Board cleaned");
    }

    /// Applied edits, in the given traversal order.
    pub fn timeline(&self, order: EachOrder) -> Vec<TimelineEntry> {
        let mut entries = Vec::new();
        self.history.each(order, |snapshot, index| {
            entries.push(TimelineEntry {
                index,
                action: snapshot.action,
                target: snapshot.target,
            })
        });
        entries
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.viewport = Size::new(width.max(0.0), height.max(0.0));
    }

    /// Start or end a pan gesture. Ending it saves the panned transform.
    pub fn set_panning(&mut self, active: bool) {
        self.panning = active;
        if active {
            if self.pending_transform.is_none() {
                self.pending_transform = Some(self.viewport_transform);
            }
        } else if let Some(transform) = self.pending_transform.take() {
            self.viewport_transform = transform;
            log::debug!("Saved viewport transform {:?}", transform.as_coeffs());
        }
    }

    /// Pan the view by `delta` screen units. Only has an effect while panning.
    pub fn pan(&mut self, delta: Vec2) -> bool {
        match self.pending_transform.as_mut() {
            Some(transform) if self.panning => {
                *transform = Affine::translate(delta) * *transform;
                true
            }
            _ => false,
        }
    }

    /// Serialize the document (objects and metadata) to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Open a document. Its content becomes the first history snapshot.
    pub fn from_json(json: &str, config: BoardConfig) -> Result<Self, BoardError> {
        let board: Board = serde_json::from_str(json)?;
        Ok(board.reopen(config))
    }

    /// Attach session state to a freshly deserialized document.
    pub(crate) fn reopen(mut self, config: BoardConfig) -> Self {
        self.viewport = Size::new(config.viewport_width, config.viewport_height);
        self.history = history_for(&config);
        self.config = config;
        if !self.objects.is_empty() {
            self.record(EditAction::Load, None);
        }
        self
    }

    /// Save the document as JSON, creating parent directories as needed.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), BoardError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.to_json()?)?;
        log::info!("Saved board '{}' to {}", self.name, path.display());
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>, config: BoardConfig) -> Result<Self, BoardError> {
        let json = fs::read_to_string(path.as_ref())?;
        Self::from_json(&json, config)
    }
}
