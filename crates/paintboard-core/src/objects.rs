//! Board objects: strokes, shapes, text and images.

use crate::image::ImageData;
use kurbo::{Affine, Point, Rect, Size, Vec2};
use peniko::Color;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for board objects.
pub type ObjectId = Uuid;

/// Minimum width reported for text bounds, so empty text stays clickable.
const MIN_TEXT_WIDTH: f64 = 20.0;

/// Serializable color representation (RGBA8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializableColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl SerializableColor {
    pub fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn black() -> Self {
        Self::new(0, 0, 0, 255)
    }

    pub fn white() -> Self {
        Self::new(255, 255, 255, 255)
    }

    /// Parse `#rgb`, `#rrggbb` or `#rrggbbaa`.
    pub fn from_hex(color: &str) -> Option<Self> {
        let hex = color.trim().strip_prefix('#')?;
        let channel = |range: std::ops::Range<usize>| u8::from_str_radix(hex.get(range)?, 16).ok();
        match hex.len() {
            3 => Some(Self::new(
                channel(0..1)? * 17,
                channel(1..2)? * 17,
                channel(2..3)? * 17,
                255,
            )),
            6 => Some(Self::new(channel(0..2)?, channel(2..4)?, channel(4..6)?, 255)),
            8 => Some(Self::new(
                channel(0..2)?,
                channel(2..4)?,
                channel(4..6)?,
                channel(6..8)?,
            )),
            _ => None,
        }
    }

    pub fn to_hex(&self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }
}

impl From<Color> for SerializableColor {
    fn from(color: Color) -> Self {
        let rgba = color.to_rgba8();
        Self::new(rgba.r, rgba.g, rgba.b, rgba.a)
    }
}

impl From<SerializableColor> for Color {
    fn from(color: SerializableColor) -> Self {
        Color::from_rgba8(color.r, color.g, color.b, color.a)
    }
}

/// Stroke and fill styling shared by every object kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectStyle {
    pub stroke: SerializableColor,
    pub stroke_width: f64,
    /// Fill color (None = no fill).
    pub fill: Option<SerializableColor>,
    /// Overall opacity (0.0 = fully transparent, 1.0 = fully opaque).
    #[serde(default = "default_opacity")]
    pub opacity: f64,
}

fn default_opacity() -> f64 {
    1.0
}

impl Default for ObjectStyle {
    fn default() -> Self {
        Self {
            stroke: SerializableColor::black(),
            stroke_width: 2.0,
            fill: None,
            opacity: 1.0,
        }
    }
}

impl ObjectStyle {
    /// Stroke color with opacity applied, ready for a renderer.
    pub fn stroke_color(&self) -> Color {
        with_opacity(self.stroke, self.opacity)
    }

    /// Fill color with opacity applied.
    pub fn fill_color(&self) -> Option<Color> {
        self.fill.map(|fill| with_opacity(fill, self.opacity))
    }
}

fn with_opacity(color: SerializableColor, opacity: f64) -> Color {
    let alpha = (color.a as f64 * opacity.clamp(0.0, 1.0)) as u8;
    Color::from_rgba8(color.r, color.g, color.b, alpha)
}

/// Geometry and content of an object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ObjectKind {
    /// A freehand stroke.
    Freehand { points: Vec<Point> },
    Rectangle { origin: Point, size: Size },
    Ellipse { center: Point, radii: Vec2 },
    Text {
        origin: Point,
        content: String,
        font_size: f64,
    },
    /// A raster image displayed at `size`.
    Image {
        origin: Point,
        size: Size,
        image: ImageData,
    },
}

/// A single drawable item on the board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardObject {
    pub id: ObjectId,
    pub kind: ObjectKind,
    #[serde(default)]
    pub style: ObjectStyle,
}

impl BoardObject {
    /// Default font size for new text objects.
    pub const DEFAULT_FONT_SIZE: f64 = 24.0;

    fn with_kind(kind: ObjectKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            style: ObjectStyle::default(),
        }
    }

    pub fn freehand(points: Vec<Point>) -> Self {
        Self::with_kind(ObjectKind::Freehand { points })
    }

    pub fn rectangle(origin: Point, size: Size) -> Self {
        Self::with_kind(ObjectKind::Rectangle { origin, size })
    }

    /// Rectangle spanning two corner points, in any order.
    pub fn rectangle_from_corners(p1: Point, p2: Point) -> Self {
        let rect = Rect::from_points(p1, p2);
        Self::rectangle(rect.origin(), rect.size())
    }

    pub fn ellipse(center: Point, radii: Vec2) -> Self {
        Self::with_kind(ObjectKind::Ellipse { center, radii })
    }

    pub fn text(origin: Point, content: impl Into<String>) -> Self {
        Self::with_kind(ObjectKind::Text {
            origin,
            content: content.into(),
            font_size: Self::DEFAULT_FONT_SIZE,
        })
    }

    /// Image at its natural pixel size.
    pub fn image(origin: Point, image: ImageData) -> Self {
        let size = Size::new(image.width as f64, image.height as f64);
        Self::with_kind(ObjectKind::Image {
            origin,
            size,
            image,
        })
    }

    /// Short name of the object kind, for logs and timelines.
    pub fn kind_name(&self) -> &'static str {
        match self.kind {
            ObjectKind::Freehand { .. } => "freehand",
            ObjectKind::Rectangle { .. } => "rectangle",
            ObjectKind::Ellipse { .. } => "ellipse",
            ObjectKind::Text { .. } => "text",
            ObjectKind::Image { .. } => "image",
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self.kind, ObjectKind::Text { .. })
    }

    /// Bounding box in board coordinates.
    pub fn bounds(&self) -> Rect {
        match &self.kind {
            ObjectKind::Freehand { points } => {
                let Some((first, rest)) = points.split_first() else {
                    return Rect::ZERO;
                };
                rest.iter()
                    .fold(Rect::from_points(*first, *first), |rect, p| rect.union_pt(*p))
            }
            ObjectKind::Rectangle { origin, size } => Rect::from_origin_size(*origin, *size),
            ObjectKind::Ellipse { center, radii } => Rect::new(
                center.x - radii.x.abs(),
                center.y - radii.y.abs(),
                center.x + radii.x.abs(),
                center.y + radii.y.abs(),
            ),
            ObjectKind::Text {
                origin,
                content,
                font_size,
            } => {
                // Rough metrics; the renderer owns real text layout.
                let widest = content.lines().map(|l| l.chars().count()).max().unwrap_or(0);
                let lines = content.lines().count().max(1);
                let width = (widest as f64 * font_size * 0.55).max(MIN_TEXT_WIDTH);
                let height = lines as f64 * font_size * 1.2;
                Rect::from_origin_size(*origin, Size::new(width, height))
            }
            ObjectKind::Image { origin, size, .. } => Rect::from_origin_size(*origin, *size),
        }
    }

    /// Move the object by `delta`.
    pub fn translate(&mut self, delta: Vec2) {
        let affine = Affine::translate(delta);
        match &mut self.kind {
            ObjectKind::Freehand { points } => {
                for point in points {
                    *point = affine * *point;
                }
            }
            ObjectKind::Rectangle { origin, .. }
            | ObjectKind::Text { origin, .. }
            | ObjectKind::Image { origin, .. } => *origin = affine * *origin,
            ObjectKind::Ellipse { center, .. } => *center = affine * *center,
        }
    }

    /// Copy of this object with a fresh id, shifted by `offset`.
    pub fn duplicate(&self, offset: Vec2) -> Self {
        let mut copy = self.clone();
        copy.id = Uuid::new_v4();
        copy.translate(offset);
        copy
    }

    /// Replace the content of a text object. Returns false for other kinds.
    pub fn set_text(&mut self, text: impl Into<String>) -> bool {
        match &mut self.kind {
            ObjectKind::Text { content, .. } => {
                *content = text.into();
                true
            }
            _ => false,
        }
    }

    /// Scale an image object down so it fits inside `max`, keeping its aspect ratio.
    pub fn fit_within(&mut self, max: Size) {
        let ObjectKind::Image { size, .. } = &mut self.kind else {
            return;
        };
        if size.width <= 0.0 || size.height <= 0.0 || max.width <= 0.0 || max.height <= 0.0 {
            return;
        }
        let scale = (max.width / size.width).min(max.height / size.height);
        if scale < 1.0 {
            *size = Size::new(size.width * scale, size.height * scale);
        }
    }
}
