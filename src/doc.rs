//! Document model: board objects, sparse patches, and the cascade query.
//!
//! This module defines what lives on the canvas (`BoardObject`, `ObjectKind`),
//! how connectors attach to other objects (`Endpoint`, `ConnectionPoint`), a
//! sparse-update type for incremental edits (`ObjectPatch`), and the reduced
//! projection handed to the command translator (`ObjectSummary`).
//!
//! Data flows into this layer from the remote store (JSON rows) and from the
//! board container (mutations). Every deletion path asks [`removal_closure`]
//! which connectors must go along with the objects being removed.

#[cfg(test)]
#[path = "doc_test.rs"]
mod doc_test;

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::camera::Point;
use crate::consts::{
    CIRCLE_RADIUS, CONNECTOR_THICKNESS, FRAME_HEIGHT, FRAME_WIDTH, RECT_HEIGHT, RECT_WIDTH, SHAPE_FILL,
    STICKY_NOTE_FILL, STICKY_NOTE_SIZE, STROKE_COLOR,
};

/// Unique identifier for a board object.
pub type ObjectId = Uuid;

/// Unique identifier for a board.
pub type BoardId = Uuid;

/// The kind of a board object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ObjectKind {
    /// Square note with text.
    StickyNote,
    /// Axis-aligned rectangle.
    Rectangle,
    /// Circle keyed by its center; radius is half the width.
    Circle,
    /// Freehand path; points are relative to the object position.
    Line,
    /// Titled region that paints behind other objects.
    Frame,
    /// Free-standing text block.
    Text,
    /// Line or arrow between two connection points on two other objects.
    Connector,
}

impl ObjectKind {
    /// Wire name of the kind.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::StickyNote => "sticky-note",
            Self::Rectangle => "rectangle",
            Self::Circle => "circle",
            Self::Line => "line",
            Self::Frame => "frame",
            Self::Text => "text",
            Self::Connector => "connector",
        }
    }

    /// Parse a kind name, accepting the spellings people and models actually use.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let normalized = raw.trim().to_ascii_lowercase().replace(['_', ' '], "-");
        match normalized.as_str() {
            "sticky-note" | "stickynote" | "sticky" | "note" => Some(Self::StickyNote),
            "rectangle" | "rect" | "square" | "shape" => Some(Self::Rectangle),
            "circle" | "ellipse" | "oval" => Some(Self::Circle),
            "line" | "freehand" | "pen" | "path" => Some(Self::Line),
            "frame" => Some(Self::Frame),
            "text" => Some(Self::Text),
            "connector" | "arrow" => Some(Self::Connector),
            _ => None,
        }
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Named anchor on an object's boundary used for connector attachment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionPoint {
    Top,
    Bottom,
    Left,
    Right,
    #[default]
    Center,
}

/// Arrowhead style of a connector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ArrowStyle {
    None,
    #[default]
    OneWay,
    TwoWay,
}

/// One end of a connector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    pub object_id: ObjectId,
    #[serde(default)]
    pub point: ConnectionPoint,
}

impl Endpoint {
    #[must_use]
    pub fn new(object_id: ObjectId, point: ConnectionPoint) -> Self {
        Self { object_id, point }
    }
}

/// Display properties of a connector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectorStyle {
    pub color: String,
    pub thickness: f64,
    #[serde(default)]
    pub arrow: ArrowStyle,
}

impl Default for ConnectorStyle {
    fn default() -> Self {
        Self { color: STROKE_COLOR.to_string(), thickness: CONNECTOR_THICKNESS, arrow: ArrowStyle::OneWay }
    }
}

/// A board object as stored in the board and on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardObject {
    /// Unique identifier, stable for the object's lifetime.
    pub id: ObjectId,
    /// Shape or edge type.
    pub kind: ObjectKind,
    /// Left edge for box-like kinds, center for circles.
    pub x: f64,
    /// Top edge for box-like kinds, center for circles.
    pub y: f64,
    #[serde(default)]
    pub width: f64,
    #[serde(default)]
    pub height: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke: Option<String>,
    /// Clockwise rotation in degrees.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f64>,
    /// Freehand path points relative to `(x, y)`. Lines only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub points: Option<Vec<Point>>,
    /// Connector source. Connectors only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<Endpoint>,
    /// Connector target. Connectors only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<Endpoint>,
    /// Connector display properties. Connectors only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<ConnectorStyle>,
}

impl BoardObject {
    /// Bare object of `kind` with a fresh id and no optional fields.
    #[must_use]
    pub fn new(kind: ObjectKind, x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            x,
            y,
            width,
            height,
            text: None,
            fill: None,
            stroke: None,
            rotation: None,
            points: None,
            source: None,
            target: None,
            style: None,
        }
    }

    #[must_use]
    pub fn sticky_note(x: f64, y: f64, text: impl Into<String>) -> Self {
        Self::new(ObjectKind::StickyNote, x, y, STICKY_NOTE_SIZE, STICKY_NOTE_SIZE)
            .with_text(text)
            .with_fill(STICKY_NOTE_FILL)
    }

    #[must_use]
    pub fn rectangle(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self::new(ObjectKind::Rectangle, x, y, width, height).with_fill(SHAPE_FILL)
    }

    /// Rectangle with the default size.
    #[must_use]
    pub fn default_rectangle(x: f64, y: f64) -> Self {
        Self::rectangle(x, y, RECT_WIDTH, RECT_HEIGHT)
    }

    /// Circle centered on `(cx, cy)`.
    #[must_use]
    pub fn circle(cx: f64, cy: f64, radius: f64) -> Self {
        let radius = if radius > 0.0 { radius } else { CIRCLE_RADIUS };
        Self::new(ObjectKind::Circle, cx, cy, radius * 2.0, radius * 2.0).with_fill(SHAPE_FILL)
    }

    #[must_use]
    pub fn frame(x: f64, y: f64, width: f64, height: f64, title: impl Into<String>) -> Self {
        let width = if width > 0.0 { width } else { FRAME_WIDTH };
        let height = if height > 0.0 { height } else { FRAME_HEIGHT };
        Self::new(ObjectKind::Frame, x, y, width, height).with_text(title)
    }

    #[must_use]
    pub fn text_block(x: f64, y: f64, text: impl Into<String>) -> Self {
        Self::new(ObjectKind::Text, x, y, 200.0, 40.0).with_text(text)
    }

    /// Freehand line anchored at `origin`; `points` are relative to it.
    #[must_use]
    pub fn line(origin: Point, points: Vec<Point>) -> Self {
        let mut obj = Self::new(ObjectKind::Line, origin.x, origin.y, 0.0, 0.0);
        obj.stroke = Some(STROKE_COLOR.to_string());
        obj.points = Some(points);
        obj
    }

    #[must_use]
    pub fn connector(source: Endpoint, target: Endpoint) -> Self {
        let mut obj = Self::new(ObjectKind::Connector, 0.0, 0.0, 0.0, 0.0);
        obj.source = Some(source);
        obj.target = Some(target);
        obj.style = Some(ConnectorStyle::default());
        obj
    }

    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    #[must_use]
    pub fn with_fill(mut self, fill: impl Into<String>) -> Self {
        self.fill = Some(fill.into());
        self
    }

    #[must_use]
    pub fn is_connector(&self) -> bool {
        self.kind == ObjectKind::Connector
    }

    /// Ids this connector attaches to. Empty for every other kind.
    #[must_use]
    pub fn endpoint_ids(&self) -> Vec<ObjectId> {
        if !self.is_connector() {
            return Vec::new();
        }
        self.source
            .iter()
            .chain(self.target.iter())
            .map(|e| e.object_id)
            .collect()
    }

    /// Whether this is a connector attached to `id` at either end.
    #[must_use]
    pub fn references(&self, id: ObjectId) -> bool {
        self.endpoint_ids().contains(&id)
    }

    /// Shift the object by a world-space delta. Connectors follow their endpoints and are untouched.
    pub fn translate(&mut self, dx: f64, dy: f64) {
        if self.is_connector() {
            return;
        }
        self.x += dx;
        self.y += dy;
    }
}

/// Sparse update for a board object. Only present fields are applied.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObjectPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stroke: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub points: Option<Vec<Point>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<Endpoint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<Endpoint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<ConnectorStyle>,
}

impl ObjectPatch {
    #[must_use]
    pub fn position(x: f64, y: f64) -> Self {
        Self { x: Some(x), y: Some(y), ..Self::default() }
    }

    #[must_use]
    pub fn size(width: f64, height: f64) -> Self {
        Self { width: Some(width), height: Some(height), ..Self::default() }
    }

    #[must_use]
    pub fn fill(color: impl Into<String>) -> Self {
        Self { fill: Some(color.into()), ..Self::default() }
    }

    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self { text: Some(text.into()), ..Self::default() }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Merge every present field into `obj`.
    pub fn apply_to(&self, obj: &mut BoardObject) {
        if let Some(x) = self.x {
            obj.x = x;
        }
        if let Some(y) = self.y {
            obj.y = y;
        }
        if let Some(w) = self.width {
            obj.width = w;
        }
        if let Some(h) = self.height {
            obj.height = h;
        }
        if let Some(text) = &self.text {
            obj.text = Some(text.clone());
        }
        if let Some(fill) = &self.fill {
            obj.fill = Some(fill.clone());
        }
        if let Some(stroke) = &self.stroke {
            obj.stroke = Some(stroke.clone());
        }
        if let Some(rotation) = self.rotation {
            obj.rotation = Some(rotation);
        }
        if let Some(points) = &self.points {
            obj.points = Some(points.clone());
        }
        if obj.is_connector() {
            if let Some(source) = self.source {
                obj.source = Some(source);
            }
            if let Some(target) = self.target {
                obj.target = Some(target);
            }
            if let Some(style) = &self.style {
                obj.style = Some(style.clone());
            }
        }
    }
}

/// Reduced projection of an object sent to the command translator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectSummary {
    pub id: ObjectId,
    pub kind: ObjectKind,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl From<&BoardObject> for ObjectSummary {
    fn from(obj: &BoardObject) -> Self {
        let color = if obj.is_connector() {
            obj.style.as_ref().map(|s| s.color.clone())
        } else {
            obj.fill.clone()
        };
        Self {
            id: obj.id,
            kind: obj.kind,
            x: obj.x,
            y: obj.y,
            width: obj.width,
            height: obj.height,
            color,
            text: obj.text.clone(),
        }
    }
}

// =============================================================================
// CASCADE
// =============================================================================

/// Ids of connectors attached to any id in `ids`.
#[must_use]
pub fn dependents_of(objects: &[BoardObject], ids: &HashSet<ObjectId>) -> HashSet<ObjectId> {
    objects
        .iter()
        .filter(|obj| obj.is_connector() && obj.endpoint_ids().iter().any(|id| ids.contains(id)))
        .map(|obj| obj.id)
        .collect()
}

/// `roots` plus every connector that transitively depends on them.
///
/// Only ids present in `objects` are returned, so removing the result never
/// reports phantom deletions.
#[must_use]
pub fn removal_closure(objects: &[BoardObject], roots: &HashSet<ObjectId>) -> HashSet<ObjectId> {
    let mut removed: HashSet<ObjectId> = objects
        .iter()
        .filter(|obj| roots.contains(&obj.id))
        .map(|obj| obj.id)
        .collect();
    loop {
        let before = removed.len();
        removed.extend(dependents_of(objects, &removed));
        if removed.len() == before {
            return removed;
        }
    }
}

/// Drop connectors whose source or target is not in the sequence.
#[must_use]
pub fn prune_dangling(objects: Vec<BoardObject>) -> Vec<BoardObject> {
    let mut objects = objects;
    loop {
        let present: HashSet<ObjectId> = objects.iter().map(|obj| obj.id).collect();
        let before = objects.len();
        objects.retain(|obj| {
            if !obj.is_connector() {
                return true;
            }
            match (obj.source, obj.target) {
                (Some(s), Some(t)) => present.contains(&s.object_id) && present.contains(&t.object_id),
                _ => false,
            }
        });
        if objects.len() == before {
            return objects;
        }
    }
}
