//! Grid, align and distribute position computation.
//!
//! Every function here is pure: it reads objects and returns
//! `(id, x, y)` triples ready for [`crate::board::Board::rearrange`].
//! Computation works on bounding boxes, then converts back to each kind's
//! anchor, so circles (keyed by center) line up with box-like kinds.
//! Connectors have no bounds and are skipped.

#[cfg(test)]
#[path = "layout_test.rs"]
mod layout_test;

use crate::camera::Point;
use crate::doc::{BoardObject, ObjectId};
use crate::geometry::{Rect, bounds};

/// One `(id, x, y)` target position.
pub type Placement = (ObjectId, f64, f64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alignment {
    Left,
    Right,
    Top,
    Bottom,
    /// Shared vertical center line.
    Center,
    /// Shared horizontal center line.
    Middle,
}

impl Alignment {
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "left" => Some(Self::Left),
            "right" => Some(Self::Right),
            "top" => Some(Self::Top),
            "bottom" => Some(Self::Bottom),
            "center" | "centre" | "center-horizontal" => Some(Self::Center),
            "middle" | "center-vertical" => Some(Self::Middle),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Horizontal,
    Vertical,
}

impl Axis {
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "horizontal" | "horizontally" | "x" | "row" => Some(Self::Horizontal),
            "vertical" | "vertically" | "y" | "column" => Some(Self::Vertical),
            _ => None,
        }
    }
}

fn with_bounds<'a>(objects: impl IntoIterator<Item = &'a BoardObject>) -> Vec<(&'a BoardObject, Rect)> {
    objects
        .into_iter()
        .filter_map(|o| bounds(o).map(|b| (o, b)))
        .collect()
}

/// Anchor position that puts `obj`'s bounding box top-left at `(left, top)`.
fn place(obj: &BoardObject, current: &Rect, left: f64, top: f64) -> Placement {
    (obj.id, left + (obj.x - current.x), top + (obj.y - current.y))
}

/// Lay objects out in rows of `columns` cells, each cell as large as the
/// largest object, starting at `origin`. `columns` defaults to a square-ish grid.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn grid<'a>(
    objects: impl IntoIterator<Item = &'a BoardObject>,
    columns: Option<usize>,
    origin: Point,
    spacing: f64,
) -> Vec<Placement> {
    let items = with_bounds(objects);
    if items.is_empty() {
        return Vec::new();
    }
    let columns = columns.filter(|c| *c > 0).unwrap_or_else(|| square_columns(items.len()));
    let cell_w = items.iter().map(|(_, b)| b.width).fold(0.0, f64::max);
    let cell_h = items.iter().map(|(_, b)| b.height).fold(0.0, f64::max);

    items
        .iter()
        .enumerate()
        .map(|(i, (obj, b))| {
            let col = (i % columns) as f64;
            let row = (i / columns) as f64;
            place(obj, b, origin.x + col * (cell_w + spacing), origin.y + row * (cell_h + spacing))
        })
        .collect()
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
fn square_columns(n: usize) -> usize {
    ((n as f64).sqrt().ceil() as usize).max(1)
}

/// Align every object's edge or center to the extreme of the group.
#[must_use]
pub fn align<'a>(objects: impl IntoIterator<Item = &'a BoardObject>, alignment: Alignment) -> Vec<Placement> {
    let items = with_bounds(objects);
    let Some(group) = items.iter().map(|(_, b)| *b).reduce(|a, b| a.union(&b)) else {
        return Vec::new();
    };
    let center = group.center();

    items
        .iter()
        .map(|(obj, b)| {
            let (left, top) = match alignment {
                Alignment::Left => (group.x, b.y),
                Alignment::Right => (group.right() - b.width, b.y),
                Alignment::Top => (b.x, group.y),
                Alignment::Bottom => (b.x, group.bottom() - b.height),
                Alignment::Center => (center.x - b.width / 2.0, b.y),
                Alignment::Middle => (b.x, center.y - b.height / 2.0),
            };
            place(obj, b, left, top)
        })
        .collect()
}

/// Space objects with equal gaps along `axis`. The outermost two stay put;
/// fewer than three objects yields no placements.
#[must_use]
pub fn distribute<'a>(objects: impl IntoIterator<Item = &'a BoardObject>, axis: Axis) -> Vec<Placement> {
    let mut items = with_bounds(objects);
    if items.len() < 3 {
        return Vec::new();
    }
    let start = |b: &Rect| match axis {
        Axis::Horizontal => b.x,
        Axis::Vertical => b.y,
    };
    let extent = |b: &Rect| match axis {
        Axis::Horizontal => b.width,
        Axis::Vertical => b.height,
    };
    items.sort_by(|(_, a), (_, b)| start(a).total_cmp(&start(b)));

    let first = items[0].1;
    let last = items[items.len() - 1].1;
    let span = start(&last) + extent(&last) - start(&first);
    let occupied: f64 = items.iter().map(|(_, b)| extent(b)).sum();
    #[allow(clippy::cast_precision_loss)]
    let gap = (span - occupied) / (items.len() - 1) as f64;

    let mut cursor = start(&first);
    items
        .iter()
        .map(|(obj, b)| {
            let placed = match axis {
                Axis::Horizontal => place(obj, b, cursor, b.y),
                Axis::Vertical => place(obj, b, b.x, cursor),
            };
            cursor += extent(b) + gap;
            placed
        })
        .collect()
}
