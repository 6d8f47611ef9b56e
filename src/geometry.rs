//! Pure geometry over board objects: connection points, bounds, marquee hits.
//!
//! All functions ignore rotation and work on axis-aligned boxes. Circles are
//! keyed by center and radius (`width / 2`); every other kind by its
//! top-left corner and size. Connectors have no geometry of their own.

#[cfg(test)]
#[path = "geometry_test.rs"]
mod geometry_test;

use crate::camera::Point;
use crate::doc::{BoardObject, ConnectionPoint, ObjectKind};

/// Axis-aligned rectangle in world coordinates. Width and height are never negative.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    /// Build a rectangle, normalizing negative extents (marquee dragged up or left).
    #[must_use]
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        let (x, width) = if width < 0.0 { (x + width, -width) } else { (x, width) };
        let (y, height) = if height < 0.0 { (y + height, -height) } else { (y, height) };
        Self { x, y, width, height }
    }

    /// Rectangle spanning two opposite corners in any order.
    #[must_use]
    pub fn from_corners(a: Point, b: Point) -> Self {
        Self::new(a.x, a.y, b.x - a.x, b.y - a.y)
    }

    #[must_use]
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    #[must_use]
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Inclusive point containment.
    #[must_use]
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.right() && p.y >= self.y && p.y <= self.bottom()
    }

    /// Inclusive overlap; touching edges count.
    #[must_use]
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x <= other.right() && other.x <= self.right() && self.y <= other.bottom() && other.y <= self.bottom()
    }

    /// Smallest rectangle covering both.
    #[must_use]
    pub fn union(&self, other: &Rect) -> Rect {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        Rect::new(x, y, self.right().max(other.right()) - x, self.bottom().max(other.bottom()) - y)
    }
}

/// Absolute coordinates of a named connection point on `obj`.
#[must_use]
pub fn connection_point(obj: &BoardObject, point: ConnectionPoint) -> Point {
    if obj.kind == ObjectKind::Circle {
        let r = obj.width / 2.0;
        return match point {
            ConnectionPoint::Top => Point::new(obj.x, obj.y - r),
            ConnectionPoint::Bottom => Point::new(obj.x, obj.y + r),
            ConnectionPoint::Left => Point::new(obj.x - r, obj.y),
            ConnectionPoint::Right => Point::new(obj.x + r, obj.y),
            ConnectionPoint::Center => Point::new(obj.x, obj.y),
        };
    }

    let (w, h) = (obj.width, obj.height);
    match point {
        ConnectionPoint::Top => Point::new(obj.x + w / 2.0, obj.y),
        ConnectionPoint::Bottom => Point::new(obj.x + w / 2.0, obj.y + h),
        ConnectionPoint::Left => Point::new(obj.x, obj.y + h / 2.0),
        ConnectionPoint::Right => Point::new(obj.x + w, obj.y + h / 2.0),
        ConnectionPoint::Center => Point::new(obj.x + w / 2.0, obj.y + h / 2.0),
    }
}

/// Absolute path points of a freehand line.
#[must_use]
pub fn absolute_points(obj: &BoardObject) -> Vec<Point> {
    match &obj.points {
        Some(points) if !points.is_empty() => points
            .iter()
            .map(|p| Point::new(obj.x + p.x, obj.y + p.y))
            .collect(),
        _ => vec![Point::new(obj.x, obj.y)],
    }
}

/// Bounding box of an object. `None` for connectors.
#[must_use]
pub fn bounds(obj: &BoardObject) -> Option<Rect> {
    match obj.kind {
        ObjectKind::Connector => None,
        ObjectKind::Circle => {
            let r = obj.width / 2.0;
            Some(Rect::new(obj.x - r, obj.y - r, obj.width, obj.width))
        }
        ObjectKind::Line => {
            let points = absolute_points(obj);
            let (mut min_x, mut min_y) = (f64::INFINITY, f64::INFINITY);
            let (mut max_x, mut max_y) = (f64::NEG_INFINITY, f64::NEG_INFINITY);
            for p in &points {
                min_x = min_x.min(p.x);
                min_y = min_y.min(p.y);
                max_x = max_x.max(p.x);
                max_y = max_y.max(p.y);
            }
            Some(Rect::new(min_x, min_y, max_x - min_x, max_y - min_y))
        }
        _ => Some(Rect::new(obj.x, obj.y, obj.width, obj.height)),
    }
}

/// Union of the bounds of `objects`, skipping connectors. `None` when nothing has geometry.
#[must_use]
pub fn bounds_of<'a>(objects: impl IntoIterator<Item = &'a BoardObject>) -> Option<Rect> {
    objects
        .into_iter()
        .filter_map(bounds)
        .reduce(|acc, r| acc.union(&r))
}

/// Kind-aware marquee hit test.
///
/// - lines: any path point inside the rectangle;
/// - circles: the closest rectangle point lies within the radius;
/// - connectors: never hit;
/// - everything else: axis-aligned box overlap.
#[must_use]
pub fn box_intersects(obj: &BoardObject, rect: &Rect) -> bool {
    match obj.kind {
        ObjectKind::Connector => false,
        ObjectKind::Line => absolute_points(obj).into_iter().any(|p| rect.contains(p)),
        ObjectKind::Circle => {
            let r = obj.width / 2.0;
            let nearest_x = obj.x.max(rect.x).min(rect.right());
            let nearest_y = obj.y.max(rect.y).min(rect.bottom());
            let dx = obj.x - nearest_x;
            let dy = obj.y - nearest_y;
            dx * dx + dy * dy <= r * r
        }
        _ => Rect::new(obj.x, obj.y, obj.width, obj.height).intersects(rect),
    }
}
