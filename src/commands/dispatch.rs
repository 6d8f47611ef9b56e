//! Operation dispatcher: applies a list of [`Operation`]s to a [`Board`].
//!
//! DESIGN
//! ======
//! Every operation maps onto one call of the board's public mutation surface;
//! the dispatcher never touches the object sequence directly. Consecutive
//! mutating operations run inside one `batch`, so an AI command is a single
//! undo step. `undo` and `redo` walk history themselves and cannot sit
//! inside a batch, so they split the list into separate segments.
//!
//! ERROR HANDLING
//! ==============
//! Nothing here fails. Unknown names and operations with missing or
//! malformed arguments are logged with `warn!` and reported as skipped.
//! Ids that are not on the board are silent no-ops, as everywhere else.

#[cfg(test)]
#[path = "dispatch_test.rs"]
mod dispatch_test;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};
use uuid::Uuid;

use super::{Operation, OperationName};
use crate::board::Board;
use crate::camera::Point;
use crate::consts::{
    DEFAULT_SCREEN_HEIGHT, DEFAULT_SCREEN_WIDTH, FIT_PADDING_PX, FRAME_HEIGHT, FRAME_WIDTH, LAYOUT_SPACING, RECT_HEIGHT,
    RECT_WIDTH, STICKY_NOTE_SIZE,
};
use crate::doc::{
    ArrowStyle, BoardObject, ConnectionPoint, ConnectorStyle, Endpoint, ObjectId, ObjectKind, ObjectPatch,
};
use crate::geometry::bounds_of;
use crate::layout::{self, Alignment, Axis};
use crate::templates::Template;

/// What a dispatch run did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DispatchReport {
    /// Operations that were recognized and carried out.
    pub applied: usize,
    /// Names of operations that were unknown or had unusable arguments.
    pub skipped: Vec<String>,
    /// Ids of objects created, in creation order.
    pub created: Vec<ObjectId>,
}

// =============================================================================
// EXECUTE
// =============================================================================

/// Apply `ops` in order.
pub fn execute(board: &mut Board, ops: &[Operation]) -> DispatchReport {
    let mut report = DispatchReport::default();
    let mut segment: Vec<&Operation> = Vec::new();

    for op in ops {
        match op.kind() {
            Some(name) if name.is_history_step() => {
                run_segment(board, &segment, &mut report);
                segment.clear();
                let stepped = match name {
                    OperationName::Undo => board.undo(),
                    _ => board.redo(),
                };
                debug!(operation = %op.name, stepped, "dispatch: history step");
                report.applied += 1;
            }
            _ => segment.push(op),
        }
    }
    run_segment(board, &segment, &mut report);
    report
}

fn run_segment(board: &mut Board, segment: &[&Operation], report: &mut DispatchReport) {
    if segment.is_empty() {
        return;
    }
    board.batch(|board| {
        for op in segment {
            let Some(name) = op.kind() else {
                warn!(operation = %op.name, "dispatch: unknown operation skipped");
                report.skipped.push(op.name.clone());
                continue;
            };
            if apply(board, name, &op.args, &mut report.created).is_some() {
                report.applied += 1;
            } else {
                warn!(operation = %op.name, args = %op.args, "dispatch: missing or invalid arguments");
                report.skipped.push(op.name.clone());
            }
        }
    });
}

/// Carry out one operation. `None` means the arguments were unusable.
#[allow(clippy::too_many_lines)]
fn apply(board: &mut Board, name: OperationName, args: &Value, created: &mut Vec<ObjectId>) -> Option<()> {
    match name {
        OperationName::CreateStickyNote => {
            let text = str_arg(args, "text").unwrap_or_default();
            let (x, y) = placement(board, args, STICKY_NOTE_SIZE, STICKY_NOTE_SIZE);
            let mut note = BoardObject::sticky_note(x, y, text);
            if let Some(color) = str_arg(args, "color") {
                note = note.with_fill(color);
            }
            push_created(board, note, created);
        }
        OperationName::CreateRectangle => {
            let width = positive(args, "width").unwrap_or(RECT_WIDTH);
            let height = positive(args, "height").unwrap_or(RECT_HEIGHT);
            let (x, y) = placement(board, args, width, height);
            let mut rect = BoardObject::rectangle(x, y, width, height);
            if let Some(color) = str_arg(args, "color") {
                rect = rect.with_fill(color);
            }
            push_created(board, rect, created);
        }
        OperationName::CreateCircle => {
            let center = screen_center(board);
            let cx = num(args, "x").unwrap_or(center.x);
            let cy = num(args, "y").unwrap_or(center.y);
            let mut circle = BoardObject::circle(cx, cy, positive(args, "radius").unwrap_or(0.0));
            if let Some(color) = str_arg(args, "color") {
                circle = circle.with_fill(color);
            }
            push_created(board, circle, created);
        }
        OperationName::CreateFrame => {
            let width = positive(args, "width").unwrap_or(FRAME_WIDTH);
            let height = positive(args, "height").unwrap_or(FRAME_HEIGHT);
            let (x, y) = placement(board, args, width, height);
            let title = str_arg(args, "title").unwrap_or("Frame");
            push_created(board, BoardObject::frame(x, y, width, height, title), created);
        }
        OperationName::CreateText => {
            let text = str_arg(args, "text")?;
            let (x, y) = placement(board, args, 200.0, 40.0);
            push_created(board, BoardObject::text_block(x, y, text), created);
        }
        OperationName::CreateConnector => {
            let from = id_arg(args, "fromId")?;
            let to = id_arg(args, "toId")?;
            let from_point = typed::<ConnectionPoint>(args, "fromPoint").unwrap_or_default();
            let to_point = typed::<ConnectionPoint>(args, "toPoint").unwrap_or_default();
            let mut connector = BoardObject::connector(Endpoint::new(from, from_point), Endpoint::new(to, to_point));
            if let Some(arrow) = typed::<ArrowStyle>(args, "arrow") {
                connector.style = Some(ConnectorStyle { arrow, ..ConnectorStyle::default() });
            }
            push_created(board, connector, created);
        }
        OperationName::MoveObject => {
            let x = num(args, "x")?;
            let y = num(args, "y")?;
            if let Some(id) = id_arg(args, "id") {
                board.update(id, &ObjectPatch::position(x, y));
            } else {
                let group = bounds_of(board.selected_objects())?;
                board.move_selection(x - group.x, y - group.y);
            }
        }
        OperationName::DeleteObject => {
            board.delete(id_arg(args, "id")?);
        }
        OperationName::DeleteObjects => {
            let ids = match str_arg(args, "kind") {
                Some(raw) => {
                    let kind = ObjectKind::parse(raw)?;
                    board.objects().iter().filter(|o| o.kind == kind).map(|o| o.id).collect()
                }
                None => explicit_or_selected(board, args),
            };
            board.delete_many(ids);
        }
        OperationName::UpdateStickyNote => {
            let id = id_arg(args, "id")?;
            board.update(id, &ObjectPatch::text(str_arg(args, "text")?));
        }
        OperationName::UpdateObject => {
            let patch = ObjectPatch {
                x: num(args, "x"),
                y: num(args, "y"),
                width: positive(args, "width"),
                height: positive(args, "height"),
                text: str_arg(args, "text").map(str::to_string),
                fill: str_arg(args, "color").map(str::to_string),
                ..ObjectPatch::default()
            };
            if patch.is_empty() {
                return None;
            }
            for id in explicit_or_selected(board, args) {
                board.update(id, &patch);
            }
        }
        OperationName::ClearBoard => board.clear(),
        OperationName::ChangeColor => {
            let color = str_arg(args, "color")?;
            for id in explicit_or_selected(board, args) {
                let Some(obj) = board.object(id) else { continue };
                let patch = if obj.is_connector() {
                    let mut style = obj.style.clone().unwrap_or_default();
                    style.color = color.to_string();
                    ObjectPatch { style: Some(style), ..ObjectPatch::default() }
                } else {
                    ObjectPatch::fill(color)
                };
                board.update(id, &patch);
            }
        }
        OperationName::ArrangeInGrid => {
            let ids = layout_targets(board, args);
            let objects: Vec<&BoardObject> = ids.iter().filter_map(|id| board.object(*id)).collect();
            let group = bounds_of(objects.iter().copied())?;
            let origin = Point::new(num(args, "x").unwrap_or(group.x), num(args, "y").unwrap_or(group.y));
            let columns = args.get("columns").and_then(Value::as_u64).map(|c| usize::try_from(c).unwrap_or(usize::MAX));
            let spacing = num(args, "spacing").unwrap_or(LAYOUT_SPACING);
            let placements = layout::grid(objects, columns, origin, spacing);
            board.rearrange(&placements);
        }
        OperationName::AlignObjects => {
            let alignment = Alignment::parse(str_arg(args, "alignment")?)?;
            let ids = layout_targets(board, args);
            let placements = layout::align(ids.iter().filter_map(|id| board.object(*id)), alignment);
            board.rearrange(&placements);
        }
        OperationName::DistributeObjects => {
            let axis = Axis::parse(str_arg(args, "direction")?)?;
            let ids = layout_targets(board, args);
            let placements = layout::distribute(ids.iter().filter_map(|id| board.object(*id)), axis);
            board.rearrange(&placements);
        }
        OperationName::CreateTemplate => {
            let template = Template::parse(str_arg(args, "template")?)?;
            let center = screen_center(board);
            let origin = Point::new(num(args, "x").unwrap_or(center.x), num(args, "y").unwrap_or(center.y));
            for obj in template.build(origin) {
                push_created(board, obj, created);
            }
        }
        OperationName::SetZoom => board.set_zoom(num(args, "zoom")?),
        OperationName::PanView => board.pan_by(num(args, "dx")?, num(args, "dy")?),
        OperationName::ResetView => board.reset_view(),
        OperationName::FitToView => board.fit_to_view(
            positive(args, "width").unwrap_or(DEFAULT_SCREEN_WIDTH),
            positive(args, "height").unwrap_or(DEFAULT_SCREEN_HEIGHT),
            FIT_PADDING_PX,
        ),
        // Answered by the runner; nothing to mutate.
        OperationName::SummarizeBoard => {}
        OperationName::MoveSelection => {
            board.move_selection(num(args, "dx")?, num(args, "dy")?);
        }
        OperationName::DeleteSelected => {
            board.delete_selected();
        }
        OperationName::ZoomBy => {
            let factor = positive(args, "factor")?;
            board.zoom_by(factor, Point::new(DEFAULT_SCREEN_WIDTH / 2.0, DEFAULT_SCREEN_HEIGHT / 2.0));
        }
        OperationName::SelectAll => board.select_all(),
        OperationName::SelectObjects => match str_arg(args, "kind") {
            Some(raw) => board.select_kind(ObjectKind::parse(raw)?),
            None => board.set_selection(id_list(args)),
        },
        OperationName::Deselect => board.clear_selection(),
        OperationName::Undo => {
            board.undo();
        }
        OperationName::Redo => {
            board.redo();
        }
    }
    Some(())
}

// =============================================================================
// SUMMARY
// =============================================================================

/// Plain-text description of a board: object counts per kind, then note texts.
#[must_use]
pub fn summarize(objects: &[BoardObject]) -> String {
    if objects.is_empty() {
        return "The board is empty.".into();
    }
    let mut counts: Vec<(ObjectKind, usize)> = Vec::new();
    for obj in objects {
        match counts.iter_mut().find(|(kind, _)| *kind == obj.kind) {
            Some((_, n)) => *n += 1,
            None => counts.push((obj.kind, 1)),
        }
    }
    let parts: Vec<String> = counts.iter().map(|(kind, n)| format!("{n} {kind}")).collect();
    let mut out = format!("{} objects: {}.", objects.len(), parts.join(", "));

    let notes: Vec<String> = objects
        .iter()
        .filter(|o| o.kind == ObjectKind::StickyNote)
        .filter_map(|o| o.text.as_deref())
        .filter(|t| !t.trim().is_empty())
        .map(|t| format!("\"{}\"", t.trim()))
        .collect();
    if !notes.is_empty() {
        out.push_str(" Notes: ");
        out.push_str(&notes.join(", "));
        out.push('.');
    }
    out
}

// =============================================================================
// ARGUMENTS
// =============================================================================

fn num(args: &Value, key: &str) -> Option<f64> {
    args.get(key).and_then(Value::as_f64).filter(|v| v.is_finite())
}

fn positive(args: &Value, key: &str) -> Option<f64> {
    num(args, key).filter(|v| *v > 0.0)
}

fn str_arg<'a>(args: &'a Value, key: &str) -> Option<&'a str> {
    args.get(key).and_then(Value::as_str)
}

fn parse_id(raw: &str) -> Option<ObjectId> {
    match Uuid::parse_str(raw.trim()) {
        Ok(id) => Some(id),
        Err(e) => {
            debug!(raw, error = %e, "dispatch: ignoring malformed object id");
            None
        }
    }
}

fn id_arg(args: &Value, key: &str) -> Option<ObjectId> {
    str_arg(args, key).and_then(parse_id)
}

fn typed<T: DeserializeOwned>(args: &Value, key: &str) -> Option<T> {
    let raw = args.get(key)?;
    match serde_json::from_value(raw.clone()) {
        Ok(value) => Some(value),
        Err(e) => {
            debug!(key, error = %e, "dispatch: ignoring malformed argument");
            None
        }
    }
}

/// Ids named by `ids` (array) or `id`. Unparseable entries are dropped.
fn id_list(args: &Value) -> Vec<ObjectId> {
    if let Some(list) = args.get("ids").and_then(Value::as_array) {
        return list.iter().filter_map(Value::as_str).filter_map(parse_id).collect();
    }
    id_arg(args, "id").into_iter().collect()
}

/// Explicit ids, else the selection.
fn explicit_or_selected(board: &Board, args: &Value) -> Vec<ObjectId> {
    let ids = id_list(args);
    if !ids.is_empty() {
        return ids;
    }
    board.selection().iter().copied().collect()
}

/// Explicit ids, else the selection, else every non-connector, in paint order.
fn layout_targets(board: &Board, args: &Value) -> Vec<ObjectId> {
    let ids = explicit_or_selected(board, args);
    board
        .objects()
        .iter()
        .filter(|o| if ids.is_empty() { !o.is_connector() } else { ids.contains(&o.id) })
        .map(|o| o.id)
        .collect()
}

/// World point under the middle of the default screen.
fn screen_center(board: &Board) -> Point {
    board
        .viewport()
        .screen_to_world(Point::new(DEFAULT_SCREEN_WIDTH / 2.0, DEFAULT_SCREEN_HEIGHT / 2.0))
}

/// Top-left for a new box: the given `x`/`y`, else centered on screen.
fn placement(board: &Board, args: &Value, width: f64, height: f64) -> (f64, f64) {
    let center = screen_center(board);
    (
        num(args, "x").unwrap_or(center.x - width / 2.0),
        num(args, "y").unwrap_or(center.y - height / 2.0),
    )
}

fn push_created(board: &mut Board, obj: BoardObject, created: &mut Vec<ObjectId>) {
    if let Some(id) = board.add(obj) {
        created.push(id);
    }
}
