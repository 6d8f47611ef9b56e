//! Board state container: the sole owner of a board's live state.
//!
//! DESIGN
//! ======
//! `Board` owns the object sequence, selection, clipboard, viewport and
//! active tool of one opened board. Every mutation is optimistic: it is
//! applied in memory immediately, recorded in history (unless paused) and
//! re-arms the debounce scheduler so the full sequence is written once the
//! board goes quiet. Nothing here performs I/O; the session drains due
//! writes with [`Board::take_pending_write`].
//!
//! The object sequence is an `Arc<Vec<_>>` snapshot. Each mutation builds a
//! new vector and swaps the handle, so history entries are shared, never
//! copied, and change detection is handle identity.
//!
//! Order is paint order. Frames are kept ahead of every other kind so they
//! paint behind.
//!
//! ERROR HANDLING
//! ==============
//! Mutations never fail. An id that does not exist makes the call a silent
//! no-op so concurrent deletes and edits from other clients cannot break a
//! local gesture. No mutation can leave a dangling connector or a selected
//! id that is not on the board.

#[cfg(test)]
#[path = "board_test.rs"]
mod board_test;

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tokio::time::Instant;
use tracing::debug;

use crate::camera::{Point, Viewport, clamp_zoom};
use crate::config::BoardSettings;
use crate::doc::{BoardId, BoardObject, ObjectId, ObjectKind, ObjectPatch, ObjectSummary, prune_dangling, removal_closure};
use crate::geometry::{Rect, bounds_of, box_intersects};
use crate::history::{History, Recording, Snapshot};
use crate::scheduler::PersistScheduler;

// =============================================================================
// TYPES
// =============================================================================

/// Which tool is currently active. Pure UI mode; never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tool {
    #[default]
    Select,
    Pan,
    StickyNote,
    Rectangle,
    Circle,
    Line,
    Frame,
    Text,
    Connector,
}

/// Where the clipboard contents came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClipboardSource {
    /// Survives any number of pastes.
    Copy,
    /// Consumed by the first paste.
    Cut,
}

/// Local clipboard. Never persisted and never part of history.
#[derive(Debug, Clone)]
pub struct Clipboard {
    objects: Vec<BoardObject>,
    source: ClipboardSource,
    pastes: u32,
}

impl Clipboard {
    #[must_use]
    pub fn objects(&self) -> &[BoardObject] {
        &self.objects
    }

    #[must_use]
    pub fn source(&self) -> ClipboardSource {
        self.source
    }

    /// Pastes performed from this clipboard so far.
    #[must_use]
    pub fn pastes(&self) -> u32 {
        self.pastes
    }
}

/// A due remote write: the full object sequence of one board.
#[derive(Debug, Clone)]
pub struct PendingWrite {
    pub board_id: BoardId,
    pub objects: Snapshot,
    /// Mutations folded into this write.
    pub coalesced: u64,
}

// =============================================================================
// BOARD
// =============================================================================

#[derive(Debug)]
pub struct Board {
    board_id: BoardId,
    objects: Snapshot,
    selection: HashSet<ObjectId>,
    clipboard: Option<Clipboard>,
    viewport: Viewport,
    tool: Tool,
    history: History,
    scheduler: PersistScheduler,
    settings: BoardSettings,
}

impl Board {
    /// Empty board.
    #[must_use]
    pub fn new(board_id: BoardId, settings: BoardSettings) -> Self {
        Self::load(board_id, Vec::new(), settings)
    }

    /// Board hydrated from a stored snapshot. History starts empty and no write is pending.
    #[must_use]
    pub fn load(board_id: BoardId, objects: Vec<BoardObject>, settings: BoardSettings) -> Self {
        Self {
            board_id,
            objects: Arc::new(prune_dangling(objects)),
            selection: HashSet::new(),
            clipboard: None,
            viewport: Viewport::default(),
            tool: Tool::default(),
            history: History::new(settings.history_depth),
            scheduler: PersistScheduler::new(settings.persist_debounce),
            settings,
        }
    }

    /// Switch this container to another board. Nothing carries over: not
    /// history, selection, clipboard, nor a pending write.
    pub fn reset(&mut self, board_id: BoardId, objects: Vec<BoardObject>) {
        *self = Self::load(board_id, objects, self.settings);
    }

    // --- Reads ---

    #[must_use]
    pub fn board_id(&self) -> BoardId {
        self.board_id
    }

    #[must_use]
    pub fn objects(&self) -> &[BoardObject] {
        &self.objects
    }

    /// Shared handle to the current sequence.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        Arc::clone(&self.objects)
    }

    #[must_use]
    pub fn object(&self, id: ObjectId) -> Option<&BoardObject> {
        self.objects.iter().find(|o| o.id == id)
    }

    #[must_use]
    pub fn contains(&self, id: ObjectId) -> bool {
        self.object(id).is_some()
    }

    #[must_use]
    pub fn selection(&self) -> &HashSet<ObjectId> {
        &self.selection
    }

    #[must_use]
    pub fn is_selected(&self, id: ObjectId) -> bool {
        self.selection.contains(&id)
    }

    /// Selected objects in paint order.
    #[must_use]
    pub fn selected_objects(&self) -> Vec<&BoardObject> {
        self.objects
            .iter()
            .filter(|o| self.selection.contains(&o.id))
            .collect()
    }

    /// Bounds of the current selection, if any selected object has geometry.
    #[must_use]
    pub fn selection_bounds(&self) -> Option<Rect> {
        bounds_of(self.selected_objects())
    }

    #[must_use]
    pub fn clipboard(&self) -> Option<&Clipboard> {
        self.clipboard.as_ref()
    }

    #[must_use]
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    #[must_use]
    pub fn active_tool(&self) -> Tool {
        self.tool
    }

    #[must_use]
    pub fn history(&self) -> &History {
        &self.history
    }

    /// Direct history access for composite operations that pause, mutate,
    /// resume and push one entry by hand. Prefer [`Board::batch`].
    pub fn history_mut(&mut self) -> &mut History {
        &mut self.history
    }

    #[must_use]
    pub fn settings(&self) -> BoardSettings {
        self.settings
    }

    #[must_use]
    pub fn has_pending_write(&self) -> bool {
        self.scheduler.is_armed()
    }

    #[must_use]
    pub fn persist_deadline(&self) -> Option<Instant> {
        self.scheduler.deadline()
    }

    /// Reduced projection of every object, for the command translator.
    #[must_use]
    pub fn summaries(&self) -> Vec<ObjectSummary> {
        self.objects.iter().map(ObjectSummary::from).collect()
    }

    // --- Commit plumbing ---

    fn commit(&mut self, next: Vec<BoardObject>) {
        self.swap(next);
        self.scheduler.arm(Instant::now());
    }

    fn swap(&mut self, next: Vec<BoardObject>) {
        let next: Snapshot = Arc::new(next);
        self.history.record(&self.objects, &next);
        self.objects = next;
        self.prune_selection();
    }

    /// Re-arm persistence without changing the sequence.
    fn touch(&mut self) {
        self.scheduler.arm(Instant::now());
    }

    fn prune_selection(&mut self) {
        if self.selection.is_empty() {
            return;
        }
        let present: HashSet<ObjectId> = self.objects.iter().map(|o| o.id).collect();
        self.selection.retain(|id| present.contains(id));
    }

    fn restore(&mut self, snapshot: Snapshot) {
        self.objects = snapshot;
        self.prune_selection();
        self.scheduler.arm(Instant::now());
    }

    // --- Object mutations ---

    /// Add an object. Frames go behind all non-frame objects; everything else is appended.
    ///
    /// Returns `None` (and changes nothing) when the id is already on the
    /// board or the object is a connector whose endpoints are missing.
    pub fn add(&mut self, object: BoardObject) -> Option<ObjectId> {
        if self.contains(object.id) {
            debug!(id = %object.id, "board: add ignored, id already present");
            return None;
        }
        if object.is_connector() {
            let attached = object.source.is_some()
                && object.target.is_some()
                && object
                    .endpoint_ids()
                    .iter()
                    .all(|id| self.contains(*id));
            if !attached {
                debug!(id = %object.id, "board: connector add ignored, endpoint missing");
                return None;
            }
        }

        let id = object.id;
        let mut next = self.objects.to_vec();
        insert_in_paint_order(&mut next, object);
        self.commit(next);
        Some(id)
    }

    /// Merge `patch` into the object with `id`. Returns whether the object exists.
    pub fn update(&mut self, id: ObjectId, patch: &ObjectPatch) -> bool {
        let Some(index) = self.objects.iter().position(|o| o.id == id) else {
            self.touch();
            return false;
        };
        let mut next = self.objects.to_vec();
        patch.apply_to(&mut next[index]);
        let reattached_to_missing = next[index]
            .endpoint_ids()
            .iter()
            .any(|endpoint| !self.contains(*endpoint));
        if reattached_to_missing {
            debug!(%id, "board: connector update ignored, endpoint missing");
            self.touch();
            return false;
        }
        self.commit(next);
        true
    }

    /// Remove an object together with every connector attached to it.
    /// Returns the number of objects removed.
    pub fn delete(&mut self, id: ObjectId) -> usize {
        self.delete_many([id])
    }

    /// Remove several objects and their dependent connectors as one mutation.
    pub fn delete_many(&mut self, ids: impl IntoIterator<Item = ObjectId>) -> usize {
        let roots: HashSet<ObjectId> = ids.into_iter().collect();
        let removed = removal_closure(&self.objects, &roots);
        if removed.is_empty() {
            self.touch();
            return 0;
        }
        let next: Vec<BoardObject> = self
            .objects
            .iter()
            .filter(|o| !removed.contains(&o.id))
            .cloned()
            .collect();
        self.commit(next);
        removed.len()
    }

    /// Delete every selected object in one batch. No-op on an empty selection.
    pub fn delete_selected(&mut self) -> usize {
        if self.selection.is_empty() {
            return 0;
        }
        let ids: Vec<ObjectId> = self.selection.iter().copied().collect();
        self.delete_many(ids)
    }

    /// Batch position update. Objects not listed are untouched.
    pub fn rearrange(&mut self, positions: &[(ObjectId, f64, f64)]) -> usize {
        let targets: HashMap<ObjectId, (f64, f64)> = positions.iter().map(|&(id, x, y)| (id, (x, y))).collect();
        let mut moved = 0;
        let next: Vec<BoardObject> = self
            .objects
            .iter()
            .map(|o| {
                let mut o = o.clone();
                if let Some(&(x, y)) = targets.get(&o.id) {
                    o.x = x;
                    o.y = y;
                    moved += 1;
                }
                o
            })
            .collect();
        if moved == 0 {
            self.touch();
            return 0;
        }
        self.commit(next);
        moved
    }

    /// Translate every selected object by a delta, committing one history entry.
    pub fn move_selection(&mut self, dx: f64, dy: f64) -> usize {
        let ids: Vec<ObjectId> = self
            .selected_objects()
            .iter()
            .filter(|o| !o.is_connector())
            .map(|o| o.id)
            .collect();
        if ids.is_empty() {
            return 0;
        }
        self.batch(|board| {
            for id in &ids {
                if let Some(obj) = board.object(*id) {
                    let patch = ObjectPatch::position(obj.x + dx, obj.y + dy);
                    board.update(*id, &patch);
                }
            }
        });
        ids.len()
    }

    /// Remove every object and empty the selection.
    pub fn clear(&mut self) {
        self.commit(Vec::new());
    }

    /// Replace the whole sequence without arming persistence.
    ///
    /// This is the inbound path for snapshots that came from the remote
    /// store. Dangling connectors in the incoming sequence are dropped.
    /// History is recorded as usual unless paused; the sync bridge pauses it.
    pub fn replace_objects(&mut self, objects: Vec<BoardObject>) {
        self.swap(prune_dangling(objects));
    }

    // --- Selection ---

    /// Replace the selection with `{id}`, or toggle `id` when `additive`. Unknown ids are ignored.
    pub fn select(&mut self, id: ObjectId, additive: bool) {
        if !self.contains(id) {
            return;
        }
        if !additive {
            self.selection.clear();
            self.selection.insert(id);
        } else if !self.selection.remove(&id) {
            self.selection.insert(id);
        }
    }

    /// Replace the selection wholesale, keeping only ids on the board.
    pub fn set_selection(&mut self, ids: impl IntoIterator<Item = ObjectId>) {
        self.selection = ids.into_iter().filter(|id| self.contains(*id)).collect();
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    pub fn select_all(&mut self) {
        self.selection = self.objects.iter().map(|o| o.id).collect();
    }

    /// Select every object of `kind`.
    pub fn select_kind(&mut self, kind: ObjectKind) {
        self.selection = self
            .objects
            .iter()
            .filter(|o| o.kind == kind)
            .map(|o| o.id)
            .collect();
    }

    /// Marquee selection. Connectors are never hit.
    pub fn marquee_select(&mut self, rect: Rect, additive: bool) {
        let hits: Vec<ObjectId> = self
            .objects
            .iter()
            .filter(|o| box_intersects(o, &rect))
            .map(|o| o.id)
            .collect();
        if !additive {
            self.selection.clear();
        }
        self.selection.extend(hits);
    }

    // --- Clipboard ---

    /// Selected objects plus connectors whose both endpoints are selected, in paint order.
    fn selection_group(&self) -> Vec<BoardObject> {
        self.objects
            .iter()
            .filter(|o| {
                self.selection.contains(&o.id)
                    || (o.is_connector()
                        && o.source.is_some()
                        && o.target.is_some()
                        && o.endpoint_ids().iter().all(|id| self.selection.contains(id)))
            })
            .cloned()
            .collect()
    }

    /// Copy the selection into the clipboard. Returns the number of objects copied.
    pub fn copy(&mut self) -> usize {
        self.fill_clipboard(ClipboardSource::Copy)
    }

    /// Copy the selection into the clipboard, then delete it from the board.
    pub fn cut(&mut self) -> usize {
        let copied = self.fill_clipboard(ClipboardSource::Cut);
        if copied > 0 {
            self.delete_selected();
        }
        copied
    }

    fn fill_clipboard(&mut self, source: ClipboardSource) -> usize {
        let group = self.selection_group();
        if group.is_empty() {
            return 0;
        }
        let count = group.len();
        self.clipboard = Some(Clipboard { objects: group, source, pastes: 0 });
        count
    }

    /// Paste the clipboard with fresh ids, offset by one more step per paste,
    /// and select the pasted objects. A cut clipboard is consumed.
    pub fn paste(&mut self) -> Vec<ObjectId> {
        let Some(clipboard) = self.clipboard.as_mut() else {
            return Vec::new();
        };
        clipboard.pastes += 1;
        let offset = self.settings.paste_offset * f64::from(clipboard.pastes);
        let clones = clone_group(&clipboard.objects, offset);
        if clipboard.source == ClipboardSource::Cut {
            self.clipboard = None;
        }
        self.insert_group(clones)
    }

    /// Clone the selection one offset step away and select the clones. The clipboard is untouched.
    pub fn duplicate(&mut self) -> Vec<ObjectId> {
        let group = self.selection_group();
        if group.is_empty() {
            return Vec::new();
        }
        let clones = clone_group(&group, self.settings.paste_offset);
        self.insert_group(clones)
    }

    fn insert_group(&mut self, clones: Vec<BoardObject>) -> Vec<ObjectId> {
        if clones.is_empty() {
            return Vec::new();
        }
        let ids: Vec<ObjectId> = clones.iter().map(|o| o.id).collect();
        let mut next = self.objects.to_vec();
        for clone in clones {
            insert_in_paint_order(&mut next, clone);
        }
        self.commit(next);
        self.selection = ids.iter().copied().collect();
        ids
    }

    // --- History ---

    /// Restore the previous snapshot. Returns whether anything was undone.
    pub fn undo(&mut self) -> bool {
        match self.history.undo(&self.objects) {
            Some(snapshot) => {
                self.restore(snapshot);
                true
            }
            None => false,
        }
    }

    /// Re-apply the last undone snapshot. Returns whether anything was redone.
    pub fn redo(&mut self) -> bool {
        match self.history.redo(&self.objects) {
            Some(snapshot) => {
                self.restore(snapshot);
                true
            }
            None => false,
        }
    }

    /// Run several mutations as one undoable step.
    ///
    /// Recording is paused for the closure; afterwards a single entry with
    /// the pre-batch snapshot is pushed if the sequence changed. Nested
    /// batches fold into the outermost one.
    pub fn batch<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        if self.history.is_paused() {
            return f(self);
        }
        let before = Arc::clone(&self.objects);
        self.history.pause();
        let out = f(self);
        self.history.resume();
        if !Arc::ptr_eq(&before, &self.objects) {
            self.history.push(before);
        }
        out
    }

    /// Run mutations that must never become undoable steps.
    pub fn without_history<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        let previous = self.history.recording();
        self.history.pause();
        let out = f(self);
        if previous == Recording::Armed {
            self.history.resume();
        }
        out
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    // --- Viewport / tool ---

    /// Set camera state. Never persisted, never recorded.
    pub fn set_viewport(&mut self, pan_x: f64, pan_y: f64, zoom: f64) {
        self.viewport = Viewport::new(pan_x, pan_y, zoom);
    }

    pub fn set_zoom(&mut self, zoom: f64) {
        self.viewport.zoom = clamp_zoom(zoom);
    }

    /// Zoom by `factor` around a screen-space anchor.
    pub fn zoom_by(&mut self, factor: f64, anchor: Point) {
        self.viewport = self.viewport.zoomed_at(factor, anchor);
    }

    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        self.viewport = self.viewport.panned(dx, dy);
    }

    pub fn reset_view(&mut self) {
        self.viewport = Viewport::default();
    }

    /// Frame every object inside a `width` x `height` screen with `padding`
    /// pixels on each side. Resets the view on an empty board.
    pub fn fit_to_view(&mut self, width: f64, height: f64, padding: f64) {
        let Some(content) = bounds_of(self.objects.iter()) else {
            self.reset_view();
            return;
        };
        let avail_w = (width - 2.0 * padding).max(1.0);
        let avail_h = (height - 2.0 * padding).max(1.0);
        let zoom = clamp_zoom((avail_w / content.width.max(1.0)).min(avail_h / content.height.max(1.0)));
        let center = content.center();
        self.viewport = Viewport { pan_x: width / 2.0 - center.x * zoom, pan_y: height / 2.0 - center.y * zoom, zoom };
    }

    pub fn set_active_tool(&mut self, tool: Tool) {
        self.tool = tool;
    }

    // --- Persistence hand-off ---

    /// The debounced write, if its quiet period has elapsed at `now`.
    pub fn take_pending_write(&mut self, now: Instant) -> Option<PendingWrite> {
        let coalesced = self.scheduler.coalesced();
        self.scheduler
            .take_due(now)
            .then(|| self.pending_write(coalesced))
    }

    /// The pending write regardless of its deadline (shutdown and tests).
    pub fn flush_pending_write(&mut self) -> Option<PendingWrite> {
        let coalesced = self.scheduler.coalesced();
        self.scheduler.flush().then(|| self.pending_write(coalesced))
    }

    fn pending_write(&self, coalesced: u64) -> PendingWrite {
        PendingWrite { board_id: self.board_id, objects: Arc::clone(&self.objects), coalesced }
    }
}

// =============================================================================
// HELPERS
// =============================================================================

/// Insert keeping frames ahead of every other kind.
fn insert_in_paint_order(objects: &mut Vec<BoardObject>, object: BoardObject) {
    if object.kind == ObjectKind::Frame {
        let index = objects
            .iter()
            .position(|o| o.kind != ObjectKind::Frame)
            .unwrap_or(objects.len());
        objects.insert(index, object);
    } else {
        objects.push(object);
    }
}

/// Clone `group` with fresh ids, shifted by `offset` on both axes.
///
/// Connector endpoints are remapped to the clones. A connector with an
/// endpoint outside the group is dropped rather than reattached.
fn clone_group(group: &[BoardObject], offset: f64) -> Vec<BoardObject> {
    let remap: HashMap<ObjectId, ObjectId> = group
        .iter()
        .map(|o| (o.id, uuid::Uuid::new_v4()))
        .collect();

    let clones: Vec<BoardObject> = group
        .iter()
        .filter_map(|o| {
            let mut clone = o.clone();
            clone.id = *remap.get(&o.id)?;
            if clone.is_connector() {
                let source = clone.source.as_mut()?;
                let Some(&new_source) = remap.get(&source.object_id) else {
                    debug!(connector = %o.id, "board: dropping connector with source outside group");
                    return None;
                };
                source.object_id = new_source;
                let target = clone.target.as_mut()?;
                let Some(&new_target) = remap.get(&target.object_id) else {
                    debug!(connector = %o.id, "board: dropping connector with target outside group");
                    return None;
                };
                target.object_id = new_target;
            } else {
                clone.translate(offset, offset);
            }
            Some(clone)
        })
        .collect();

    prune_dangling(clones)
}
