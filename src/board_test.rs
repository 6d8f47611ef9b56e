#![allow(clippy::float_cmp)]

use std::time::Duration;

use uuid::Uuid;

use super::*;
use crate::doc::{ConnectionPoint, Endpoint};

// =============================================================
// Helpers
// =============================================================

fn board() -> Board {
    Board::new(Uuid::new_v4(), BoardSettings::default())
}

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

fn rect_at(x: f64, y: f64) -> BoardObject {
    BoardObject::rectangle(x, y, 100.0, 50.0)
}

fn link(a: ObjectId, b: ObjectId) -> BoardObject {
    BoardObject::connector(Endpoint::new(a, ConnectionPoint::Right), Endpoint::new(b, ConnectionPoint::Left))
}

/// Board with A, B, C, connector A->B and connector B->C.
fn chain() -> (Board, [ObjectId; 5]) {
    let mut b = board();
    let a = b.add(rect_at(0.0, 0.0)).unwrap();
    let bb = b.add(rect_at(200.0, 0.0)).unwrap();
    let c = b.add(rect_at(400.0, 0.0)).unwrap();
    let ab = b.add(link(a, bb)).unwrap();
    let bc = b.add(link(bb, c)).unwrap();
    (b, [a, bb, c, ab, bc])
}

fn ids(b: &Board) -> Vec<ObjectId> {
    b.objects().iter().map(|o| o.id).collect()
}

// =============================================================
// Add
// =============================================================

#[test]
fn add_appends_in_paint_order() {
    let mut b = board();
    let first = b.add(rect_at(0.0, 0.0)).unwrap();
    let second = b.add(BoardObject::sticky_note(10.0, 10.0, "hi")).unwrap();
    assert_eq!(ids(&b), vec![first, second]);
    assert!(b.has_pending_write());
}

#[test]
fn add_frame_goes_behind_everything_else() {
    let mut b = board();
    let shape = b.add(rect_at(0.0, 0.0)).unwrap();
    let frame_a = b.add(BoardObject::frame(0.0, 0.0, 400.0, 300.0, "A")).unwrap();
    let frame_b = b.add(BoardObject::frame(0.0, 0.0, 400.0, 300.0, "B")).unwrap();
    assert_eq!(ids(&b), vec![frame_a, frame_b, shape]);
}

#[test]
fn add_connector_with_missing_endpoint_is_ignored() {
    let mut b = board();
    let a = b.add(rect_at(0.0, 0.0)).unwrap();
    assert!(b.add(link(a, Uuid::new_v4())).is_none());
    assert_eq!(b.objects().len(), 1);
}

#[test]
fn add_duplicate_id_is_ignored() {
    let mut b = board();
    let obj = rect_at(0.0, 0.0);
    b.add(obj.clone()).unwrap();
    assert!(b.add(obj).is_none());
    assert_eq!(b.objects().len(), 1);
}

// =============================================================
// Update
// =============================================================

#[test]
fn update_merges_patch() {
    let mut b = board();
    let id = b.add(rect_at(0.0, 0.0)).unwrap();
    assert!(b.update(id, &ObjectPatch::fill("#FF0000")));
    let obj = b.object(id).unwrap();
    assert_eq!(obj.fill.as_deref(), Some("#FF0000"));
    assert_eq!(obj.width, 100.0);
}

#[test]
fn update_missing_id_is_noop_but_arms_persist() {
    let mut b = board();
    let before = b.snapshot();
    assert!(!b.update(Uuid::new_v4(), &ObjectPatch::position(1.0, 1.0)));
    assert!(Arc::ptr_eq(&before, &b.snapshot()));
    assert!(b.has_pending_write());
    assert!(!b.history().can_undo());
}

#[test]
fn update_cannot_reattach_connector_to_missing_object() {
    let (mut b, [_, _, _, ab, _]) = chain();
    let patch = ObjectPatch {
        target: Some(Endpoint::new(Uuid::new_v4(), ConnectionPoint::Top)),
        ..ObjectPatch::default()
    };
    assert!(!b.update(ab, &patch));
    assert_ne!(b.object(ab).unwrap().target.unwrap().point, ConnectionPoint::Top);
}

// =============================================================
// Delete cascade
// =============================================================

#[test]
fn delete_cascades_to_attached_connectors() {
    let (mut b, [a, bb, c, _, _]) = chain();
    b.set_selection([bb]);
    assert_eq!(b.delete(bb), 3);
    assert_eq!(ids(&b), vec![a, c]);
    assert!(b.selection().is_empty());
}

#[test]
fn delete_missing_id_changes_nothing() {
    let (mut b, _) = chain();
    let before = b.snapshot();
    assert_eq!(b.delete(Uuid::new_v4()), 0);
    assert!(Arc::ptr_eq(&before, &b.snapshot()));
}

#[test]
fn delete_selected_is_one_undo_step() {
    let (mut b, [a, bb, c, ab, bc]) = chain();
    b.set_selection([a, c]);
    assert_eq!(b.delete_selected(), 4);
    assert_eq!(ids(&b), vec![bb]);
    assert!(b.undo());
    assert_eq!(ids(&b), vec![a, bb, c, ab, bc]);
}

#[test]
fn delete_selected_with_empty_selection_is_noop() {
    let (mut b, _) = chain();
    b.flush_pending_write();
    assert_eq!(b.delete_selected(), 0);
    assert!(!b.has_pending_write());
}

// =============================================================
// Selection
// =============================================================

#[test]
fn select_replaces_or_toggles() {
    let (mut b, [a, bb, ..]) = chain();
    b.select(a, false);
    b.select(bb, true);
    assert_eq!(b.selection().len(), 2);
    b.select(a, true);
    assert!(!b.is_selected(a));
    b.select(a, false);
    assert_eq!(b.selection().len(), 1);
}

#[test]
fn select_unknown_id_is_ignored() {
    let mut b = board();
    b.select(Uuid::new_v4(), false);
    b.set_selection([Uuid::new_v4()]);
    assert!(b.selection().is_empty());
}

#[test]
fn marquee_skips_connectors() {
    let (mut b, [a, bb, ..]) = chain();
    b.marquee_select(Rect::new(-10.0, -10.0, 320.0, 100.0), false);
    let expected: HashSet<ObjectId> = [a, bb].into_iter().collect();
    assert_eq!(b.selection(), &expected);
}

#[test]
fn select_kind_picks_matching_objects() {
    let (mut b, [.., ab, bc]) = chain();
    b.select_kind(ObjectKind::Connector);
    let expected: HashSet<ObjectId> = [ab, bc].into_iter().collect();
    assert_eq!(b.selection(), &expected);
}

// =============================================================
// Clipboard
// =============================================================

#[test]
fn repeated_paste_offsets_accumulate() {
    let mut b = board();
    let a = b.add(rect_at(100.0, 100.0)).unwrap();
    let c = b.add(rect_at(300.0, 100.0)).unwrap();
    b.set_selection([a, c]);
    assert_eq!(b.copy(), 2);

    let first = b.paste();
    let second = b.paste();
    assert_eq!(b.objects().len(), 6);

    let p1 = b.object(first[0]).unwrap();
    assert_eq!((p1.x, p1.y), (120.0, 120.0));
    let p2 = b.object(second[0]).unwrap();
    assert_eq!((p2.x, p2.y), (140.0, 140.0));
    let p2b = b.object(second[1]).unwrap();
    assert_eq!((p2b.x, p2b.y), (340.0, 140.0));

    let expected: HashSet<ObjectId> = second.iter().copied().collect();
    assert_eq!(b.selection(), &expected);
}

#[test]
fn paste_remaps_internal_connectors() {
    let (mut b, [a, bb, ..]) = chain();
    b.set_selection([a, bb]);
    assert_eq!(b.copy(), 3);
    let pasted = b.paste();
    assert_eq!(pasted.len(), 3);
    let conn = pasted
        .iter()
        .filter_map(|id| b.object(*id))
        .find(|o| o.is_connector())
        .unwrap();
    assert!(conn.endpoint_ids().iter().all(|id| pasted.contains(id)));
}

#[test]
fn paste_drops_connector_with_outside_endpoint() {
    let (mut b, [a, _, _, ab, _]) = chain();
    b.set_selection([a, ab]);
    b.copy();
    let pasted = b.paste();
    assert_eq!(pasted.len(), 1);
    assert!(!b.object(pasted[0]).unwrap().is_connector());
}

#[test]
fn cut_removes_and_is_consumed_by_one_paste() {
    let mut b = board();
    let a = b.add(rect_at(0.0, 0.0)).unwrap();
    b.set_selection([a]);
    assert_eq!(b.cut(), 1);
    assert!(b.objects().is_empty());
    assert_eq!(b.paste().len(), 1);
    assert!(b.clipboard().is_none());
    assert!(b.paste().is_empty());
}

#[test]
fn copy_with_empty_selection_keeps_clipboard() {
    let mut b = board();
    let a = b.add(rect_at(0.0, 0.0)).unwrap();
    b.set_selection([a]);
    b.copy();
    b.clear_selection();
    assert_eq!(b.copy(), 0);
    assert_eq!(b.clipboard().unwrap().objects().len(), 1);
}

#[test]
fn duplicate_does_not_touch_clipboard() {
    let mut b = board();
    let a = b.add(rect_at(0.0, 0.0)).unwrap();
    b.set_selection([a]);
    let clones = b.duplicate();
    assert_eq!(clones.len(), 1);
    let clone = b.object(clones[0]).unwrap();
    assert_eq!((clone.x, clone.y), (20.0, 20.0));
    assert!(b.clipboard().is_none());
    assert!(b.is_selected(clones[0]));
}

// =============================================================
// Rearrange / move / clear
// =============================================================

#[test]
fn rearrange_moves_listed_objects_only() {
    let (mut b, [a, bb, ..]) = chain();
    assert_eq!(b.rearrange(&[(a, 5.0, 6.0)]), 1);
    assert_eq!((b.object(a).unwrap().x, b.object(a).unwrap().y), (5.0, 6.0));
    assert_eq!(b.object(bb).unwrap().x, 200.0);
}

#[test]
fn move_selection_is_single_undo_step() {
    let (mut b, [a, bb, ..]) = chain();
    b.clear_history();
    b.set_selection([a, bb]);
    assert_eq!(b.move_selection(10.0, 0.0), 2);
    assert_eq!(b.history().past_len(), 1);
    assert_eq!(b.object(bb).unwrap().x, 210.0);
    b.undo();
    assert_eq!(b.object(bb).unwrap().x, 200.0);
}

#[test]
fn clear_empties_board_and_selection() {
    let (mut b, [a, ..]) = chain();
    b.select(a, false);
    b.clear();
    assert!(b.objects().is_empty());
    assert!(b.selection().is_empty());
    assert!(b.undo());
    assert_eq!(b.objects().len(), 5);
}

// =============================================================
// History
// =============================================================

#[test]
fn undo_redo_round_trip() {
    let mut b = board();
    let a = b.add(rect_at(0.0, 0.0)).unwrap();
    b.update(a, &ObjectPatch::position(50.0, 50.0));
    let moved = b.snapshot();

    assert!(b.undo());
    assert_eq!(b.object(a).unwrap().x, 0.0);
    assert!(b.redo());
    assert!(Arc::ptr_eq(&moved, &b.snapshot()));
}

#[test]
fn new_mutation_after_undo_clears_redo() {
    let mut b = board();
    b.add(rect_at(0.0, 0.0));
    b.undo();
    b.add(rect_at(1.0, 1.0));
    assert!(!b.redo());
}

#[test]
fn undo_prunes_selection_of_vanished_ids() {
    let mut b = board();
    let a = b.add(rect_at(0.0, 0.0)).unwrap();
    b.select(a, false);
    b.undo();
    assert!(b.selection().is_empty());
}

#[test]
fn batch_records_one_entry() {
    let mut b = board();
    b.batch(|b| {
        b.add(rect_at(0.0, 0.0));
        b.add(rect_at(10.0, 0.0));
        b.add(rect_at(20.0, 0.0));
    });
    assert_eq!(b.history().past_len(), 1);
    b.undo();
    assert!(b.objects().is_empty());
}

#[test]
fn batch_without_changes_records_nothing() {
    let mut b = board();
    b.batch(|b| b.delete(Uuid::new_v4()));
    assert!(!b.history().can_undo());
}

#[test]
fn without_history_changes_are_not_undoable() {
    let mut b = board();
    b.without_history(|b| b.replace_objects(vec![rect_at(0.0, 0.0)]));
    assert_eq!(b.objects().len(), 1);
    assert!(!b.history().can_undo());
    assert!(!b.history().is_paused());
}

#[test]
fn replace_objects_prunes_dangling_and_skips_persist() {
    let mut b = board();
    let a = rect_at(0.0, 0.0);
    let dangling = link(a.id, Uuid::new_v4());
    b.replace_objects(vec![a, dangling]);
    assert_eq!(b.objects().len(), 1);
    assert!(!b.has_pending_write());
}

#[test]
fn history_depth_is_bounded() {
    let settings = BoardSettings { history_depth: 3, ..BoardSettings::default() };
    let mut b = Board::new(Uuid::new_v4(), settings);
    for i in 0..10 {
        b.add(rect_at(f64::from(i), 0.0));
    }
    assert_eq!(b.history().past_len(), 3);
}

// =============================================================
// Viewport / tool
// =============================================================

#[test]
fn viewport_changes_are_not_recorded_or_persisted() {
    let mut b = board();
    b.set_viewport(10.0, 20.0, 2.0);
    b.pan_by(5.0, 5.0);
    b.set_active_tool(Tool::Frame);
    assert_eq!(b.viewport(), Viewport::new(15.0, 25.0, 2.0));
    assert_eq!(b.active_tool(), Tool::Frame);
    assert!(!b.has_pending_write());
    assert!(!b.history().can_undo());
}

#[test]
fn set_viewport_clamps_zoom() {
    let mut b = board();
    b.set_viewport(0.0, 0.0, 50.0);
    assert_eq!(b.viewport().zoom, crate::consts::MAX_ZOOM);
}

#[test]
fn fit_to_view_centers_content() {
    let mut b = board();
    b.add(BoardObject::rectangle(0.0, 0.0, 100.0, 100.0));
    b.fit_to_view(300.0, 300.0, 50.0);
    let vp = b.viewport();
    assert_eq!(vp.zoom, 2.0);
    let center = vp.world_to_screen(Point::new(50.0, 50.0));
    assert_eq!((center.x, center.y), (150.0, 150.0));
}

#[test]
fn fit_to_view_on_empty_board_resets() {
    let mut b = board();
    b.set_viewport(100.0, 100.0, 3.0);
    b.fit_to_view(800.0, 600.0, crate::consts::FIT_PADDING_PX);
    assert_eq!(b.viewport(), Viewport::default());
}

// =============================================================
// Debounced persistence
// =============================================================

#[tokio::test(start_paused = true)]
async fn burst_of_updates_coalesces_into_one_write() {
    let mut b = board();
    let id = b.add(rect_at(0.0, 0.0)).unwrap();
    b.flush_pending_write();

    for i in 0..5 {
        b.update(id, &ObjectPatch::position(f64::from(i), 0.0));
        tokio::time::advance(ms(100)).await;
    }
    // 500ms since the first update, 100ms since the last.
    assert!(b.take_pending_write(Instant::now()).is_none());

    tokio::time::advance(ms(500)).await;
    let write = b.take_pending_write(Instant::now()).unwrap();
    assert_eq!(write.board_id, b.board_id());
    assert_eq!(write.objects[0].x, 4.0);
    assert_eq!(write.coalesced, 5);

    tokio::time::advance(ms(5_000)).await;
    assert!(b.take_pending_write(Instant::now()).is_none());
}

#[tokio::test(start_paused = true)]
async fn undo_arms_persistence() {
    let mut b = board();
    b.add(rect_at(0.0, 0.0));
    b.flush_pending_write();
    b.undo();
    tokio::time::advance(ms(600)).await;
    let write = b.take_pending_write(Instant::now()).unwrap();
    assert!(write.objects.is_empty());
}

#[test]
fn flush_returns_pending_write_once() {
    let mut b = board();
    b.add(rect_at(0.0, 0.0));
    assert!(b.flush_pending_write().is_some());
    assert!(b.flush_pending_write().is_none());
}

#[test]
fn reset_discards_everything() {
    let (mut b, [a, ..]) = chain();
    b.select(a, false);
    b.copy();
    let next = Uuid::new_v4();
    b.reset(next, vec![rect_at(0.0, 0.0)]);
    assert_eq!(b.board_id(), next);
    assert_eq!(b.objects().len(), 1);
    assert!(b.selection().is_empty());
    assert!(b.clipboard().is_none());
    assert!(!b.history().can_undo());
    assert!(!b.has_pending_write());
}

#[test]
fn summaries_cover_every_object() {
    let (b, _) = chain();
    assert_eq!(b.summaries().len(), 5);
}
