use super::*;

fn snap(n: usize) -> Snapshot {
    Arc::new(
        (0..n)
            .map(|i| BoardObject::sticky_note(i as f64, 0.0, format!("n{i}")))
            .collect(),
    )
}

#[test]
fn new_history_is_empty_and_armed() {
    let h = History::new(10);
    assert!(!h.can_undo());
    assert!(!h.can_redo());
    assert_eq!(h.recording(), Recording::Armed);
    assert_eq!(h.max_depth(), 10);
}

#[test]
fn record_pushes_previous() {
    let mut h = History::new(10);
    let a = snap(0);
    let b = snap(1);
    assert!(h.record(&a, &b));
    assert_eq!(h.past_len(), 1);
}

#[test]
fn record_ignores_same_handle() {
    let mut h = History::new(10);
    let a = snap(1);
    let same = Arc::clone(&a);
    assert!(!h.record(&a, &same));
    assert_eq!(h.past_len(), 0);
}

#[test]
fn record_compares_identity_not_contents() {
    let mut h = History::new(10);
    let a = snap(1);
    let equal_copy: Snapshot = Arc::new((*a).clone());
    assert!(h.record(&a, &equal_copy));
}

#[test]
fn record_while_paused_is_suppressed() {
    let mut h = History::new(10);
    h.pause();
    assert!(h.is_paused());
    assert!(!h.record(&snap(0), &snap(1)));
    assert_eq!(h.past_len(), 0);
    h.resume();
    assert!(h.record(&snap(0), &snap(1)));
    assert_eq!(h.past_len(), 1);
}

#[test]
fn record_clears_future() {
    let mut h = History::new(10);
    let a = snap(0);
    let b = snap(1);
    h.record(&a, &b);
    let restored = h.undo(&b).unwrap();
    assert!(Arc::ptr_eq(&restored, &a));
    assert!(h.can_redo());
    h.record(&a, &snap(2));
    assert!(!h.can_redo());
}

#[test]
fn depth_is_bounded_oldest_first() {
    let mut h = History::new(3);
    let snaps: Vec<Snapshot> = (0..6).map(snap).collect();
    for pair in snaps.windows(2) {
        h.record(&pair[0], &pair[1]);
    }
    assert_eq!(h.past_len(), 3);
    let current = Arc::clone(&snaps[5]);
    let first = h.undo(&current).unwrap();
    assert!(Arc::ptr_eq(&first, &snaps[4]));
    let second = h.undo(&first).unwrap();
    let third = h.undo(&second).unwrap();
    assert!(Arc::ptr_eq(&third, &snaps[2]));
    assert!(h.undo(&third).is_none());
}

#[test]
fn undo_then_redo_round_trips() {
    let mut h = History::new(10);
    let a = snap(0);
    let b = snap(1);
    h.record(&a, &b);
    let back = h.undo(&b).unwrap();
    let forward = h.redo(&back).unwrap();
    assert!(Arc::ptr_eq(&forward, &b));
    assert!(h.can_undo());
    assert!(!h.can_redo());
}

#[test]
fn undo_on_empty_is_none() {
    let mut h = History::new(10);
    assert!(h.undo(&snap(0)).is_none());
    assert!(h.redo(&snap(0)).is_none());
}

#[test]
fn push_records_even_when_paused() {
    let mut h = History::new(10);
    h.pause();
    h.push(snap(0));
    assert_eq!(h.past_len(), 1);
}

#[test]
fn clear_empties_both_stacks() {
    let mut h = History::new(10);
    let a = snap(0);
    let b = snap(1);
    h.record(&a, &b);
    h.undo(&b);
    h.clear();
    assert!(!h.can_undo());
    assert!(!h.can_redo());
}
