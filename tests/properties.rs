//! Property-based tests for the board container invariants.

#![allow(clippy::float_cmp)]

use std::collections::HashSet;

use boardstate::board::Board;
use boardstate::config::BoardSettings;
use boardstate::doc::{BoardObject, ConnectionPoint, Endpoint, ObjectId, ObjectPatch};
use boardstate::geometry::{bounds, bounds_of};
use proptest::prelude::*;
use uuid::Uuid;

#[derive(Debug, Clone)]
enum Step {
    AddRect(i16, i16),
    AddNote(i16, i16),
    Connect(usize, usize),
    Move(usize, i16, i16),
    Delete(usize),
    Select(usize, bool),
    DeleteSelected,
    CopyPaste,
    Cut,
    Undo,
    Redo,
}

fn step() -> impl Strategy<Value = Step> {
    prop_oneof![
        (any::<i16>(), any::<i16>()).prop_map(|(x, y)| Step::AddRect(x, y)),
        (any::<i16>(), any::<i16>()).prop_map(|(x, y)| Step::AddNote(x, y)),
        (0..16usize, 0..16usize).prop_map(|(a, b)| Step::Connect(a, b)),
        (0..16usize, any::<i16>(), any::<i16>()).prop_map(|(i, x, y)| Step::Move(i, x, y)),
        (0..16usize).prop_map(Step::Delete),
        (0..16usize, any::<bool>()).prop_map(|(i, additive)| Step::Select(i, additive)),
        Just(Step::DeleteSelected),
        Just(Step::CopyPaste),
        Just(Step::Cut),
        Just(Step::Undo),
        Just(Step::Redo),
    ]
}

fn board() -> Board {
    Board::new(Uuid::new_v4(), BoardSettings::default())
}

fn nth_id(b: &Board, i: usize) -> Option<ObjectId> {
    let objects = b.objects();
    if objects.is_empty() {
        return None;
    }
    Some(objects[i % objects.len()].id)
}

fn apply(b: &mut Board, step: &Step) {
    match *step {
        Step::AddRect(x, y) => {
            b.add(BoardObject::rectangle(f64::from(x), f64::from(y), 100.0, 60.0));
        }
        Step::AddNote(x, y) => {
            b.add(BoardObject::sticky_note(f64::from(x), f64::from(y), "n"));
        }
        Step::Connect(a, c) => {
            if let (Some(a), Some(c)) = (nth_id(b, a), nth_id(b, c)) {
                b.add(BoardObject::connector(
                    Endpoint::new(a, ConnectionPoint::Right),
                    Endpoint::new(c, ConnectionPoint::Left),
                ));
            }
        }
        Step::Move(i, x, y) => {
            if let Some(id) = nth_id(b, i) {
                b.update(id, &ObjectPatch::position(f64::from(x), f64::from(y)));
            }
        }
        Step::Delete(i) => {
            if let Some(id) = nth_id(b, i) {
                b.delete(id);
            }
        }
        Step::Select(i, additive) => {
            if let Some(id) = nth_id(b, i) {
                b.select(id, additive);
            }
        }
        Step::DeleteSelected => {
            b.delete_selected();
        }
        Step::CopyPaste => {
            b.copy();
            b.paste();
        }
        Step::Cut => {
            b.cut();
        }
        Step::Undo => {
            b.undo();
        }
        Step::Redo => {
            b.redo();
        }
    }
}

fn assert_no_dangling(b: &Board) -> Result<(), TestCaseError> {
    let present: HashSet<ObjectId> = b.objects().iter().map(|o| o.id).collect();
    for obj in b.objects().iter().filter(|o| o.is_connector()) {
        for endpoint in obj.endpoint_ids() {
            prop_assert!(present.contains(&endpoint), "connector {} dangles to {}", obj.id, endpoint);
        }
    }
    Ok(())
}

proptest! {
    #[test]
    fn no_dangling_connectors_and_selection_subset(steps in prop::collection::vec(step(), 1..60)) {
        let mut b = board();
        for s in &steps {
            apply(&mut b, s);
            assert_no_dangling(&b)?;
            let present: HashSet<ObjectId> = b.objects().iter().map(|o| o.id).collect();
            prop_assert!(b.selection().is_subset(&present));
        }
    }

    #[test]
    fn undo_then_redo_round_trips(
        seed in prop::collection::vec(step(), 0..20),
        edits in prop::collection::vec((any::<i16>(), any::<i16>()), 1..20),
    ) {
        let mut b = board();
        for s in &seed {
            apply(&mut b, s);
        }
        let before = b.objects().to_vec();
        for (x, y) in &edits {
            b.add(BoardObject::rectangle(f64::from(*x), f64::from(*y), 10.0, 10.0));
        }
        let after = b.objects().to_vec();

        for _ in &edits {
            prop_assert!(b.undo());
        }
        prop_assert_eq!(b.objects(), before.as_slice());
        for _ in &edits {
            prop_assert!(b.redo());
        }
        prop_assert_eq!(b.objects(), after.as_slice());
    }

    #[test]
    fn group_bounds_contain_every_member(coords in prop::collection::vec((any::<i16>(), any::<i16>(), 1..500u16, 1..500u16), 1..20)) {
        let objects: Vec<BoardObject> = coords
            .iter()
            .map(|&(x, y, w, h)| BoardObject::rectangle(f64::from(x), f64::from(y), f64::from(w), f64::from(h)))
            .collect();
        let group = bounds_of(objects.iter()).unwrap();
        for obj in &objects {
            let b = bounds(obj).unwrap();
            prop_assert!(b.x >= group.x && b.y >= group.y);
            prop_assert!(b.right() <= group.right() && b.bottom() <= group.bottom());
        }
    }

    #[test]
    fn repeated_pastes_step_the_offset(x in -1000i16..1000, y in -1000i16..1000, pastes in 1..6u32) {
        let mut b = board();
        let id = b.add(BoardObject::rectangle(f64::from(x), f64::from(y), 50.0, 50.0)).unwrap();
        b.select(id, false);
        b.copy();
        let offset = BoardSettings::default().paste_offset;
        for k in 1..=pastes {
            let pasted = b.paste();
            prop_assert_eq!(pasted.len(), 1);
            let obj = b.object(pasted[0]).unwrap();
            prop_assert_eq!(obj.x, f64::from(x) + offset * f64::from(k));
            prop_assert_eq!(obj.y, f64::from(y) + offset * f64::from(k));
        }
    }
}
