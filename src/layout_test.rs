#![allow(clippy::float_cmp)]

use super::*;

fn rect(x: f64, y: f64, w: f64, h: f64) -> BoardObject {
    BoardObject::rectangle(x, y, w, h)
}

fn position_of(placements: &[Placement], id: ObjectId) -> (f64, f64) {
    placements
        .iter()
        .find(|(pid, _, _)| *pid == id)
        .map(|&(_, x, y)| (x, y))
        .unwrap()
}

#[test]
fn grid_defaults_to_square_columns() {
    let objects: Vec<BoardObject> = (0..4).map(|i| rect(f64::from(i) * 500.0, 0.0, 100.0, 50.0)).collect();
    let placements = grid(&objects, None, Point::new(0.0, 0.0), 20.0);
    assert_eq!(placements.len(), 4);
    assert_eq!(position_of(&placements, objects[1].id), (120.0, 0.0));
    assert_eq!(position_of(&placements, objects[2].id), (0.0, 70.0));
    assert_eq!(position_of(&placements, objects[3].id), (120.0, 70.0));
}

#[test]
fn grid_respects_explicit_columns() {
    let objects: Vec<BoardObject> = (0..3).map(|_| rect(0.0, 0.0, 10.0, 10.0)).collect();
    let placements = grid(&objects, Some(3), Point::new(100.0, 100.0), 5.0);
    assert_eq!(position_of(&placements, objects[2].id), (130.0, 100.0));
}

#[test]
fn grid_places_circles_by_center() {
    let circle = BoardObject::circle(0.0, 0.0, 50.0);
    let placements = grid([&circle], None, Point::new(0.0, 0.0), 0.0);
    assert_eq!(position_of(&placements, circle.id), (50.0, 50.0));
}

#[test]
fn grid_skips_connectors() {
    let a = rect(0.0, 0.0, 10.0, 10.0);
    let b = rect(0.0, 0.0, 10.0, 10.0);
    let link = BoardObject::connector(
        crate::doc::Endpoint::new(a.id, crate::doc::ConnectionPoint::Center),
        crate::doc::Endpoint::new(b.id, crate::doc::ConnectionPoint::Center),
    );
    let placements = grid([&a, &b, &link], None, Point::new(0.0, 0.0), 0.0);
    assert_eq!(placements.len(), 2);
}

#[test]
fn align_left_and_bottom() {
    let a = rect(10.0, 0.0, 100.0, 50.0);
    let b = rect(50.0, 100.0, 40.0, 80.0);
    let left = align([&a, &b], Alignment::Left);
    assert_eq!(position_of(&left, b.id), (10.0, 100.0));

    let bottom = align([&a, &b], Alignment::Bottom);
    assert_eq!(position_of(&bottom, a.id), (10.0, 130.0));
    assert_eq!(position_of(&bottom, b.id), (50.0, 100.0));
}

#[test]
fn align_center_uses_group_center() {
    let a = rect(0.0, 0.0, 100.0, 10.0);
    let b = rect(0.0, 50.0, 20.0, 10.0);
    let placements = align([&a, &b], Alignment::Center);
    assert_eq!(position_of(&placements, b.id), (40.0, 50.0));
}

#[test]
fn distribute_equalizes_gaps() {
    let a = rect(0.0, 0.0, 10.0, 10.0);
    let b = rect(15.0, 0.0, 10.0, 10.0);
    let c = rect(90.0, 0.0, 10.0, 10.0);
    let placements = distribute([&c, &a, &b], Axis::Horizontal);
    assert_eq!(position_of(&placements, a.id), (0.0, 0.0));
    assert_eq!(position_of(&placements, b.id), (45.0, 0.0));
    assert_eq!(position_of(&placements, c.id), (90.0, 0.0));
}

#[test]
fn distribute_needs_three_objects() {
    let a = rect(0.0, 0.0, 10.0, 10.0);
    let b = rect(50.0, 0.0, 10.0, 10.0);
    assert!(distribute([&a, &b], Axis::Vertical).is_empty());
}

#[test]
fn alignment_and_axis_parse() {
    assert_eq!(Alignment::parse("Left"), Some(Alignment::Left));
    assert_eq!(Alignment::parse("middle"), Some(Alignment::Middle));
    assert_eq!(Alignment::parse("diagonal"), None);
    assert_eq!(Axis::parse("vertically"), Some(Axis::Vertical));
}
