#![allow(clippy::float_cmp)]

use serde_json::json;

use super::*;

fn connect(a: &BoardObject, b: &BoardObject) -> BoardObject {
    BoardObject::connector(
        Endpoint::new(a.id, ConnectionPoint::Right),
        Endpoint::new(b.id, ConnectionPoint::Left),
    )
}

fn ids(list: &[&BoardObject]) -> HashSet<ObjectId> {
    list.iter().map(|o| o.id).collect()
}

// =============================================================
// ObjectKind
// =============================================================

#[test]
fn kind_serde_all_variants() {
    let cases = [
        (ObjectKind::StickyNote, "\"sticky-note\""),
        (ObjectKind::Rectangle, "\"rectangle\""),
        (ObjectKind::Circle, "\"circle\""),
        (ObjectKind::Line, "\"line\""),
        (ObjectKind::Frame, "\"frame\""),
        (ObjectKind::Text, "\"text\""),
        (ObjectKind::Connector, "\"connector\""),
    ];
    for (kind, expected) in cases {
        assert_eq!(serde_json::to_string(&kind).unwrap(), expected);
        assert_eq!(format!("\"{kind}\""), expected);
    }
}

#[test]
fn kind_deserialize_invalid_rejects() {
    assert!(serde_json::from_str::<ObjectKind>("\"hexagon\"").is_err());
}

#[test]
fn kind_parse_accepts_aliases() {
    assert_eq!(ObjectKind::parse("sticky note"), Some(ObjectKind::StickyNote));
    assert_eq!(ObjectKind::parse("Sticky_Note"), Some(ObjectKind::StickyNote));
    assert_eq!(ObjectKind::parse("note"), Some(ObjectKind::StickyNote));
    assert_eq!(ObjectKind::parse("square"), Some(ObjectKind::Rectangle));
    assert_eq!(ObjectKind::parse("oval"), Some(ObjectKind::Circle));
    assert_eq!(ObjectKind::parse("arrow"), Some(ObjectKind::Connector));
    assert_eq!(ObjectKind::parse("triangle"), None);
}

// =============================================================
// BoardObject serde
// =============================================================

#[test]
fn board_object_omits_absent_optionals() {
    let obj = BoardObject::new(ObjectKind::Rectangle, 1.0, 2.0, 3.0, 4.0);
    let value = serde_json::to_value(&obj).unwrap();
    let map = value.as_object().unwrap();
    assert!(map.contains_key("id"));
    assert_eq!(map.get("kind"), Some(&json!("rectangle")));
    assert!(!map.contains_key("text"));
    assert!(!map.contains_key("source"));
    assert!(!map.contains_key("points"));
}

#[test]
fn connector_serializes_endpoints_and_style() {
    let a = BoardObject::sticky_note(0.0, 0.0, "a");
    let b = BoardObject::default_rectangle(300.0, 0.0);
    let conn = connect(&a, &b);
    let value = serde_json::to_value(&conn).unwrap();
    assert_eq!(value["source"]["object_id"], json!(a.id));
    assert_eq!(value["source"]["point"], json!("right"));
    assert_eq!(value["target"]["point"], json!("left"));
    assert_eq!(value["style"]["arrow"], json!("one-way"));

    let back: BoardObject = serde_json::from_value(value).unwrap();
    assert_eq!(back, conn);
}

#[test]
fn board_object_deserializes_minimal_row() {
    let id = Uuid::new_v4();
    let obj: BoardObject = serde_json::from_value(json!({
        "id": id,
        "kind": "text",
        "x": 5,
        "y": 6
    }))
    .unwrap();
    assert_eq!(obj.id, id);
    assert_eq!(obj.kind, ObjectKind::Text);
    assert_eq!(obj.width, 0.0);
    assert!(obj.text.is_none());
}

// =============================================================
// Constructors
// =============================================================

#[test]
fn circle_size_is_diameter() {
    let c = BoardObject::circle(100.0, 100.0, 30.0);
    assert_eq!(c.width, 60.0);
    assert_eq!(c.height, 60.0);
    assert_eq!(c.x, 100.0);
}

#[test]
fn circle_nonpositive_radius_uses_default() {
    let c = BoardObject::circle(0.0, 0.0, 0.0);
    assert_eq!(c.width, CIRCLE_RADIUS * 2.0);
}

#[test]
fn sticky_note_has_default_fill_and_text() {
    let n = BoardObject::sticky_note(10.0, 20.0, "hello");
    assert_eq!(n.kind, ObjectKind::StickyNote);
    assert_eq!(n.text.as_deref(), Some("hello"));
    assert_eq!(n.fill.as_deref(), Some(STICKY_NOTE_FILL));
}

#[test]
fn translate_moves_shapes_but_not_connectors() {
    let mut rect = BoardObject::default_rectangle(0.0, 0.0);
    rect.translate(5.0, -5.0);
    assert_eq!((rect.x, rect.y), (5.0, -5.0));

    let mut conn = connect(&rect, &rect.clone());
    conn.translate(5.0, 5.0);
    assert_eq!((conn.x, conn.y), (0.0, 0.0));
}

// =============================================================
// ObjectPatch
// =============================================================

#[test]
fn patch_applies_only_present_fields() {
    let mut obj = BoardObject::sticky_note(0.0, 0.0, "before");
    let patch = ObjectPatch { x: Some(42.0), text: Some("after".into()), ..ObjectPatch::default() };
    patch.apply_to(&mut obj);
    assert_eq!(obj.x, 42.0);
    assert_eq!(obj.y, 0.0);
    assert_eq!(obj.text.as_deref(), Some("after"));
    assert_eq!(obj.fill.as_deref(), Some(STICKY_NOTE_FILL));
}

#[test]
fn patch_endpoint_fields_ignored_for_shapes() {
    let mut obj = BoardObject::default_rectangle(0.0, 0.0);
    let patch = ObjectPatch {
        source: Some(Endpoint::new(Uuid::new_v4(), ConnectionPoint::Top)),
        ..ObjectPatch::default()
    };
    patch.apply_to(&mut obj);
    assert!(obj.source.is_none());
}

#[test]
fn patch_is_empty() {
    assert!(ObjectPatch::default().is_empty());
    assert!(!ObjectPatch::fill("#fff").is_empty());
}

#[test]
fn patch_deserializes_sparse_json() {
    let patch: ObjectPatch = serde_json::from_value(json!({"width": 10, "fill": "red"})).unwrap();
    assert_eq!(patch.width, Some(10.0));
    assert_eq!(patch.fill.as_deref(), Some("red"));
    assert!(patch.x.is_none());
}

// =============================================================
// Summary
// =============================================================

#[test]
fn summary_uses_connector_color() {
    let a = BoardObject::sticky_note(0.0, 0.0, "a");
    let conn = connect(&a, &a);
    let summary = ObjectSummary::from(&conn);
    assert_eq!(summary.color.as_deref(), Some(STROKE_COLOR));
    let note = ObjectSummary::from(&a);
    assert_eq!(note.text.as_deref(), Some("a"));
    assert_eq!(note.color.as_deref(), Some(STICKY_NOTE_FILL));
}

// =============================================================
// Cascade
// =============================================================

#[test]
fn dependents_of_finds_attached_connectors() {
    let a = BoardObject::sticky_note(0.0, 0.0, "a");
    let b = BoardObject::default_rectangle(300.0, 0.0);
    let c = BoardObject::default_rectangle(600.0, 0.0);
    let ab = connect(&a, &b);
    let bc = connect(&b, &c);
    let objects = vec![a.clone(), b.clone(), c.clone(), ab.clone(), bc.clone()];

    let deps = dependents_of(&objects, &ids(&[&a]));
    assert_eq!(deps, ids(&[&ab]));

    let deps = dependents_of(&objects, &ids(&[&b]));
    assert_eq!(deps, ids(&[&ab, &bc]));
}

#[test]
fn removal_closure_ignores_missing_roots() {
    let a = BoardObject::sticky_note(0.0, 0.0, "a");
    let objects = vec![a.clone()];
    let mut roots = HashSet::new();
    roots.insert(Uuid::new_v4());
    assert!(removal_closure(&objects, &roots).is_empty());
}

#[test]
fn removal_closure_is_transitive() {
    let a = BoardObject::sticky_note(0.0, 0.0, "a");
    let b = BoardObject::default_rectangle(300.0, 0.0);
    let ab = connect(&a, &b);
    // A connector attached to another connector goes when its endpoint goes.
    let meta = BoardObject::connector(
        Endpoint::new(ab.id, ConnectionPoint::Center),
        Endpoint::new(b.id, ConnectionPoint::Top),
    );
    let objects = vec![a.clone(), b.clone(), ab.clone(), meta.clone()];
    let removed = removal_closure(&objects, &ids(&[&a]));
    assert_eq!(removed, ids(&[&a, &ab, &meta]));
}

#[test]
fn prune_dangling_drops_orphans() {
    let a = BoardObject::sticky_note(0.0, 0.0, "a");
    let b = BoardObject::default_rectangle(300.0, 0.0);
    let ab = connect(&a, &b);
    let kept = prune_dangling(vec![a.clone(), ab.clone()]);
    assert_eq!(kept, vec![a.clone()]);

    let kept = prune_dangling(vec![a.clone(), b.clone(), ab.clone()]);
    assert_eq!(kept.len(), 3);
}
