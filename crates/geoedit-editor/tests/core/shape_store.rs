use geoedit_core::EditorError;
use geoedit_editor::geometry::coord;
use geoedit_editor::primitives::rectangle;
use geoedit_editor::{Geometry, GeometryValue, SpatialShapeStore};
use proptest::prelude::*;

fn unit_square() -> GeometryValue {
    GeometryValue::new(Geometry::Polygon(rectangle(coord(0.0, 0.0), coord(1.0, 1.0))))
}

#[test]
fn test_nearest_returns_closest_vertex() {
    let mut store = SpatialShapeStore::new();
    let id = store.insert(unit_square()).unwrap();

    let (vertex, hit) = store.nearest(coord(0.1, 0.1)).unwrap();
    assert_eq!(vertex, coord(0.0, 0.0));
    assert_eq!(hit, id);
}

#[test]
fn test_nearest_on_empty_store() {
    let store = SpatialShapeStore::new();
    assert!(matches!(
        store.nearest(coord(0.0, 0.0)),
        Err(EditorError::EmptyStore)
    ));
}

#[test]
fn test_utility_shapes_are_rejected() {
    let mut store = SpatialShapeStore::new();
    let preview = GeometryValue::utility(Geometry::Point(coord(0.0, 0.0)));
    assert!(store.insert(preview).is_err());
    assert!(store.is_empty());
}

#[test]
fn test_remove_drops_vertices_from_index() {
    let mut store = SpatialShapeStore::new();
    let keep = store
        .insert(GeometryValue::new(Geometry::Point(coord(5.0, 5.0))))
        .unwrap();
    let gone = store.insert(unit_square()).unwrap();

    store.remove(gone).unwrap();
    let (vertex, hit) = store.nearest(coord(0.0, 0.0)).unwrap();
    assert_eq!(hit, keep);
    assert_eq!(vertex, coord(5.0, 5.0));
    assert!(store.shapes_near(coord(0.0, 0.0), 0.5).is_empty());
}

#[test]
fn test_enumeration_keeps_insertion_order() {
    let mut store = SpatialShapeStore::new();
    let ids: Vec<_> = (0..5)
        .map(|i| {
            store
                .insert(GeometryValue::new(Geometry::Point(coord(i as f64, 0.0))))
                .unwrap()
        })
        .collect();
    store.remove(ids[2]).unwrap();

    let listed: Vec<_> = store.ids().collect();
    assert_eq!(listed, vec![ids[0], ids[1], ids[3], ids[4]]);
}

proptest! {
    #[test]
    fn prop_insert_then_remove_restores_count(
        points in prop::collection::vec((-100.0f64..100.0, -100.0f64..100.0), 0..20),
        x in -100.0f64..100.0,
        y in -100.0f64..100.0,
    ) {
        let mut store = SpatialShapeStore::new();
        for (px, py) in points {
            store.insert(GeometryValue::new(Geometry::Point(coord(px, py)))).unwrap();
        }
        let before = store.enumerate().count();
        let vertices = store.vertex_count();

        let id = store.insert(GeometryValue::new(Geometry::Polygon(rectangle(
            coord(x, y),
            coord(x + 1.0, y + 1.0),
        )))).unwrap();
        store.remove(id).unwrap();

        prop_assert_eq!(store.enumerate().count(), before);
        prop_assert_eq!(store.vertex_count(), vertices);
    }
}
