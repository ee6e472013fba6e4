//! # Spatial shape store
//!
//! Owns the persisted shapes of one editing session and an R-tree over
//! every vertex of every shape. Each indexed vertex carries the handle of
//! its owning shape, so nearest-vertex queries answer both "where should
//! the cursor snap" and "which shape was clicked".
//!
//! Shapes are kept in a `BTreeMap` keyed by a monotonically increasing
//! [`ShapeId`], which makes enumeration order stable (insertion order) and
//! restartable.

use crate::geometry::{coord, GeometryValue};
use geo::Coord;
use geoedit_core::{EditorError, EditorResult};
use rstar::primitives::GeomWithData;
use rstar::RTree;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Opaque handle of a stored shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ShapeId(u64);

impl ShapeId {
    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ShapeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

type IndexedVertex = GeomWithData<[f64; 2], ShapeId>;

#[derive(Debug, Clone)]
struct StoredShape {
    value: GeometryValue,
    /// Exactly the vertices inserted into the index for this shape.
    vertices: Vec<[f64; 2]>,
}

/// Shapes of one session plus a vertex index over them.
#[derive(Debug, Clone)]
pub struct SpatialShapeStore {
    shapes: BTreeMap<ShapeId, StoredShape>,
    index: RTree<IndexedVertex>,
    next_id: u64,
    tolerance: Option<f64>,
}

impl Default for SpatialShapeStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SpatialShapeStore {
    pub fn new() -> Self {
        Self::with_tolerance(None)
    }

    /// A store that simplifies shapes with `tolerance` before indexing
    /// their vertices.
    pub fn with_tolerance(tolerance: Option<f64>) -> Self {
        Self {
            shapes: BTreeMap::new(),
            index: RTree::new(),
            next_id: 0,
            tolerance,
        }
    }

    /// Changes the simplification tolerance and rebuilds the index.
    pub fn set_tolerance(&mut self, tolerance: Option<f64>) {
        if self.tolerance == tolerance {
            return;
        }
        self.tolerance = tolerance;
        let mut entries = Vec::new();
        for (id, stored) in self.shapes.iter_mut() {
            stored.vertices = index_vertices(&stored.value, tolerance);
            entries.extend(
                stored
                    .vertices
                    .iter()
                    .map(|v| IndexedVertex::new(*v, *id)),
            );
        }
        self.index = RTree::bulk_load(entries);
        tracing::debug!("Rebuilt vertex index with tolerance {:?}", tolerance);
    }

    /// Inserts a shape and indexes all its vertices.
    pub fn insert(&mut self, value: GeometryValue) -> EditorResult<ShapeId> {
        let id = ShapeId(self.next_id);
        self.insert_with_id(id, value)?;
        self.next_id += 1;
        Ok(id)
    }

    /// Fails if `value` cannot be stored: empty geometry or preview shapes.
    pub fn check(value: &GeometryValue) -> EditorResult<()> {
        if value.geometry.is_empty() {
            return Err(EditorError::EmptyGeometry);
        }
        if value.is_utility {
            return Err(EditorError::invalid_parameter(
                "shape",
                "utility geometry cannot be stored",
            ));
        }
        Ok(())
    }

    fn insert_with_id(&mut self, id: ShapeId, value: GeometryValue) -> EditorResult<()> {
        Self::check(&value)?;

        let vertices = index_vertices(&value, self.tolerance);
        for v in &vertices {
            self.index.insert(IndexedVertex::new(*v, id));
        }
        self.shapes.insert(id, StoredShape { value, vertices });
        Ok(())
    }

    /// Removes a shape and its index entries. Returns `None` when the
    /// handle is unknown.
    pub fn remove(&mut self, id: ShapeId) -> Option<GeometryValue> {
        let Some(stored) = self.shapes.remove(&id) else {
            tracing::warn!("Shape {} is not in the store", id);
            return None;
        };
        for v in &stored.vertices {
            self.index.remove(&IndexedVertex::new(*v, id));
        }
        Some(stored.value)
    }

    /// Replaces the geometry stored under `id`, keeping its handle and
    /// enumeration position.
    pub fn replace(&mut self, id: ShapeId, value: GeometryValue) -> EditorResult<()> {
        Self::check(&value)?;
        if self.remove(id).is_none() {
            return Err(EditorError::invalid_parameter(
                "shape",
                format!("{} is not in the store", id),
            ));
        }
        self.insert_with_id(id, value)
    }

    pub fn get(&self, id: ShapeId) -> Option<&GeometryValue> {
        self.shapes.get(&id).map(|s| &s.value)
    }

    pub fn contains(&self, id: ShapeId) -> bool {
        self.shapes.contains_key(&id)
    }

    /// Closest indexed vertex to `point` and the shape owning it.
    pub fn nearest(&self, point: Coord) -> EditorResult<(Coord, ShapeId)> {
        if self.shapes.is_empty() {
            return Err(EditorError::EmptyStore);
        }
        self.index
            .nearest_neighbor(&[point.x, point.y])
            .map(|v| (coord(v.geom()[0], v.geom()[1]), v.data))
            .ok_or(EditorError::EmptyStore)
    }

    /// Every shape owning a vertex within `radius` of `point`, nearest
    /// first and without duplicates.
    pub fn shapes_near(&self, point: Coord, radius: f64) -> Vec<ShapeId> {
        let mut hits: Vec<(f64, ShapeId)> = self
            .index
            .locate_within_distance([point.x, point.y], radius * radius)
            .map(|v| {
                let [x, y] = *v.geom();
                ((x - point.x).powi(2) + (y - point.y).powi(2), v.data)
            })
            .collect();
        hits.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));

        let mut out = Vec::new();
        for (_, id) in hits {
            if !out.contains(&id) {
                out.push(id);
            }
        }
        out
    }

    /// All stored shapes in insertion order. Calling again restarts the
    /// sequence.
    pub fn enumerate(&self) -> impl Iterator<Item = (ShapeId, &GeometryValue)> + '_ {
        self.shapes.iter().map(|(id, s)| (*id, &s.value))
    }

    pub fn ids(&self) -> impl Iterator<Item = ShapeId> + '_ {
        self.shapes.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    /// Number of vertices currently indexed.
    pub fn vertex_count(&self) -> usize {
        self.index.size()
    }

    pub fn clear(&mut self) {
        self.shapes.clear();
        self.index = RTree::new();
    }
}

fn index_vertices(value: &GeometryValue, tolerance: Option<f64>) -> Vec<[f64; 2]> {
    match tolerance {
        Some(t) => value
            .geometry
            .simplified(t)
            .coords()
            .map(|c| [c.x, c.y])
            .collect(),
        None => value.coords().map(|c| [c.x, c.y]).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Geometry;
    use geo::LineString;

    fn line(points: &[(f64, f64)]) -> GeometryValue {
        GeometryValue::new(Geometry::LineString(LineString::from(points.to_vec())))
    }

    #[test]
    fn test_insert_rejects_empty_collection() {
        let mut store = SpatialShapeStore::new();
        let err = store
            .insert(GeometryValue::new(Geometry::Collection(vec![])))
            .unwrap_err();
        assert_eq!(err, EditorError::EmptyGeometry);
        assert!(store.is_empty());
    }

    #[test]
    fn test_insert_rejects_utility() {
        let mut store = SpatialShapeStore::new();
        let value = GeometryValue::utility(Geometry::Point(coord(0.0, 0.0)));
        assert!(store.insert(value).is_err());
        assert_eq!(store.vertex_count(), 0);
    }

    #[test]
    fn test_nearest_on_empty_store() {
        let store = SpatialShapeStore::new();
        assert_eq!(store.nearest(coord(0.0, 0.0)), Err(EditorError::EmptyStore));
    }

    #[test]
    fn test_remove_drops_index_entries() {
        let mut store = SpatialShapeStore::new();
        let a = store.insert(line(&[(0.0, 0.0), (1.0, 0.0)])).unwrap();
        let b = store.insert(line(&[(5.0, 5.0), (6.0, 5.0)])).unwrap();
        assert_eq!(store.vertex_count(), 4);

        store.remove(a);
        assert_eq!(store.vertex_count(), 2);
        let (vertex, owner) = store.nearest(coord(0.0, 0.0)).unwrap();
        assert_eq!(owner, b);
        assert_eq!(vertex, coord(5.0, 5.0));
        assert!(store.remove(a).is_none());
    }

    #[test]
    fn test_replace_keeps_handle_and_order() {
        let mut store = SpatialShapeStore::new();
        let a = store.insert(line(&[(0.0, 0.0), (1.0, 0.0)])).unwrap();
        let b = store.insert(line(&[(2.0, 0.0), (3.0, 0.0)])).unwrap();
        store.replace(a, line(&[(10.0, 0.0), (11.0, 0.0)])).unwrap();

        let ids: Vec<_> = store.ids().collect();
        assert_eq!(ids, vec![a, b]);
        assert_eq!(store.nearest(coord(10.2, 0.0)).unwrap().1, a);
    }

    #[test]
    fn test_rejected_replace_keeps_shape() {
        let mut store = SpatialShapeStore::new();
        let a = store.insert(line(&[(0.0, 0.0), (1.0, 0.0)])).unwrap();
        let preview = GeometryValue::utility(Geometry::Point(coord(4.0, 4.0)));
        assert!(store.replace(a, preview).is_err());
        assert!(store
            .replace(a, GeometryValue::new(Geometry::Collection(vec![])))
            .is_err());

        assert!(store.contains(a));
        assert_eq!(store.vertex_count(), 2);
        assert_eq!(store.nearest(coord(4.0, 4.0)).unwrap(), (coord(1.0, 0.0), a));
    }

    #[test]
    fn test_shapes_near_deduplicates_coincident_vertices() {
        let mut store = SpatialShapeStore::new();
        let a = store.insert(line(&[(0.0, 0.0), (1.0, 0.0)])).unwrap();
        let b = store.insert(line(&[(0.0, 0.0), (0.0, 1.0)])).unwrap();
        let near = store.shapes_near(coord(0.0, 0.0), 0.01);
        assert_eq!(near, vec![a, b]);
    }

    #[test]
    fn test_tolerance_reduces_index() {
        let mut store = SpatialShapeStore::new();
        store
            .insert(line(&[(0.0, 0.0), (1.0, 0.001), (2.0, 0.0), (3.0, 0.001), (4.0, 0.0)]))
            .unwrap();
        assert_eq!(store.vertex_count(), 5);
        store.set_tolerance(Some(0.01));
        assert_eq!(store.vertex_count(), 2);
    }
}
