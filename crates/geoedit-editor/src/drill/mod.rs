//! # Drill editor
//!
//! Drill holes are grouped by diameter: each diameter owns its own
//! [`SpatialShapeStore`] of drill markers (a "+" cross sized to the hole).
//! A bucket is created the first time a drill of that diameter is added and
//! deleted when its last drill is removed.

pub mod array;
pub mod tools;

pub use array::{ArrayGenerator, ArrayLayout, ArrayParams, LinearAxis};
pub use tools::{DrillAddTool, DrillArrayTool, DrillResizeTool, DrillToolKind};

use crate::geometry::{distance, GeometryValue};
use crate::shape_store::{ShapeId, SpatialShapeStore};
use crate::tools::{Tool, ToolContext};
use crate::workspace::Workspace;
use geo::Coord;
use geoedit_core::{EditorError, EditorResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Diameter keys are compared in units of 1/10000 mm.
const DIAMETER_SCALE: f64 = 10_000.0;

/// A drill diameter, usable as an ordered map key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Diameter(u64);

impl Diameter {
    pub fn new(value: f64) -> EditorResult<Self> {
        if !(value.is_finite() && value > 0.0) {
            return Err(EditorError::invalid_parameter("diameter", "must be > 0"));
        }
        let units = (value * DIAMETER_SCALE).round();
        if units < 1.0 || units > u64::MAX as f64 {
            return Err(EditorError::invalid_parameter(
                "diameter",
                format!("{} is out of range", value),
            ));
        }
        Ok(Self(units as u64))
    }

    pub fn value(self) -> f64 {
        self.0 as f64 / DIAMETER_SCALE
    }
}

impl TryFrom<f64> for Diameter {
    type Error = EditorError;

    fn try_from(value: f64) -> EditorResult<Self> {
        Self::new(value)
    }
}

impl From<Diameter> for f64 {
    fn from(d: Diameter) -> f64 {
        d.value()
    }
}

impl fmt::Display for Diameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}", self.value())
    }
}

/// Handle of one drill: its diameter bucket and id within the bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DrillRef {
    pub diameter: Diameter,
    pub id: ShapeId,
}

impl fmt::Display for DrillRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (D{})", self.id, self.diameter)
    }
}

/// A drill marker and the diameter it belongs to.
#[derive(Debug, Clone, PartialEq)]
pub struct DrillShape {
    pub diameter: Diameter,
    pub value: GeometryValue,
}

/// Drill markers bucketed by diameter, plus the active diameter new drills
/// are added with.
#[derive(Debug, Default)]
pub struct DrillStores {
    buckets: BTreeMap<Diameter, SpatialShapeStore>,
    active: Option<Diameter>,
    tolerance: Option<f64>,
}

impl DrillStores {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an empty bucket. Returns `false` if it already existed.
    pub fn add_diameter(&mut self, diameter: Diameter) -> bool {
        if self.buckets.contains_key(&diameter) {
            return false;
        }
        self.buckets
            .insert(diameter, SpatialShapeStore::with_tolerance(self.tolerance));
        tracing::debug!("Added drill diameter {}", diameter);
        true
    }

    /// Drops a bucket with all its drills.
    pub fn remove_diameter(&mut self, diameter: Diameter) -> Option<SpatialShapeStore> {
        if self.active == Some(diameter) {
            self.active = None;
        }
        self.buckets.remove(&diameter)
    }

    pub fn active(&self) -> Option<Diameter> {
        self.active
    }

    pub fn set_active(&mut self, diameter: Option<Diameter>) {
        self.active = diameter;
    }

    /// Diameters in ascending order.
    pub fn diameters(&self) -> impl Iterator<Item = Diameter> + '_ {
        self.buckets.keys().copied()
    }

    pub fn store(&self, diameter: Diameter) -> Option<&SpatialShapeStore> {
        self.buckets.get(&diameter)
    }

    /// Total number of drills.
    pub fn len(&self) -> usize {
        self.buckets.values().map(SpatialShapeStore::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.values().all(SpatialShapeStore::is_empty)
    }

    pub fn clear(&mut self) {
        self.buckets.clear();
    }
}

impl Workspace for DrillStores {
    type Ref = DrillRef;
    type Value = DrillShape;
    type ToolKind = DrillToolKind;

    fn select_kind() -> DrillToolKind {
        DrillToolKind::Select
    }

    fn build_tool(
        kind: &DrillToolKind,
        ctx: &ToolContext<'_, Self>,
    ) -> EditorResult<Box<dyn Tool<Self>>> {
        tools::build_drill_tool(kind, ctx)
    }

    fn check(&self, value: &DrillShape) -> EditorResult<()> {
        SpatialShapeStore::check(&value.value)
    }

    fn add(&mut self, shape: DrillShape) -> EditorResult<DrillRef> {
        let tolerance = self.tolerance;
        let store = self.buckets.entry(shape.diameter).or_insert_with(|| {
            tracing::debug!("Created drill bucket {}", shape.diameter);
            SpatialShapeStore::with_tolerance(tolerance)
        });
        let id = store.insert(shape.value)?;
        Ok(DrillRef {
            diameter: shape.diameter,
            id,
        })
    }

    fn remove(&mut self, r: DrillRef) -> Option<DrillShape> {
        let store = self.buckets.get_mut(&r.diameter)?;
        let value = store.remove(r.id)?;
        if store.is_empty() {
            self.buckets.remove(&r.diameter);
            tracing::debug!("Deleted empty drill bucket {}", r.diameter);
        }
        Some(DrillShape {
            diameter: r.diameter,
            value,
        })
    }

    fn replace(&mut self, r: DrillRef, shape: DrillShape) -> EditorResult<DrillRef> {
        if shape.diameter == r.diameter {
            let store = self
                .buckets
                .get_mut(&r.diameter)
                .ok_or_else(|| EditorError::invalid_parameter("drill", format!("{} not found", r)))?;
            store.replace(r.id, shape.value)?;
            return Ok(r);
        }
        self.check(&shape)?;
        self.remove(r);
        self.add(shape)
    }

    fn contains(&self, r: DrillRef) -> bool {
        self.buckets
            .get(&r.diameter)
            .is_some_and(|s| s.contains(r.id))
    }

    fn geometry(&self, r: DrillRef) -> Option<&GeometryValue> {
        self.buckets.get(&r.diameter)?.get(r.id)
    }

    fn transformed(
        &self,
        r: DrillRef,
        f: &dyn Fn(&GeometryValue) -> GeometryValue,
    ) -> Option<DrillShape> {
        self.geometry(r).map(|v| DrillShape {
            diameter: r.diameter,
            value: f(v),
        })
    }

    fn refs(&self) -> Vec<DrillRef> {
        self.buckets
            .iter()
            .flat_map(|(diameter, store)| {
                store.ids().map(|id| DrillRef {
                    diameter: *diameter,
                    id,
                })
            })
            .collect()
    }

    fn stores(&self) -> Vec<&SpatialShapeStore> {
        self.buckets.values().collect()
    }

    fn nearest(&self, point: Coord) -> EditorResult<(Coord, DrillRef)> {
        self.buckets
            .iter()
            .filter_map(|(diameter, store)| {
                store.nearest(point).ok().map(|(vertex, id)| {
                    (
                        vertex,
                        DrillRef {
                            diameter: *diameter,
                            id,
                        },
                    )
                })
            })
            .min_by(|a, b| distance(a.0, point).total_cmp(&distance(b.0, point)))
            .ok_or(EditorError::EmptyStore)
    }

    fn refs_near(&self, point: Coord, radius: f64) -> Vec<DrillRef> {
        let mut hits: Vec<(f64, DrillRef)> = Vec::new();
        for (diameter, store) in &self.buckets {
            for id in store.shapes_near(point, radius) {
                let closest = store
                    .get(id)
                    .map(|v| {
                        v.coords()
                            .map(|c| distance(c, point))
                            .fold(f64::INFINITY, f64::min)
                    })
                    .unwrap_or(f64::INFINITY);
                hits.push((
                    closest,
                    DrillRef {
                        diameter: *diameter,
                        id,
                    },
                ));
            }
        }
        hits.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
        hits.into_iter().map(|(_, r)| r).collect()
    }

    fn set_tolerance(&mut self, tolerance: Option<f64>) {
        self.tolerance = tolerance;
        for store in self.buckets.values_mut() {
            store.set_tolerance(tolerance);
        }
    }
}
