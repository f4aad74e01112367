// Geometry side table.
// Positions and sizes live here, keyed by NodeId, so layout never touches
// the structural tree. Coordinates use a lower-left origin with y growing up.

use serde::Serialize;

use crate::domain::tree::{CodeTree, NodeId};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct GeometryInfo {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl GeometryInfo {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn left(&self) -> i32 {
        self.x
    }

    pub fn right(&self) -> i32 {
        self.x.saturating_add(self.width)
    }

    pub fn bottom(&self) -> i32 {
        self.y
    }

    pub fn top(&self) -> i32 {
        self.y.saturating_add(self.height)
    }

    pub fn center(&self) -> Point {
        Point::new(
            self.x as f32 + self.width as f32 / 2.0,
            self.y as f32 + self.height as f32 / 2.0,
        )
    }

    /// Horizontal center of the top edge.
    pub fn top_center(&self) -> Point {
        Point::new(self.x as f32 + self.width as f32 / 2.0, self.top() as f32)
    }

    /// Edges are inclusive.
    pub fn contains_point(&self, px: i32, py: i32) -> bool {
        px >= self.left() && px <= self.right() && py >= self.bottom() && py <= self.top()
    }

    /// True when `inner` fits horizontally with at least `inset` on both sides.
    pub fn contains_horizontally(&self, inner: &GeometryInfo, inset: i32) -> bool {
        inner.left() >= self.left().saturating_add(inset)
            && inner.right() <= self.right().saturating_sub(inset)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// One `GeometryInfo` per registered entity.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeometryTable {
    entries: Vec<GeometryInfo>,
}

impl GeometryTable {
    /// Zeroed records for every entity of `tree`. Created once after reduction.
    pub fn for_tree(tree: &CodeTree) -> Self {
        Self {
            entries: vec![GeometryInfo::default(); tree.len()],
        }
    }

    pub fn get(&self, id: NodeId) -> &GeometryInfo {
        &self.entries[id.index()]
    }

    pub fn get_mut(&mut self, id: NodeId) -> &mut GeometryInfo {
        &mut self.entries[id.index()]
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
