//! Layout engine.
//!
//! Two strictly ordered passes over the reduced tree:
//!
//! 1. **size** (bottom-up): code lines are `min_size` squares; every container
//!    is `gap × (children + 1) + Σ child heights` tall and
//!    `max(child width + 2 × horizontal_buffer)` wide. Functions add the
//!    access strip, classes and structs use the larger member gap.
//! 2. **position** (top-down): a node takes the given lower-left origin and
//!    stacks its children downward from its top edge, one gap apart, each
//!    indented by one horizontal buffer.
//!
//! Roots sit on one baseline, left to right, vertically centered in the
//! viewport. Call edges are sampled quadratic curves.

use crate::domain::callgraph::CallEdge;
use crate::domain::geometry::{GeometryTable, Point};
use crate::domain::scaler::Scaler;
use crate::domain::tree::{CodeTree, NodeId, NodeKind};

#[derive(Debug, Clone, Copy)]
pub struct LayoutEngine {
    scaler: Scaler,
}

impl LayoutEngine {
    pub fn new(scaler: Scaler) -> Self {
        Self { scaler }
    }

    pub fn scaler(&self) -> &Scaler {
        &self.scaler
    }

    /// Size pass, then root placement for a `width × height` viewport.
    pub fn layout(&self, tree: &CodeTree, table: &mut GeometryTable, width: i32, height: i32) {
        self.size_pass(tree, table);
        self.place_roots(tree, table, width, height);
    }

    /// Compute width and height of every reachable entity.
    pub fn size_pass(&self, tree: &CodeTree, table: &mut GeometryTable) {
        for &root in &tree.roots {
            self.compute_size(tree, root, table);
        }
    }

    fn compute_size(&self, tree: &CodeTree, id: NodeId, table: &mut GeometryTable) {
        let s = &self.scaler;
        let kind = tree.kind(id);
        if let NodeKind::CodeLine { .. } = kind {
            let g = table.get_mut(id);
            g.width = s.min_size;
            g.height = s.min_size;
            return;
        }

        let children = tree.children(id);
        for &child in &children {
            self.compute_size(tree, child, table);
        }

        let gap = self.gap(kind);
        // Saturating: a huge tree clamps at the coordinate limit instead of
        // wrapping.
        let slots = i32::try_from(children.len() + 1).unwrap_or(i32::MAX);
        let mut height = gap.saturating_mul(slots);
        let mut width = 0;
        for &child in &children {
            let c = table.get(child);
            height = height.saturating_add(c.height);
            width = width.max(
                c.width
                    .saturating_add(s.horizontal_buffer.saturating_mul(2)),
            );
        }
        if children.is_empty() {
            width = s.min_size;
        }
        if let NodeKind::Function(_) = kind {
            height = height.saturating_add(s.access_buffer);
        }

        let g = table.get_mut(id);
        g.width = width;
        g.height = height;
    }

    /// Place `id` with its lower-left corner at `(x, y)` and lay out its
    /// subtree. Sizes must be current.
    pub fn position(&self, tree: &CodeTree, id: NodeId, x: i32, y: i32, table: &mut GeometryTable) {
        let top = {
            let g = table.get_mut(id);
            g.x = x;
            g.y = y;
            g.top()
        };

        let kind = tree.kind(id);
        let gap = self.gap(kind);
        let mut cursor = match kind {
            NodeKind::Function(_) => top.saturating_sub(self.scaler.access_buffer),
            _ => top,
        };
        let child_x = x.saturating_add(self.scaler.horizontal_buffer);
        for child in tree.children(id) {
            cursor = cursor.saturating_sub(gap.saturating_add(table.get(child).height));
            self.position(tree, child, child_x, cursor, table);
        }
    }

    /// Lay roots out left to right, `objects_buffer` apart, centered
    /// vertically in a viewport of the given height.
    pub fn place_roots(&self, tree: &CodeTree, table: &mut GeometryTable, _width: i32, height: i32) {
        let mut x = self.scaler.root_margin();
        for &root in &tree.roots {
            let size = *table.get(root);
            let y = height.saturating_sub(size.height) / 2;
            self.position(tree, root, x, y, table);
            x = x
                .saturating_add(size.width)
                .saturating_add(self.scaler.objects_buffer);
        }
    }

    /// Polyline approximation of a resolved call edge, from the center of
    /// the calling line to the top center of the callee. `None` for
    /// unresolved edges.
    pub fn edge_curve(
        &self,
        table: &GeometryTable,
        edge: &CallEdge,
        steps: usize,
    ) -> Option<Vec<Point>> {
        let target = edge.target?;
        let start = table.get(edge.source).center();
        let end = table.get(target).top_center();
        Some(quadratic_curve(start, end, self.scaler.curvature, steps))
    }

    fn gap(&self, kind: &NodeKind) -> i32 {
        match kind {
            NodeKind::Class(_) | NodeKind::Struct(_) => self.scaler.class_vertical_buffer,
            _ => self.scaler.vertical_buffer,
        }
    }
}

/// Sample a quadratic Bézier whose control point is the chord midpoint
/// pushed sideways by `curvature × |chord|`. The bow side flips with the
/// horizontal direction of travel.
pub fn quadratic_curve(start: Point, end: Point, curvature: f32, steps: usize) -> Vec<Point> {
    let steps = steps.max(1);
    let (dx, dy) = (end.x - start.x, end.y - start.y);
    let sign = if end.x >= start.x { 1.0 } else { -1.0 };
    let control = Point::new(
        (start.x + end.x) / 2.0 - dy * curvature * sign,
        (start.y + end.y) / 2.0 + dx * curvature * sign,
    );

    (0..=steps)
        .map(|i| {
            let t = i as f32 / steps as f32;
            let u = 1.0 - t;
            Point::new(
                u * u * start.x + 2.0 * u * t * control.x + t * t * end.x,
                u * u * start.y + 2.0 * u * t * control.y + t * t * end.y,
            )
        })
        .collect()
}
