// Pointer and keyboard interaction over a laid-out tree.

use thiserror::Error;
use tracing::debug;

use crate::domain::geometry::GeometryTable;
use crate::domain::layout::LayoutEngine;
use crate::domain::tree::{CodeTree, NodeId, NodeKind};

/// Innermost selectable entity under `(x, y)`.
///
/// Code blocks are not selectable. Among the boxes containing the point the
/// narrowest wins; on equal widths the first registered entity is kept.
pub fn hit_test(tree: &CodeTree, table: &GeometryTable, x: i32, y: i32) -> Option<NodeId> {
    let mut best: Option<(NodeId, i32)> = None;
    for id in tree.ids() {
        if matches!(tree.kind(id), NodeKind::CodeBlock { .. }) {
            continue;
        }
        let g = table.get(id);
        if !g.contains_point(x, y) {
            continue;
        }
        match best {
            Some((_, width)) if g.width >= width => {}
            _ => best = Some((id, g.width)),
        }
    }
    best.map(|(id, _)| id)
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoveError {
    #[error("moving root {root} by ({dx}, {dy}) leaves the coordinate range")]
    OutOfRange { root: usize, dx: i32, dy: i32 },
}

/// Shift the root owning `selection` (every root when nothing is selected)
/// by `(dx, dy)`, re-running its position pass from the shifted origin.
///
/// All-or-nothing: if any moved box would leave the `i32` range, no root
/// moves.
pub fn translate(
    engine: &LayoutEngine,
    tree: &CodeTree,
    table: &mut GeometryTable,
    selection: Option<NodeId>,
    dx: i32,
    dy: i32,
) -> Result<(), MoveError> {
    let roots: Vec<NodeId> = match selection {
        Some(id) => vec![tree.node(id).root],
        None => tree.roots.clone(),
    };

    let mut targets = Vec::with_capacity(roots.len());
    for root in roots {
        let origin = *table.get(root);
        let shifted = origin
            .x
            .checked_add(dx)
            .zip(origin.y.checked_add(dy))
            .filter(|&(x, y)| {
                x.checked_add(origin.width).is_some() && y.checked_add(origin.height).is_some()
            })
            .ok_or(MoveError::OutOfRange {
                root: root.index(),
                dx,
                dy,
            })?;
        targets.push((root, origin, shifted));
    }

    for (root, origin, (x, y)) in targets {
        debug!(
            "moving root {} from ({}, {}) by ({}, {})",
            root.index(),
            origin.x,
            origin.y,
            dx,
            dy
        );
        engine.position(tree, root, x, y, table);
    }
    Ok(())
}
