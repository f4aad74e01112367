//! Scene renderer
//!
//! Draws a laid-out tree onto any [`DrawSurface`]: one filled box per
//! entity, the access strip on functions, outlines, the selection highlight
//! and call-edge curves.

use crate::domain::geometry::GeometryTable;
use crate::domain::layout::LayoutEngine;
use crate::domain::tree::{AccessTag, CodeTree, NodeId, NodeKind};
use crate::ports::{DrawSurface, Rgba};

pub const CODE_LINE: Rgba = Rgba::rgb(0, 50, 255);
pub const LOOP: Rgba = Rgba::rgb(255, 0, 0);
pub const CONDITIONAL: Rgba = Rgba::rgb(0, 255, 0);
pub const FUNCTION: Rgba = Rgba::rgb(125, 125, 125);
pub const CLASS: Rgba = Rgba::rgb(50, 50, 50);
pub const STRUCT: Rgba = Rgba::rgb(70, 80, 100);
pub const CODE_BLOCK: Rgba = Rgba::TRANSPARENT;

pub const OUTLINE: Rgba = Rgba::rgb(0, 0, 0);
pub const SELECTION: Rgba = Rgba::rgb(255, 215, 0);
pub const CALL_EDGE: Rgba = Rgba::rgb(255, 140, 0);
pub const LOADING_TEXT: Rgba = Rgba::rgb(0, 0, 0);
pub const BACKGROUND: Rgba = Rgba::rgb(255, 255, 255);

pub fn fill_color(kind: &NodeKind) -> Rgba {
    match kind {
        NodeKind::CodeLine { .. } => CODE_LINE,
        NodeKind::CodeBlock { .. } => CODE_BLOCK,
        NodeKind::Loop { .. } => LOOP,
        NodeKind::If { .. } => CONDITIONAL,
        NodeKind::Function(_) => FUNCTION,
        NodeKind::Class(_) => CLASS,
        NodeKind::Struct(_) => STRUCT,
    }
}

pub fn access_color(access: AccessTag) -> Rgba {
    match access {
        AccessTag::Public => Rgba::rgb(0, 255, 0),
        AccessTag::Protected => Rgba::rgb(255, 255, 0),
        AccessTag::Private => Rgba::rgb(255, 0, 0),
        AccessTag::Constructor => Rgba::rgb(255, 0, 255),
        AccessTag::Unset => Rgba::rgb(150, 150, 150),
    }
}

/// Paint every entity (parents before children), then the call edges.
pub fn render_scene(
    surface: &mut dyn DrawSurface,
    engine: &LayoutEngine,
    tree: &CodeTree,
    table: &GeometryTable,
    selection: Option<NodeId>,
    curve_steps: usize,
) {
    let scaler = engine.scaler();
    let order: Vec<NodeId> = if tree.all_nodes.is_empty() {
        tree.ids().collect()
    } else {
        tree.all_nodes.clone()
    };

    for id in order {
        let kind = tree.kind(id);
        if let NodeKind::CodeBlock { .. } = kind {
            continue;
        }
        let g = table.get(id);
        surface.fill_rect(g.x, g.y, g.width, g.height, fill_color(kind));
        if let NodeKind::Function(f) = kind {
            let strip = scaler.access_buffer;
            surface.fill_rect(g.x, g.top() - strip, g.width, strip, access_color(f.access));
        }
        surface.outline_rect(g.x, g.y, g.width, g.height, OUTLINE, 1);
    }

    if let Some(id) = selection {
        let g = table.get(id);
        let width = (scaler.line_width / 2).max(1);
        surface.outline_rect(g.x, g.y, g.width, g.height, SELECTION, width);
    }

    for edge in &tree.call_edges {
        let Some(points) = engine.edge_curve(table, edge, curve_steps) else {
            continue;
        };
        for pair in points.windows(2) {
            surface.line(pair[0], pair[1], CALL_EDGE, scaler.line_width);
        }
    }
}

/// Placeholder shown while a parse is running.
pub fn render_loading(surface: &mut dyn DrawSurface, width: i32, height: i32) {
    let size = (height / 10).max(12);
    let x = width / 2 - size * 2;
    surface.text(x, height / 2, size, "LOADING", LOADING_TEXT);
}
