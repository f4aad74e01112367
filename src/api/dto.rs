use serde::{Deserialize, Serialize};

use crate::application::Scene;
use crate::domain::geometry::Point;
use crate::domain::tree::NodeKind;

#[derive(Debug, Serialize, Deserialize)]
pub struct SceneDto {
    pub scale: f64,
    pub width: i32,
    pub height: i32,
    pub selection: Option<usize>,
    pub nodes: Vec<NodeDto>,
    pub edges: Vec<EdgeDto>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct NodeDto {
    pub id: usize,
    pub kind: String,
    pub name: Option<String>,
    pub parent: Option<usize>,
    pub root: usize,
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    pub access: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EdgeDto {
    pub source: usize,
    pub target: Option<usize>,
    pub callee: String,
    pub location: String,
    /// Sampled curve, empty for unresolved edges.
    pub points: Vec<(f32, f32)>,
}

impl From<&Scene> for SceneDto {
    fn from(scene: &Scene) -> Self {
        let tree = &scene.tree;
        let nodes = tree
            .ids()
            .map(|id| {
                let node = tree.node(id);
                let g = scene.geometry.get(id);
                let access = match &node.kind {
                    NodeKind::Function(f) => Some(format!("{:?}", f.access).to_lowercase()),
                    _ => None,
                };
                NodeDto {
                    id: id.index(),
                    kind: node.kind.label().to_string(),
                    name: node.kind.name().map(str::to_string),
                    parent: node.parent.map(|p| p.index()),
                    root: node.root.index(),
                    x: g.x,
                    y: g.y,
                    width: g.width,
                    height: g.height,
                    access,
                }
            })
            .collect();

        let edges = tree
            .call_edges
            .iter()
            .map(|edge| EdgeDto {
                source: edge.source.index(),
                target: edge.target.map(|t| t.index()),
                callee: edge.callee_name.clone(),
                location: edge.location.to_string(),
                points: scene
                    .engine()
                    .edge_curve(&scene.geometry, edge, scene.curve_steps)
                    .unwrap_or_default()
                    .into_iter()
                    .map(|Point { x, y }| (x, y))
                    .collect(),
            })
            .collect();

        SceneDto {
            scale: scene.scaler().scale,
            width: scene.width,
            height: scene.height,
            selection: scene.selection.map(|s| s.index()),
            nodes,
            edges,
        }
    }
}
