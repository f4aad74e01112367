// Application layer: the parse pipeline and the interactive scene.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use crate::domain::callgraph::CallResolver;
use crate::domain::geometry::GeometryTable;
use crate::domain::interaction::{self, MoveError};
use crate::domain::layout::LayoutEngine;
use crate::domain::reducer::{AstReducer, ReduceReport};
use crate::domain::scaler::Scaler;
use crate::domain::tree::{CodeTree, NodeId};
use crate::infrastructure::project_loader::ProjectLoader;
use crate::ports::scene_renderer;
use crate::ports::svg_exporter::SvgSurface;
use crate::ports::{AstProvider, DrawSurface};

/// Result of a full parse: the resolved tree plus reduction bookkeeping.
#[derive(Debug)]
pub struct Analysis {
    pub tree: CodeTree,
    pub report: ReduceReport,
}

/// Directory scan → per-file reduction → call resolution.
pub struct AnalyzeUsecase<'a> {
    pub provider: &'a dyn AstProvider,
    pub reducer: AstReducer,
    pub extensions: Vec<String>,
}

impl<'a> AnalyzeUsecase<'a> {
    pub fn run(&self, target: &Path) -> Result<Analysis> {
        let files = ProjectLoader::collect_sources(target, &self.extensions)?;
        info!("parsing {} translation unit(s) under {}", files.len(), target.display());

        let mut tree = CodeTree::new();
        let mut report = ReduceReport::default();
        for file in &files {
            let tu = self
                .provider
                .parse(file)
                .with_context(|| format!("Failed to parse {}", file.display()))?;
            self.reducer.reduce_translation_unit(&tu, &mut tree, &mut report)?;
        }

        CallResolver::new().resolve(&mut tree);
        info!(
            "reduced {} entities: {} functions, {} classes, {} structs, {} methods, {} call edges ({} skipped, {} filtered)",
            tree.len(),
            tree.functions.len(),
            tree.classes.len(),
            tree.structs.len(),
            tree.methods.len(),
            tree.call_edges.len(),
            report.skipped.len(),
            report.filtered
        );
        Ok(Analysis { tree, report })
    }
}

/// A laid-out tree plus viewport and selection state.
#[derive(Debug)]
pub struct Scene {
    pub tree: CodeTree,
    pub geometry: GeometryTable,
    pub selection: Option<NodeId>,
    pub width: i32,
    pub height: i32,
    pub curve_steps: usize,
    engine: LayoutEngine,
}

impl Scene {
    /// Build the geometry table once and run the first layout.
    pub fn new(tree: CodeTree, scaler: Scaler, width: i32, height: i32, curve_steps: usize) -> Self {
        let geometry = GeometryTable::for_tree(&tree);
        let mut scene = Self {
            tree,
            geometry,
            selection: None,
            width,
            height,
            curve_steps,
            engine: LayoutEngine::new(scaler),
        };
        scene.refresh();
        scene
    }

    pub fn scaler(&self) -> &Scaler {
        self.engine.scaler()
    }

    pub fn engine(&self) -> &LayoutEngine {
        &self.engine
    }

    /// Full size + position pass for the current viewport.
    pub fn refresh(&mut self) {
        self.engine
            .layout(&self.tree, &mut self.geometry, self.width, self.height);
    }

    pub fn resize(&mut self, width: i32, height: i32) {
        self.width = width;
        self.height = height;
        self.refresh();
    }

    /// Swap in rescaled constants. Call `refresh` or `resize` to apply them.
    pub fn rescale(&mut self, factor: f64) {
        self.engine = LayoutEngine::new(self.engine.scaler().rescale(factor));
    }

    pub fn click(&mut self, x: i32, y: i32) -> Option<NodeId> {
        self.selection = interaction::hit_test(&self.tree, &self.geometry, x, y);
        self.selection
    }

    pub fn deselect(&mut self) {
        self.selection = None;
    }

    pub fn move_by(&mut self, dx: i32, dy: i32) -> Result<(), MoveError> {
        interaction::translate(
            &self.engine,
            &self.tree,
            &mut self.geometry,
            self.selection,
            dx,
            dy,
        )
    }

    /// Draw the scene, or the loading placeholder while the tree is empty.
    pub fn render(&self, surface: &mut dyn DrawSurface) {
        if self.tree.is_empty() {
            scene_renderer::render_loading(surface, self.width, self.height);
            return;
        }
        scene_renderer::render_scene(
            surface,
            &self.engine,
            &self.tree,
            &self.geometry,
            self.selection,
            self.curve_steps,
        );
    }

    pub fn export_svg(&self, path: &str) -> Result<()> {
        let mut surface = SvgSurface::new(self.width, self.height);
        self.render(&mut surface);
        surface
            .export(path)
            .with_context(|| format!("Failed to write {}", path))
    }
}
