use std::path::Path;

use crate::domain::cursor::TranslationUnit;
use crate::domain::geometry::Point;

pub mod scene_renderer;
pub mod svg_exporter;

/// Produces a cursor tree plus diagnostics for one source file.
pub trait AstProvider {
    fn parse(&self, path: &Path) -> anyhow::Result<TranslationUnit>;
}

/// 8-bit RGBA colour. Alpha 0 is fully transparent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgba(pub u8, pub u8, pub u8, pub u8);

impl Rgba {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Rgba(r, g, b, 255)
    }

    pub const TRANSPARENT: Rgba = Rgba(0, 0, 0, 0);

    pub fn is_transparent(&self) -> bool {
        self.3 == 0
    }
}

/// Drawing primitives consumed by the scene renderer. Rectangles are keyed
/// by their lower-left corner.
pub trait DrawSurface {
    fn fill_rect(&mut self, x: i32, y: i32, width: i32, height: i32, color: Rgba);
    fn outline_rect(&mut self, x: i32, y: i32, width: i32, height: i32, color: Rgba, line_width: i32);
    fn line(&mut self, from: Point, to: Point, color: Rgba, line_width: i32);
    fn text(&mut self, x: i32, y: i32, size: i32, content: &str, color: Rgba);
}
