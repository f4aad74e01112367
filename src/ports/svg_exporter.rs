//! SVG Exporter
//!
//! A [`DrawSurface`] that records primitives as SVG elements. Scene
//! coordinates have a lower-left origin, so every y is flipped against the
//! canvas height.

use crate::domain::geometry::Point;
use crate::ports::scene_renderer::BACKGROUND;
use crate::ports::{DrawSurface, Rgba};
use std::io::Result;

pub struct SvgSurface {
    width: i32,
    height: i32,
    elements: Vec<String>,
}

impl SvgSurface {
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            width,
            height,
            elements: Vec::new(),
        }
    }

    /// Write the document to `path`.
    pub fn export(&self, path: &str) -> Result<()> {
        std::fs::write(path, self.to_svg())
    }

    pub fn to_svg(&self) -> String {
        let mut lines = Vec::with_capacity(self.elements.len() + 4);
        lines.push(format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\">",
            w = self.width,
            h = self.height
        ));
        lines.push(format!(
            "  <rect x=\"0\" y=\"0\" width=\"{}\" height=\"{}\" fill=\"{}\"/>",
            self.width,
            self.height,
            Self::color(BACKGROUND)
        ));
        for element in &self.elements {
            lines.push(format!("  {}", element));
        }
        lines.push("</svg>".to_string());
        lines.join("\n")
    }

    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    fn flip(&self, y: f32) -> f32 {
        self.height as f32 - y
    }

    fn color(color: Rgba) -> String {
        format!("#{:02x}{:02x}{:02x}", color.0, color.1, color.2)
    }

    fn opacity(color: Rgba) -> String {
        format!("{:.3}", color.3 as f32 / 255.0)
    }

    fn escape_text(text: &str) -> String {
        text.replace('&', "&amp;")
            .replace('<', "&lt;")
            .replace('>', "&gt;")
            .replace('"', "&quot;")
    }
}

impl DrawSurface for SvgSurface {
    fn fill_rect(&mut self, x: i32, y: i32, width: i32, height: i32, color: Rgba) {
        if color.is_transparent() {
            return;
        }
        let top = self.flip(y.saturating_add(height) as f32);
        self.elements.push(format!(
            "<rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"{}\" fill-opacity=\"{}\"/>",
            x,
            top,
            width,
            height,
            Self::color(color),
            Self::opacity(color)
        ));
    }

    fn outline_rect(&mut self, x: i32, y: i32, width: i32, height: i32, color: Rgba, line_width: i32) {
        let top = self.flip(y.saturating_add(height) as f32);
        self.elements.push(format!(
            "<rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"none\" stroke=\"{}\" stroke-width=\"{}\"/>",
            x,
            top,
            width,
            height,
            Self::color(color),
            line_width
        ));
    }

    fn line(&mut self, from: Point, to: Point, color: Rgba, line_width: i32) {
        self.elements.push(format!(
            "<line x1=\"{:.1}\" y1=\"{:.1}\" x2=\"{:.1}\" y2=\"{:.1}\" stroke=\"{}\" stroke-width=\"{}\" stroke-linecap=\"round\"/>",
            from.x,
            self.flip(from.y),
            to.x,
            self.flip(to.y),
            Self::color(color),
            line_width
        ));
    }

    fn text(&mut self, x: i32, y: i32, size: i32, content: &str, color: Rgba) {
        self.elements.push(format!(
            "<text x=\"{}\" y=\"{}\" font-family=\"Helvetica\" font-size=\"{}\" fill=\"{}\">{}</text>",
            x,
            self.flip(y as f32),
            size,
            Self::color(color),
            Self::escape_text(content)
        ));
    }
}
