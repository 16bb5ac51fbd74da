//! Software command executor for headless rendering.
//!
//! Replays a paint command list onto an RGBA pixel buffer. The executor is
//! the last stage of the pipeline and knows nothing about CSS, layout, or
//! the DOM — it only understands `Line`, `Rect`, and `Text` primitives:
//!
//! ```text
//! Render tree → Layout → Paint commands → Pixels
//! ```
//!
//! Text is rasterized with fontdue; colors arrive as raw CSS strings and
//! are resolved by [`crate::css_color`].

use anyhow::{Context, Result};
use fontdue::{Font, FontSettings};
use image::{ImageBuffer, Rgba, RgbaImage};
use std::path::Path;
use wren_common::warning::warn_once;
use wren_css::PaintCommand;

use crate::css_color::{self, Color};

/// Common system font paths to search for a default font.
const FONT_SEARCH_PATHS: &[&str] = &[
    // macOS
    "/System/Library/Fonts/Helvetica.ttc",
    "/System/Library/Fonts/SFNS.ttf",
    "/Library/Fonts/Arial.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    // Linux
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/truetype/freefont/FreeSans.ttf",
    // Windows
    "C:\\Windows\\Fonts\\arial.ttf",
    "C:\\Windows\\Fonts\\segoeui.ttf",
];

/// The single font size this engine renders at. Font selection and sizing
/// are outside the styled property set; everything draws at this size.
pub const FONT_SIZE: f32 = 16.0;

/// Try to load a usable system font for text rendering.
///
/// Returns `None` (with a warning) when no font file can be found; text
/// commands are then skipped.
#[must_use]
pub fn load_system_font() -> Option<Font> {
    for path in FONT_SEARCH_PATHS {
        if let Ok(data) = std::fs::read(path)
            && let Ok(font) = Font::from_bytes(data, FontSettings::default())
        {
            return Some(font);
        }
    }
    warn_once("Render", "no system font found; text will not be drawn");
    None
}

/// Software executor that replays paint commands onto a pixel buffer.
pub struct Renderer<'a> {
    /// RGBA pixel buffer, cleared to white.
    buffer: RgbaImage,
    /// Width in pixels.
    width: u32,
    /// Height in pixels.
    height: u32,
    /// Font for text rasterization (`None` skips text commands).
    font: Option<&'a Font>,
}

impl<'a> Renderer<'a> {
    /// Create a renderer with a white surface of the given dimensions.
    #[must_use]
    pub fn new(width: u32, height: u32, font: Option<&'a Font>) -> Self {
        let buffer = ImageBuffer::from_pixel(width, height, Rgba([255, 255, 255, 255]));
        Self {
            buffer,
            width,
            height,
            font,
        }
    }

    /// Execute a command list in order (back to front).
    pub fn render(&mut self, commands: &[PaintCommand]) {
        for command in commands {
            self.execute(command);
        }
    }

    /// Consume the renderer and return the pixel buffer.
    #[must_use]
    pub fn into_image(self) -> RgbaImage {
        self.buffer
    }

    /// Save the rendered surface as a PNG.
    ///
    /// # Errors
    ///
    /// Returns an error if the image cannot be written to the given path.
    pub fn save(&self, path: &Path) -> Result<()> {
        self.buffer
            .save(path)
            .with_context(|| format!("failed to save render to '{}'", path.display()))
    }

    fn execute(&mut self, command: &PaintCommand) {
        match command {
            PaintCommand::Rect {
                x,
                y,
                width,
                height,
                color,
            } => self.fill_rect(*x, *y, *width, *height, resolve_color(color)),
            PaintCommand::Line {
                x1,
                y1,
                x2,
                y2,
                width,
                color,
            } => self.stroke_line(*x1, *y1, *x2, *y2, *width, resolve_color(color)),
            PaintCommand::Text { x, y, text, color } => {
                self.draw_text(text, *x, *y, resolve_color(color));
            }
        }
    }

    /// Fill a rectangle, clipped to the surface.
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_possible_wrap
    )]
    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32, color: Color) {
        if color.a == 0 {
            return;
        }
        let rgba = Rgba([color.r, color.g, color.b, color.a]);
        let x = x as i32;
        let y = y as i32;
        let width = width.max(0.0) as u32;
        let height = height.max(0.0) as u32;

        for dy in 0..height {
            for dx in 0..width {
                let px = x + dx as i32;
                let py = y + dy as i32;
                if px >= 0 && py >= 0 && (px as u32) < self.width && (py as u32) < self.height {
                    self.buffer.put_pixel(px as u32, py as u32, rgba);
                }
            }
        }
    }

    /// Stroke a line segment of the given width.
    ///
    /// Border lines are always axis-aligned, so the stroke is a bar of
    /// `width` thickness centered on the segment. Diagonal segments are
    /// not produced by the paint builder and are skipped with a warning.
    fn stroke_line(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, width: f32, color: Color) {
        let half = width / 2.0;
        if (y1 - y2).abs() < f32::EPSILON {
            // Horizontal
            let left = x1.min(x2);
            let right = x1.max(x2);
            self.fill_rect(left, y1 - half, right - left, width, color);
        } else if (x1 - x2).abs() < f32::EPSILON {
            // Vertical
            let top = y1.min(y2);
            let bottom = y1.max(y2);
            self.fill_rect(x1 - half, top, width, bottom - top, color);
        } else {
            warn_once("Render", "diagonal line segments are not supported");
        }
    }

    /// Draw a text run with its origin at the baseline.
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_possible_wrap
    )]
    fn draw_text(&mut self, text: &str, x: f32, baseline_y: f32, color: Color) {
        let Some(font) = self.font else {
            return;
        };

        let rgba = Rgba([color.r, color.g, color.b, color.a]);
        let mut cursor_x = x;

        for ch in text.chars() {
            if ch.is_control() {
                continue;
            }

            let (metrics, bitmap) = font.rasterize(ch, FONT_SIZE);

            // fontdue's ymin is the offset of the bitmap's bottom edge
            // relative to the baseline.
            let glyph_x = cursor_x as i32 + metrics.xmin;
            let glyph_y = baseline_y as i32 - metrics.ymin - metrics.height as i32;

            for gy in 0..metrics.height {
                for gx in 0..metrics.width {
                    let coverage = bitmap[gy * metrics.width + gx];
                    if coverage == 0 {
                        continue;
                    }
                    let px = glyph_x + gx as i32;
                    let py = glyph_y + gy as i32;
                    if px >= 0 && py >= 0 && (px as u32) < self.width && (py as u32) < self.height
                    {
                        let bg = *self.buffer.get_pixel(px as u32, py as u32);
                        let blended = alpha_blend(rgba, bg, coverage);
                        self.buffer.put_pixel(px as u32, py as u32, blended);
                    }
                }
            }

            cursor_x += metrics.advance_width;
        }
    }
}

/// Resolve a raw CSS color string, degrading to black with a diagnostic.
fn resolve_color(value: &str) -> Color {
    css_color::parse(value).unwrap_or_else(|| {
        warn_once("Render", &format!("unknown color {value:?}; using black"));
        Color::BLACK
    })
}

/// Alpha blend a foreground color onto a background color.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn alpha_blend(fg: Rgba<u8>, bg: Rgba<u8>, alpha: u8) -> Rgba<u8> {
    let a = f32::from(alpha) / 255.0;
    let inv_a = 1.0 - a;

    Rgba([
        f32::from(fg[0]).mul_add(a, f32::from(bg[0]) * inv_a) as u8,
        f32::from(fg[1]).mul_add(a, f32::from(bg[1]) * inv_a) as u8,
        f32::from(fg[2]).mul_add(a, f32::from(bg[2]) * inv_a) as u8,
        255,
    ])
}
