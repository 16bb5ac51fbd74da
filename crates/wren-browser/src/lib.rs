//! High-level pipeline API for the Wren rendering engine.
//!
//! # Scope
//!
//! This crate wires the stages together for callers:
//! - **Document loading** - read HTML from disk or fetch it over http(s)
//! - **Parsing** - delegated to `wren-html`
//! - **Rendering** - render tree → box tree → layout → paint → pixels,
//!   driven by a [`RenderSession`]
//!
//! There is no global "current page" state: a [`RenderSession`] is an
//! explicit per-invocation context value, and every call to
//! [`RenderSession::paint`] or [`RenderSession::render`] builds fresh
//! trees from the input document.

/// CSS color resolution for the command executor.
pub mod css_color;
/// Fontdue-backed text metrics.
pub mod font_metrics;
/// Software command executor.
pub mod renderer;

pub use css_color::Color;
pub use font_metrics::FontTextMetrics;
pub use renderer::{FONT_SIZE, Renderer, load_system_font};

pub use wren_css as css;
pub use wren_dom as dom;
pub use wren_html as html;

use anyhow::{Context, Result};
use fontdue::Font;
use image::RgbaImage;
use std::fs;
use std::time::Duration;
use thiserror::Error;
use wren_common::warning::clear_warnings;
use wren_css::{
    HeuristicTextMetrics, LayoutBox, PaintCommand, Rect, TextMetrics, build_paint_commands,
    build_render_tree, layout_tree,
};
use wren_dom::DomTree;

/// Error type for document loading.
#[derive(Debug, Error)]
pub enum LoadError {
    /// Failed to read a local file.
    #[error("file error: {0}")]
    File(String),
    /// Failed to fetch a URL.
    #[error("network error: {0}")]
    Network(String),
}

/// Load a document's HTML source from a file path or URL.
///
/// http(s) URLs are fetched with a blocking client and a 30 second
/// timeout; anything else is treated as a filesystem path.
///
/// # Errors
///
/// Returns a [`LoadError`] when the file cannot be read or the request
/// fails.
pub fn load_document(path: &str) -> Result<String, LoadError> {
    if path.starts_with("http://") || path.starts_with("https://") {
        fetch_url(path)
    } else {
        fs::read_to_string(path)
            .map_err(|e| LoadError::File(format!("failed to read '{path}': {e}")))
    }
}

/// Fetch HTML content from a URL.
fn fetch_url(url: &str) -> Result<String, LoadError> {
    let client = reqwest::blocking::Client::builder()
        .timeout(Duration::from_secs(30))
        .build()
        .map_err(|e| LoadError::Network(format!("failed to create HTTP client: {e}")))?;

    let response = client
        .get(url)
        .header("User-Agent", "wren/0.1")
        .send()
        .map_err(|e| LoadError::Network(format!("request failed: {e}")))?;

    if !response.status().is_success() {
        return Err(LoadError::Network(format!("HTTP error: {}", response.status())));
    }

    response
        .text()
        .map_err(|e| LoadError::Network(format!("failed to read response body: {e}")))
}

/// Per-invocation rendering context: viewport dimensions and the loaded
/// font. Holds no document state — each call builds fresh trees, so a
/// session can be reused across navigations as long as calls are
/// serialized.
pub struct RenderSession {
    viewport_width: u32,
    viewport_height: u32,
    font: Option<Font>,
}

impl RenderSession {
    /// Create a session for the given viewport, loading a system font for
    /// text measurement and rasterization. Without a font, layout falls
    /// back to heuristic metrics and text is not drawn.
    #[must_use]
    pub fn new(viewport_width: u32, viewport_height: u32) -> Self {
        Self {
            viewport_width,
            viewport_height,
            font: load_system_font(),
        }
    }

    /// The viewport as a layout rectangle.
    #[allow(clippy::cast_precision_loss)]
    fn viewport(&self) -> Rect {
        Rect {
            x: 0.0,
            y: 0.0,
            width: self.viewport_width as f32,
            height: self.viewport_height as f32,
        }
    }

    /// Run the pipeline up to paint commands: render tree, box tree,
    /// layout, paint. Returns an empty list for a document with no
    /// renderable content.
    ///
    /// # Errors
    ///
    /// Propagates stylesheet errors from the cascade and contract
    /// violations from the paint builder.
    pub fn paint(&self, dom: &DomTree) -> Result<Vec<PaintCommand>> {
        // Stale diagnostics belong to the previous document.
        clear_warnings();

        let tree = build_render_tree(dom).context("building render tree")?;
        let Some(tree) = tree else {
            return Ok(Vec::new());
        };

        let mut root = LayoutBox::build(&tree);

        let font_backed;
        let heuristic;
        let metrics: &dyn TextMetrics = match &self.font {
            Some(font) => {
                font_backed = FontTextMetrics::new(font, FONT_SIZE);
                &font_backed
            }
            None => {
                heuristic = HeuristicTextMetrics;
                &heuristic
            }
        };

        layout_tree(&mut root, self.viewport(), metrics);
        let commands = build_paint_commands(&root).context("building paint commands")?;
        Ok(commands)
    }

    /// Run the full pipeline and rasterize onto a fresh white surface.
    ///
    /// # Errors
    ///
    /// Propagates the same errors as [`RenderSession::paint`].
    pub fn render(&self, dom: &DomTree) -> Result<RgbaImage> {
        let commands = self.paint(dom)?;
        let mut renderer = Renderer::new(
            self.viewport_width,
            self.viewport_height,
            self.font.as_ref(),
        );
        renderer.render(&commands);
        Ok(renderer.into_image())
    }
}
