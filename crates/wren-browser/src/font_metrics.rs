//! Text metrics backed by fontdue for accurate measurement during layout.
//!
//! [§ 10.8 Line height calculations](https://www.w3.org/TR/CSS2/visudet.html#line-height)
//!
//! "CSS assumes that every font has font metrics that specify a
//! characteristic height above the baseline and a depth below it."

use fontdue::Font;
use wren_css::{TextMeasurement, TextMetrics};

/// Glyph-accurate text metrics over a fontdue [`Font`] at a fixed size.
///
/// Advance widths are summed per character, matching the cursor
/// advancement used by the renderer's text drawing, so measured and
/// painted text line up. Uses `Font::metrics()` (not `Font::rasterize()`)
/// to avoid bitmap generation when only measurements are needed.
pub struct FontTextMetrics<'a> {
    font: &'a Font,
    font_size: f32,
}

impl<'a> FontTextMetrics<'a> {
    /// Create a metrics provider for a font at the given pixel size.
    #[must_use]
    pub fn new(font: &'a Font, font_size: f32) -> Self {
        Self { font, font_size }
    }
}

impl TextMetrics for FontTextMetrics<'_> {
    fn measure(&self, text: &str) -> TextMeasurement {
        let width = text
            .chars()
            .filter(|ch| !ch.is_control())
            .map(|ch| self.font.metrics(ch, self.font_size).advance_width)
            .sum();

        // The font's horizontal line metrics give ascent above and descent
        // below the baseline (descent is negative in fontdue's convention).
        let (ascent, descent) = self
            .font
            .horizontal_line_metrics(self.font_size)
            .map_or((self.font_size * 0.8, self.font_size * 0.2), |line| {
                (line.ascent, -line.descent)
            });

        TextMeasurement {
            width,
            ascent,
            descent,
        }
    }
}
