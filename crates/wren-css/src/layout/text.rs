//! The delegated text-measurement capability.
//!
//! [§ 10.8 Line height calculations](https://www.w3.org/TR/CSS2/visudet.html#line-height)
//!
//! "CSS assumes that every font has font metrics that specify a
//! characteristic height above the baseline and a depth below it."
//!
//! Font shaping is outside this engine: the layout pass only needs an
//! advance width and the font's ascent/descent for a given string, the
//! same contract a 2D canvas `measureText` provides.

/// The measurement of one text run under the current font.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextMeasurement {
    /// Total advance width of the string.
    pub width: f32,
    /// Font ascent above the baseline.
    pub ascent: f32,
    /// Font descent below the baseline.
    pub descent: f32,
}

/// External text-metrics capability used to size text boxes.
///
/// Implementors provide per-string advance widths and the font's vertical
/// extents. The layout engine uses this only to size inline text boxes;
/// the paint builder places the baseline with the recorded ascent.
pub trait TextMetrics {
    /// Measure a text string under the implementor's current font.
    fn measure(&self, text: &str) -> TextMeasurement;
}

/// Rough text metrics for a nominal 16px font.
///
/// Uses a fixed per-character advance ratio; good enough for tests and for
/// environments without a real font. Real rendering substitutes a
/// glyph-accurate implementation.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicTextMetrics;

impl TextMetrics for HeuristicTextMetrics {
    fn measure(&self, text: &str) -> TextMeasurement {
        const FONT_SIZE: f32 = 16.0;
        const CHAR_WIDTH_RATIO: f32 = 0.6;
        const ASCENT_RATIO: f32 = 0.8;
        const DESCENT_RATIO: f32 = 0.25;

        #[allow(clippy::cast_precision_loss)]
        let width = text.chars().count() as f32 * FONT_SIZE * CHAR_WIDTH_RATIO;
        TextMeasurement {
            width,
            ascent: FONT_SIZE * ASCENT_RATIO,
            descent: FONT_SIZE * DESCENT_RATIO,
        }
    }
}
