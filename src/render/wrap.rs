//! Word-wrap measurement engine.
//!
//! Wrapping breaks at word boundaries against a target width; a single
//! word wider than the width keeps its own line unbroken. The engine is
//! metrics-driven so the same algorithm serves any font backend, and so
//! rendered height is known before anything is drawn.

/// Per-glyph horizontal advance and line height for one font.
pub trait GlyphMetrics {
    fn advance(&self, c: char, size: f32) -> f32;
    fn line_height(&self, size: f32) -> f32;
}

/// One wrapped line and its measured width.
#[derive(Debug, Clone, PartialEq)]
pub struct WrappedLine {
    pub text: String,
    pub width: f32,
}

/// Uniform glyph metrics, independent of any font file: every glyph
/// advances half the point size, lines are 1.2× the point size.
pub struct FixedMetrics;

impl GlyphMetrics for FixedMetrics {
    fn advance(&self, _c: char, size: f32) -> f32 {
        size * 0.5
    }

    fn line_height(&self, size: f32) -> f32 {
        size * 1.2
    }
}

pub fn text_width(text: &str, size: f32, metrics: &dyn GlyphMetrics) -> f32 {
    text.chars().map(|c| metrics.advance(c, size)).sum()
}

/// Wraps `text` to `max_width`. Paragraph breaks (`\n`) are preserved; an
/// empty paragraph still occupies a line. Never returns an empty vec.
pub fn wrap_text(
    text: &str,
    max_width: f32,
    size: f32,
    metrics: &dyn GlyphMetrics,
) -> Vec<WrappedLine> {
    let space = metrics.advance(' ', size);
    let mut lines = Vec::new();

    for paragraph in text.split('\n') {
        let mut current = String::new();
        let mut current_width = 0.0_f32;

        for word in paragraph.split_whitespace() {
            let word_width = text_width(word, size, metrics);
            let needed = if current.is_empty() {
                word_width
            } else {
                current_width + space + word_width
            };

            if needed > max_width && !current.is_empty() {
                lines.push(WrappedLine {
                    text: std::mem::take(&mut current),
                    width: current_width,
                });
                current_width = 0.0;
            }
            if !current.is_empty() {
                current.push(' ');
                current_width += space;
            }
            current.push_str(word);
            current_width += word_width;
        }

        lines.push(WrappedLine {
            text: current,
            width: current_width,
        });
    }

    lines
}

/// Rendered height of `text` wrapped to `max_width`. Available before any
/// draw call; later layout offsets depend on it.
pub fn wrapped_height(text: &str, max_width: f32, size: f32, metrics: &dyn GlyphMetrics) -> f32 {
    wrap_text(text, max_width, size, metrics).len() as f32 * metrics.line_height(size)
}
