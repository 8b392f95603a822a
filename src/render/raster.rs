//! Raster backend: draws cards into an `image::RgbaImage`.
//!
//! Rounded rectangles and alpha blending are plain pixel math on the
//! canvas buffer; image blitting reuses the aspect-fit arithmetic and
//! resize filters of the `image` crate; text goes through `ab_glyph`
//! outlines with the shared word-wrap engine providing measurement.

use ab_glyph::{Font, FontArc, PxScale, ScaleFont};
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, Rgba, RgbaImage};

use crate::render::surface::{
    Color, HAlign, Rect, RenderSurface, ScaleMode, TextStyle, VAlign,
};
use crate::render::wrap::{self, GlyphMetrics};

/// `RenderSurface` over an RGBA canvas with an `ab_glyph` font (plus an
/// optional bold face; bold text falls back to the regular face when no
/// bold font was supplied).
pub struct RasterSurface {
    canvas: RgbaImage,
    font: FontArc,
    bold: Option<FontArc>,
}

impl RasterSurface {
    pub fn new(width: u32, height: u32, font: FontArc) -> Self {
        Self {
            canvas: RgbaImage::new(width, height),
            font,
            bold: None,
        }
    }

    pub fn with_bold(mut self, bold: FontArc) -> Self {
        self.bold = Some(bold);
        self
    }

    pub fn into_image(self) -> RgbaImage {
        self.canvas
    }

    fn face(&self, style: &TextStyle) -> &FontArc {
        if style.bold {
            self.bold.as_ref().unwrap_or(&self.font)
        } else {
            &self.font
        }
    }

    fn draw_line(&mut self, line: &str, origin_x: f32, baseline_y: f32, style: &TextStyle) {
        let font = self.face(style).clone();
        let scale = PxScale::from(style.size);
        let scaled = font.as_scaled(scale);
        let mut x = origin_x;
        for c in line.chars() {
            let id = font.glyph_id(c);
            let glyph = id.with_scale_and_position(scale, ab_glyph::point(x, baseline_y));
            if let Some(outlined) = font.outline_glyph(glyph) {
                let bounds = outlined.px_bounds();
                outlined.draw(|gx, gy, coverage| {
                    let px = bounds.min.x as i32 + gx as i32;
                    let py = bounds.min.y as i32 + gy as i32;
                    blend_pixel(&mut self.canvas, px, py, style.color, coverage);
                });
            }
            x += scaled.h_advance(id);
        }
    }
}

struct FontMetrics<'a>(&'a FontArc);

impl GlyphMetrics for FontMetrics<'_> {
    fn advance(&self, c: char, size: f32) -> f32 {
        let scaled = self.0.as_scaled(PxScale::from(size));
        scaled.h_advance(self.0.glyph_id(c))
    }

    fn line_height(&self, size: f32) -> f32 {
        let scaled = self.0.as_scaled(PxScale::from(size));
        scaled.ascent() - scaled.descent() + scaled.line_gap()
    }
}

impl RenderSurface for RasterSurface {
    fn width(&self) -> i32 {
        self.canvas.width() as i32
    }

    fn height(&self) -> i32 {
        self.canvas.height() as i32
    }

    fn fill(&mut self, color: Color) {
        let px = Rgba([color.r, color.g, color.b, 255]);
        for p in self.canvas.pixels_mut() {
            *p = px;
        }
    }

    fn fill_round_rect(
        &mut self,
        rect: Rect,
        radius: i32,
        fill: Color,
        border: Option<(Color, i32)>,
    ) {
        if let Some((border_color, border_width)) = border {
            fill_round_rect_px(&mut self.canvas, rect, radius, border_color);
            fill_round_rect_px(
                &mut self.canvas,
                rect.inset(border_width),
                (radius - border_width).max(0),
                fill,
            );
        } else {
            fill_round_rect_px(&mut self.canvas, rect, radius, fill);
        }
    }

    fn blit_image(&mut self, rect: Rect, image: &DynamicImage, mode: ScaleMode) {
        let (src_w, src_h) = image.dimensions();
        if src_w == 0 || src_h == 0 || rect.w <= 0 || rect.h <= 0 {
            return;
        }
        let (dst_w, dst_h) = (rect.w as u32, rect.h as u32);

        match mode {
            ScaleMode::Fit => {
                let (w, h) = fit_dimensions(src_w, src_h, dst_w, dst_h);
                let resized = image.resize_exact(w, h, FilterType::CatmullRom).to_rgba8();
                // centered within the leftover space
                let ox = rect.x + ((dst_w - w) / 2) as i32;
                let oy = rect.y + ((dst_h - h) / 2) as i32;
                image::imageops::overlay(&mut self.canvas, &resized, i64::from(ox), i64::from(oy));
            }
            ScaleMode::Fill => {
                let (w, h) = cover_dimensions(src_w, src_h, dst_w, dst_h);
                let resized = image.resize_exact(w, h, FilterType::CatmullRom).to_rgba8();
                // central crop of the overflow
                let crop_x = (w - dst_w) / 2;
                let crop_y = (h - dst_h) / 2;
                let cropped =
                    image::imageops::crop_imm(&resized, crop_x, crop_y, dst_w, dst_h).to_image();
                image::imageops::overlay(
                    &mut self.canvas,
                    &cropped,
                    i64::from(rect.x),
                    i64::from(rect.y),
                );
            }
        }
    }

    fn measure_text(&self, text: &str, width: i32, style: &TextStyle) -> i32 {
        let metrics = FontMetrics(self.face(style));
        wrap::wrapped_height(text, width as f32, style.size, &metrics).ceil() as i32
    }

    fn draw_text(&mut self, rect: Rect, text: &str, style: &TextStyle) -> i32 {
        let face = self.face(style).clone();
        let metrics = FontMetrics(&face);
        let lines = wrap::wrap_text(text, rect.w as f32, style.size, &metrics);
        let line_height = metrics.line_height(style.size);
        let total_height = lines.len() as f32 * line_height;

        let scaled = face.as_scaled(PxScale::from(style.size));
        let ascent = scaled.ascent();

        let mut top = match style.valign {
            VAlign::Top => rect.y as f32,
            VAlign::Middle => rect.y as f32 + ((rect.h as f32 - total_height) / 2.0).max(0.0),
        };

        for line in &lines {
            // clip lines that would cross the bottom edge
            if top + line_height > rect.bottom() as f32 + 0.5 {
                break;
            }
            let x = match style.resolved_align() {
                HAlign::Left => rect.x as f32,
                HAlign::Center => rect.x as f32 + (rect.w as f32 - line.width) / 2.0,
                HAlign::Right => rect.right() as f32 - line.width,
            };
            self.draw_line(&line.text, x, top + ascent, style);
            top += line_height;
        }

        total_height.ceil() as i32
    }
}

// ─── Pixel helpers ────────────────────────────────────────────────────────────

/// Source-over blend of `color` at `coverage` onto one canvas pixel.
/// Out-of-bounds coordinates are ignored.
pub(crate) fn blend_pixel(canvas: &mut RgbaImage, x: i32, y: i32, color: Color, coverage: f32) {
    if x < 0 || y < 0 || x >= canvas.width() as i32 || y >= canvas.height() as i32 {
        return;
    }
    let alpha = (f32::from(color.a) / 255.0 * coverage.clamp(0.0, 1.0)).clamp(0.0, 1.0);
    if alpha <= 0.0 {
        return;
    }
    let dst = canvas.get_pixel_mut(x as u32, y as u32);
    let blend = |src: u8, dst: u8| -> u8 {
        (f32::from(src) * alpha + f32::from(dst) * (1.0 - alpha)).round() as u8
    };
    let da = f32::from(dst[3]) / 255.0;
    let out_a = alpha + da * (1.0 - alpha);
    *dst = Rgba([
        blend(color.r, dst[0]),
        blend(color.g, dst[1]),
        blend(color.b, dst[2]),
        (out_a * 255.0).round() as u8,
    ]);
}

/// Rounded-rectangle membership test: inside the body, or within `radius`
/// of a corner center.
pub(crate) fn inside_round_rect(x: i32, y: i32, rect: Rect, radius: i32) -> bool {
    if x < rect.x || y < rect.y || x >= rect.right() || y >= rect.bottom() {
        return false;
    }
    let r = radius.max(0);
    let left = rect.x + r;
    let right = rect.right() - 1 - r;
    let top = rect.y + r;
    let bottom = rect.bottom() - 1 - r;

    let cx = if x < left {
        left
    } else if x > right {
        right
    } else {
        return true;
    };
    let cy = if y < top {
        top
    } else if y > bottom {
        bottom
    } else {
        return true;
    };

    let dx = x - cx;
    let dy = y - cy;
    dx * dx + dy * dy <= r * r
}

pub(crate) fn fill_round_rect_px(canvas: &mut RgbaImage, rect: Rect, radius: i32, color: Color) {
    let x0 = rect.x.max(0);
    let y0 = rect.y.max(0);
    let x1 = rect.right().min(canvas.width() as i32);
    let y1 = rect.bottom().min(canvas.height() as i32);
    for y in y0..y1 {
        for x in x0..x1 {
            if inside_round_rect(x, y, rect, radius) {
                blend_pixel(canvas, x, y, color, 1.0);
            }
        }
    }
}

/// Largest dimensions with the source aspect ratio that fit inside the
/// destination box.
pub(crate) fn fit_dimensions(src_w: u32, src_h: u32, dst_w: u32, dst_h: u32) -> (u32, u32) {
    let scale = (dst_w as f64 / src_w as f64).min(dst_h as f64 / src_h as f64);
    scaled_dimensions(src_w, src_h, scale)
}

/// Smallest dimensions with the source aspect ratio that cover the
/// destination box.
pub(crate) fn cover_dimensions(src_w: u32, src_h: u32, dst_w: u32, dst_h: u32) -> (u32, u32) {
    let scale = (dst_w as f64 / src_w as f64).max(dst_h as f64 / src_h as f64);
    let (w, h) = scaled_dimensions(src_w, src_h, scale);
    // rounding must never undershoot the box
    (w.max(dst_w), h.max(dst_h))
}

fn scaled_dimensions(src_w: u32, src_h: u32, scale: f64) -> (u32, u32) {
    (
        ((src_w as f64 * scale).round() as u32).max(1),
        ((src_h as f64 * scale).round() as u32).max(1),
    )
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fit_contains_within_box() {
        assert_eq!(fit_dimensions(400, 200, 100, 100), (100, 50));
        assert_eq!(fit_dimensions(200, 400, 100, 100), (50, 100));
        assert_eq!(fit_dimensions(100, 100, 180, 180), (180, 180));
    }

    #[test]
    fn cover_spans_the_box() {
        assert_eq!(cover_dimensions(400, 200, 100, 100), (200, 100));
        assert_eq!(cover_dimensions(200, 400, 100, 100), (100, 200));
        let (w, h) = cover_dimensions(640, 480, 180, 180);
        assert!(w >= 180 && h >= 180);
    }

    #[test]
    fn round_rect_fills_body_but_not_corners() {
        let mut canvas = RgbaImage::new(40, 40);
        let red = Color::rgb(255, 0, 0);
        fill_round_rect_px(&mut canvas, Rect::new(0, 0, 40, 40), 12, red);

        // center and edge midpoints are filled
        assert_eq!(canvas.get_pixel(20, 20)[0], 255);
        assert_eq!(canvas.get_pixel(0, 20)[0], 255);
        assert_eq!(canvas.get_pixel(20, 39)[0], 255);
        // the extreme corner stays empty
        assert_eq!(canvas.get_pixel(0, 0)[3], 0);
        assert_eq!(canvas.get_pixel(39, 39)[3], 0);
    }

    #[test]
    fn zero_radius_is_a_plain_rectangle() {
        let mut canvas = RgbaImage::new(10, 10);
        fill_round_rect_px(&mut canvas, Rect::new(2, 2, 6, 6), 0, Color::rgb(0, 255, 0));
        assert_eq!(canvas.get_pixel(2, 2)[1], 255);
        assert_eq!(canvas.get_pixel(7, 7)[1], 255);
        assert_eq!(canvas.get_pixel(1, 1)[3], 0);
        assert_eq!(canvas.get_pixel(8, 8)[3], 0);
    }

    #[test]
    fn blend_respects_alpha() {
        let mut canvas = RgbaImage::from_pixel(1, 1, Rgba([255, 255, 255, 255]));
        blend_pixel(&mut canvas, 0, 0, Color::rgba(0, 0, 0, 255), 0.5);
        let px = canvas.get_pixel(0, 0);
        assert_eq!(px[0], 128);

        // zero coverage is a no-op
        let mut canvas = RgbaImage::from_pixel(1, 1, Rgba([10, 20, 30, 255]));
        blend_pixel(&mut canvas, 0, 0, Color::rgb(255, 255, 255), 0.0);
        assert_eq!(*canvas.get_pixel(0, 0), Rgba([10, 20, 30, 255]));
    }

    #[test]
    fn blend_ignores_out_of_bounds() {
        let mut canvas = RgbaImage::new(4, 4);
        blend_pixel(&mut canvas, -1, 0, Color::rgb(255, 0, 0), 1.0);
        blend_pixel(&mut canvas, 0, 99, Color::rgb(255, 0, 0), 1.0);
        assert!(canvas.pixels().all(|p| p[3] == 0));
    }

    #[test]
    fn border_leaves_a_ring_of_border_color() {
        let mut canvas = RgbaImage::new(30, 30);
        // no font needed for rect drawing; bypass RasterSurface
        let rect = Rect::new(0, 0, 30, 30);
        fill_round_rect_px(&mut canvas, rect, 0, Color::rgb(0, 0, 255));
        fill_round_rect_px(&mut canvas, rect.inset(2), 0, Color::rgb(255, 0, 0));
        assert_eq!(canvas.get_pixel(0, 15)[2], 255); // border
        assert_eq!(canvas.get_pixel(15, 15)[0], 255); // fill
    }

    // Font-dependent checks run only where a system font is discoverable;
    // the wrap/layout engines carry the deterministic coverage.
    #[test]
    fn draw_text_marks_pixels_with_a_real_font() {
        let Some(font) = crate::assets::load_export_font().ok() else {
            return;
        };
        let mut surface = RasterSurface::new(200, 60, font);
        surface.fill(Color::rgb(255, 255, 255));
        let style = TextStyle::new(24.0, Color::rgb(0, 0, 0));
        let height = surface.draw_text(Rect::new(0, 0, 200, 60), "Hi", &style);
        assert!(height > 0);

        let img = surface.into_image();
        let dark = img.pixels().filter(|p| p[0] < 128).count();
        assert!(dark > 0, "expected glyph coverage on the canvas");
    }
}
