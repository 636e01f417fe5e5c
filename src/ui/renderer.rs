//! Raster preview of the exported page
//!
//! Draws the same [`DocumentLayout`] the PDF writer consumes onto a tiny-skia
//! pixmap. Text is rasterized with ab_glyph when a font file is configured;
//! without one the preview only shows the page structure (bands).

use std::fs;
use std::path::{Path, PathBuf};

use ab_glyph::{Font, FontVec, PxScale, ScaleFont, point};
use tiny_skia::{Color, Paint, Pixmap, PremultipliedColorU8, Rect as SkiaRect, Transform};

use crate::domain::core::{Rect, Rgb};
use crate::ui::layout::{DocumentLayout, DrawOp, PageMetrics, POINT_TO_MM, TextAnchor, TextRun};

/// Rendering errors
#[derive(Debug, thiserror::Error)]
pub enum RendererError {
    #[error("Failed to create {width}x{height} pixmap for rendering")]
    PixmapCreationFailed { width: u32, height: u32 },

    #[error("Invalid band geometry: {0:?}")]
    InvalidBand(Rect),

    #[error("Failed to read font {path}: {source}")]
    FontRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Unsupported font data in {path}")]
    InvalidFont { path: PathBuf },

    #[error("PNG encoding failed: {0}")]
    Encoding(String),
}

/// Page preview renderer
#[derive(Debug)]
pub struct PreviewRenderer {
    /// Device pixels per millimetre
    scale: f32,
    font: Option<FontVec>,
}

impl PreviewRenderer {
    /// Create a renderer without a font (bands only)
    pub fn new(scale: f32) -> Self {
        Self { scale, font: None }
    }

    /// Use the given font for text runs
    pub fn with_font(mut self, font: FontVec) -> Self {
        self.font = Some(font);
        self
    }

    /// Load a TrueType/OpenType font from disk
    pub fn load_font(path: &Path) -> Result<FontVec, RendererError> {
        let data = fs::read(path).map_err(|source| RendererError::FontRead {
            path: path.to_path_buf(),
            source,
        })?;
        FontVec::try_from_vec(data).map_err(|_| RendererError::InvalidFont {
            path: path.to_path_buf(),
        })
    }

    pub fn has_font(&self) -> bool {
        self.font.is_some()
    }

    /// Pixel dimensions of the canvas for a page
    pub fn canvas_size(&self, page: &PageMetrics) -> (u32, u32) {
        (
            (page.width * self.scale).round().max(0.0) as u32,
            (page.height * self.scale).round().max(0.0) as u32,
        )
    }

    /// Render a layout to a pixmap
    pub fn render(&self, layout: &DocumentLayout) -> Result<Pixmap, RendererError> {
        let (width, height) = self.canvas_size(&layout.page);
        let mut pixmap = Pixmap::new(width, height)
            .ok_or(RendererError::PixmapCreationFailed { width, height })?;

        pixmap.fill(Color::WHITE);

        if self.font.is_none() {
            tracing::warn!("no preview font configured, text is omitted from the preview");
        }

        for op in layout.ops() {
            match op {
                DrawOp::Band { rect, color } => self.render_band(&mut pixmap, rect, *color)?,
                DrawOp::Text(run) => {
                    if let Some(font) = &self.font {
                        self.render_text(&mut pixmap, font, run);
                    }
                }
            }
        }

        Ok(pixmap)
    }

    /// Render a layout and encode it as PNG
    pub fn render_png(&self, layout: &DocumentLayout) -> Result<Vec<u8>, RendererError> {
        let pixmap = self.render(layout)?;
        pixmap
            .encode_png()
            .map_err(|err| RendererError::Encoding(err.to_string()))
    }

    fn render_band(&self, pixmap: &mut Pixmap, rect: &Rect, color: Rgb) -> Result<(), RendererError> {
        let scaled = rect.scaled(self.scale);
        let skia_rect = SkiaRect::from_xywh(scaled.x, scaled.y, scaled.w, scaled.h)
            .ok_or(RendererError::InvalidBand(*rect))?;

        let mut paint = Paint::default();
        paint.set_color_rgba8(color.r, color.g, color.b, 255);
        pixmap.fill_rect(skia_rect, &paint, Transform::identity(), None);

        Ok(())
    }

    fn render_text(&self, pixmap: &mut Pixmap, font: &FontVec, run: &TextRun) {
        let px_size = run.size * POINT_TO_MM * self.scale;
        let scaled_font = font.as_scaled(PxScale::from(px_size));

        let glyph_ids: Vec<_> = run.text.chars().map(|c| scaled_font.glyph_id(c)).collect();
        let advance: f32 = glyph_ids.iter().map(|id| scaled_font.h_advance(*id)).sum();

        let mut caret = match run.anchor {
            TextAnchor::Left => run.x * self.scale,
            TextAnchor::Center => run.x * self.scale - advance / 2.0,
        };
        let baseline = run.y * self.scale;

        let width = pixmap.width() as i32;
        let height = pixmap.height() as i32;
        let color = run.color;
        let pixels = pixmap.pixels_mut();

        for id in glyph_ids {
            let glyph = id.with_scale_and_position(px_size, point(caret, baseline));
            caret += scaled_font.h_advance(id);

            let Some(outlined) = font.outline_glyph(glyph) else {
                continue;
            };
            let bounds = outlined.px_bounds();
            outlined.draw(|gx, gy, coverage| {
                let x = bounds.min.x as i32 + gx as i32;
                let y = bounds.min.y as i32 + gy as i32;
                if x < 0 || y < 0 || x >= width || y >= height {
                    return;
                }
                let index = (y * width + x) as usize;
                pixels[index] = blend(pixels[index], color, coverage);
            });
        }
    }
}

/// Blend `color` at `coverage` over an opaque pixel
fn blend(dst: PremultipliedColorU8, color: Rgb, coverage: f32) -> PremultipliedColorU8 {
    let a = coverage.clamp(0.0, 1.0);
    let mix = |src: u8, dst: u8| (src as f32 * a + dst as f32 * (1.0 - a)).round() as u8;
    PremultipliedColorU8::from_rgba(
        mix(color.r, dst.red()),
        mix(color.g, dst.green()),
        mix(color.b, dst.blue()),
        255,
    )
    .unwrap_or(dst)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::plan::SafetyPlan;
    use crate::ui::layout::LayoutMetrics;

    fn layout() -> DocumentLayout {
        DocumentLayout::build(&SafetyPlan::new()).unwrap()
    }

    #[test]
    fn canvas_follows_scale() {
        let renderer = PreviewRenderer::new(2.0);
        assert_eq!(renderer.canvas_size(&PageMetrics::A4), (420, 594));
        assert!(!renderer.has_font());
    }

    #[test]
    fn renders_bands_on_white_page() {
        let renderer = PreviewRenderer::new(2.0);
        let pixmap = renderer.render(&layout()).unwrap();
        assert_eq!((pixmap.width(), pixmap.height()), (420, 594));

        let corner = pixmap.pixel(1, 1).unwrap();
        assert_eq!((corner.red(), corner.green(), corner.blue()), (255, 255, 255));

        // first band spans 14..196mm horizontally and 35..43mm vertically
        let band = pixmap.pixel(200, 78).unwrap();
        assert_eq!(
            (band.red(), band.green(), band.blue()),
            (Rgb::BRAND_BLUE.r, Rgb::BRAND_BLUE.g, Rgb::BRAND_BLUE.b)
        );
    }

    #[test]
    fn rendering_is_pixel_identical() {
        let renderer = PreviewRenderer::new(1.5);
        let a = renderer.render(&layout()).unwrap();
        let b = renderer.render(&layout()).unwrap();
        assert_eq!(a.data(), b.data());
    }

    #[test]
    fn png_output_has_signature() {
        let renderer = PreviewRenderer::new(1.0);
        let png = renderer.render_png(&layout()).unwrap();
        assert!(png.starts_with(&[0x89, b'P', b'N', b'G']));
    }

    #[test]
    fn zero_scale_cannot_allocate() {
        let renderer = PreviewRenderer::new(0.0);
        assert!(matches!(
            renderer.render(&layout()),
            Err(RendererError::PixmapCreationFailed { .. })
        ));
    }

    #[test]
    fn degenerate_band_is_rejected() {
        // narrower than the band inset, so the band width goes negative
        let page = PageMetrics {
            width: 20.0,
            height: 297.0,
        };
        let layout =
            DocumentLayout::build_with(&SafetyPlan::new(), page, LayoutMetrics::STANDARD).unwrap();
        let renderer = PreviewRenderer::new(1.0);
        assert!(matches!(
            renderer.render(&layout),
            Err(RendererError::InvalidBand(_))
        ));
    }

    #[test]
    fn font_loading_errors() {
        let missing = std::env::temp_dir().join("safety_plan_missing_font.ttf");
        let _ = fs::remove_file(&missing);
        assert!(matches!(
            PreviewRenderer::load_font(&missing),
            Err(RendererError::FontRead { .. })
        ));

        let garbage = std::env::temp_dir().join("safety_plan_garbage_font.ttf");
        fs::write(&garbage, b"definitely not a font").unwrap();
        assert!(matches!(
            PreviewRenderer::load_font(&garbage),
            Err(RendererError::InvalidFont { .. })
        ));
        let _ = fs::remove_file(&garbage);
    }

    fn fixture_font() -> FontVec {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/DejaVuSansMono.ttf");
        PreviewRenderer::load_font(&path).unwrap()
    }

    /// Pixels in rows `top..bottom` that are not pure white
    fn inked_pixels(pixmap: &Pixmap, top: u32, bottom: u32) -> usize {
        (top..bottom)
            .flat_map(|y| (0..pixmap.width()).map(move |x| (x, y)))
            .filter_map(|(x, y)| pixmap.pixel(x, y))
            .filter(|p| (p.red(), p.green(), p.blue()) != (255, 255, 255))
            .count()
    }

    #[test]
    fn font_draws_heading_text() {
        // heading baseline sits at 25mm, 50px at this scale
        let plain = PreviewRenderer::new(2.0).render(&layout()).unwrap();
        assert_eq!(inked_pixels(&plain, 20, 52), 0);

        let renderer = PreviewRenderer::new(2.0).with_font(fixture_font());
        assert!(renderer.has_font());
        let pixmap = renderer.render(&layout()).unwrap();
        assert!(inked_pixels(&pixmap, 20, 52) > 100);

        let again = renderer.render(&layout()).unwrap();
        assert_eq!(pixmap.data(), again.data());
    }

    #[test]
    fn band_titles_are_drawn_over_bands() {
        let plain = PreviewRenderer::new(2.0).render(&layout()).unwrap();
        let text = PreviewRenderer::new(2.0)
            .with_font(fixture_font())
            .render(&layout())
            .unwrap();

        // first band covers rows 70..86; white title glyphs break up the blue
        let blue_rows = |pixmap: &Pixmap| {
            (70..86)
                .flat_map(|y| (0..pixmap.width()).map(move |x| (x, y)))
                .filter_map(|(x, y)| pixmap.pixel(x, y))
                .filter(|p| {
                    (p.red(), p.green(), p.blue())
                        == (Rgb::BRAND_BLUE.r, Rgb::BRAND_BLUE.g, Rgb::BRAND_BLUE.b)
                })
                .count()
        };
        assert!(blue_rows(&text) < blue_rows(&plain));
    }

    #[test]
    fn blend_mixes_toward_color() {
        let white = PremultipliedColorU8::from_rgba(255, 255, 255, 255).unwrap();
        let full = blend(white, Rgb::BLACK, 1.0);
        assert_eq!((full.red(), full.green(), full.blue()), (0, 0, 0));
        let none = blend(white, Rgb::BLACK, 0.0);
        assert_eq!(none, white);
    }
}
