//! Pure in-process raster backend.
//!
//! Last resort in the chain: needs no external binaries. Draws the
//! background and rounded card with tiny-skia, rasterizes each glyph's
//! resolved vector asset with resvg, and falls back to plain font-rendered
//! text per glyph when an asset is unavailable. The date uses a system text
//! font; if none of the candidate fonts exist the backend fails with
//! `MissingFont` and the chain is already exhausted.

use std::path::Path;

use anyhow::Context as _;
use kurbo::Shape as _;
use resvg::tiny_skia::{Color, FillRule, Paint, PathBuilder, Pixmap, Stroke, Transform};
use rusttype::{Font, Scale, point};

use crate::{
    assets::AssetStore,
    error::BackendError,
    layout::{CardRect, DateAlign, GlyphSlot, LayoutPlan},
    model::{Glyph, RenderRequest},
    render::RenderBackend,
};

/// Candidate text fonts, DejaVu first (present on most Linux hosts).
const TEXT_FONT_PATHS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/local/share/fonts/DejaVuSans.ttf",
    "/Library/Fonts/Arial Unicode.ttf",
    "/System/Library/Fonts/Supplemental/Arial Unicode.ttf",
];

/// Fallback glyph text is drawn smaller than the slot so even a tofu box
/// stays inside its cell.
const FALLBACK_GLYPH_SCALE: f32 = 0.8;

pub struct RasterBackend;

impl RenderBackend for RasterBackend {
    fn name(&self) -> &'static str {
        "raster"
    }

    fn attempt(
        &self,
        plan: &LayoutPlan,
        request: &RenderRequest,
        store: &mut AssetStore,
        out: &Path,
    ) -> Result<(), BackendError> {
        let size = plan.canvas_size;
        let mut pixmap = Pixmap::new(size, size)
            .ok_or_else(|| BackendError::Raster("failed to allocate canvas pixmap".to_string()))?;

        let font = load_text_font()?;

        let bg = plan.palette.background;
        pixmap.fill(Color::from_rgba8(bg[0], bg[1], bg[2], 255));

        if let Some(card) = &plan.card {
            draw_card(&mut pixmap, card, plan)?;
        }

        for (glyph, slot) in request.glyphs.iter().zip(&plan.glyphs) {
            match store.resolve(glyph) {
                Some(asset) => {
                    if let Err(err) = draw_svg_glyph(&mut pixmap, &asset.content, slot) {
                        tracing::warn!(key = %asset.key, %err, "svg glyph raster failed, using text fallback");
                        draw_fallback_glyph(&mut pixmap, &font, glyph, slot, plan);
                    }
                }
                None => draw_fallback_glyph(&mut pixmap, &font, glyph, slot, plan),
            }
        }

        let date = request.formatted_date();
        let date_x = match plan.date_align {
            DateAlign::RowLeft => plan.date_anchor.0,
            DateAlign::Center => {
                plan.date_anchor.0 - text_width(&font, plan.date_font_size, &date) / 2.0
            }
        };
        draw_text(
            &mut pixmap,
            &font,
            &date,
            plan.date_font_size,
            date_x,
            plan.date_anchor.1,
            plan.palette.text,
        );

        write_png(&pixmap, out)
            .map_err(|err| BackendError::Raster(format!("png write failed: {err:#}")))?;
        Ok(())
    }
}

fn load_text_font() -> Result<Font<'static>, BackendError> {
    for path in TEXT_FONT_PATHS {
        if let Ok(bytes) = std::fs::read(path)
            && let Some(font) = Font::try_from_vec(bytes)
        {
            return Ok(font);
        }
    }
    Err(BackendError::MissingFont)
}

fn draw_card(pixmap: &mut Pixmap, card: &CardRect, plan: &LayoutPlan) -> Result<(), BackendError> {
    let path = rounded_rect_path(card)
        .ok_or_else(|| BackendError::Raster("failed to build card path".to_string()))?;

    let mut paint = Paint::default();
    paint.anti_alias = true;
    let fill = plan.palette.card;
    paint.set_color(Color::from_rgba8(fill[0], fill[1], fill[2], 255));
    pixmap.fill_path(&path, &paint, FillRule::Winding, Transform::identity(), None);

    let border = plan.palette.border;
    paint.set_color(Color::from_rgba8(border[0], border[1], border[2], 255));
    let stroke = Stroke {
        width: card.border_width,
        ..Stroke::default()
    };
    pixmap.stroke_path(&path, &paint, &stroke, Transform::identity(), None);
    Ok(())
}

/// Translate kurbo's rounded-rect elements into a tiny-skia path.
fn rounded_rect_path(card: &CardRect) -> Option<resvg::tiny_skia::Path> {
    let rect = kurbo::Rect::new(
        card.x as f64,
        card.y as f64,
        (card.x + card.width) as f64,
        (card.y + card.height) as f64,
    );
    let rounded = kurbo::RoundedRect::from_rect(rect, card.radius as f64);

    let mut builder = PathBuilder::new();
    for element in rounded.path_elements(0.1) {
        match element {
            kurbo::PathEl::MoveTo(p) => builder.move_to(p.x as f32, p.y as f32),
            kurbo::PathEl::LineTo(p) => builder.line_to(p.x as f32, p.y as f32),
            kurbo::PathEl::QuadTo(c, p) => {
                builder.quad_to(c.x as f32, c.y as f32, p.x as f32, p.y as f32)
            }
            kurbo::PathEl::CurveTo(c1, c2, p) => builder.cubic_to(
                c1.x as f32,
                c1.y as f32,
                c2.x as f32,
                c2.y as f32,
                p.x as f32,
                p.y as f32,
            ),
            kurbo::PathEl::ClosePath => builder.close(),
        }
    }
    builder.finish()
}

fn draw_svg_glyph(
    pixmap: &mut Pixmap,
    svg_bytes: &[u8],
    slot: &GlyphSlot,
) -> anyhow::Result<()> {
    let opts = usvg::Options::default();
    let tree = usvg::Tree::from_data(svg_bytes, &opts).context("parse svg tree")?;

    let tree_size = tree.size();
    if !tree_size.width().is_finite() || tree_size.width() <= 0.0 || tree_size.height() <= 0.0 {
        anyhow::bail!("svg has invalid width/height");
    }

    let sx = slot.size / tree_size.width();
    let sy = slot.size / tree_size.height();
    let transform = Transform::from_scale(sx, sy).post_translate(slot.x, slot.y);
    resvg::render(&tree, transform, &mut pixmap.as_mut());
    Ok(())
}

/// Plain centered-text stand-in for a glyph with no vector asset.
fn draw_fallback_glyph(
    pixmap: &mut Pixmap,
    font: &Font<'_>,
    glyph: &Glyph,
    slot: &GlyphSlot,
    plan: &LayoutPlan,
) {
    let px = slot.size * FALLBACK_GLYPH_SCALE;
    let width = text_width(font, px, &glyph.char);
    let x = slot.x + (slot.size - width) / 2.0;
    let y = slot.y + (slot.size - px) / 2.0;
    draw_text(pixmap, font, &glyph.char, px, x, y, plan.palette.text);
}

fn text_width(font: &Font<'_>, px: f32, text: &str) -> f32 {
    if text.is_empty() {
        return 0.0;
    }
    let scale = Scale::uniform(px);
    let v_metrics = font.v_metrics(scale);
    font.layout(text, scale, point(0.0, v_metrics.ascent))
        .filter_map(|g| g.pixel_bounding_box())
        .map(|bb| bb.max.x as f32)
        .fold(0.0, f32::max)
}

/// Rasterize one line of text onto the pixmap, blending by coverage. The
/// destination under text is always opaque here, so a straight per-channel
/// lerp is exact.
fn draw_text(
    pixmap: &mut Pixmap,
    font: &Font<'_>,
    text: &str,
    px: f32,
    origin_x: f32,
    top_y: f32,
    rgb: [u8; 3],
) {
    let scale = Scale::uniform(px);
    let v_metrics = font.v_metrics(scale);
    let width = pixmap.width() as i32;
    let height = pixmap.height() as i32;
    let glyphs: Vec<_> = font
        .layout(text, scale, point(origin_x, top_y + v_metrics.ascent))
        .collect();
    let data = pixmap.data_mut();

    for glyph in &glyphs {
        let Some(bb) = glyph.pixel_bounding_box() else {
            continue;
        };
        glyph.draw(|gx, gy, coverage| {
            let x = bb.min.x + gx as i32;
            let y = bb.min.y + gy as i32;
            if x < 0 || y < 0 || x >= width || y >= height {
                return;
            }
            let idx = ((y * width + x) * 4) as usize;
            for (offset, channel) in rgb.iter().enumerate() {
                let dst = data[idx + offset] as f32;
                data[idx + offset] =
                    (dst + (*channel as f32 - dst) * coverage).round().clamp(0.0, 255.0) as u8;
            }
            // Alpha stays opaque underneath text.
        });
    }
}

fn write_png(pixmap: &Pixmap, out: &Path) -> anyhow::Result<()> {
    let mut rgba = Vec::with_capacity(pixmap.data().len());
    for pixel in pixmap.pixels() {
        let color = pixel.demultiply();
        rgba.extend_from_slice(&[color.red(), color.green(), color.blue(), color.alpha()]);
    }
    image::save_buffer_with_format(
        out,
        &rgba,
        pixmap.width(),
        pixmap.height(),
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", out.display()))?;
    Ok(())
}
