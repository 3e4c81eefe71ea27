//! Pure canvas geometry.
//!
//! [`compute_layout`] maps `(mode, glyph count)` to a [`LayoutPlan`] with no
//! I/O and no backend knowledge; every backend consumes the same plan.

use crate::model::RenderMode;

/// Final output edge length in pixels (square canvas).
pub const CANVAS_SIZE: u32 = 1080;
/// Linear supersampling factor for backends that render high-DPI frames.
pub const SUPERSAMPLE: u32 = 2;
/// Glyph count required by normal mode.
pub const GLYPHS_PER_ROW: usize = 5;

pub const PADDING_OUTER: f32 = 80.0;
pub const CARD_RADIUS: f32 = 60.0;
pub const CARD_BORDER_WIDTH: f32 = 2.0;

pub const DATE_FONT_SIZE: f32 = 40.0;
/// Date offset from the card's top edge in normal mode.
pub const DATE_TOP_OFFSET: f32 = 30.0;
pub const GLYPH_FONT_SIZE: f32 = 150.0;
pub const GLYPH_GAP: f32 = 35.0;

pub const ESSENCE_GLYPH_FONT_SIZE: f32 = 420.0;
pub const ESSENCE_DATE_FONT_SIZE: f32 = 36.0;
pub const ESSENCE_DATE_TOP_PADDING: f32 = 70.0;

/// Mode-dependent colors, carried in the plan so all backends agree.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Palette {
    pub background: [u8; 3],
    /// Gradient end color for backends that support a background gradient.
    pub background_end: [u8; 3],
    pub card: [u8; 3],
    pub border: [u8; 3],
    pub text: [u8; 3],
}

pub fn palette(mode: RenderMode) -> Palette {
    match mode {
        RenderMode::Normal => Palette {
            background: [245, 243, 238],
            background_end: [240, 237, 230],
            card: [255, 255, 255],
            border: [220, 216, 208],
            text: [60, 60, 60],
        },
        RenderMode::Essence => Palette {
            background: [242, 241, 236],
            background_end: [237, 236, 228],
            card: [255, 255, 255],
            border: [220, 216, 208],
            text: [70, 70, 70],
        },
    }
}

/// `#rrggbb` form used by the CSS and ImageMagick backends.
pub fn css_hex(rgb: [u8; 3]) -> String {
    format!("#{:02x}{:02x}{:02x}", rgb[0], rgb[1], rgb[2])
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CardRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub radius: f32,
    pub border_width: f32,
}

/// Placement of one glyph: top-left corner plus nominal square size.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GlyphSlot {
    pub x: f32,
    pub y: f32,
    pub size: f32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DateAlign {
    /// `date_anchor.x` is the left edge of the date text (normal mode,
    /// aligned with the first glyph's column).
    RowLeft,
    /// `date_anchor.x` is the horizontal center of the date text.
    Center,
}

/// Backend-independent geometry for one frame at 1× resolution.
#[derive(Clone, Debug)]
pub struct LayoutPlan {
    pub canvas_size: u32,
    pub mode: RenderMode,
    pub card: Option<CardRect>,
    pub glyphs: Vec<GlyphSlot>,
    pub date_anchor: (f32, f32),
    pub date_align: DateAlign,
    pub date_font_size: f32,
    pub palette: Palette,
}

/// Left edge of the glyph row: centered, but never closer to the canvas
/// edge than the outer padding. A zero-glyph row degenerates to the padding.
pub fn row_left(glyph_count: usize) -> f32 {
    if glyph_count == 0 {
        return PADDING_OUTER;
    }
    let width = row_width(glyph_count);
    let centered = (CANVAS_SIZE as f32 - width) / 2.0;
    centered.max(PADDING_OUTER)
}

pub fn row_width(glyph_count: usize) -> f32 {
    if glyph_count == 0 {
        return 0.0;
    }
    glyph_count as f32 * GLYPH_FONT_SIZE + (glyph_count - 1) as f32 * GLYPH_GAP
}

pub fn compute_layout(mode: RenderMode, glyph_count: usize) -> LayoutPlan {
    let size = CANVAS_SIZE as f32;
    match mode {
        RenderMode::Normal => {
            let card = CardRect {
                x: PADDING_OUTER,
                y: PADDING_OUTER,
                width: size - 2.0 * PADDING_OUTER,
                height: size - 2.0 * PADDING_OUTER,
                radius: CARD_RADIUS,
                border_width: CARD_BORDER_WIDTH,
            };
            let left = row_left(glyph_count);
            let top = (size - GLYPH_FONT_SIZE) / 2.0;
            let glyphs = (0..glyph_count)
                .map(|i| GlyphSlot {
                    x: left + i as f32 * (GLYPH_FONT_SIZE + GLYPH_GAP),
                    y: top,
                    size: GLYPH_FONT_SIZE,
                })
                .collect();
            LayoutPlan {
                canvas_size: CANVAS_SIZE,
                mode,
                card: Some(card),
                glyphs,
                date_anchor: (left, PADDING_OUTER + DATE_TOP_OFFSET),
                date_align: DateAlign::RowLeft,
                date_font_size: DATE_FONT_SIZE,
                palette: palette(mode),
            }
        }
        RenderMode::Essence => {
            let glyphs = (0..glyph_count)
                .map(|_| GlyphSlot {
                    x: (size - ESSENCE_GLYPH_FONT_SIZE) / 2.0,
                    y: (size - ESSENCE_GLYPH_FONT_SIZE) / 2.0,
                    size: ESSENCE_GLYPH_FONT_SIZE,
                })
                .collect();
            LayoutPlan {
                canvas_size: CANVAS_SIZE,
                mode,
                card: None,
                glyphs,
                date_anchor: (size / 2.0, ESSENCE_DATE_TOP_PADDING),
                date_align: DateAlign::Center,
                date_font_size: ESSENCE_DATE_FONT_SIZE,
                palette: palette(mode),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_width_is_monotonic_and_left_respects_padding() {
        let mut prev_width = 0.0;
        for n in 0..=8 {
            let width = row_width(n);
            assert!(width >= prev_width, "row width shrank at n={n}");
            prev_width = width;
            assert!(row_left(n) >= PADDING_OUTER);
        }
    }

    #[test]
    fn zero_glyphs_is_safe() {
        let plan = compute_layout(RenderMode::Normal, 0);
        assert_eq!(plan.date_anchor.0, PADDING_OUTER);
        assert!(plan.glyphs.is_empty());
        assert!(plan.date_anchor.1.is_finite());
        assert!(plan.date_anchor.1 >= 0.0);
    }

    #[test]
    fn normal_date_anchor_matches_first_glyph_left_edge() {
        let plan = compute_layout(RenderMode::Normal, GLYPHS_PER_ROW);
        let first = plan.glyphs.first().unwrap();
        assert_eq!(plan.date_anchor.0, first.x);
        assert_eq!(plan.date_align, DateAlign::RowLeft);
    }

    #[test]
    fn normal_row_has_configured_shape() {
        let plan = compute_layout(RenderMode::Normal, GLYPHS_PER_ROW);
        assert_eq!(plan.glyphs.len(), GLYPHS_PER_ROW);
        for slot in &plan.glyphs {
            assert_eq!(slot.size, GLYPH_FONT_SIZE);
        }
        for pair in plan.glyphs.windows(2) {
            let step = pair[1].x - pair[0].x;
            assert!((step - (GLYPH_FONT_SIZE + GLYPH_GAP)).abs() < 1e-3);
        }
        assert!(plan.card.is_some());
    }

    #[test]
    fn wide_row_clamps_to_outer_padding() {
        // 7 glyphs exceed the centered width available on a 1080 canvas.
        assert_eq!(row_left(7), PADDING_OUTER);
    }

    #[test]
    fn essence_is_single_centered_slot() {
        let plan = compute_layout(RenderMode::Essence, 1);
        assert_eq!(plan.glyphs.len(), 1);
        let slot = &plan.glyphs[0];
        assert_eq!(slot.size, ESSENCE_GLYPH_FONT_SIZE);
        assert!((slot.x - (CANVAS_SIZE as f32 - slot.size) / 2.0).abs() < 1e-3);
        assert_eq!(plan.date_anchor.0, CANVAS_SIZE as f32 / 2.0);
        assert_eq!(plan.date_align, DateAlign::Center);
        assert!(plan.card.is_none());
    }

    #[test]
    fn css_hex_formats_palette_colors() {
        assert_eq!(css_hex([245, 243, 238]), "#f5f3ee");
        assert_eq!(css_hex([0, 0, 0]), "#000000");
    }
}
