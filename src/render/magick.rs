//! ImageMagick backend.
//!
//! Command-line composition: solid background, rounded card, annotated
//! date, and Pango-rendered emoji text (Pango picks up the system color
//! emoji font). No vector-asset support; glyphs always come from fonts.

use std::path::Path;

use crate::{
    assets::AssetStore,
    error::BackendError,
    layout::{DateAlign, LayoutPlan, css_hex},
    model::RenderRequest,
    render::{
        RenderBackend,
        process::{SUBPROCESS_TIMEOUT, binary_available, run_with_timeout},
    },
};

/// ImageMagick 7 entry point first, v6 fallback second.
const MAGICK_CANDIDATES: &[&str] = &["magick", "convert"];

/// `-annotate` positions a baseline, not a top edge; nudge the plan's
/// top-based date anchor down by roughly the cap height.
const ANNOTATE_BASELINE_NUDGE: f32 = 20.0;

pub struct MagickBackend;

impl RenderBackend for MagickBackend {
    fn name(&self) -> &'static str {
        "magick"
    }

    fn attempt(
        &self,
        plan: &LayoutPlan,
        request: &RenderRequest,
        _store: &mut AssetStore,
        out: &Path,
    ) -> Result<(), BackendError> {
        let Some(binary) = MAGICK_CANDIDATES
            .iter()
            .copied()
            .find(|candidate| binary_available(candidate))
        else {
            return Err(BackendError::BinaryMissing("magick".to_string()));
        };

        let mut cmd = std::process::Command::new(binary);
        cmd.args(build_args(plan, request)).arg(out);
        run_with_timeout(&mut cmd, binary, SUBPROCESS_TIMEOUT)?;

        if !out.exists() {
            return Err(BackendError::OutputMissing(out.to_path_buf()));
        }
        Ok(())
    }
}

fn pango_escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Everything but the trailing output path.
fn build_args(plan: &LayoutPlan, request: &RenderRequest) -> Vec<String> {
    let size = plan.canvas_size;
    let glyph_size = plan.glyphs.first().map(|g| g.size).unwrap_or(0.0);
    let emoji_text = pango_escape(
        &request
            .glyphs
            .iter()
            .map(|g| g.char.as_str())
            .collect::<Vec<_>>()
            .join(" "),
    );
    let date_text = request.formatted_date();

    let mut args = vec![
        "-size".to_string(),
        format!("{size}x{size}"),
        format!("xc:{}", css_hex(plan.palette.background)),
    ];

    if let Some(card) = &plan.card {
        args.extend([
            "-fill".to_string(),
            css_hex(plan.palette.card),
            "-stroke".to_string(),
            css_hex(plan.palette.border),
            "-strokewidth".to_string(),
            format!("{}", card.border_width),
            "-draw".to_string(),
            format!(
                "roundrectangle {},{} {},{} {},{}",
                card.x,
                card.y,
                card.x + card.width,
                card.y + card.height,
                card.radius,
                card.radius
            ),
        ]);
    }

    // Emoji overlay as a separate Pango image, composited onto the canvas
    // center so a single output frame is produced.
    args.extend([
        "(".to_string(),
        "-background".to_string(),
        "none".to_string(),
        format!("pango:<span font=\"{glyph_size}\">{emoji_text}</span>"),
        ")".to_string(),
        "-gravity".to_string(),
        "center".to_string(),
        "-composite".to_string(),
    ]);

    args.extend([
        "-font".to_string(),
        "DejaVu-Sans".to_string(),
        "-pointsize".to_string(),
        format!("{}", plan.date_font_size),
        "-fill".to_string(),
        css_hex(plan.palette.text),
    ]);
    match plan.date_align {
        DateAlign::RowLeft => args.extend([
            "-gravity".to_string(),
            "northwest".to_string(),
            "-annotate".to_string(),
            format!(
                "+{}+{}",
                plan.date_anchor.0,
                plan.date_anchor.1 + ANNOTATE_BASELINE_NUDGE
            ),
            date_text,
        ]),
        DateAlign::Center => args.extend([
            "-gravity".to_string(),
            "north".to_string(),
            "-annotate".to_string(),
            format!("+0+{}", plan.date_anchor.1),
            date_text,
        ]),
    }

    args
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        layout::compute_layout,
        model::{Glyph, RenderMode},
    };

    fn request(mode: RenderMode, n: usize) -> RenderRequest {
        RenderRequest {
            glyphs: (0..n).map(|_| Glyph::new("✨")).collect(),
            date: chrono::NaiveDate::from_ymd_opt(2025, 11, 22).unwrap(),
            timestamp: None,
            mode,
        }
    }

    #[test]
    fn normal_args_draw_card_then_composite_then_annotate() {
        let plan = compute_layout(RenderMode::Normal, 5);
        let args = build_args(&plan, &request(RenderMode::Normal, 5));
        let draw = args.iter().position(|a| a == "-draw").unwrap();
        let composite = args.iter().position(|a| a == "-composite").unwrap();
        let annotate = args.iter().position(|a| a == "-annotate").unwrap();
        assert!(draw < composite && composite < annotate);
        assert!(args[draw + 1].starts_with("roundrectangle 80,80 1000,1000 60,60"));
        assert!(args.contains(&"xc:#f5f3ee".to_string()));
    }

    #[test]
    fn essence_args_skip_card_and_center_date() {
        let plan = compute_layout(RenderMode::Essence, 1);
        let args = build_args(&plan, &request(RenderMode::Essence, 1));
        assert!(!args.contains(&"-draw".to_string()));
        assert!(args.contains(&"north".to_string()));
        assert!(args.contains(&"+0+70".to_string()));
        assert!(args.iter().any(|a| a.contains("font=\"420\"")));
    }

    #[test]
    fn pango_markup_is_escaped() {
        assert_eq!(pango_escape("a&b<c>"), "a&amp;b&lt;c&gt;");
    }
}
