//! Headless-browser compositor backend.
//!
//! Builds an HTML document that expresses the layout plan as CSS, embeds
//! each resolved vector asset inline (falling back to a font-glyph span per
//! glyph), and screenshots it with headless Chromium at the supersampled
//! resolution. The finalizer downsamples the frame afterwards.

use std::path::Path;

use crate::{
    assets::AssetStore,
    error::BackendError,
    layout::{DateAlign, LayoutPlan, SUPERSAMPLE, css_hex},
    model::RenderRequest,
    render::{
        RenderBackend,
        process::{SUBPROCESS_TIMEOUT, TempFileGuard, binary_available, run_with_timeout},
    },
};

/// Checked in order; absolute entries cover macOS app bundles.
const BROWSER_CANDIDATES: &[&str] = &[
    "chromium",
    "chromium-browser",
    "google-chrome",
    "google-chrome-stable",
    "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
    "/Applications/Chromium.app/Contents/MacOS/Chromium",
];

/// Virtual-time window granting web fonts a bounded chance to load.
const VIRTUAL_TIME_BUDGET_MS: u32 = 5_000;

pub struct BrowserBackend {
    debug_html: bool,
}

impl BrowserBackend {
    pub fn new(debug_html: bool) -> Self {
        Self { debug_html }
    }
}

impl RenderBackend for BrowserBackend {
    fn name(&self) -> &'static str {
        "browser"
    }

    fn supersampled(&self) -> bool {
        true
    }

    fn attempt(
        &self,
        plan: &LayoutPlan,
        request: &RenderRequest,
        store: &mut AssetStore,
        out: &Path,
    ) -> Result<(), BackendError> {
        let Some(browser) = find_browser() else {
            return Err(BackendError::BinaryMissing("chromium".to_string()));
        };

        let document = build_document(plan, request, store);

        if self.debug_html {
            // Diagnostics only; failure to write it never affects the render.
            let debug_path = out.with_extension("html");
            if let Err(err) = std::fs::write(&debug_path, &document) {
                tracing::warn!(path = %debug_path.display(), %err, "failed to write debug html");
            }
        }

        let guard = TempFileGuard::unique("browser", ".html");
        std::fs::write(&guard.0, &document)?;

        let render_size = plan.canvas_size * SUPERSAMPLE;
        let mut cmd = std::process::Command::new(browser);
        cmd.arg("--headless=new")
            .arg("--disable-gpu")
            .arg("--hide-scrollbars")
            .arg("--force-device-scale-factor=1")
            .arg(format!("--window-size={render_size},{render_size}"))
            .arg(format!("--virtual-time-budget={VIRTUAL_TIME_BUDGET_MS}"))
            .arg(format!("--screenshot={}", out.display()))
            .arg(format!("file://{}", guard.0.display()));
        run_with_timeout(&mut cmd, browser, SUBPROCESS_TIMEOUT)?;

        if !out.exists() {
            return Err(BackendError::OutputMissing(out.to_path_buf()));
        }
        Ok(())
    }
}

fn find_browser() -> Option<&'static str> {
    BROWSER_CANDIDATES
        .iter()
        .copied()
        .find(|candidate| binary_available(candidate))
}

fn html_escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Inline SVG markup for a glyph cell, or a font-glyph span when the asset
/// is unavailable or not valid UTF-8.
fn glyph_cell(store: &mut AssetStore, glyph: &crate::model::Glyph) -> String {
    if let Some(asset) = store.resolve(glyph)
        && let Ok(svg) = String::from_utf8(asset.content)
    {
        // Drop any XML prolog; it is not valid inside an HTML body.
        let markup = match svg.find("<svg") {
            Some(idx) => svg[idx..].to_string(),
            None => svg,
        };
        return format!(r#"<span class="emoji">{markup}</span>"#);
    }
    format!(
        r#"<span class="emoji emoji-font">{}</span>"#,
        html_escape(&glyph.char)
    )
}

/// Build the full document for either mode, scaled by [`SUPERSAMPLE`].
fn build_document(plan: &LayoutPlan, request: &RenderRequest, store: &mut AssetStore) -> String {
    let scale = SUPERSAMPLE as f32;
    let render_size = plan.canvas_size * SUPERSAMPLE;
    let bg = css_hex(plan.palette.background);
    let bg_end = css_hex(plan.palette.background_end);
    let text = css_hex(plan.palette.text);
    let date = html_escape(&request.formatted_date());
    let glyph_px = plan.glyphs.first().map(|g| g.size).unwrap_or(0.0) * scale;
    let date_px = plan.date_font_size * scale;

    let cells: String = request
        .glyphs
        .iter()
        .map(|g| glyph_cell(store, g))
        .collect();

    match (&plan.card, plan.date_align) {
        (Some(card), DateAlign::RowLeft) => {
            let card_px = card.width * scale;
            let border_px = card.border_width * scale;
            let radius_px = card.radius * scale;
            let border = css_hex(plan.palette.border);
            let card_color = css_hex(plan.palette.card);
            let gap_px = crate::layout::GLYPH_GAP * scale;
            let date_top = (plan.date_anchor.1 - card.y) * scale;
            let date_left = ((plan.date_anchor.0 - card.x) * scale).max(0.0);
            format!(
                r#"<!DOCTYPE html>
<html>
<head>
<meta charset="UTF-8">
<style>
@import url('https://fonts.googleapis.com/css2?family=Inter:wght@400;500&display=swap');

* {{ margin: 0; padding: 0; box-sizing: border-box; }}
html, body {{ width: {render_size}px; height: {render_size}px; overflow: hidden; }}
body {{
    background: linear-gradient(135deg, {bg} 0%, {bg_end} 100%);
    display: flex;
    justify-content: center;
    align-items: center;
    font-family: 'Inter', -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif;
    -webkit-font-smoothing: antialiased;
}}
.card {{
    width: {card_px}px;
    height: {card_px}px;
    background: {card_color};
    border: {border_px}px solid {border};
    border-radius: {radius_px}px;
    position: relative;
    display: flex;
    justify-content: center;
    align-items: center;
}}
.date {{
    position: absolute;
    top: {date_top}px;
    left: {date_left}px;
    font-size: {date_px}px;
    color: {text};
    font-weight: 500;
    letter-spacing: 0.5px;
}}
.emojis {{ display: flex; align-items: center; justify-content: center; gap: {gap_px}px; }}
.emoji {{
    width: {glyph_px}px;
    height: {glyph_px}px;
    display: flex;
    align-items: center;
    justify-content: center;
    line-height: 1;
}}
.emoji svg {{ width: 100%; height: 100%; display: block; }}
.emoji-font {{
    font-size: {glyph_px}px;
    font-family: 'Noto Color Emoji', 'Apple Color Emoji', 'Segoe UI Emoji', sans-serif;
}}
</style>
</head>
<body>
<div class="card">
    <div class="date">{date}</div>
    <div class="emojis">{cells}</div>
</div>
</body>
</html>"#
            )
        }
        _ => {
            let date_top = plan.date_anchor.1 * scale;
            format!(
                r#"<!DOCTYPE html>
<html>
<head>
<meta charset="UTF-8">
<style>
@import url('https://fonts.googleapis.com/css2?family=Inter:wght@400;500&display=swap');

* {{ margin: 0; padding: 0; box-sizing: border-box; }}
html, body {{ width: {render_size}px; height: {render_size}px; overflow: hidden; }}
body {{
    background: linear-gradient(135deg, {bg} 0%, {bg_end} 100%);
    display: flex;
    justify-content: center;
    align-items: center;
    font-family: 'Inter', -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif;
    position: relative;
    -webkit-font-smoothing: antialiased;
}}
.emoji {{
    width: {glyph_px}px;
    height: {glyph_px}px;
    display: flex;
    align-items: center;
    justify-content: center;
    line-height: 1;
}}
.emoji svg {{ width: 100%; height: 100%; display: block; }}
.emoji-font {{
    font-size: {glyph_px}px;
    font-family: 'Noto Color Emoji', 'Apple Color Emoji', 'Segoe UI Emoji', sans-serif;
}}
.date {{
    position: absolute;
    top: {date_top}px;
    left: 50%;
    transform: translateX(-50%);
    font-size: {date_px}px;
    font-weight: 500;
    color: {text};
    letter-spacing: 0.02em;
}}
</style>
</head>
<body>
{cells}
<div class="date">{date}</div>
</body>
</html>"#
            )
        }
    }
}
