//! Native macOS compositor backend.
//!
//! Generates a small AppKit drawing program and runs it with the system
//! `swift` binary, which gets Apple Color Emoji rendering for free. Only
//! attempted on macOS; everywhere else it reports `PlatformUnsupported` and
//! the chain moves on.

use std::path::Path;

use crate::{
    assets::AssetStore,
    error::BackendError,
    layout::{DateAlign, LayoutPlan},
    model::RenderRequest,
    render::{
        RenderBackend,
        process::{SUBPROCESS_TIMEOUT, TempFileGuard, binary_available, run_with_timeout},
    },
};

pub struct NativeBackend;

impl RenderBackend for NativeBackend {
    fn name(&self) -> &'static str {
        "native"
    }

    fn attempt(
        &self,
        plan: &LayoutPlan,
        request: &RenderRequest,
        _store: &mut AssetStore,
        out: &Path,
    ) -> Result<(), BackendError> {
        if !cfg!(target_os = "macos") {
            return Err(BackendError::PlatformUnsupported);
        }
        if !binary_available("swift") {
            return Err(BackendError::BinaryMissing("swift".to_string()));
        }

        let source = swift_source(plan, request, out);
        let guard = TempFileGuard::unique("native", ".swift");
        std::fs::write(&guard.0, source)?;

        run_with_timeout(
            std::process::Command::new("swift").arg(&guard.0),
            "swift",
            SUBPROCESS_TIMEOUT,
        )?;

        if !out.exists() {
            return Err(BackendError::OutputMissing(out.to_path_buf()));
        }
        Ok(())
    }
}

fn rgb_components(rgb: [u8; 3]) -> (f32, f32, f32) {
    (
        rgb[0] as f32 / 255.0,
        rgb[1] as f32 / 255.0,
        rgb[2] as f32 / 255.0,
    )
}

fn swift_quote(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}

/// AppKit draws in a bottom-left coordinate space; the plan's top-based
/// offsets are flipped inside the generated program.
fn swift_source(plan: &LayoutPlan, request: &RenderRequest, out: &Path) -> String {
    let size = plan.canvas_size;
    let (bg_r, bg_g, bg_b) = rgb_components(plan.palette.background);
    let (text_r, text_g, text_b) = rgb_components(plan.palette.text);
    let date_text = swift_quote(&request.formatted_date());
    let glyph_size = plan.glyphs.first().map(|g| g.size).unwrap_or(0.0);
    let emoji_text = swift_quote(
        &request
            .glyphs
            .iter()
            .map(|g| g.char.as_str())
            .collect::<Vec<_>>()
            .join(" "),
    );
    let out_path = swift_quote(&out.display().to_string());

    let mut src = String::new();
    src.push_str(&format!(
        r#"import Cocoa

let size = NSSize(width: {size}, height: {size})
let image = NSImage(size: size)

image.lockFocus()

NSColor(calibratedRed: {bg_r:.4}, green: {bg_g:.4}, blue: {bg_b:.4}, alpha: 1.0).setFill()
NSRect(origin: .zero, size: size).fill()
"#
    ));

    if let Some(card) = &plan.card {
        let (border_r, border_g, border_b) = rgb_components(plan.palette.border);
        src.push_str(&format!(
            r#"
let cardRect = NSRect(x: {x}, y: {y}, width: {w}, height: {h})
let cardPath = NSBezierPath(roundedRect: cardRect, xRadius: {radius}, yRadius: {radius})
NSColor.white.setFill()
cardPath.fill()
NSColor(calibratedRed: {border_r:.4}, green: {border_g:.4}, blue: {border_b:.4}, alpha: 1.0).setStroke()
cardPath.lineWidth = {border}
cardPath.stroke()
"#,
            x = card.x,
            y = card.y,
            w = card.width,
            h = card.height,
            radius = card.radius,
            border = card.border_width,
        ));
    }

    src.push_str(&format!(
        r#"
let emojiText = "{emoji_text}"
let emojiFont = NSFont.systemFont(ofSize: {glyph_size})
let emojiAttributes: [NSAttributedString.Key: Any] = [.font: emojiFont]
let emojiSize = emojiText.size(withAttributes: emojiAttributes)
let emojiX = ({size} - emojiSize.width) / 2
let emojiY = ({size} - emojiSize.height) / 2
emojiText.draw(at: NSPoint(x: emojiX, y: emojiY), withAttributes: emojiAttributes)

let dateText = "{date_text}"
let dateFont = NSFont.systemFont(ofSize: {date_size}, weight: .regular)
let dateAttributes: [NSAttributedString.Key: Any] = [
    .font: dateFont,
    .foregroundColor: NSColor(calibratedRed: {text_r:.4}, green: {text_g:.4}, blue: {text_b:.4}, alpha: 1.0)
]
"#,
        date_size = plan.date_font_size,
    ));

    match plan.date_align {
        DateAlign::RowLeft => {
            // Date column-aligned with the measured emoji row, a fixed
            // offset below the card's top edge.
            let date_y = plan.canvas_size as f32 - plan.date_anchor.1 - plan.date_font_size;
            src.push_str(&format!(
                "dateText.draw(at: NSPoint(x: emojiX, y: {date_y}), withAttributes: dateAttributes)\n"
            ));
        }
        DateAlign::Center => {
            src.push_str(&format!(
                r#"let dateSize = dateText.size(withAttributes: dateAttributes)
let dateX = ({size} - dateSize.width) / 2
let dateY = CGFloat({size}) - CGFloat({top}) - dateSize.height
dateText.draw(at: NSPoint(x: dateX, y: dateY), withAttributes: dateAttributes)
"#,
                top = plan.date_anchor.1,
            ));
        }
    }

    src.push_str(&format!(
        r#"
image.unlockFocus()

if let tiffData = image.tiffRepresentation,
   let bitmapRep = NSBitmapImageRep(data: tiffData),
   let pngData = bitmapRep.representation(using: .png, properties: [:]) {{
    try? pngData.write(to: URL(fileURLWithPath: "{out_path}"))
}}
"#
    ));

    src
}
