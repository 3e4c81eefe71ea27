//! Output finalization: file naming and the supersample downscale.

use std::path::Path;

use anyhow::Context as _;
use chrono::NaiveDate;

use crate::error::EmojidayResult;

/// Width of the collapsed timestamp token, `YYYY-MM-DD-HHMM`.
const TIMESTAMP_TOKEN_LEN: usize = 15;

/// Derive the output file name from the request's timestamp, or from the
/// date alone when no timestamp is present.
///
/// `2025-11-22T07:30:00Z` collapses to `2025-11-22-0730.png`.
pub fn output_file_name(timestamp: Option<&str>, date: NaiveDate) -> String {
    let base = match timestamp {
        Some(ts) if !ts.is_empty() => ts
            .chars()
            .filter(|c| *c != ':' && *c != 'Z')
            .map(|c| if c == 'T' { '-' } else { c })
            .take(TIMESTAMP_TOKEN_LEN)
            .collect::<String>(),
        _ => date.format("%Y-%m-%d").to_string(),
    };
    format!("{base}.png")
}

pub fn ensure_parent_dir(path: &Path) -> EmojidayResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

/// Downsample a supersampled frame to the target canvas size in place.
///
/// Frames already at the target size are left untouched. Lanczos3 keeps
/// glyph edges crisp through the 2× reduction.
pub fn downscale_to_canvas(path: &Path, canvas_size: u32) -> EmojidayResult<()> {
    let img = image::open(path)
        .with_context(|| format!("failed to reopen rendered frame '{}'", path.display()))?;
    if img.width() == canvas_size && img.height() == canvas_size {
        return Ok(());
    }

    let resized = img.resize_exact(
        canvas_size,
        canvas_size,
        image::imageops::FilterType::Lanczos3,
    );
    resized
        .save_with_format(path, image::ImageFormat::Png)
        .with_context(|| format!("failed to write downscaled frame '{}'", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 11, 22).unwrap()
    }

    #[test]
    fn timestamp_collapses_to_fixed_width_token() {
        assert_eq!(
            output_file_name(Some("2025-11-22T07:30:00Z"), date()),
            "2025-11-22-0730.png"
        );
    }

    #[test]
    fn empty_timestamp_falls_back_to_date() {
        assert_eq!(output_file_name(Some(""), date()), "2025-11-22.png");
        assert_eq!(output_file_name(None, date()), "2025-11-22.png");
    }

    #[test]
    fn downscale_halves_a_supersampled_frame() {
        let tmp = std::env::temp_dir().join(format!(
            "emojiday_downscale_{}_{}.png",
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap()
                .as_nanos()
        ));
        let img = image::RgbaImage::from_pixel(8, 8, image::Rgba([10, 20, 30, 255]));
        img.save(&tmp).unwrap();

        downscale_to_canvas(&tmp, 4).unwrap();
        let reopened = image::open(&tmp).unwrap();
        assert_eq!((reopened.width(), reopened.height()), (4, 4));

        // Already at target size: a second call is a no-op.
        downscale_to_canvas(&tmp, 4).unwrap();
        std::fs::remove_file(&tmp).ok();
    }
}
