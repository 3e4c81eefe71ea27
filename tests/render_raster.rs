use std::path::PathBuf;

use emojiday::{
    AssetStore, BackendError, CANVAS_SIZE, Config, Glyph, RenderBackend, RenderMode,
    RenderRequest, compute_layout,
    render::RasterBackend,
};

fn temp_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "emojiday_{name}_{}_{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

/// Full-bleed red square; scaled into whatever slot it lands in.
const RED_SVG: &[u8] = br##"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 36 36"><rect width="36" height="36" fill="#ff0000"/></svg>"##;

fn seeded_store(dir: &std::path::Path, keys: &[&str]) -> AssetStore {
    let cache = dir.join("cache");
    std::fs::create_dir_all(&cache).unwrap();
    for key in keys {
        std::fs::write(cache.join(format!("{key}.svg")), RED_SVG).unwrap();
    }
    AssetStore::new(&Config {
        offline: true,
        cache_dir: cache,
        ..Config::default()
    })
}

fn request(mode: RenderMode, n: usize) -> RenderRequest {
    RenderRequest {
        glyphs: (0..n).map(|_| Glyph::new("🌍")).collect(),
        date: chrono::NaiveDate::from_ymd_opt(2025, 11, 22).unwrap(),
        timestamp: None,
        mode,
    }
}

/// The raster backend needs a system text font for the date; hosts without
/// one exercise the `MissingFont` path instead.
macro_rules! attempt_or_skip {
    ($result:expr) => {
        match $result {
            Err(BackendError::MissingFont) => {
                eprintln!("skipping: no system text font available");
                return;
            }
            other => other.unwrap(),
        }
    };
}

#[test]
fn normal_mode_renders_card_and_svg_glyphs() {
    let dir = temp_dir("raster_normal");
    let out = dir.join("out.png");
    let plan = compute_layout(RenderMode::Normal, 5);
    let mut store = seeded_store(&dir, &["1f30d"]);

    attempt_or_skip!(RasterBackend.attempt(&plan, &request(RenderMode::Normal, 5), &mut store, &out));

    let img = image::open(&out).unwrap().to_rgba8();
    assert_eq!(img.dimensions(), (CANVAS_SIZE, CANVAS_SIZE));

    // Outer background outside the card.
    assert_eq!(img.get_pixel(10, 10).0, [245, 243, 238, 255]);
    // Card interior below the glyph row is plain white.
    assert_eq!(img.get_pixel(540, 950).0, [255, 255, 255, 255]);
    // Center of the middle glyph slot carries the red asset.
    let center = img.get_pixel(540, 540).0;
    assert!(center[0] > 200 && center[1] < 60, "got {center:?}");

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn essence_mode_renders_one_large_glyph_without_card() {
    let dir = temp_dir("raster_essence");
    let out = dir.join("out.png");
    let plan = compute_layout(RenderMode::Essence, 1);
    let mut store = seeded_store(&dir, &["1f30d"]);

    attempt_or_skip!(RasterBackend.attempt(
        &plan,
        &request(RenderMode::Essence, 1),
        &mut store,
        &out
    ));

    let img = image::open(&out).unwrap().to_rgba8();
    assert_eq!(img.dimensions(), (CANVAS_SIZE, CANVAS_SIZE));

    // Essence background, no white card anywhere near the corner.
    assert_eq!(img.get_pixel(10, 10).0, [242, 241, 236, 255]);
    // The big glyph covers the canvas center.
    let center = img.get_pixel(540, 540).0;
    assert!(center[0] > 200 && center[1] < 60, "got {center:?}");

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn missing_assets_fall_back_to_text_without_failing() {
    let dir = temp_dir("raster_fallback");
    let out = dir.join("out.png");
    let plan = compute_layout(RenderMode::Normal, 5);
    // Empty cache and offline: every glyph takes the text fallback.
    let mut store = AssetStore::new(&Config {
        offline: true,
        cache_dir: dir.join("cache"),
        ..Config::default()
    });

    attempt_or_skip!(RasterBackend.attempt(&plan, &request(RenderMode::Normal, 5), &mut store, &out));

    let img = image::open(&out).unwrap().to_rgba8();
    assert_eq!(img.dimensions(), (CANVAS_SIZE, CANVAS_SIZE));
    assert_eq!(store.fetch_count(), 0);

    std::fs::remove_dir_all(&dir).ok();
}
