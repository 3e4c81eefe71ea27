use std::{path::PathBuf, time::Duration};

/// Default remote source for glyph vector assets (Twemoji SVG set, keyed by
/// canonical code-point names).
pub const DEFAULT_ASSET_BASE_URL: &str =
    "https://cdn.jsdelivr.net/gh/jdecked/twemoji@latest/assets/svg";

/// Default on-disk cache directory for fetched glyph assets.
pub const DEFAULT_CACHE_DIR: &str = "assets/emoji-svg";

/// Per-fetch network timeout for glyph assets.
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(5);

/// Process-wide configuration, constructed once at startup and passed by
/// reference into the components that need it. There is no ambient global
/// state; the environment is only read in [`Config::from_env`].
#[derive(Clone, Debug)]
pub struct Config {
    /// Base URL for remote glyph assets; `{base}/{key}.svg` must resolve.
    pub asset_base_url: String,
    /// Local cache directory for fetched assets.
    pub cache_dir: PathBuf,
    /// Skip all network access for asset resolution.
    pub offline: bool,
    /// Emit the browser backend's generated document to a sibling `.html`
    /// file for diagnostics.
    pub debug_html: bool,
    /// Timeout applied to each asset fetch.
    pub fetch_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            asset_base_url: DEFAULT_ASSET_BASE_URL.to_string(),
            cache_dir: PathBuf::from(DEFAULT_CACHE_DIR),
            offline: false,
            debug_html: false,
            fetch_timeout: FETCH_TIMEOUT,
        }
    }
}

impl Config {
    /// Build a configuration from `EMOJIDAY_*` environment variables,
    /// falling back to defaults for anything unset.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            asset_base_url: std::env::var("EMOJIDAY_ASSET_BASE_URL")
                .ok()
                .filter(|v| !v.is_empty())
                .unwrap_or(defaults.asset_base_url),
            cache_dir: std::env::var("EMOJIDAY_CACHE_DIR")
                .ok()
                .filter(|v| !v.is_empty())
                .map(PathBuf::from)
                .unwrap_or(defaults.cache_dir),
            offline: env_flag("EMOJIDAY_OFFLINE"),
            debug_html: env_flag("EMOJIDAY_DEBUG_HTML"),
            fetch_timeout: defaults.fetch_timeout,
        }
    }
}

fn env_flag(name: &str) -> bool {
    std::env::var(name)
        .map(|v| matches!(v.trim(), "1" | "true" | "yes" | "on"))
        .unwrap_or(false)
}
