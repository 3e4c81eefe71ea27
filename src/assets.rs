//! On-disk glyph asset cache with lazy remote fetch.
//!
//! Entries live at `{cache_dir}/{canonical key}.svg` and are never evicted;
//! a given key always maps to byte-identical content, so concurrent writers
//! cannot corrupt the cache. Resolution is best-effort: every failure mode
//! degrades to `None` and the caller falls back to font-rendered glyphs.

use std::path::PathBuf;

use crate::{config::Config, model::Glyph, normalize::canonical_key};

/// Vector artwork for one glyph, as fetched from the asset CDN.
#[derive(Clone, Debug)]
pub struct VectorAsset {
    pub key: String,
    pub content: Vec<u8>,
    pub path: PathBuf,
}

pub struct AssetStore {
    base_url: String,
    cache_dir: PathBuf,
    offline: bool,
    agent: ureq::Agent,
    fetched: u64,
}

impl AssetStore {
    pub fn new(config: &Config) -> Self {
        let agent_config = ureq::Agent::config_builder()
            .timeout_global(Some(config.fetch_timeout))
            .build();
        Self {
            base_url: config.asset_base_url.trim_end_matches('/').to_string(),
            cache_dir: config.cache_dir.clone(),
            offline: config.offline,
            agent: agent_config.into(),
            fetched: 0,
        }
    }

    /// Number of completed remote fetches performed by this store.
    pub fn fetch_count(&self) -> u64 {
        self.fetched
    }

    /// Resolve a glyph to its vector asset, from cache or the network.
    ///
    /// Cache hits never touch the network. Any miss in offline mode, and any
    /// fetch error, returns `None` after logging; callers render the glyph
    /// via a font instead.
    pub fn resolve(&mut self, glyph: &Glyph) -> Option<VectorAsset> {
        let key = canonical_key(&glyph.char);
        if key.is_empty() {
            tracing::warn!(glyph = %glyph.char, "glyph has no resolvable code points");
            return None;
        }

        let path = self.cache_dir.join(format!("{key}.svg"));
        match std::fs::read(&path) {
            Ok(content) => {
                tracing::debug!(%key, "glyph asset cache hit");
                return Some(VectorAsset { key, content, path });
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
            Err(err) => {
                tracing::warn!(%key, %err, "glyph asset cache entry unreadable");
            }
        }

        if self.offline {
            tracing::debug!(%key, "offline mode, skipping glyph asset fetch");
            return None;
        }

        let url = format!("{}/{key}.svg", self.base_url);
        let content = match self.fetch(&url) {
            Ok(content) => content,
            Err(err) => {
                tracing::warn!(%key, %url, %err, "glyph asset fetch failed");
                return None;
            }
        };
        self.fetched += 1;

        // Persist for future runs. A racing process writing the same key is
        // harmless: content is byte-identical by construction.
        if let Err(err) = std::fs::create_dir_all(&self.cache_dir)
            .and_then(|()| std::fs::write(&path, &content))
        {
            tracing::warn!(%key, %err, "failed to persist glyph asset");
        }

        Some(VectorAsset { key, content, path })
    }

    fn fetch(&self, url: &str) -> anyhow::Result<Vec<u8>> {
        let mut response = self.agent.get(url).call()?;
        let bytes = response.body_mut().read_to_vec()?;
        Ok(bytes)
    }
}

impl std::fmt::Debug for AssetStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssetStore")
            .field("base_url", &self.base_url)
            .field("cache_dir", &self.cache_dir)
            .field("offline", &self.offline)
            .field("fetched", &self.fetched)
            .finish_non_exhaustive()
    }
}
