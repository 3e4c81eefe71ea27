//! Backend strategy chain.
//!
//! Rendering is tried against an ordered slice of [`RenderBackend`]
//! implementations; the first to produce a non-empty output file wins and
//! its frame is handed to the output finalizer. Backend failures are
//! warnings, never fatal: only exhausting the whole chain fails the request.

use std::path::Path;

use crate::{
    assets::AssetStore,
    config::Config,
    error::{BackendError, EmojidayError, EmojidayResult},
    layout::{LayoutPlan, compute_layout},
    model::RenderRequest,
    output,
};

pub mod browser;
pub mod magick;
pub mod native;
mod process;
pub mod raster;

pub use browser::BrowserBackend;
pub use magick::MagickBackend;
pub use native::NativeBackend;
pub use raster::RasterBackend;

/// One concrete rendering strategy.
pub trait RenderBackend {
    fn name(&self) -> &'static str;

    /// Whether this backend renders at [`crate::layout::SUPERSAMPLE`]× and
    /// needs the finalizer's downscale pass.
    fn supersampled(&self) -> bool {
        false
    }

    /// Produce a frame at `out`. Implementations resolve whatever glyph
    /// assets they can use from `store`; unresolvable glyphs degrade to
    /// font rendering inside the backend, not to failure.
    fn attempt(
        &self,
        plan: &LayoutPlan,
        request: &RenderRequest,
        store: &mut AssetStore,
        out: &Path,
    ) -> Result<(), BackendError>;
}

/// Successful render: where the frame landed and which backend made it.
#[derive(Clone, Debug)]
pub struct RenderOutcome {
    pub output_path: std::path::PathBuf,
    pub backend: &'static str,
}

/// The fixed priority order: native OS compositor, headless browser,
/// ImageMagick, pure-raster fallback. Platform gating happens inside each
/// backend so the chain driver stays a plain loop.
pub fn default_backends(config: &Config) -> Vec<Box<dyn RenderBackend>> {
    vec![
        Box::new(NativeBackend),
        Box::new(BrowserBackend::new(config.debug_html)),
        Box::new(MagickBackend),
        Box::new(RasterBackend),
    ]
}

/// Render `request` to `out` using the default backend chain.
pub fn render_request(
    request: &RenderRequest,
    config: &Config,
    out: &Path,
) -> EmojidayResult<RenderOutcome> {
    request.validate()?;
    let plan = compute_layout(request.mode, request.glyphs.len());
    let mut store = AssetStore::new(config);
    let backends = default_backends(config);
    render_with_backends(request, &plan, &mut store, &backends, out)
}

/// Drive the chain: try each backend in order until one leaves a non-empty
/// file at `out`.
#[tracing::instrument(skip_all, fields(mode = ?request.mode, glyphs = request.glyphs.len()))]
pub fn render_with_backends(
    request: &RenderRequest,
    plan: &LayoutPlan,
    store: &mut AssetStore,
    backends: &[Box<dyn RenderBackend>],
    out: &Path,
) -> EmojidayResult<RenderOutcome> {
    output::ensure_parent_dir(out)?;

    for backend in backends {
        match backend.attempt(plan, request, store, out) {
            Ok(()) => {
                if !output_is_plausible(out) {
                    tracing::warn!(
                        backend = backend.name(),
                        "backend reported success but produced no usable file; trying next"
                    );
                    continue;
                }
                if backend.supersampled()
                    && let Err(err) = output::downscale_to_canvas(out, plan.canvas_size)
                {
                    tracing::warn!(backend = backend.name(), %err, "downscale failed; trying next");
                    continue;
                }
                tracing::debug!(backend = backend.name(), out = %out.display(), "render succeeded");
                return Ok(RenderOutcome {
                    output_path: out.to_path_buf(),
                    backend: backend.name(),
                });
            }
            Err(err) => {
                tracing::warn!(backend = backend.name(), %err, "render backend failed; trying next");
            }
        }
    }

    Err(EmojidayError::render(
        "all rendering backends failed for this request",
    ))
}

fn output_is_plausible(out: &Path) -> bool {
    std::fs::metadata(out).map(|m| m.len() > 0).unwrap_or(false)
}
