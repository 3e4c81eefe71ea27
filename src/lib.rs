#![forbid(unsafe_code)]

pub mod assets;
pub mod config;
pub mod error;
pub mod layout;
pub mod model;
pub mod normalize;
pub mod output;
pub mod render;

pub use assets::{AssetStore, VectorAsset};
pub use config::Config;
pub use error::{BackendError, EmojidayError, EmojidayResult};
pub use layout::{CANVAS_SIZE, GLYPHS_PER_ROW, LayoutPlan, SUPERSAMPLE, compute_layout};
pub use model::{Glyph, RenderMode, RenderRequest};
pub use normalize::canonical_key;
pub use output::{downscale_to_canvas, output_file_name};
pub use render::{
    RenderBackend, RenderOutcome, default_backends, render_request, render_with_backends,
};
