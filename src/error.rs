use std::{path::PathBuf, time::Duration};

pub type EmojidayResult<T> = Result<T, EmojidayError>;

#[derive(thiserror::Error, Debug)]
pub enum EmojidayError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("asset error: {0}")]
    Asset(String),

    #[error("render error: {0}")]
    Render(String),

    #[error("serialization error: {0}")]
    Serde(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl EmojidayError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn asset(msg: impl Into<String>) -> Self {
        Self::Asset(msg.into())
    }

    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

/// Failure of a single backend attempt.
///
/// Every variant is recoverable from the chain driver's point of view: it is
/// logged and the next backend in priority order is tried. Only exhausting
/// the whole chain becomes an [`EmojidayError`].
#[derive(thiserror::Error, Debug)]
pub enum BackendError {
    #[error("backend is not supported on this platform")]
    PlatformUnsupported,

    #[error("required binary '{0}' was not found")]
    BinaryMissing(String),

    #[error("failed to spawn '{binary}': {message}")]
    Spawn { binary: String, message: String },

    #[error("'{binary}' exited with {status}: {stderr}")]
    Subprocess {
        binary: String,
        status: String,
        stderr: String,
    },

    #[error("'{0}' did not finish within {1:?}")]
    Timeout(String, Duration),

    #[error("no usable text font found on this system")]
    MissingFont,

    #[error("backend reported success but left no output at '{}'", .0.display())]
    OutputMissing(PathBuf),

    #[error("raster error: {0}")]
    Raster(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_prefixes_are_stable() {
        assert!(
            EmojidayError::validation("x")
                .to_string()
                .contains("validation error:")
        );
        assert!(EmojidayError::asset("x").to_string().contains("asset error:"));
        assert!(
            EmojidayError::render("x")
                .to_string()
                .contains("render error:")
        );
        assert!(
            EmojidayError::serde("x")
                .to_string()
                .contains("serialization error:")
        );
    }

    #[test]
    fn other_preserves_source() {
        let base = std::io::Error::other("boom");
        let err = EmojidayError::Other(anyhow::Error::new(base));
        assert!(err.to_string().contains("boom"));
    }

    #[test]
    fn backend_error_names_the_binary() {
        let err = BackendError::Subprocess {
            binary: "magick".to_string(),
            status: "exit status: 1".to_string(),
            stderr: "no fonts".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("magick"));
        assert!(msg.contains("no fonts"));
    }
}
