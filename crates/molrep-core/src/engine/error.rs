use thiserror::Error;

use crate::core::represent::BuildError;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("Failed to encode artifact '{path}': {source}")]
    Encode {
        path: String,
        source: bincode::Error,
    },

    #[error("Failed to decode artifact '{path}': {source}")]
    Decode {
        path: String,
        source: bincode::Error,
    },

    #[error(
        "Cache at '{path}' was built with hooks '{stored}' but '{requested}' was requested; \
         use matching hooks or a different directory"
    )]
    InconsistentCache {
        path: String,
        stored: String,
        requested: String,
    },

    #[error("Item index {index} is out of range for a dataset of {len} items")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Representation build failed: {source}")]
    Build {
        #[from]
        source: BuildError,
    },
}
