use std::{io, path::PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot open {path:?}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("read error: {0}")]
    Io(#[from] io::Error),

    #[error("file holds {len} bytes, shorter than the texture header")]
    TruncatedHeader { len: u64 },

    #[error("cannot build mipmaps for {width}x{height}: sides must be powers of two")]
    NotPowerOfTwo { width: u16, height: u16 },
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("unsupported texture for export: {0}")]
    Unsupported(String),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("io error: {0}")]
    Io(#[from] io::Error),
}
