//! Loader for fixed-header PVR texture files.
//!
//! A file is a 32-byte header followed by the texel payload. The header is
//! decoded by [`texture::Header::parse`], the payload buffer is sized by
//! [`sizer::payload_buffer_size`] and [`loader::load_texture`] hands the result
//! to a [`backend::GraphicsBackend`].

pub mod backend;
pub mod error;
pub mod export;
pub mod loader;
pub mod pixel;
pub mod sizer;
pub mod software;
pub mod texture;

pub use backend::{FormatToken, GraphicsBackend, PixelLayout, TextureTarget};
pub use error::{ExportError, LoadError};
pub use loader::{load_texture, load_texture_from, MipOptions};
pub use software::{SoftwareBackend, StoredTexture, TextureId};
pub use texture::{ColorMode, FormatFlags, Header, StorageFormat, HEADER_SIZE};
