use std::{
    fs::File,
    io::{Read, Seek, SeekFrom},
    path::Path,
};

use tracing::{debug, warn};

use crate::backend::{GraphicsBackend, PixelLayout, TextureTarget};
use crate::error::LoadError;
use crate::sizer::payload_buffer_size;
use crate::texture::{Header, HEADER_SIZE};

/// Mip level handling for one load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MipOptions {
    /// The file already stores its mip levels after the base level.
    pub has_embedded_mips: bool,
    /// The backend should build the mip levels from the base level.
    pub generate_host_mips: bool,
}

impl MipOptions {
    fn builds_host_mips(self) -> bool {
        !self.has_embedded_mips && self.generate_host_mips
    }

    fn mip_level(self) -> u32 {
        if self.has_embedded_mips || self.generate_host_mips {
            1
        } else {
            0
        }
    }
}

/// Opens `path` and uploads the texture it holds to `backend`.
pub fn load_texture<B: GraphicsBackend>(
    backend: &mut B,
    path: impl AsRef<Path>,
    options: MipOptions,
) -> Result<B::Handle, LoadError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| LoadError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    debug!("loading {:?}", path);
    load_texture_from(backend, file, options)
}

/// Same as [`load_texture`] over any seekable source.
///
/// The texture is left bound on `backend` when this returns.
pub fn load_texture_from<B, R>(
    backend: &mut B,
    mut reader: R,
    options: MipOptions,
) -> Result<B::Handle, LoadError>
where
    B: GraphicsBackend,
    R: Read + Seek,
{
    let len = reader.seek(SeekFrom::End(0))?;
    if len < HEADER_SIZE as u64 {
        return Err(LoadError::TruncatedHeader { len });
    }
    let payload_size = (len - HEADER_SIZE as u64) as usize;
    reader.seek(SeekFrom::Start(0))?;

    let mut raw = [0u8; HEADER_SIZE];
    reader.read_exact(&mut raw)?;
    let header = Header::parse(&raw);
    debug!(
        "header {:?} {:?} {}x{}, payload {} bytes",
        header.color, header.format, header.width, header.height, payload_size
    );

    if options.builds_host_mips()
        && !(header.width.is_power_of_two() && header.height.is_power_of_two())
    {
        return Err(LoadError::NotPowerOfTwo {
            width: header.width,
            height: header.height,
        });
    }

    let mut size = payload_buffer_size(
        &*backend,
        header.width,
        header.height,
        options.has_embedded_mips,
        options.generate_host_mips,
        payload_size,
    );
    if size < payload_size {
        warn!(
            "mip pyramid of {} bytes is smaller than the {} byte payload",
            size, payload_size
        );
        size = payload_size;
    }

    // bytes past the payload are filled by mipmap generation
    let mut buf = vec![0u8; size];
    reader.read_exact(&mut buf[..payload_size])?;

    let target = TextureTarget::Texture2D;
    if options.builds_host_mips() {
        if header.format.is_twiddled() {
            warn!("building mipmaps over twiddled {:?} texels", header.color);
        }
        backend.build_host_mipmaps(
            target,
            header.width,
            header.height,
            PixelLayout::Rgb,
            header.color,
            &mut buf,
        );
    }

    let handle = backend.create_texture_handle();
    backend.bind_texture(target, handle);

    let mip_level = options.mip_level();
    if header.format.is_vector_quantized() {
        backend.upload_compressed(
            target,
            mip_level,
            header.format_token(),
            header.width,
            header.height,
            &buf,
        );
    } else {
        backend.upload_raw(
            target,
            mip_level,
            PixelLayout::Rgb,
            header.width,
            header.height,
            header.format_token(),
            &buf,
        );
    }

    Ok(handle)
}
