//! In-memory backend that keeps every upload, used by the CLI and tests.

use std::collections::HashMap;

use image::{imageops, imageops::FilterType, RgbaImage};
use tracing::{debug, warn};

use crate::backend::{FormatToken, GraphicsBackend, PixelLayout, TextureTarget};
use crate::pixel::{decode_rgba, encode_rgba, BYTES_PER_TEXEL};
use crate::texture::ColorMode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadKind {
    Compressed,
    Raw(PixelLayout),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    pub kind: UploadKind,
    pub mip_level: u32,
    pub format: FormatToken,
    pub width: u16,
    pub height: u16,
}

#[derive(Debug, Clone)]
pub struct StoredTexture {
    pub upload: Upload,
    pub data: Vec<u8>,
}

fn level_sizes(width: u16, height: u16) -> impl Iterator<Item = (u32, u32)> {
    let mut next = Some((u32::from(width).max(1), u32::from(height).max(1)));
    std::iter::from_fn(move || {
        let (w, h) = next?;
        next = if w == 1 && h == 1 {
            None
        } else {
            Some(((w / 2).max(1), (h / 2).max(1)))
        };
        Some((w, h))
    })
}

#[derive(Debug, Default)]
pub struct SoftwareBackend {
    next_id: u32,
    bound: Option<TextureId>,
    textures: HashMap<TextureId, StoredTexture>,
}

impl SoftwareBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bound(&self) -> Option<TextureId> {
        self.bound
    }

    pub fn texture(&self, id: TextureId) -> Option<&StoredTexture> {
        self.textures.get(&id)
    }

    fn store(&mut self, upload: Upload, data: &[u8]) {
        match self.bound {
            Some(id) => {
                self.textures.insert(
                    id,
                    StoredTexture {
                        upload,
                        data: data.to_vec(),
                    },
                );
            }
            None => warn!("upload with no texture bound, ignored"),
        }
    }
}

impl GraphicsBackend for SoftwareBackend {
    type Handle = TextureId;

    fn create_texture_handle(&mut self) -> TextureId {
        self.next_id += 1;
        TextureId(self.next_id)
    }

    fn bind_texture(&mut self, _target: TextureTarget, handle: TextureId) {
        self.bound = Some(handle);
    }

    fn upload_compressed(
        &mut self,
        _target: TextureTarget,
        mip_level: u32,
        format: FormatToken,
        width: u16,
        height: u16,
        data: &[u8],
    ) {
        let upload = Upload {
            kind: UploadKind::Compressed,
            mip_level,
            format,
            width,
            height,
        };
        self.store(upload, data);
    }

    fn upload_raw(
        &mut self,
        _target: TextureTarget,
        mip_level: u32,
        layout: PixelLayout,
        width: u16,
        height: u16,
        source_format: FormatToken,
        data: &[u8],
    ) {
        let upload = Upload {
            kind: UploadKind::Raw(layout),
            mip_level,
            format: source_format,
            width,
            height,
        };
        self.store(upload, data);
    }

    fn build_host_mipmaps(
        &mut self,
        _target: TextureTarget,
        width: u16,
        height: u16,
        _layout: PixelLayout,
        source_format: ColorMode,
        data: &mut [u8],
    ) {
        if width == 0 || height == 0 {
            warn!("cannot build mipmaps for an empty {}x{} texture", width, height);
            return;
        }
        if !source_format.is_direct_16bpp() {
            warn!("cannot build mipmaps for {:?} texels", source_format);
            return;
        }
        let needed = self.mip_pyramid_byte_size(width, height);
        if data.len() < needed {
            warn!("mipmap buffer holds {} bytes, {} needed", data.len(), needed);
            return;
        }

        let (w, h) = (u32::from(width), u32::from(height));
        let base_len = (w * h) as usize * BYTES_PER_TEXEL;
        let base = match decode_rgba(&data[..base_len], source_format)
            .and_then(|rgba| RgbaImage::from_raw(w, h, rgba))
        {
            Some(base) => base,
            None => {
                warn!("cannot decode {}x{} base level, mipmaps skipped", width, height);
                return;
            }
        };

        let mut offset = base_len;
        for (lw, lh) in level_sizes(width, height).skip(1) {
            let level = imageops::resize(&base, lw, lh, FilterType::Triangle);
            let len = (lw * lh) as usize * BYTES_PER_TEXEL;
            encode_rgba(level.as_raw(), source_format, &mut data[offset..offset + len]);
            debug!("built mip level {}x{} at offset {}", lw, lh, offset);
            offset += len;
        }
    }

    fn mip_pyramid_byte_size(&self, width: u16, height: u16) -> usize {
        level_sizes(width, height)
            .map(|(w, h)| (w * h) as usize * BYTES_PER_TEXEL)
            .sum()
    }
}
