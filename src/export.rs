use std::path::Path;

use image::{ImageBuffer, RgbaImage};

use crate::error::ExportError;
use crate::pixel::{decode_rgba, untwiddle, BYTES_PER_TEXEL};
use crate::software::StoredTexture;
use crate::texture::{ColorMode, FormatFlags};

/// Converts the base level of a stored texture to RGBA8.
///
/// Storage without the non-twiddled flag, unknown storage codes included, is
/// read as twiddled.
pub fn base_level_rgba(texture: &StoredTexture) -> Result<RgbaImage, ExportError> {
    let upload = &texture.upload;
    let color = ColorMode::from_code(((upload.format >> 27) & 0x7) as u8);
    let flags = FormatFlags::from_bits_truncate(upload.format);
    if flags.contains(FormatFlags::VQ_ENABLE) {
        return Err(ExportError::Unsupported("vector quantized".to_string()));
    }
    if !color.is_direct_16bpp() {
        return Err(ExportError::Unsupported(format!("{:?} texels", color)));
    }

    let (width, height) = (u32::from(upload.width), u32::from(upload.height));
    let base_len = (width * height) as usize * BYTES_PER_TEXEL;
    let base = texture
        .data
        .get(..base_len)
        .ok_or_else(|| ExportError::Unsupported("payload shorter than base level".to_string()))?;

    let linear = if flags.contains(FormatFlags::NON_TWIDDLED) {
        base.to_vec()
    } else {
        untwiddle(base, width, height, BYTES_PER_TEXEL)
            .ok_or_else(|| ExportError::Unsupported("bad twiddled layout".to_string()))?
    };
    let rgba = decode_rgba(&linear, color)
        .ok_or_else(|| ExportError::Unsupported(format!("{:?} texels", color)))?;

    ImageBuffer::from_raw(width, height, rgba)
        .ok_or_else(|| ExportError::Unsupported("pixel count mismatch".to_string()))
}

pub fn save_png(texture: &StoredTexture, path: impl AsRef<Path>) -> Result<(), ExportError> {
    let image = base_level_rgba(texture)?;
    image.save(path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::PixelLayout;
    use crate::software::{Upload, UploadKind};
    use crate::texture::StorageFormat;

    fn stored(format: u32, width: u16, height: u16, data: Vec<u8>) -> StoredTexture {
        StoredTexture {
            upload: Upload {
                kind: UploadKind::Raw(PixelLayout::Rgb),
                mip_level: 0,
                format,
                width,
                height,
            },
            data,
        }
    }

    #[test]
    fn linear_rgb565_decodes_in_order() {
        let mut data = Vec::new();
        data.extend_from_slice(&0xf800u16.to_le_bytes());
        data.extend_from_slice(&0x001fu16.to_le_bytes());
        let image = base_level_rgba(&stored((1 << 26) | (1 << 27), 2, 1, data)).unwrap();
        assert_eq!(image.get_pixel(0, 0).0, [255, 0, 0, 255]);
        assert_eq!(image.get_pixel(1, 0).0, [0, 0, 255, 255]);
    }

    #[test]
    fn twiddled_is_reordered() {
        // twiddled order: (0,0) (0,1) (1,0) (1,1)
        let texels = [0xf800u16, 0x07e0, 0x001f, 0xffff];
        let data = texels.iter().flat_map(|t| t.to_le_bytes().to_vec()).collect();
        let image = base_level_rgba(&stored(1 << 27, 2, 2, data)).unwrap();
        assert_eq!(image.get_pixel(0, 1).0, [0, 255, 0, 255]);
        assert_eq!(image.get_pixel(1, 0).0, [0, 0, 255, 255]);
    }

    #[test]
    fn unknown_storage_reads_as_twiddled() {
        let texels = [0xf800u16, 0x07e0, 0x001f, 0xffff];
        let data = texels.iter().flat_map(|t| t.to_le_bytes().to_vec()).collect();
        let format = StorageFormat::from_code(0x7f).token() | ColorMode::Rgb565.token();
        let image = base_level_rgba(&stored(format, 2, 2, data)).unwrap();
        assert_eq!(image.get_pixel(0, 1).0, [0, 255, 0, 255]);
        assert_eq!(image.get_pixel(1, 0).0, [0, 0, 255, 255]);
    }

    #[test]
    fn vq_and_palette_are_rejected() {
        let vq = stored((1 << 30) | (1 << 27), 2, 2, vec![0; 8]);
        assert!(matches!(base_level_rgba(&vq), Err(ExportError::Unsupported(_))));
        let pal = stored(5 << 27, 2, 2, vec![0; 8]);
        assert!(matches!(base_level_rgba(&pal), Err(ExportError::Unsupported(_))));
    }

    #[test]
    fn writes_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.png");
        save_png(&stored(1 << 26, 4, 4, vec![0xff; 32]), &path).unwrap();
        let decoded = image::open(&path).unwrap();
        let image = decoded.as_rgba8().unwrap();
        assert_eq!(image.dimensions(), (4, 4));
        assert_eq!(image.get_pixel(3, 3).0, [255, 255, 255, 255]);
    }
}
