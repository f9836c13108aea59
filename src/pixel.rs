//! 16-bit texel codecs and twiddled order conversion.

use crate::texture::ColorMode;

pub const BYTES_PER_TEXEL: usize = 2;

fn expand(value: u16, bits: u32) -> u8 {
    let max = (1u32 << bits) - 1;
    (u32::from(value) * 255 / max) as u8
}

fn shrink(value: u8, bits: u32) -> u16 {
    let max = (1u32 << bits) - 1;
    ((u32::from(value) * max + 127) / 255) as u16
}

pub fn decode_texel(color: u16, mode: ColorMode) -> Option<[u8; 4]> {
    let rgba = match mode {
        ColorMode::Rgb565 => {
            let r = (color & 0xf800) >> 11;
            let g = (color & 0x07e0) >> 5;
            let b = color & 0x1f;
            [expand(r, 5), expand(g, 6), expand(b, 5), 255]
        }
        ColorMode::Argb1555 => {
            let a = (color & 0x8000) >> 15;
            let r = (color & 0x7c00) >> 10;
            let g = (color & 0x03e0) >> 5;
            let b = color & 0x1f;
            [expand(r, 5), expand(g, 5), expand(b, 5), expand(a, 1)]
        }
        ColorMode::Argb4444 => {
            let a = (color & 0xf000) >> 12;
            let r = (color & 0xf00) >> 8;
            let g = (color & 0xf0) >> 4;
            let b = color & 0xf;
            [expand(r, 4), expand(g, 4), expand(b, 4), expand(a, 4)]
        }
        _ => return None,
    };
    Some(rgba)
}

pub fn encode_texel(rgba: [u8; 4], mode: ColorMode) -> Option<u16> {
    let [r, g, b, a] = rgba;
    let color = match mode {
        ColorMode::Rgb565 => (shrink(r, 5) << 11) | (shrink(g, 6) << 5) | shrink(b, 5),
        ColorMode::Argb1555 => {
            (shrink(a, 1) << 15) | (shrink(r, 5) << 10) | (shrink(g, 5) << 5) | shrink(b, 5)
        }
        ColorMode::Argb4444 => {
            (shrink(a, 4) << 12) | (shrink(r, 4) << 8) | (shrink(g, 4) << 4) | shrink(b, 4)
        }
        _ => return None,
    };
    Some(color)
}

/// Decodes little-endian 16-bit texels into RGBA8.
pub fn decode_rgba(buf: &[u8], mode: ColorMode) -> Option<Vec<u8>> {
    let mut rgba = Vec::with_capacity(buf.len() * 2);
    for texel in buf.chunks_exact(BYTES_PER_TEXEL) {
        let color = u16::from_le_bytes([texel[0], texel[1]]);
        rgba.extend_from_slice(&decode_texel(color, mode)?);
    }
    Some(rgba)
}

/// Encodes RGBA8 into little-endian 16-bit texels written to `out`.
pub fn encode_rgba(rgba: &[u8], mode: ColorMode, out: &mut [u8]) -> Option<()> {
    for (pixel, texel) in rgba.chunks_exact(4).zip(out.chunks_exact_mut(BYTES_PER_TEXEL)) {
        let color = encode_texel([pixel[0], pixel[1], pixel[2], pixel[3]], mode)?;
        texel.copy_from_slice(&color.to_le_bytes());
    }
    Some(())
}

// x in the odd bits, y in the even bits
fn morton(x: u32, y: u32) -> usize {
    let mut index = 0usize;
    for bit in 0..16 {
        index |= (((y >> bit) & 1) as usize) << (2 * bit);
        index |= (((x >> bit) & 1) as usize) << (2 * bit + 1);
    }
    index
}

/// Position of texel `(x, y)` in a twiddled `width` x `height` texture.
///
/// Rectangles are a row (or column) of square twiddled blocks whose side is
/// the shorter dimension.
pub fn twiddled_index(x: u32, y: u32, width: u32, height: u32) -> usize {
    let side = width.min(height).max(1);
    let block_len = (side * side) as usize;
    if width >= height {
        (x / side) as usize * block_len + morton(x % side, y)
    } else {
        (y / side) as usize * block_len + morton(x, y % side)
    }
}

/// Reorders twiddled texels into row-major order.
pub fn untwiddle(buf: &[u8], width: u32, height: u32, bytes_per_texel: usize) -> Option<Vec<u8>> {
    let count = (width * height) as usize;
    if buf.len() < count * bytes_per_texel {
        return None;
    }
    let mut linear = Vec::with_capacity(count * bytes_per_texel);
    for y in 0..height {
        for x in 0..width {
            let src = twiddled_index(x, y, width, height) * bytes_per_texel;
            linear.extend_from_slice(buf.get(src..src + bytes_per_texel)?);
        }
    }
    Some(linear)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rgb565_extremes() {
        assert_eq!(decode_texel(0xf800, ColorMode::Rgb565), Some([255, 0, 0, 255]));
        assert_eq!(decode_texel(0x07e0, ColorMode::Rgb565), Some([0, 255, 0, 255]));
        assert_eq!(decode_texel(0x001f, ColorMode::Rgb565), Some([0, 0, 255, 255]));
    }

    #[test]
    fn alpha_modes_decode_alpha() {
        assert_eq!(decode_texel(0x0000, ColorMode::Argb1555), Some([0, 0, 0, 0]));
        assert_eq!(decode_texel(0x8000, ColorMode::Argb1555).unwrap()[3], 255);
        assert_eq!(decode_texel(0xf0f0, ColorMode::Argb4444), Some([0, 255, 0, 255]));
    }

    #[test]
    fn palette_modes_are_not_direct() {
        assert_eq!(decode_texel(0x1234, ColorMode::Pal8bpp), None);
        assert_eq!(encode_texel([1, 2, 3, 4], ColorMode::Yuv422), None);
    }

    #[test]
    fn encode_inverts_decode_at_full_precision() {
        for &mode in [ColorMode::Rgb565, ColorMode::Argb1555, ColorMode::Argb4444].iter() {
            for &color in [0x0000u16, 0xffff, 0x8421, 0x7bef].iter() {
                let color = if mode == ColorMode::Rgb565 { color } else { color | 0x8000 };
                let rgba = decode_texel(color, mode).unwrap();
                assert_eq!(encode_texel(rgba, mode), Some(color));
            }
        }
    }

    #[test]
    fn twiddle_goes_down_before_right() {
        assert_eq!(twiddled_index(0, 0, 2, 2), 0);
        assert_eq!(twiddled_index(0, 1, 2, 2), 1);
        assert_eq!(twiddled_index(1, 0, 2, 2), 2);
        assert_eq!(twiddled_index(1, 1, 2, 2), 3);
        assert_eq!(twiddled_index(2, 0, 4, 4), 8);
    }

    #[test]
    fn rectangles_tile_square_blocks() {
        assert_eq!(twiddled_index(2, 0, 4, 2), 4);
        assert_eq!(twiddled_index(0, 2, 2, 4), 4);
    }

    #[test]
    fn untwiddle_2x2() {
        let twiddled = [0u8, 1, 2, 3];
        assert_eq!(untwiddle(&twiddled, 2, 2, 1), Some(vec![0, 2, 1, 3]));
        assert_eq!(untwiddle(&twiddled[..3], 2, 2, 1), None);
    }
}
