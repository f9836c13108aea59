use bitflags::bitflags;

/// Size of the fixed PVR header. The payload starts right after it.
pub const HEADER_SIZE: usize = 0x20;

const COLOR_OFFSET: usize = HEADER_SIZE - 8;
const STORAGE_OFFSET: usize = HEADER_SIZE - 7;
const WIDTH_OFFSET: usize = HEADER_SIZE - 4;
const HEIGHT_OFFSET: usize = HEADER_SIZE - 2;

/// Pixel color encoding, as stored at `HEADER_SIZE - 8`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorMode {
    /// ARGB1555, bi-level translucent alpha.
    Argb1555 = 0,
    /// Non-translucent RGB565.
    Rgb565 = 1,
    /// ARGB4444, translucent alpha.
    Argb4444 = 2,
    /// Non-translucent UYVY.
    Yuv422 = 3,
    Bump = 4,
    Pal4bpp = 5,
    Pal8bpp = 6,
}

impl ColorMode {
    /// Unknown codes fall back to RGB565.
    pub fn from_code(code: u8) -> Self {
        match code {
            0x00 => ColorMode::Argb1555,
            0x01 => ColorMode::Rgb565,
            0x02 => ColorMode::Argb4444,
            0x03 => ColorMode::Yuv422,
            0x04 => ColorMode::Bump,
            0x05 => ColorMode::Pal4bpp,
            0x06 => ColorMode::Pal8bpp,
            _ => ColorMode::Rgb565,
        }
    }

    /// Color bits of the rasterizer's texture format word.
    pub fn token(self) -> u32 {
        (self as u32) << 27
    }

    /// Whether texels are 16-bit direct color values.
    pub fn is_direct_16bpp(self) -> bool {
        matches!(
            self,
            ColorMode::Argb1555 | ColorMode::Rgb565 | ColorMode::Argb4444
        )
    }
}

bitflags! {
    /// Storage bits of the rasterizer's texture format word.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct FormatFlags: u32 {
        const STRIDE = 1 << 21;
        const NON_TWIDDLED = 1 << 26;
        const VQ_ENABLE = 1 << 30;
    }
}

/// Texel storage layout, as stored at `HEADER_SIZE - 7`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageFormat {
    Twiddled,
    VectorQuantized,
    NonTwiddled,
    StridedNonTwiddled,
    VectorQuantizedNonTwiddled,
    None,
}

impl StorageFormat {
    /// Unknown codes fall back to `None`.
    pub fn from_code(code: u8) -> Self {
        match code {
            // square twiddled
            0x01 => StorageFormat::Twiddled,
            // VQ twiddled
            0x03 => StorageFormat::VectorQuantized,
            // rectangle
            0x09 => StorageFormat::NonTwiddled,
            // rectangular stride
            0x0b => StorageFormat::StridedNonTwiddled,
            // rectangular twiddled
            0x0d => StorageFormat::Twiddled,
            // small VQ
            0x10 => StorageFormat::VectorQuantizedNonTwiddled,
            _ => StorageFormat::None,
        }
    }

    pub fn flags(self) -> FormatFlags {
        match self {
            StorageFormat::Twiddled | StorageFormat::None => FormatFlags::empty(),
            StorageFormat::VectorQuantized => FormatFlags::VQ_ENABLE,
            StorageFormat::NonTwiddled => FormatFlags::NON_TWIDDLED,
            StorageFormat::StridedNonTwiddled => FormatFlags::STRIDE | FormatFlags::NON_TWIDDLED,
            StorageFormat::VectorQuantizedNonTwiddled => {
                FormatFlags::VQ_ENABLE | FormatFlags::NON_TWIDDLED
            }
        }
    }

    pub fn token(self) -> u32 {
        self.flags().bits()
    }

    pub fn is_vector_quantized(self) -> bool {
        self.flags().contains(FormatFlags::VQ_ENABLE)
    }

    pub fn is_twiddled(self) -> bool {
        !self.flags().contains(FormatFlags::NON_TWIDDLED)
    }
}

/// Decoded header fields. Everything else in the 32 bytes is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Header {
    pub color: ColorMode,
    pub format: StorageFormat,
    pub width: u16,
    pub height: u16,
}

impl Header {
    /// Decodes a raw header. Never fails: unknown codes map to defaults.
    pub fn parse(buf: &[u8; HEADER_SIZE]) -> Self {
        Header {
            color: ColorMode::from_code(buf[COLOR_OFFSET]),
            format: StorageFormat::from_code(buf[STORAGE_OFFSET]),
            width: u16::from_le_bytes([buf[WIDTH_OFFSET], buf[WIDTH_OFFSET + 1]]),
            height: u16::from_le_bytes([buf[HEIGHT_OFFSET], buf[HEIGHT_OFFSET + 1]]),
        }
    }

    /// `(StorageFormat | ColorMode)`, the combined texture format word.
    pub fn format_token(&self) -> u32 {
        self.format.token() | self.color.token()
    }
}

#[cfg(test)]
pub(crate) fn build_header(color: u8, format: u8, width: u16, height: u16) -> [u8; HEADER_SIZE] {
    let mut buf = [0u8; HEADER_SIZE];
    buf[..4].copy_from_slice(b"GBIX");
    buf[16..20].copy_from_slice(b"PVRT");
    buf[COLOR_OFFSET] = color;
    buf[STORAGE_OFFSET] = format;
    buf[WIDTH_OFFSET..WIDTH_OFFSET + 2].copy_from_slice(&width.to_le_bytes());
    buf[HEIGHT_OFFSET..HEIGHT_OFFSET + 2].copy_from_slice(&height.to_le_bytes());
    buf
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_codes_follow_table() {
        let expected = [
            ColorMode::Argb1555,
            ColorMode::Rgb565,
            ColorMode::Argb4444,
            ColorMode::Yuv422,
            ColorMode::Bump,
            ColorMode::Pal4bpp,
            ColorMode::Pal8bpp,
        ];
        for (code, mode) in expected.iter().enumerate() {
            let header = Header::parse(&build_header(code as u8, 0x01, 8, 8));
            assert_eq!(header.color, *mode);
        }
    }

    #[test]
    fn unknown_color_code_is_rgb565() {
        for code in 0x07..=0xffu8 {
            assert_eq!(ColorMode::from_code(code), ColorMode::Rgb565);
        }
    }

    #[test]
    fn storage_codes_follow_table() {
        let table = [
            (0x01, StorageFormat::Twiddled),
            (0x03, StorageFormat::VectorQuantized),
            (0x09, StorageFormat::NonTwiddled),
            (0x0b, StorageFormat::StridedNonTwiddled),
            (0x0d, StorageFormat::Twiddled),
            (0x10, StorageFormat::VectorQuantizedNonTwiddled),
        ];
        for &(code, format) in table.iter() {
            let header = Header::parse(&build_header(0x01, code, 8, 8));
            assert_eq!(header.format, format);
        }
    }

    #[test]
    fn unknown_storage_code_is_none() {
        let known = [0x01u8, 0x03, 0x09, 0x0b, 0x0d, 0x10];
        for code in 0..=0xffu8 {
            if !known.contains(&code) {
                assert_eq!(StorageFormat::from_code(code), StorageFormat::None);
            }
        }
    }

    #[test]
    fn dimensions_are_little_endian() {
        let mut buf = [0u8; HEADER_SIZE];
        buf[HEADER_SIZE - 4] = 0x00;
        buf[HEADER_SIZE - 3] = 0x01;
        buf[HEADER_SIZE - 2] = 0x40;
        buf[HEADER_SIZE - 1] = 0x00;
        let header = Header::parse(&buf);
        assert_eq!(header.width, 256);
        assert_eq!(header.height, 64);
    }

    #[test]
    fn composite_formats_keep_both_flags() {
        let strided = StorageFormat::StridedNonTwiddled.flags();
        assert!(strided.contains(FormatFlags::STRIDE | FormatFlags::NON_TWIDDLED));
        let small_vq = StorageFormat::VectorQuantizedNonTwiddled;
        assert!(small_vq.is_vector_quantized());
        assert!(!small_vq.is_twiddled());
    }

    #[test]
    fn format_token_combines_storage_and_color() {
        let header = Header::parse(&build_header(0x02, 0x03, 16, 16));
        assert_eq!(header.format_token(), (1 << 30) | (2 << 27));
        let header = Header::parse(&build_header(0x01, 0x09, 16, 16));
        assert_eq!(header.format_token(), (1 << 26) | (1 << 27));
    }

    #[test]
    fn parse_is_pure() {
        let buf = build_header(0x04, 0x0b, 320, 240);
        assert_eq!(Header::parse(&buf), Header::parse(&buf));
    }
}
