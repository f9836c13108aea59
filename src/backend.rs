use crate::texture::ColorMode;

/// Texture binding point. The loader only ever targets 2D textures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureTarget {
    Texture2D,
}

/// Internal layout the backend stores a raw upload in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelLayout {
    Rgb,
}

/// Combined `(StorageFormat | ColorMode)` format word.
pub type FormatToken = u32;

/// What the loader needs from a rasterizer.
///
/// The binding set by `bind_texture` is state of the backend value itself.
/// Loads that share one backend must not interleave between binding and upload.
pub trait GraphicsBackend {
    type Handle: Copy;

    fn create_texture_handle(&mut self) -> Self::Handle;

    fn bind_texture(&mut self, target: TextureTarget, handle: Self::Handle);

    fn upload_compressed(
        &mut self,
        target: TextureTarget,
        mip_level: u32,
        format: FormatToken,
        width: u16,
        height: u16,
        data: &[u8],
    );

    #[allow(clippy::too_many_arguments)]
    fn upload_raw(
        &mut self,
        target: TextureTarget,
        mip_level: u32,
        layout: PixelLayout,
        width: u16,
        height: u16,
        source_format: FormatToken,
        data: &[u8],
    );

    /// Fills the mip levels after level 0 in `data`.
    ///
    /// Only the color mode is passed, so level 0 is read in whatever order the
    /// backend assumes. Twiddled sources are not reordered first.
    fn build_host_mipmaps(
        &mut self,
        target: TextureTarget,
        width: u16,
        height: u16,
        layout: PixelLayout,
        source_format: ColorMode,
        data: &mut [u8],
    );

    /// Bytes needed to hold a full pyramid whose base is `width` x `height`.
    fn mip_pyramid_byte_size(&self, width: u16, height: u16) -> usize;
}
