use crate::backend::GraphicsBackend;

/// Number of bytes the payload buffer must hold.
///
/// Only when the file has no mip levels and the backend is asked to build them
/// does the pyramid size win; otherwise the on-disk payload size is used as is.
pub fn payload_buffer_size<B: GraphicsBackend + ?Sized>(
    backend: &B,
    width: u16,
    height: u16,
    has_embedded_mips: bool,
    generate_host_mips: bool,
    payload_size: usize,
) -> usize {
    if !has_embedded_mips && generate_host_mips {
        backend.mip_pyramid_byte_size(width, height)
    } else {
        payload_size
    }
}
