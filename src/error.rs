use std::path::PathBuf;

use crate::id::TextureId;

/// Errors produced while configuring, mounting or rendering a gallery.
#[derive(Debug, thiserror::Error)]
pub enum GalleryError {
    /// No graphics adapter could be acquired. The gallery falls back to the CPU renderer.
    #[error("no compatible graphics adapter: {0}")]
    AdapterUnavailable(String),
    /// The window could not back a wgpu surface.
    #[error("failed to create a rendering surface: {0}")]
    SurfaceCreation(String),
    /// The adapter refused to hand out a device.
    #[error("failed to request a graphics device: {0}")]
    DeviceRequest(String),
    /// Acquiring the next surface texture failed.
    #[error("surface error: {0}")]
    Surface(#[from] wgpu::SurfaceError),
    /// A texture id was used before it was allocated.
    #[error("texture {0} has not been allocated")]
    TextureNotFound(TextureId),
    /// An image file could not be read or decoded.
    #[error("failed to decode image {path}: {source}")]
    ImageDecode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    /// The CPU fallback could not present its frame. Kept as text so the error stays `Send`.
    #[error("failed to present fallback frame: {0}")]
    Presentation(String),
    /// A rendered frame could not be copied back from the GPU.
    #[error("failed to read back the rendered frame: {0}")]
    Readback(String),
    #[error("invalid color {0:?}")]
    InvalidColor(String),
    #[error("invalid font {0:?}, expected CSS shorthand like \"bold 30px Figtree\"")]
    InvalidFont(String),
    #[error("invalid gallery configuration: {0}")]
    InvalidConfig(String),
}

impl From<softbuffer::SoftBufferError> for GalleryError {
    fn from(error: softbuffer::SoftBufferError) -> Self {
        Self::Presentation(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;

    fn assert_send_sync<T: Send + Sync + 'static>() {}

    #[test]
    fn errors_cross_threads() {
        assert_send_sync::<GalleryError>();

        let handle = thread::spawn(|| GalleryError::Presentation("surface lost".to_string()));
        let error = handle.join().unwrap();
        assert_eq!(
            error.to_string(),
            "failed to present fallback frame: surface lost"
        );
    }
}
