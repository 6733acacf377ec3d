//! Setup-time error kinds.
//!
//! Everything that can fail does so during initialization: window and device
//! creation, asset decoding, shader compilation. Once the render loop is
//! running no fallible operation remains, so there is no runtime error class.
//! Library code never terminates the process; the binary decides what a
//! `SetupError` means (it aborts).

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SetupError {
    #[error("failed to create window: {0}")]
    Window(#[from] winit::error::OsError),

    #[error("failed to create rendering surface: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),

    #[error("no suitable GPU adapter: {0}")]
    Adapter(#[from] wgpu::RequestAdapterError),

    #[error("failed to create GPU device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),

    #[error("could not read `{}`: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("could not decode image `{}`: {source}", path.display())]
    Image {
        path: PathBuf,
        source: image::ImageError,
    },

    #[error("shader `{}` failed to compile: {message}", path.display())]
    ShaderCompile { path: PathBuf, message: String },

    #[error("event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),
}
