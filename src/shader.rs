//! WGSL shader source loading and compilation.
//!
//! Sources are read from disk so diagnostics can name the file. Compilation
//! runs inside a wgpu validation error scope: an invalid shader surfaces as
//! a [`SetupError::ShaderCompile`] carrying the path and the compiler
//! message instead of a deferred device error.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::SetupError;
use crate::gpu::GpuContext;

/// Shader source text tied to the file it came from.
pub struct ShaderSource {
    path: PathBuf,
    source: String,
}

impl ShaderSource {
    /// Reads WGSL source from the given file path.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SetupError> {
        let path = path.as_ref().to_path_buf();
        let source = fs::read_to_string(&path).map_err(|source| SetupError::Io {
            path: path.clone(),
            source,
        })?;

        Ok(Self { path, source })
    }

    /// Compiles the source into a shader module.
    ///
    /// Validation errors are captured synchronously and reported with the
    /// source path; there is no fallback, the caller aborts setup.
    pub fn compile(&self, gpu: &GpuContext, label: &str) -> Result<wgpu::ShaderModule, SetupError> {
        gpu.device.push_error_scope(wgpu::ErrorFilter::Validation);

        let module = gpu
            .device
            .create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(label),
                source: wgpu::ShaderSource::Wgsl(self.source.as_str().into()),
            });

        if let Some(error) = pollster::block_on(gpu.device.pop_error_scope()) {
            return Err(SetupError::ShaderCompile {
                path: self.path.clone(),
                message: error.to_string(),
            });
        }

        Ok(module)
    }
}
