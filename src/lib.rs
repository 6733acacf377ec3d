//! Clerestory: a progressive volumetric renderer.
//!
//! A compute pass ray-marches a volume bound inside an axis-aligned box
//! against an HDR environment map, accumulating samples into a float image
//! while the camera holds still, and a post-process pass composites that
//! image to the window every frame.
//!
//! [`run`] with an [`AppConfig`] is the whole public entry point:
//!
//! ```no_run
//! use clerestory::{AppConfig, Volume};
//! use clerestory::glam::Vec3;
//!
//! let config = AppConfig::new()
//!     .title("Clerestory")
//!     .volume(Volume::new(Vec3::splat(-10.0), Vec3::splat(10.0)));
//! clerestory::run(config).unwrap();
//! ```

pub mod accumulation;
pub mod app;
pub mod camera;
pub mod error;
pub mod gpu;
pub mod input;
pub mod mesh;
pub mod post_process;
pub mod shader;
pub mod texture;
pub mod trace_pass;
pub mod transform;
pub mod volume;

pub use accumulation::Accumulator;
pub use app::{AppConfig, run};
pub use camera::Camera;
pub use error::SetupError;
pub use gpu::GpuContext;
pub use input::Input;
pub use mesh::{Mesh, Vertex};
pub use post_process::PostProcessPass;
pub use shader::ShaderSource;
pub use texture::{Texture, TextureKind};
pub use trace_pass::TracePass;
pub use transform::{Space, Transform};
pub use volume::Volume;

pub use glam;
pub use winit;
