//! gpraster is a compute-driven vector rasterization and compositing engine.
//!
//! Shapes arrive as triangles and implicit curve spans, are accumulated into a signed
//! supersampled stencil and resolved under a winding rule into a destination layer. Layers
//! composite with Porter-Duff operators and blend modes, and can be painted with gradients or
//! resampled textures. Every operation is a data-parallel kernel launch recorded into batched
//! command buffers:
//!
//! - Pick a device ([`HostDevice`], or `gpu::WgpuDevice` with the `gpu` feature)
//! - Get a [`Renderer`] for a pixel layout from a [`RendererRegistry`]
//! - Open an [`Encoder`] session, record operations, then [`Encoder::commit`]
#![forbid(unsafe_code)]

mod device;
mod foundation;
mod kernels;
mod pipeline;

/// Sessions, renderers and the operations they record.
pub mod render;

pub use crate::device::host::{HostBuffer, HostDevice, HostDeviceOpts};
pub use crate::device::{Backend, CommandBuffer, EncoderKind, WaitMode};
pub use crate::foundation::config::RendererOpts;
pub use crate::foundation::core::{
    Affine, ColorValue, GradientStop, MAX_COMPONENTS, Point, Rect, Vec2,
};
pub use crate::foundation::error::{RasterError, RasterResult};
pub use crate::pipeline::cache::{PipelineCache, PipelineCacheStats};
pub use crate::pipeline::key::{
    BlendMode, CompositingMode, GradientKind, PipelineKey, PrimitiveKind, ResamplingAlgorithm,
    ResamplingKernel, SpreadMode, WindingRule, WrapMode,
};
pub use crate::render::batcher::BatchStats;
pub use crate::render::encoder::{CLIP_COMPONENTS, Encoder, EncoderStats};
pub use crate::render::gradient::GradientPaint;
pub use crate::render::raster::CurvePrimitive;
pub use crate::render::renderer::{Renderer, RendererRegistry};
pub use crate::render::resample::{MAX_LANCZOS_LOBES, Texture};
pub use crate::render::resources::StencilPoolStats;

/// wgpu compute device.
#[cfg(feature = "gpu")]
pub mod gpu {
    pub use crate::device::wgpu::{WgpuBuffer, WgpuDevice, WgpuDeviceOpts, WgpuProgram};
}
