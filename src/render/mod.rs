//! Encoder sessions and the operations they record.
//!
//! A [`renderer::Renderer`] binds a device to a pixel layout and caches its programs. Each
//! [`encoder::Encoder`] records fills, composites, gradients and texture draws into batched
//! command buffers on that renderer.

pub(crate) mod batcher;
mod composite;
/// Session façade.
pub mod encoder;
/// Gradient paints.
pub mod gradient;
/// Shape primitives and the stencil fill.
pub mod raster;
/// Texture resampling.
pub mod resample;
/// Renderers and the per-device registry.
pub mod renderer;
pub(crate) mod resources;
