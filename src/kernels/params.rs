//! Parameter blocks uploaded with each dispatch.
//!
//! Every field is a 4-byte scalar so a block is a flat run of words; device programs read
//! fields by word index.

use bytemuck::{Pod, Zeroable};

use crate::foundation::core::{Affine, MAX_COMPONENTS};
use crate::pipeline::key::PipelineKey;

/// Row-major `[a, b, c, d, e, f]` of an affine map, narrowed to `f32`.
pub(crate) fn affine_words(t: Affine) -> [f32; 6] {
    let c = t.as_coeffs();
    [
        c[0] as f32,
        c[1] as f32,
        c[2] as f32,
        c[3] as f32,
        c[4] as f32,
        c[5] as f32,
    ]
}

/// One stencil primitive.
///
/// `p*` keep the caller's vertex order and drive barycentrics. `q*` are the same vertices
/// sorted by `y` and drive the row spans.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub(crate) struct StencilParams {
    pub(crate) p0: [f32; 2],
    pub(crate) p1: [f32; 2],
    pub(crate) p2: [f32; 2],
    pub(crate) v0: [f32; 3],
    pub(crate) v1: [f32; 3],
    pub(crate) v2: [f32; 3],
    pub(crate) winding: i32,
    pub(crate) width: u32,
    pub(crate) height: u32,
    pub(crate) y_start: u32,
    pub(crate) q0: [f32; 2],
    pub(crate) q1: [f32; 2],
    pub(crate) q2: [f32; 2],
}

#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub(crate) struct FillParams {
    pub(crate) color: [f32; MAX_COMPONENTS],
    pub(crate) offset: [u32; 2],
    pub(crate) width: u32,
    pub(crate) antialias: u32,
}

#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub(crate) struct LayerParams {
    pub(crate) width: u32,
    pub(crate) height: u32,
    pub(crate) opacity: f32,
    pub(crate) reserved: u32,
}

#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub(crate) struct GradientParams {
    /// Inverse of the gradient transform.
    pub(crate) inverse: [f32; 6],
    pub(crate) start: [f32; 2],
    pub(crate) end: [f32; 2],
    pub(crate) start_radius: f32,
    pub(crate) end_radius: f32,
    pub(crate) stop_count: u32,
    pub(crate) width: u32,
}

/// Floats per uploaded gradient stop: offset then a full color block.
pub(crate) const STOP_WORDS: usize = 1 + MAX_COMPONENTS;

#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub(crate) struct ResampleParams {
    /// Inverse of the texture transform.
    pub(crate) inverse: [f32; 6],
    pub(crate) src_width: u32,
    pub(crate) src_height: u32,
    pub(crate) width: u32,
    pub(crate) antialias: u32,
    /// Hermite tension, Mitchell B.
    pub(crate) a: f32,
    /// Hermite bias, Mitchell C.
    pub(crate) b: f32,
    /// Lanczos lobes.
    pub(crate) lobes: u32,
    pub(crate) reserved: u32,
}

#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub(crate) struct ShadowParams {
    pub(crate) color: [f32; MAX_COMPONENTS],
    pub(crate) offset: [f32; 2],
    pub(crate) sigma: f32,
    pub(crate) radius: u32,
    pub(crate) width: u32,
    pub(crate) height: u32,
}

/// Whether `params` is long enough for the block `key` reads.
pub(crate) fn params_fit(key: PipelineKey, params: &[u8]) -> bool {
    let need = match key {
        PipelineKey::Stencil(_) => size_of::<StencilParams>(),
        PipelineKey::Fill { .. } => size_of::<FillParams>(),
        PipelineKey::Blend { .. } | PipelineKey::SetOpacity | PipelineKey::Clip => {
            size_of::<LayerParams>()
        }
        PipelineKey::Gradient { .. } => size_of::<GradientParams>(),
        PipelineKey::Resample { .. } => size_of::<ResampleParams>(),
        PipelineKey::Shadow => size_of::<ShadowParams>(),
    };
    params.len() >= need
}

/// Decode a parameter block recorded with a dispatch.
pub(crate) fn read_params<P: Pod>(bytes: &[u8]) -> Option<P> {
    (bytes.len() >= std::mem::size_of::<P>())
        .then(|| bytemuck::pod_read_unaligned(&bytes[..std::mem::size_of::<P>()]))
}
