use crate::device::Backend;
use crate::device::host::{HostDevice, HostDeviceOpts};
use crate::foundation::config::RendererOpts;
use crate::foundation::core::{ColorValue, Vec2};
use crate::foundation::error::RasterError;
use crate::kernels::params::LayerParams;
use crate::pipeline::key::{BlendMode, CompositingMode, PipelineKey};
use crate::render::renderer::{Renderer, RendererRegistry};
use std::sync::Arc;

fn renderer(components: u32) -> Arc<Renderer<HostDevice>> {
    let dev = Arc::new(HostDevice::new(HostDeviceOpts { threads: Some(2) }).unwrap());
    RendererRegistry::new(dev, RendererOpts::default())
        .unwrap()
        .renderer(components)
        .unwrap()
}

const SRC: [f32; 8] = [0.2, 0.4, 0.6, 0.5, 1.0, 0.0, 0.0, 0.25];
const DST: [f32; 8] = [0.0, 0.0, 1.0, 1.0, 0.5, 0.5, 0.5, 0.0];

#[test]
fn copy_fast_path_matches_the_generic_program() {
    let r = renderer(4);
    let mut enc = r.encoder(2, 1).unwrap();
    let src = enc.make_buffer(&SRC).unwrap();
    let fast = enc.make_buffer(&DST).unwrap();
    let generic = enc.make_buffer(&DST).unwrap();

    enc.blend(&src, &fast, None, CompositingMode::Copy, BlendMode::Normal)
        .unwrap();
    let params = LayerParams {
        width: 2,
        height: 1,
        opacity: 1.0,
        reserved: 0,
    };
    let key = PipelineKey::Blend {
        compositing: CompositingMode::Copy,
        blend: BlendMode::Normal,
        clipped: false,
    };
    enc.dispatch(key, &params, &[&src, &generic], [2, 1]).unwrap();
    enc.commit(true).unwrap();

    assert_eq!(r.read_pixels(&fast).unwrap(), r.read_pixels(&generic).unwrap());
    assert_eq!(r.cache_stats().compiles, 1);
}

#[test]
fn clear_without_clip_zero_fills() {
    let r = renderer(4);
    let mut enc = r.encoder(2, 1).unwrap();
    let src = enc.make_buffer(&SRC).unwrap();
    let dst = enc.make_buffer(&DST).unwrap();
    enc.blend(&src, &dst, None, CompositingMode::Clear, BlendMode::Screen)
        .unwrap();
    enc.commit(true).unwrap();
    assert_eq!(r.read_pixels(&dst).unwrap(), vec![0.0; 8]);
    assert_eq!(r.cache_stats().compiles, 0);
}

#[test]
fn identical_buffers_are_a_no_op() {
    let r = renderer(4);
    let mut enc = r.encoder(2, 1).unwrap();
    let buf = enc.make_buffer(&SRC).unwrap();
    enc.blend(&buf, &buf, None, CompositingMode::Xor, BlendMode::Normal)
        .unwrap();
    assert_eq!(enc.stats().batch.requests, 0);
    enc.commit(true).unwrap();
    assert_eq!(r.read_pixels(&buf).unwrap(), SRC.to_vec());
}

#[test]
fn source_over_composites_per_pixel() {
    let r = renderer(4);
    let mut enc = r.encoder(2, 1).unwrap();
    let src = enc.make_buffer(&SRC).unwrap();
    let dst = enc.make_buffer(&DST).unwrap();
    enc.blend(&src, &dst, None, CompositingMode::SourceOver, BlendMode::Normal)
        .unwrap();
    enc.commit(true).unwrap();
    let px = r.read_pixels(&dst).unwrap();

    // Half-transparent source over opaque blue.
    let expect = [0.1, 0.2, 0.8, 1.0];
    for (got, want) in px[..4].iter().zip(expect) {
        assert!((got - want).abs() < 1e-6, "{got} vs {want}");
    }
    // Over a transparent destination the source comes through unchanged.
    assert_eq!(&px[4..8], [1.0, 0.0, 0.0, 0.25]);
}

#[test]
fn clipped_blend_scales_source_alpha() {
    let r = renderer(4);
    let mut enc = r.encoder(2, 1).unwrap();
    let src = enc.make_buffer(&[1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0]).unwrap();
    let dst = enc.alloc_texture().unwrap();
    let mut clip_enc = enc.clip_encoder().unwrap();
    let clip = clip_enc.make_buffer(&[1.0, 1.0, 0.5, 0.5]).unwrap();

    enc.blend(&src, &dst, Some(&clip), CompositingMode::Copy, BlendMode::Normal)
        .unwrap();
    enc.commit(true).unwrap();
    let px = r.read_pixels(&dst).unwrap();
    assert_eq!(px[3], 1.0);
    assert_eq!(px[7], 0.25);
}

#[test]
fn set_opacity_scales_alpha_only() {
    let r = renderer(4);
    let mut enc = r.encoder(2, 1).unwrap();
    let buf = enc.make_buffer(&SRC).unwrap();
    enc.set_opacity(&buf, 1.0).unwrap();
    assert_eq!(enc.stats().batch.requests, 0);
    enc.set_opacity(&buf, 0.5).unwrap();
    assert!(matches!(
        enc.set_opacity(&buf, f32::NAN),
        Err(RasterError::Validation(_))
    ));
    enc.commit(true).unwrap();
    assert_eq!(
        r.read_pixels(&buf).unwrap(),
        vec![0.2, 0.4, 0.6, 0.25, 1.0, 0.0, 0.0, 0.125]
    );
}

#[test]
fn clip_multiplies_alpha_by_coverage() {
    let r = renderer(4);
    let mut enc = r.encoder(2, 1).unwrap();
    let buf = enc.make_buffer(&[1.0; 8]).unwrap();
    let clip = r.backend().upload_buffer(bytemuck::cast_slice(&[0.5f32, 0.5, 1.0, 0.0])).unwrap();
    enc.clip(&buf, &clip).unwrap();
    enc.commit(true).unwrap();
    let px = r.read_pixels(&buf).unwrap();
    assert_eq!(px[3], 0.25);
    assert_eq!(px[7], 0.0);
}

#[test]
fn sharp_shadow_is_an_offset_tinted_copy_of_alpha() {
    let r = renderer(2);
    let mut enc = r.encoder(3, 1).unwrap();
    let src = enc.make_buffer(&[1.0, 1.0, 1.0, 0.5, 1.0, 0.0]).unwrap();
    let dst = enc.alloc_texture().unwrap();
    enc.shadow(
        &src,
        &dst,
        ColorValue::gray(0.0, 0.8),
        Vec2::new(1.0, 0.0),
        0.0,
    )
    .unwrap();
    enc.commit(true).unwrap();
    let px = r.read_pixels(&dst).unwrap();
    assert_eq!(px[1], 0.0);
    assert_eq!(px[3], 0.8);
    assert_eq!(px[5], 0.4);
}

#[test]
fn blurred_shadow_spreads_alpha() {
    let r = renderer(2);
    let mut enc = r.encoder(9, 1).unwrap();
    let mut pixels = vec![0.0; 18];
    pixels[9] = 1.0;
    let src = enc.make_buffer(&pixels).unwrap();
    let dst = enc.alloc_texture().unwrap();
    enc.shadow(&src, &dst, ColorValue::gray(0.0, 1.0), Vec2::ZERO, 2.0)
        .unwrap();
    assert!(enc.shadow(&src, &src, ColorValue::gray(0.0, 1.0), Vec2::ZERO, 2.0).is_err());
    assert!(enc.shadow(&src, &dst, ColorValue::gray(0.0, 1.0), Vec2::ZERO, -1.0).is_err());
    enc.commit(true).unwrap();

    let alpha: Vec<f32> = r.read_pixels(&dst).unwrap().chunks(2).map(|p| p[1]).collect();
    assert!(alpha[4] > alpha[3] && alpha[3] > alpha[2]);
    assert!((alpha[3] - alpha[5]).abs() < 1e-6);
    assert!(alpha[4] < 1.0);
    assert_eq!(alpha[0], 0.0);
}

#[test]
fn copy_from_a_larger_source_uses_the_layer_program() {
    let r = renderer(4);
    let mut wide = r.encoder(4, 1).unwrap();
    let mut big = SRC.to_vec();
    big.extend([0.9; 8]);
    let src = wide.make_buffer(&big).unwrap();
    wide.commit(false).unwrap();

    let mut enc = r.encoder(2, 1).unwrap();
    let dst = enc.make_buffer(&DST).unwrap();
    enc.blend(&src, &dst, None, CompositingMode::Copy, BlendMode::Normal)
        .unwrap();
    enc.commit(true).unwrap();

    assert_eq!(r.read_pixels(&dst).unwrap(), SRC);
    assert_eq!(r.cache_stats().compiles, 1);
}
