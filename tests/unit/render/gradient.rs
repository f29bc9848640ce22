use super::*;
use crate::device::host::{HostDevice, HostDeviceOpts};
use crate::foundation::config::RendererOpts;
use crate::foundation::core::ColorValue;
use crate::render::renderer::{Renderer, RendererRegistry};
use std::sync::Arc;

fn renderer() -> Arc<Renderer<HostDevice>> {
    let dev = Arc::new(HostDevice::new(HostDeviceOpts { threads: Some(2) }).unwrap());
    RendererRegistry::new(dev, RendererOpts::default())
        .unwrap()
        .renderer(4)
        .unwrap()
}

fn red_to_blue() -> Vec<GradientStop> {
    vec![
        GradientStop::new(1.0, ColorValue::rgba(0.0, 0.0, 1.0, 1.0)),
        GradientStop::new(0.0, ColorValue::rgba(1.0, 0.0, 0.0, 1.0)),
    ]
}

fn pixel(px: &[f32], width: u32, x: u32, y: u32) -> &[f32] {
    let i = ((y * width + x) * 4) as usize;
    &px[i..i + 4]
}

#[test]
fn linear_midpoint_mixes_the_stops() {
    let r = renderer();
    let mut enc = r.encoder(101, 3).unwrap();
    let dst = enc.alloc_texture().unwrap();
    enc.linear_gradient(
        &dst,
        &GradientPaint::new(red_to_blue()),
        Point::new(0.0, 1.0),
        Point::new(100.0, 1.0),
    )
    .unwrap();
    enc.commit(true).unwrap();
    let px = r.read_pixels(&dst).unwrap();
    assert_eq!(pixel(&px, 101, 50, 1), [0.5, 0.0, 0.5, 1.0]);
    assert_eq!(pixel(&px, 101, 0, 0), [1.0, 0.0, 0.0, 1.0]);
    assert_eq!(pixel(&px, 101, 100, 2), [0.0, 0.0, 1.0, 1.0]);
}

#[test]
fn repeat_spread_is_periodic() {
    let r = renderer();
    let mut enc = r.encoder(40, 1).unwrap();
    let dst = enc.alloc_texture().unwrap();
    let paint =
        GradientPaint::new(red_to_blue()).with_spread(SpreadMode::Repeat, SpreadMode::Repeat);
    enc.linear_gradient(&dst, &paint, Point::new(10.0, 0.0), Point::new(18.0, 0.0))
        .unwrap();
    enc.commit(true).unwrap();
    let px = r.read_pixels(&dst).unwrap();
    for x in [12, 14, 19, 21] {
        assert_eq!(pixel(&px, 40, x, 0), pixel(&px, 40, x + 8, 0), "x = {x}");
        assert_eq!(pixel(&px, 40, x, 0), pixel(&px, 40, x - 8, 0), "x = {x}");
    }
}

#[test]
fn none_spread_is_transparent_outside() {
    let r = renderer();
    let mut enc = r.encoder(10, 1).unwrap();
    let dst = enc.alloc_texture().unwrap();
    let paint = GradientPaint::new(red_to_blue()).with_spread(SpreadMode::None, SpreadMode::Pad);
    enc.linear_gradient(&dst, &paint, Point::new(4.0, 0.0), Point::new(8.0, 0.0))
        .unwrap();
    enc.commit(true).unwrap();
    let px = r.read_pixels(&dst).unwrap();
    assert_eq!(pixel(&px, 10, 0, 0), [1.0, 0.0, 0.0, 0.0]);
    assert_eq!(pixel(&px, 10, 9, 0), [0.0, 0.0, 1.0, 1.0]);
}

#[test]
fn transform_maps_gradient_space() {
    let r = renderer();
    let mut enc = r.encoder(20, 1).unwrap();
    let dst = enc.alloc_texture().unwrap();
    let paint = GradientPaint::new(red_to_blue()).with_transform(Affine::scale(2.0));
    enc.linear_gradient(&dst, &paint, Point::new(0.0, 0.0), Point::new(8.0, 0.0))
        .unwrap();
    enc.commit(true).unwrap();
    let px = r.read_pixels(&dst).unwrap();
    assert_eq!(pixel(&px, 20, 8, 0), [0.5, 0.0, 0.5, 1.0]);
}

#[test]
fn radial_t_grows_with_distance() {
    let r = renderer();
    let mut enc = r.encoder(101, 101).unwrap();
    let dst = enc.alloc_texture().unwrap();
    let center = Point::new(50.0, 50.0);
    enc.radial_gradient(
        &dst,
        &GradientPaint::new(red_to_blue()),
        center,
        0.0,
        center,
        50.0,
    )
    .unwrap();
    enc.commit(true).unwrap();
    let px = r.read_pixels(&dst).unwrap();
    assert_eq!(pixel(&px, 101, 50, 50), [1.0, 0.0, 0.0, 1.0]);
    assert_eq!(pixel(&px, 101, 75, 50), [0.5, 0.0, 0.5, 1.0]);
    assert_eq!(pixel(&px, 101, 50, 100), [0.0, 0.0, 1.0, 1.0]);
}

#[test]
fn degenerate_gradients_leave_the_destination_alone() {
    let r = renderer();
    let mut enc = r.encoder(4, 1).unwrap();
    let dst = enc.make_buffer(&[0.5; 16]).unwrap();
    let paint = GradientPaint::new(red_to_blue());
    let p = Point::new(1.0, 0.0);

    enc.linear_gradient(&dst, &paint, p, p).unwrap();
    enc.radial_gradient(&dst, &paint, p, 3.0, p, 3.0).unwrap();
    enc.linear_gradient(&dst, &GradientPaint::new(Vec::new()), p, Point::ZERO)
        .unwrap();
    let singular = paint.clone().with_transform(Affine::scale_non_uniform(1.0, 0.0));
    enc.linear_gradient(&dst, &singular, p, Point::ZERO).unwrap();
    assert_eq!(enc.stats().batch.requests, 0);

    enc.commit(true).unwrap();
    assert_eq!(r.read_pixels(&dst).unwrap(), vec![0.5; 16]);
}

#[test]
fn invalid_stops_and_radii_are_rejected() {
    let r = renderer();
    let mut enc = r.encoder(4, 1).unwrap();
    let dst = enc.alloc_texture().unwrap();
    let (a, b) = (Point::ZERO, Point::new(4.0, 0.0));

    let gray = GradientPaint::new(vec![GradientStop::new(0.0, ColorValue::gray(1.0, 1.0))]);
    assert!(enc.linear_gradient(&dst, &gray, a, b).is_err());

    let nan = GradientPaint::new(vec![GradientStop::new(
        f64::NAN,
        ColorValue::rgba(1.0, 1.0, 1.0, 1.0),
    )]);
    assert!(enc.linear_gradient(&dst, &nan, a, b).is_err());

    let paint = GradientPaint::new(red_to_blue());
    assert!(enc.radial_gradient(&dst, &paint, a, -1.0, b, 2.0).is_err());
}
