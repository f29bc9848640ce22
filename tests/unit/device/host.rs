use super::*;
use crate::kernels::params::{LayerParams, StencilParams};
use crate::pipeline::key::PrimitiveKind;

fn device() -> HostDevice {
    HostDevice::new(HostDeviceOpts { threads: Some(2) }).unwrap()
}

fn f32s(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect()
}

#[test]
fn zero_threads_is_rejected() {
    assert!(HostDevice::new(HostDeviceOpts { threads: Some(0) }).is_err());
}

#[test]
fn upload_and_read_back() {
    let dev = device();
    let data = [1.0f32, 2.5, -3.0];
    let buf = dev.upload_buffer(bytemuck::cast_slice(&data)).unwrap();
    assert_eq!(dev.buffer_len(&buf), 12);
    assert_eq!(f32s(&dev.read_buffer(&buf).unwrap()), data);
}

#[test]
fn compile_checks_component_count() {
    let dev = device();
    assert!(dev.compile(PipelineKey::SetOpacity, 4).is_ok());
    let err = dev.compile(PipelineKey::SetOpacity, 0).unwrap_err();
    assert!(matches!(err, RasterError::PipelineCompilation { .. }));
    assert!(dev.compile(PipelineKey::SetOpacity, 17).is_err());
}

#[test]
fn commands_require_matching_encoder() {
    let dev = device();
    let buf = dev.alloc_buffer(16).unwrap();
    let mut cb = dev.make_command_buffer().unwrap();
    assert!(cb.fill_zero(&buf).is_err());
    cb.begin_encoder(EncoderKind::Compute).unwrap();
    assert!(cb.begin_encoder(EncoderKind::Blit).is_err());
    assert!(cb.fill_zero(&buf).is_err());
    cb.end_encoder();
    cb.begin_encoder(EncoderKind::Blit).unwrap();
    cb.fill_zero(&buf).unwrap();
    cb.commit(WaitMode::Completed).unwrap();
}

#[test]
fn dispatch_validates_bindings() {
    let dev = device();
    let buf = dev.alloc_buffer(16).unwrap();
    let program = dev.compile(PipelineKey::Clip, 4).unwrap();
    let params = LayerParams {
        width: 1,
        height: 1,
        opacity: 1.0,
        reserved: 0,
    };
    let mut cb = dev.make_command_buffer().unwrap();
    cb.begin_encoder(EncoderKind::Compute).unwrap();
    let err = cb
        .dispatch(&program, bytemuck::bytes_of(&params), &[&buf], [1, 1])
        .unwrap_err();
    assert!(err.to_string().contains("bindings"));
    assert!(cb.dispatch(&program, &[0u8; 2], &[&buf, &buf], [1, 1]).is_err());
}

#[test]
fn submissions_run_in_order() {
    let dev = device();
    let src = dev.upload_buffer(bytemuck::cast_slice(&[0.5f32, 1.0])).unwrap();
    let dst = dev.upload_buffer(bytemuck::cast_slice(&[0.0f32, 0.0])).unwrap();

    let program = dev.compile(PipelineKey::SetOpacity, 2).unwrap();
    let params = LayerParams {
        width: 1,
        height: 1,
        opacity: 0.5,
        reserved: 0,
    };

    let mut a = dev.make_command_buffer().unwrap();
    a.begin_encoder(EncoderKind::Blit).unwrap();
    a.copy_buffer(&src, &dst).unwrap();
    a.commit(WaitMode::None).unwrap();

    let mut b = dev.make_command_buffer().unwrap();
    b.begin_encoder(EncoderKind::Compute).unwrap();
    b.dispatch(&program, bytemuck::bytes_of(&params), &[&dst], [1, 1])
        .unwrap();
    b.commit(WaitMode::None).unwrap();

    assert_eq!(f32s(&dev.read_buffer(&dst).unwrap()), [0.5, 0.5]);
}

#[test]
fn stencil_dispatch_accumulates_signed_winding() {
    let dev = device();
    let stencil = dev.alloc_buffer(4 * 4 * 4).unwrap();
    let program = dev.compile(PipelineKey::Stencil(PrimitiveKind::Triangle), 4).unwrap();
    let p = StencilParams {
        p0: [0.0, 0.0],
        p1: [4.0, 0.0],
        p2: [4.0, 4.0],
        winding: -1,
        width: 4,
        height: 4,
        y_start: 0,
        q0: [0.0, 0.0],
        q1: [4.0, 0.0],
        q2: [4.0, 4.0],
        ..StencilParams::default()
    };

    let mut cb = dev.make_command_buffer().unwrap();
    cb.begin_encoder(EncoderKind::Compute).unwrap();
    for _ in 0..2 {
        cb.dispatch(&program, bytemuck::bytes_of(&p), &[&stencil], [4, 4])
            .unwrap();
    }
    cb.commit(WaitMode::Completed).unwrap();

    let bytes = dev.read_buffer(&stencil).unwrap();
    let slots: Vec<i32> = bytes
        .chunks_exact(4)
        .map(|c| i32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect();
    // Upper-right triangle: row y covers x in [y, 4).
    for y in 0..4 {
        for x in 0..4 {
            let expect = if x >= y { -2 } else { 0 };
            assert_eq!(slots[y * 4 + x], expect, "slot ({x},{y})");
        }
    }
}

#[test]
fn same_buffer_tracks_identity() {
    let dev = device();
    let a = dev.alloc_buffer(4).unwrap();
    let b = dev.alloc_buffer(4).unwrap();
    assert!(dev.same_buffer(&a, &a.clone()));
    assert!(!dev.same_buffer(&a, &b));
}

// Index arithmetic only traps with overflow checks on.
#[cfg(debug_assertions)]
#[test]
fn panicked_submission_fails_completion_waits() {
    let dev = device();
    let dst = dev.alloc_buffer(16).unwrap();
    let program = dev.compile(PipelineKey::SetOpacity, 4).unwrap();
    let params = LayerParams {
        width: u32::MAX,
        height: 2,
        opacity: 0.5,
        reserved: 0,
    };

    let mut cb = dev.make_command_buffer().unwrap();
    cb.begin_encoder(EncoderKind::Compute).unwrap();
    cb.dispatch(&program, bytemuck::bytes_of(&params), &[&dst], [2, 2])
        .unwrap();
    let err = cb.commit(WaitMode::Completed).unwrap_err();
    assert!(matches!(err, RasterError::EncoderCreation(_)));
    assert!(err.to_string().contains("panicked"), "{err}");

    assert!(dev.read_buffer(&dst).is_err());

    let mut later = dev.make_command_buffer().unwrap();
    later.begin_encoder(EncoderKind::Blit).unwrap();
    later.fill_zero(&dst).unwrap();
    assert!(later.commit(WaitMode::Completed).is_err());
}
