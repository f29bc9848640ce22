use super::*;

fn checker() -> Vec<[f32; 2]> {
    // 2x2 gray+alpha texture: 0.0, 1.0 / 1.0, 0.0, all opaque.
    vec![[0.0, 1.0], [1.0, 1.0], [1.0, 1.0], [0.0, 1.0]]
}

fn with_sampler<R>(
    pixels: &[[f32; 2]],
    w: u32,
    h: u32,
    wrap: WrapMode,
    f: impl FnOnce(&Sampler<'_, dyn Fn(usize, &mut Pixel) + '_>) -> R,
) -> R {
    let read = |i: usize, out: &mut Pixel| out[..2].copy_from_slice(&pixels[i]);
    let read: &(dyn Fn(usize, &mut Pixel) + '_) = &read;
    let s = Sampler {
        read,
        width: w,
        height: h,
        components: 2,
        h_wrap: wrap,
        v_wrap: wrap,
    };
    f(&s)
}

#[test]
fn wrap_modes_address_outside_indices() {
    assert_eq!(wrap_index(-1, 4, WrapMode::None), (false, 0));
    assert_eq!(wrap_index(2, 4, WrapMode::None), (true, 2));
    assert_eq!(wrap_index(7, 4, WrapMode::Clamp), (true, 3));
    assert_eq!(wrap_index(-1, 4, WrapMode::Repeat), (true, 3));
    assert_eq!(wrap_index(5, 4, WrapMode::Repeat), (true, 1));
    assert_eq!(wrap_index(5, 4, WrapMode::Mirror), (true, 2));
    assert_eq!(wrap_index(9, 4, WrapMode::Mirror), (true, 1));
}

#[test]
fn none_wrap_outside_is_transparent_and_clamp_is_edge() {
    let px = checker();
    let none = with_sampler(&px, 2, 2, WrapMode::None, |s| s.fetch(5, 0));
    assert_eq!(none[..2], [1.0, 0.0]);
    let clamp = with_sampler(&px, 2, 2, WrapMode::Clamp, |s| s.fetch(5, 0));
    assert_eq!(clamp[..2], [1.0, 1.0]);
}

#[test]
fn linear_samples_midpoint() {
    let px = checker();
    let v = with_sampler(&px, 2, 2, WrapMode::Clamp, |s| {
        s.sample(ResamplingKernel::Linear, KernelParams::default(), 0.5, 0.0)
    });
    assert!((v[0] - 0.5).abs() < 1e-6);
    assert_eq!(v[1], 1.0);
}

#[test]
fn nearest_floors() {
    let px = checker();
    let v = with_sampler(&px, 2, 2, WrapMode::Clamp, |s| {
        s.sample(ResamplingKernel::None, KernelParams::default(), 1.9, 0.2)
    });
    assert_eq!(v[0], 1.0);
}

#[test]
fn convolution_of_constant_is_constant() {
    let px = vec![[0.25, 1.0]; 16];
    for (kernel, k) in [
        (
            ResamplingKernel::Mitchell,
            KernelParams {
                a: 1.0 / 3.0,
                b: 1.0 / 3.0,
                lobes: 0,
            },
        ),
        (
            ResamplingKernel::Lanczos,
            KernelParams {
                a: 0.0,
                b: 0.0,
                lobes: 3,
            },
        ),
        (ResamplingKernel::Cubic, KernelParams::default()),
    ] {
        let v = with_sampler(&px, 4, 4, WrapMode::Clamp, |s| s.sample(kernel, k, 1.3, 2.6));
        assert!((v[0] - 0.25).abs() < 1e-4, "{kernel:?}: {}", v[0]);
        assert!((v[1] - 1.0).abs() < 1e-4, "{kernel:?}: {}", v[1]);
    }
}

#[test]
fn kernel_reference_values() {
    assert_eq!(cubic(0.0, 1.0, 2.0, 3.0, 4.0), 2.0);
    assert_eq!(cubic(1.0, 1.0, 2.0, 3.0, 4.0), 3.0);
    assert_eq!(hermite(0.0, 0.0, 1.0, 2.0, 3.0, 0.0, 0.0), 1.0);
    assert_eq!(hermite(1.0, 0.0, 1.0, 2.0, 3.0, 0.0, 0.0), 2.0);
    assert_eq!(lanczos(0.0, 3.0), 1.0);
    assert_eq!(lanczos(3.5, 3.0), 0.0);
    assert!((mitchell(0.0, 1.0 / 3.0, 1.0 / 3.0) - 8.0 / 9.0).abs() < 1e-6);
    assert_eq!(mitchell(2.5, 0.0, 0.5), 0.0);
}
