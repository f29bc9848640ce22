use super::*;

fn approx(a: &[f32], b: &[f32]) -> bool {
    a.iter().zip(b).all(|(x, y)| (x - y).abs() < 1e-5)
}

#[test]
fn source_over_opaque_source_replaces() {
    let mut dst = [0.0, 0.0, 1.0, 1.0];
    blend_pixel(
        CompositingMode::SourceOver,
        BlendMode::Normal,
        &[1.0, 0.0, 0.0, 1.0],
        &mut dst,
    );
    assert!(approx(&dst, &[1.0, 0.0, 0.0, 1.0]));
}

#[test]
fn source_over_half_alpha_mixes() {
    let mut dst = [0.0, 0.0, 1.0, 1.0];
    blend_pixel(
        CompositingMode::SourceOver,
        BlendMode::Normal,
        &[1.0, 0.0, 0.0, 0.5],
        &mut dst,
    );
    assert!(approx(&dst, &[0.5, 0.0, 0.5, 1.0]));
}

#[test]
fn source_over_onto_transparent_keeps_source() {
    let mut dst = [0.0; 4];
    blend_pixel(
        CompositingMode::SourceOver,
        BlendMode::Multiply,
        &[0.2, 0.4, 0.6, 0.5],
        &mut dst,
    );
    assert!(approx(&dst, &[0.2, 0.4, 0.6, 0.5]));
}

#[test]
fn clear_and_empty_results_zero() {
    let mut dst = [0.3, 0.3, 0.3, 1.0];
    blend_pixel(
        CompositingMode::Clear,
        BlendMode::Screen,
        &[1.0; 4],
        &mut dst,
    );
    assert_eq!(dst, [0.0; 4]);

    let mut dst = [0.3, 0.3, 0.3, 1.0];
    blend_pixel(
        CompositingMode::DestinationIn,
        BlendMode::Normal,
        &[1.0, 1.0, 1.0, 0.0],
        &mut dst,
    );
    assert_eq!(dst, [0.0; 4]);
}

#[test]
fn copy_normal_matches_generic_formula() {
    // The generic path with ra = sa yields the source color as well.
    let src = [0.1, 0.7, 0.3, 0.6];
    let mut fast = [0.9, 0.9, 0.9, 0.2];
    blend_pixel(CompositingMode::Copy, BlendMode::Normal, &src, &mut fast);

    let dst = [0.9f32, 0.9, 0.9, 0.2];
    let (sa, da) = (src[3], dst[3]);
    let ra = porter_duff(CompositingMode::Copy, sa, sa, da, da);
    let mut generic = [0.0f32; 4];
    for i in 0..3 {
        let b = (1.0 - da) * src[i] + da * blend_channel(BlendMode::Normal, dst[i], src[i]);
        generic[i] = porter_duff(CompositingMode::Copy, sa / ra * b, sa, da / ra * dst[i], da);
    }
    generic[3] = ra;
    assert!(approx(&fast, &generic));
}

#[test]
fn blend_channel_reference_values() {
    assert_eq!(blend_channel(BlendMode::Multiply, 0.5, 0.5), 0.25);
    assert_eq!(blend_channel(BlendMode::Screen, 0.5, 0.5), 0.75);
    assert_eq!(blend_channel(BlendMode::Difference, 0.25, 0.75), 0.5);
    assert_eq!(blend_channel(BlendMode::ColorDodge, 0.5, 1.0), 1.0);
    assert_eq!(blend_channel(BlendMode::ColorBurn, 0.5, 0.0), 0.0);
    assert_eq!(blend_channel(BlendMode::PlusLighter, 0.8, 0.8), 1.0);
    assert_eq!(blend_channel(BlendMode::PlusDarker, 0.2, 0.2), 0.0);
    assert_eq!(
        blend_channel(BlendMode::HardLight, 0.25, 0.75),
        blend_channel(BlendMode::Overlay, 0.75, 0.25)
    );
}

#[test]
fn porter_duff_xor_of_opaque_is_empty() {
    assert_eq!(porter_duff(CompositingMode::Xor, 1.0, 1.0, 1.0, 1.0), 0.0);
    assert_eq!(
        porter_duff(CompositingMode::DestinationOver, 1.0, 1.0, 0.5, 0.5),
        1.0
    );
}
