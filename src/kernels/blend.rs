use crate::pipeline::key::{BlendMode, CompositingMode};

/// Separable blend of destination `d` with source `s`.
pub(crate) fn blend_channel(mode: BlendMode, d: f32, s: f32) -> f32 {
    match mode {
        BlendMode::Normal => s,
        BlendMode::Multiply => d * s,
        BlendMode::Screen => d + s - d * s,
        BlendMode::Overlay => overlay(d, s),
        BlendMode::Darken => d.min(s),
        BlendMode::Lighten => d.max(s),
        BlendMode::ColorDodge => {
            if s < 1.0 {
                (d / (1.0 - s)).min(1.0)
            } else {
                1.0
            }
        }
        BlendMode::ColorBurn => {
            if s > 0.0 {
                1.0 - ((1.0 - d) / s).min(1.0)
            } else {
                0.0
            }
        }
        BlendMode::SoftLight => {
            let db = if d < 0.25 {
                ((16.0 * d - 12.0) * d + 4.0) * d
            } else {
                d.sqrt()
            };
            let u = 1.0 - 2.0 * s;
            if s < 0.5 {
                d - u * d * (1.0 - d)
            } else {
                d - u * (db - d)
            }
        }
        BlendMode::HardLight => overlay(s, d),
        BlendMode::Difference => (d - s).abs(),
        BlendMode::Exclusion => d + s - 2.0 * d * s,
        BlendMode::PlusDarker => (1.0 - ((1.0 - d) + (1.0 - s))).max(0.0),
        BlendMode::PlusLighter => (d + s).min(1.0),
    }
}

fn overlay(d: f32, s: f32) -> f32 {
    if d < 0.5 {
        2.0 * d * s
    } else {
        1.0 - 2.0 * (1.0 - d) * (1.0 - s)
    }
}

/// Porter-Duff combination of premultiplied values.
pub(crate) fn porter_duff(mode: CompositingMode, s: f32, sa: f32, d: f32, da: f32) -> f32 {
    match mode {
        CompositingMode::Clear => 0.0,
        CompositingMode::Copy => s,
        CompositingMode::SourceOver => s + d * (1.0 - sa),
        CompositingMode::SourceIn => s * da,
        CompositingMode::SourceOut => s * (1.0 - da),
        CompositingMode::SourceAtop => s * da + d * (1.0 - sa),
        CompositingMode::DestinationOver => s * (1.0 - da) + d,
        CompositingMode::DestinationIn => d * sa,
        CompositingMode::DestinationOut => d * (1.0 - sa),
        CompositingMode::DestinationAtop => s * (1.0 - da) + d * sa,
        CompositingMode::Xor => s * (1.0 - da) + d * (1.0 - sa),
    }
}

/// Composite non-premultiplied `src` onto `dst` in place. Both slices hold the same channel
/// count with alpha last.
pub(crate) fn blend_pixel(
    compositing: CompositingMode,
    blend: BlendMode,
    src: &[f32],
    dst: &mut [f32],
) {
    let n = dst.len();
    let last = n - 1;
    match (compositing, blend) {
        (CompositingMode::Clear, _) => dst.fill(0.0),
        (CompositingMode::Copy, BlendMode::Normal) => dst.copy_from_slice(&src[..n]),
        _ => {
            let sa = src[last];
            let da = dst[last];
            let ra = porter_duff(compositing, sa, sa, da, da);
            if ra > 0.0 {
                for i in 0..last {
                    let s = src[i];
                    let d = dst[i];
                    let b = (1.0 - da) * s + da * blend_channel(blend, d, s);
                    dst[i] = porter_duff(compositing, sa / ra * b, sa, da / ra * d, da);
                }
                dst[last] = ra;
            } else {
                dst.fill(0.0);
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/kernels/blend.rs"]
mod tests;
