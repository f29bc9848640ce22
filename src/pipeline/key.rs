//! Semantic configuration of every compute program the renderer can request.
//!
//! A [`PipelineKey`] identifies exactly one program. The component count of the pixel layout
//! is not part of the key: it belongs to the renderer that owns the cache.

macro_rules! coded_enum {
    (
        $(#[$meta:meta])*
        $name:ident { $($(#[$vmeta:meta])* $variant:ident => $label:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        #[serde(rename_all = "camelCase")]
        pub enum $name {
            $($(#[$vmeta])* $variant),+
        }

        impl $name {
            /// Every variant, in code order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Stable camelCase label used in program names.
            pub fn label(self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }

            /// Numeric code baked into compiled programs.
            pub fn code(self) -> u32 {
                self as u32
            }
        }
    };
}

coded_enum! {
    /// Primitive shape handled by a stencil program.
    PrimitiveKind {
        Triangle => "triangle",
        Quadratic => "quadratic",
        Cubic => "cubic",
    }
}

coded_enum! {
    /// Rule used to resolve accumulated winding into coverage.
    WindingRule {
        NonZero => "nonZero",
        EvenOdd => "evenOdd",
    }
}

coded_enum! {
    /// Porter-Duff compositing operator.
    CompositingMode {
        /// `R = 0`
        Clear => "clear",
        /// `R = S`
        Copy => "copy",
        /// `R = S + D * (1 - Sa)`
        SourceOver => "sourceOver",
        /// `R = S * Da`
        SourceIn => "sourceIn",
        /// `R = S * (1 - Da)`
        SourceOut => "sourceOut",
        /// `R = S * Da + D * (1 - Sa)`
        SourceAtop => "sourceAtop",
        /// `R = S * (1 - Da) + D`
        DestinationOver => "destinationOver",
        /// `R = D * Sa`
        DestinationIn => "destinationIn",
        /// `R = D * (1 - Sa)`
        DestinationOut => "destinationOut",
        /// `R = S * (1 - Da) + D * Sa`
        DestinationAtop => "destinationAtop",
        /// `R = S * (1 - Da) + D * (1 - Sa)`
        Xor => "xor",
    }
}

coded_enum! {
    /// Separable color blend function.
    BlendMode {
        Normal => "normal",
        Multiply => "multiply",
        Screen => "screen",
        Overlay => "overlay",
        Darken => "darken",
        Lighten => "lighten",
        ColorDodge => "colorDodge",
        ColorBurn => "colorBurn",
        SoftLight => "softLight",
        HardLight => "hardLight",
        Difference => "difference",
        Exclusion => "exclusion",
        PlusDarker => "plusDarker",
        PlusLighter => "plusLighter",
    }
}

coded_enum! {
    /// Gradient geometry.
    GradientKind {
        Linear => "axial",
        Radial => "radial",
    }
}

coded_enum! {
    /// Behaviour of a gradient outside `[0, 1]`.
    SpreadMode {
        /// Transparent outside the range.
        None => "none",
        /// Extend the end color.
        Pad => "pad",
        /// Mirror back and forth.
        Reflect => "reflect",
        /// Tile.
        Repeat => "repeat",
    }
}

coded_enum! {
    /// Source addressing outside a texture, per axis.
    WrapMode {
        /// Transparent outside the texture.
        None => "none",
        /// Clamp to the edge pixel.
        Clamp => "clamp",
        /// Tile.
        Repeat => "repeat",
        /// Tile with every other copy mirrored.
        Mirror => "mirror",
    }
}

coded_enum! {
    /// Resampling kernel family, without its scalar parameters.
    ResamplingKernel {
        None => "none",
        Linear => "linear",
        Cosine => "cosine",
        Cubic => "cubic",
        Hermite => "hermite",
        Mitchell => "mitchell",
        Lanczos => "lanczos",
    }
}

/// Resampling kernel with its parameters.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum ResamplingAlgorithm {
    None,
    #[default]
    Linear,
    Cosine,
    Cubic,
    Hermite {
        /// Tension, `1` gives straight segments.
        tension: f64,
        /// Bias toward the previous (`> 0`) or next (`< 0`) segment.
        bias: f64,
    },
    Mitchell {
        b: f64,
        c: f64,
    },
    /// Lanczos convolution with window size `a`.
    Lanczos {
        a: u32,
    },
}

impl ResamplingAlgorithm {
    /// Kernel family selecting the compiled program.
    pub fn kernel(self) -> ResamplingKernel {
        match self {
            Self::None | Self::Lanczos { a: 0 } => ResamplingKernel::None,
            Self::Linear => ResamplingKernel::Linear,
            Self::Cosine => ResamplingKernel::Cosine,
            Self::Cubic => ResamplingKernel::Cubic,
            Self::Hermite { .. } => ResamplingKernel::Hermite,
            Self::Mitchell { .. } => ResamplingKernel::Mitchell,
            Self::Lanczos { .. } => ResamplingKernel::Lanczos,
        }
    }
}

/// Identity of one compiled compute program.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PipelineKey {
    /// Accumulate one primitive into the stencil.
    Stencil(PrimitiveKind),
    /// Resolve stencil coverage into color.
    Fill {
        winding: WindingRule,
        /// Whether a clip layer modulates coverage.
        clipped: bool,
    },
    /// Composite a source layer onto a destination layer.
    Blend {
        /// Porter-Duff operator.
        compositing: CompositingMode,
        /// Blend function.
        blend: BlendMode,
        /// Whether a clip layer modulates the source.
        clipped: bool,
    },
    /// Evaluate a gradient into a layer.
    Gradient {
        /// Gradient geometry.
        kind: GradientKind,
        /// Spread for `t < 0`.
        start_spread: SpreadMode,
        /// Spread for `t > 1`.
        end_spread: SpreadMode,
    },
    /// Resample a texture into a layer.
    Resample {
        /// Kernel family.
        kernel: ResamplingKernel,
        /// Horizontal addressing.
        h_wrap: WrapMode,
        /// Vertical addressing.
        v_wrap: WrapMode,
    },
    /// Scale layer alpha.
    SetOpacity,
    /// Multiply layer alpha by a clip layer's coverage.
    Clip,
    /// Blurred, offset alpha of a layer.
    Shadow,
}

impl PipelineKey {
    /// Program name, unique per key.
    pub fn name(&self) -> String {
        match *self {
            Self::Stencil(kind) => format!("stencil_{}", kind.label()),
            Self::Fill { winding, clipped } => {
                format!("fill_{}{}", winding.label(), clip_suffix(clipped))
            }
            Self::Blend {
                compositing,
                blend,
                clipped,
            } => format!(
                "blend_{}_{}{}",
                compositing.label(),
                blend.label(),
                clip_suffix(clipped)
            ),
            Self::Gradient {
                kind,
                start_spread,
                end_spread,
            } => format!(
                "{}_gradient_{}_{}",
                kind.label(),
                start_spread.label(),
                end_spread.label()
            ),
            Self::Resample {
                kernel,
                h_wrap,
                v_wrap,
            } => format!(
                "{}_interpolate_{}_{}",
                kernel.label(),
                h_wrap.label(),
                v_wrap.label()
            ),
            Self::SetOpacity => "set_opacity".to_owned(),
            Self::Clip => "clip".to_owned(),
            Self::Shadow => "shadow".to_owned(),
        }
    }

    /// Number of buffers bound after the parameter block.
    pub fn binding_count(&self) -> usize {
        match *self {
            Self::Stencil(_) | Self::SetOpacity => 1,
            Self::Fill { clipped, .. } | Self::Blend { clipped, .. } => 2 + usize::from(clipped),
            Self::Gradient { .. } | Self::Resample { .. } | Self::Clip | Self::Shadow => 2,
        }
    }

    /// The whole bounded key space.
    pub fn all() -> Vec<PipelineKey> {
        let mut out = Vec::new();
        out.extend(PrimitiveKind::ALL.iter().map(|&k| Self::Stencil(k)));
        for &winding in WindingRule::ALL {
            for clipped in [false, true] {
                out.push(Self::Fill { winding, clipped });
            }
        }
        for &compositing in CompositingMode::ALL {
            for &blend in BlendMode::ALL {
                for clipped in [false, true] {
                    out.push(Self::Blend {
                        compositing,
                        blend,
                        clipped,
                    });
                }
            }
        }
        for &kind in GradientKind::ALL {
            for &start_spread in SpreadMode::ALL {
                for &end_spread in SpreadMode::ALL {
                    out.push(Self::Gradient {
                        kind,
                        start_spread,
                        end_spread,
                    });
                }
            }
        }
        for &kernel in ResamplingKernel::ALL {
            for &h_wrap in WrapMode::ALL {
                for &v_wrap in WrapMode::ALL {
                    out.push(Self::Resample {
                        kernel,
                        h_wrap,
                        v_wrap,
                    });
                }
            }
        }
        out.extend([Self::SetOpacity, Self::Clip, Self::Shadow]);
        out
    }
}

fn clip_suffix(clipped: bool) -> &'static str {
    if clipped { "_clip" } else { "" }
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/key.rs"]
mod tests;
