use super::*;
use crate::pipeline::key::{BlendMode, CompositingMode, WindingRule};

#[test]
fn every_key_has_an_entry_point_and_a_kernel() {
    for key in PipelineKey::all() {
        let src = source(key, 4, 8);
        assert!(src.starts_with("const N: u32 = 4u;"), "{}", key.name());
        assert!(src.contains("@compute @workgroup_size(WG, WG, 1)"));
        assert_eq!(src.matches("fn run(").count(), 1, "{}", key.name());
    }
}

#[test]
fn clip_binding_is_declared_only_when_clipped() {
    let binding = "@binding(3) var<storage, read> clip";
    for clipped in [false, true] {
        let fill = source(
            PipelineKey::Fill {
                winding: WindingRule::EvenOdd,
                clipped,
            },
            2,
            8,
        );
        assert_eq!(fill.contains(binding), clipped);
        assert!(fill.contains("const WINDING: u32 = 1u;"));

        let blend = source(
            PipelineKey::Blend {
                compositing: CompositingMode::Xor,
                blend: BlendMode::Screen,
                clipped,
            },
            4,
            16,
        );
        assert_eq!(blend.contains(binding), clipped);
        assert!(blend.contains("const COMPOSITING: u32 = 10u;"));
        assert!(blend.contains("const BLEND_MODE: u32 = 2u;"));
        assert!(blend.contains("const WG: u32 = 16u;"));
    }
}

#[test]
fn bindings_follow_the_key_binding_count() {
    for key in PipelineKey::all() {
        let src = source(key, 4, 8);
        for b in 0..=key.binding_count() {
            assert!(
                src.contains(&format!("@binding({b})")),
                "{} lacks binding {b}",
                key.name()
            );
        }
        let extra = format!("@binding({})", key.binding_count() + 1);
        assert!(!src.contains(&extra), "{}", key.name());
    }
}
