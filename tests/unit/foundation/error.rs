use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        RasterError::allocation("x")
            .to_string()
            .contains("resource allocation error:")
    );
    assert!(
        RasterError::encoder("x")
            .to_string()
            .contains("encoder creation error:")
    );
    assert!(
        RasterError::validation("x")
            .to_string()
            .contains("validation error:")
    );
}

#[test]
fn compilation_carries_key_and_diagnostic() {
    let err = RasterError::compilation("blend_4_sourceOver_normal", "unknown identifier");
    let msg = err.to_string();
    assert!(msg.contains("blend_4_sourceOver_normal"));
    assert!(msg.contains("unknown identifier"));
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = RasterError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
