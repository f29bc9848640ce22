use super::*;

#[test]
fn defaults_match_batching_limit() {
    let opts = RendererOpts::default();
    assert_eq!(opts.dispatch_limit, 512);
    assert!(opts.validate().is_ok());
}

#[test]
fn json_fills_missing_fields() {
    let opts = RendererOpts::from_json_str(r#"{ "dispatchLimit": 4 }"#).unwrap();
    assert_eq!(opts.dispatch_limit, 4);
    assert_eq!(opts.max_buffer_bytes, 1 << 30);
}

#[test]
fn json_rejects_unknown_and_invalid() {
    assert!(RendererOpts::from_json_str(r#"{ "limit": 4 }"#).is_err());
    let err = RendererOpts::from_json_str(r#"{ "dispatchLimit": 0 }"#).unwrap_err();
    assert!(err.to_string().contains("dispatch_limit"));
    assert!(RendererOpts::from_json_str(r#"{ "maxBufferBytes": 0 }"#).is_err());
}
