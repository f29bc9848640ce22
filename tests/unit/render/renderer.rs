use super::*;
use crate::device::host::{HostDevice, HostDeviceOpts};
use crate::pipeline::key::{BlendMode, CompositingMode};

fn device() -> Arc<HostDevice> {
    Arc::new(HostDevice::new(HostDeviceOpts { threads: Some(2) }).unwrap())
}

#[test]
fn component_count_is_validated() {
    let dev = device();
    assert!(Renderer::new(Arc::clone(&dev), 1, RendererOpts::default()).is_err());
    assert!(Renderer::new(Arc::clone(&dev), 17, RendererOpts::default()).is_err());
    assert!(Renderer::new(dev, 16, RendererOpts::default()).is_ok());
}

#[test]
fn invalid_opts_are_rejected() {
    let opts = RendererOpts {
        dispatch_limit: 0,
        ..RendererOpts::default()
    };
    assert!(RendererRegistry::new(device(), opts.clone()).is_err());
    assert!(Renderer::new(device(), 4, opts).is_err());
}

#[test]
fn registry_shares_renderers_per_layout() {
    let registry = RendererRegistry::new(device(), RendererOpts::default()).unwrap();
    let a = registry.renderer(4).unwrap();
    let b = registry.clone().renderer(4).unwrap();
    let gray = registry.renderer(2).unwrap();
    assert!(Arc::ptr_eq(&a, &b));
    assert!(!Arc::ptr_eq(&a, &gray));
    assert!(Arc::ptr_eq(&a.gray().unwrap(), &gray));
    assert!(Arc::ptr_eq(&gray.gray().unwrap(), &gray));
}

#[test]
fn standalone_renderer_still_has_a_gray_layout() {
    let r = Renderer::new(device(), 4, RendererOpts::default()).unwrap();
    let gray = r.gray().unwrap();
    assert_eq!(gray.components(), 2);
    assert!(Arc::ptr_eq(gray.backend(), r.backend()));
}

#[test]
fn programs_compile_once_per_key() {
    let r = Renderer::new(device(), 4, RendererOpts::default()).unwrap();
    let key = PipelineKey::Blend {
        compositing: CompositingMode::SourceOver,
        blend: BlendMode::Multiply,
        clipped: false,
    };
    r.precompile([key, PipelineKey::SetOpacity]).unwrap();
    r.program(key).unwrap();
    r.program(key).unwrap();

    let stats = r.cache_stats();
    assert_eq!(stats.compiles, 2);
    assert_eq!(stats.hits, 2);
    assert_eq!(stats.programs, 2);
}

#[test]
fn read_pixels_returns_committed_contents() {
    let r = Renderer::new(device(), 2, RendererOpts::default()).unwrap();
    let mut enc = r.encoder(2, 1).unwrap();
    let buf = enc.make_buffer(&[0.25, 1.0, 0.5, 0.5]).unwrap();
    enc.commit(true).unwrap();
    assert_eq!(r.read_pixels(&buf).unwrap(), vec![0.25, 1.0, 0.5, 0.5]);
}
