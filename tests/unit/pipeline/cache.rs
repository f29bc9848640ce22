use super::*;
use crate::foundation::error::RasterError;
use crate::pipeline::key::PrimitiveKind;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

#[test]
fn second_request_is_a_hit() {
    let cache = PipelineCache::<String>::new();
    let key = PipelineKey::SetOpacity;
    let calls = AtomicUsize::new(0);

    for _ in 0..3 {
        let p = cache
            .request(key, |k| {
                calls.fetch_add(1, Ordering::Relaxed);
                Ok(k.name())
            })
            .unwrap();
        assert_eq!(p, "set_opacity");
    }

    assert_eq!(calls.load(Ordering::Relaxed), 1);
    let st = cache.stats();
    assert_eq!(st.compiles, 1);
    assert_eq!(st.hits, 2);
    assert_eq!(st.programs, 1);
}

#[test]
fn failures_are_not_cached() {
    let cache = PipelineCache::<u32>::new();
    let key = PipelineKey::Stencil(PrimitiveKind::Cubic);

    let err = cache
        .request(key, |k| Err(RasterError::compilation(k.name(), "bad")))
        .unwrap_err();
    assert!(matches!(err, RasterError::PipelineCompilation { .. }));
    assert!(!cache.contains(&key));

    assert_eq!(cache.request(key, |_| Ok(7)).unwrap(), 7);
    let st = cache.stats();
    assert_eq!(st.failures, 1);
    assert_eq!(st.compiles, 1);
}

#[test]
fn concurrent_requests_compile_once() {
    let cache = Arc::new(PipelineCache::<usize>::new());
    let calls = Arc::new(AtomicUsize::new(0));
    let key = PipelineKey::Shadow;

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let cache = Arc::clone(&cache);
            let calls = Arc::clone(&calls);
            std::thread::spawn(move || {
                cache
                    .request(key, |_| {
                        calls.fetch_add(1, Ordering::SeqCst);
                        std::thread::sleep(std::time::Duration::from_millis(5));
                        Ok(42)
                    })
                    .unwrap()
            })
        })
        .collect();

    for h in handles {
        assert_eq!(h.join().unwrap(), 42);
    }
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}
