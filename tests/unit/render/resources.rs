use super::*;
use crate::device::host::{HostDevice, HostDeviceOpts};

fn setup(limit: u64) -> (Arc<HostDevice>, ResourceManager<HostDevice>) {
    let dev = Arc::new(HostDevice::new(HostDeviceOpts { threads: Some(1) }).unwrap());
    let res = ResourceManager::new(Arc::clone(&dev), limit);
    (dev, res)
}

#[test]
fn oversized_allocation_fails() {
    let (_, res) = setup(64);
    assert!(res.alloc(64).is_ok());
    let err = res.alloc(65).unwrap_err();
    assert!(matches!(err, RasterError::ResourceAllocation(_)));
    assert!(res.upload(&[0f32; 17]).is_err());
}

#[test]
fn upload_round_trips_through_device() {
    let (_, res) = setup(1 << 20);
    let buf = res.upload(&[1.0f32, 2.0, 3.0]).unwrap();
    assert_eq!(res.read_f32(&buf).unwrap(), vec![1.0, 2.0, 3.0]);
}

#[test]
fn stencil_pool_reuses_and_clears() {
    let (dev, res) = setup(1 << 20);
    let mut batcher = CommandBatcher::new(Arc::clone(&dev), 512).unwrap();
    let mut pool = StencilPool::new();

    let a = pool.acquire(&res, &mut batcher, 64).unwrap();
    let seed = res.upload(&[7i32; 16]).unwrap();
    batcher.blit().unwrap().copy_buffer(&seed, &a).unwrap();

    let b = pool.acquire(&res, &mut batcher, 32).unwrap();
    assert!(dev.same_buffer(&a, &b));

    let c = pool.acquire(&res, &mut batcher, 128).unwrap();
    assert!(!dev.same_buffer(&a, &c));

    batcher.commit(true).unwrap();
    assert!(res.read_i32(&a).unwrap().iter().all(|&v| v == 0));

    let st = pool.stats();
    assert_eq!(st.allocations, 2);
    assert_eq!(st.reuses, 1);
    assert_eq!(st.retained_bytes, 128);
}
