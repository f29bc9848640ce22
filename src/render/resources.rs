use std::sync::Arc;

use bytemuck::Pod;

use crate::device::{Backend, CommandBuffer};
use crate::foundation::error::{RasterError, RasterResult};
use crate::render::batcher::CommandBatcher;

/// Allocates and uploads device buffers under a size limit.
pub(crate) struct ResourceManager<B: Backend> {
    backend: Arc<B>,
    max_buffer_bytes: u64,
}

impl<B: Backend> ResourceManager<B> {
    pub(crate) fn new(backend: Arc<B>, max_buffer_bytes: u64) -> Self {
        Self {
            backend,
            max_buffer_bytes,
        }
    }

    fn check_len(&self, byte_len: usize) -> RasterResult<()> {
        if byte_len as u64 > self.max_buffer_bytes {
            return Err(RasterError::allocation(format!(
                "buffer of {byte_len} bytes exceeds the {} byte limit",
                self.max_buffer_bytes
            )));
        }
        Ok(())
    }

    /// Zero-initialized buffer.
    pub(crate) fn alloc(&self, byte_len: usize) -> RasterResult<B::Buffer> {
        self.check_len(byte_len)?;
        self.backend.alloc_buffer(byte_len.max(4))
    }

    pub(crate) fn upload<T: Pod>(&self, data: &[T]) -> RasterResult<B::Buffer> {
        let bytes: &[u8] = bytemuck::cast_slice(data);
        self.check_len(bytes.len())?;
        if bytes.is_empty() {
            return self.backend.alloc_buffer(4);
        }
        self.backend.upload_buffer(bytes)
    }

    #[cfg(test)]
    pub(crate) fn read_f32(&self, buffer: &B::Buffer) -> RasterResult<Vec<f32>> {
        let bytes = self.backend.read_buffer(buffer)?;
        Ok(bytes
            .chunks_exact(4)
            .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect())
    }

    #[cfg(test)]
    pub(crate) fn read_i32(&self, buffer: &B::Buffer) -> RasterResult<Vec<i32>> {
        let bytes = self.backend.read_buffer(buffer)?;
        Ok(bytes
            .chunks_exact(4)
            .map(|c| i32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect())
    }
}

/// Stencil pool counters.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct StencilPoolStats {
    /// Buffers allocated.
    pub allocations: u64,
    /// Times the retained buffer was cleared and reused.
    pub reuses: u64,
    /// Size of the retained buffer.
    pub retained_bytes: usize,
}

/// Per-session stencil buffer, reused while large enough.
///
/// A reused buffer is always cleared through the batcher before it is handed out, so the
/// clear is ordered before any stencil dispatch that follows.
pub(crate) struct StencilPool<B: Backend> {
    buffer: Option<B::Buffer>,
    stats: StencilPoolStats,
}

impl<B: Backend> StencilPool<B> {
    pub(crate) fn new() -> Self {
        Self {
            buffer: None,
            stats: StencilPoolStats::default(),
        }
    }

    pub(crate) fn stats(&self) -> StencilPoolStats {
        self.stats
    }

    pub(crate) fn acquire(
        &mut self,
        resources: &ResourceManager<B>,
        batcher: &mut CommandBatcher<B>,
        byte_len: usize,
    ) -> RasterResult<B::Buffer> {
        if let Some(buffer) = &self.buffer
            && resources.backend.buffer_len(buffer) >= byte_len
        {
            batcher.blit()?.fill_zero(buffer)?;
            self.stats.reuses += 1;
            return Ok(buffer.clone());
        }

        let buffer = resources.alloc(byte_len)?;
        self.stats.allocations += 1;
        self.stats.retained_bytes = resources.backend.buffer_len(&buffer);
        tracing::debug!(bytes = byte_len, "allocated stencil buffer");
        self.buffer = Some(buffer.clone());
        Ok(buffer)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/resources.rs"]
mod tests;
