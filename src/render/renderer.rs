use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, Weak};

use crate::device::Backend;
use crate::foundation::config::RendererOpts;
use crate::foundation::core::MAX_COMPONENTS;
use crate::foundation::error::{RasterError, RasterResult};
use crate::pipeline::cache::{PipelineCache, PipelineCacheStats};
use crate::pipeline::key::PipelineKey;
use crate::render::encoder::{CLIP_COMPONENTS, Encoder};

/// One backend bound to one pixel layout.
///
/// A renderer owns the program cache for its layout, so every session opened on it shares
/// compiled programs. Renderers are shared through `Arc` and are safe to use from many
/// threads at once.
pub struct Renderer<B: Backend> {
    backend: Arc<B>,
    components: u32,
    opts: RendererOpts,
    cache: PipelineCache<B::Program>,
    registry: Weak<RegistryShared<B>>,
}

impl<B: Backend> Renderer<B> {
    /// Standalone renderer for pixels of `components` channels, alpha included.
    pub fn new(backend: Arc<B>, components: u32, opts: RendererOpts) -> RasterResult<Arc<Self>> {
        Self::build(backend, components, opts, Weak::new())
    }

    fn build(
        backend: Arc<B>,
        components: u32,
        opts: RendererOpts,
        registry: Weak<RegistryShared<B>>,
    ) -> RasterResult<Arc<Self>> {
        if !(2..=MAX_COMPONENTS as u32).contains(&components) {
            return Err(RasterError::validation(format!(
                "component count must be in 2..={MAX_COMPONENTS}, got {components}"
            )));
        }
        opts.validate()?;
        tracing::debug!(backend = backend.name(), components, "created renderer");
        Ok(Arc::new(Self {
            backend,
            components,
            opts,
            cache: PipelineCache::new(),
            registry,
        }))
    }

    pub fn backend(&self) -> &Arc<B> {
        &self.backend
    }

    /// Channels per pixel, alpha included.
    pub fn components(&self) -> u32 {
        self.components
    }

    pub fn opts(&self) -> &RendererOpts {
        &self.opts
    }

    /// Compiled program for `key`, built on first use.
    pub fn program(&self, key: PipelineKey) -> RasterResult<B::Program> {
        self.cache
            .request(key, |k| self.backend.compile(k, self.components))
    }

    /// Compile `keys` ahead of the first session that needs them.
    pub fn precompile(&self, keys: impl IntoIterator<Item = PipelineKey>) -> RasterResult<()> {
        for key in keys {
            self.program(key)?;
        }
        Ok(())
    }

    pub fn cache_stats(&self) -> PipelineCacheStats {
        self.cache.stats()
    }

    /// Open a `width x height` session.
    pub fn encoder(self: &Arc<Self>, width: u32, height: u32) -> RasterResult<Encoder<B>> {
        Encoder::new(Arc::clone(self), width, height)
    }

    /// Pixels of `buffer` once all submitted work has completed.
    pub fn read_pixels(&self, buffer: &B::Buffer) -> RasterResult<Vec<f32>> {
        let bytes = self.backend.read_buffer(buffer)?;
        Ok(bytes
            .chunks_exact(4)
            .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect())
    }

    /// Gray + alpha renderer sharing this renderer's device and options.
    pub(crate) fn gray(self: &Arc<Self>) -> RasterResult<Arc<Self>> {
        if self.components == CLIP_COMPONENTS {
            return Ok(Arc::clone(self));
        }
        match self.registry.upgrade() {
            Some(shared) => RendererRegistry { shared }.renderer(CLIP_COMPONENTS),
            None => Self::new(Arc::clone(&self.backend), CLIP_COMPONENTS, self.opts.clone()),
        }
    }
}

struct RegistryShared<B: Backend> {
    backend: Arc<B>,
    opts: RendererOpts,
    renderers: Mutex<HashMap<u32, Arc<Renderer<B>>>>,
}

/// Shared renderers for one device, one per pixel layout.
pub struct RendererRegistry<B: Backend> {
    shared: Arc<RegistryShared<B>>,
}

impl<B: Backend> Clone for RendererRegistry<B> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<B: Backend> RendererRegistry<B> {
    /// Registry handing out renderers built with `opts`.
    pub fn new(backend: Arc<B>, opts: RendererOpts) -> RasterResult<Self> {
        opts.validate()?;
        Ok(Self {
            shared: Arc::new(RegistryShared {
                backend,
                opts,
                renderers: Mutex::new(HashMap::new()),
            }),
        })
    }

    pub fn backend(&self) -> &Arc<B> {
        &self.shared.backend
    }

    /// Renderer for pixels of `components` channels, created on first request.
    pub fn renderer(&self, components: u32) -> RasterResult<Arc<Renderer<B>>> {
        let mut renderers = self
            .shared
            .renderers
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(r) = renderers.get(&components) {
            return Ok(Arc::clone(r));
        }
        let renderer = Renderer::build(
            Arc::clone(&self.shared.backend),
            components,
            self.shared.opts.clone(),
            Arc::downgrade(&self.shared),
        )?;
        renderers.insert(components, Arc::clone(&renderer));
        Ok(renderer)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/renderer.rs"]
mod tests;
