use crate::foundation::error::RasterResult;
use crate::pipeline::key::PipelineKey;
use std::collections::HashMap;
use std::sync::Mutex;

/// Counters exposed for tests and logs.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PipelineCacheStats {
    /// Programs currently cached.
    pub programs: usize,
    /// Successful compilations.
    pub compiles: u64,
    /// Requests answered from the cache.
    pub hits: u64,
    /// Compilations that failed.
    pub failures: u64,
}

struct CacheState<P> {
    programs: HashMap<PipelineKey, P>,
    stats: PipelineCacheStats,
}

/// Lookup-or-compile program cache.
///
/// One lock covers the whole lookup-or-compile step, so concurrent requests for the same key
/// compile it once. Entries live as long as the cache. Failed compilations are not cached; a
/// later request compiles again.
pub struct PipelineCache<P> {
    state: Mutex<CacheState<P>>,
}

impl<P: Clone> PipelineCache<P> {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(CacheState {
                programs: HashMap::new(),
                stats: PipelineCacheStats::default(),
            }),
        }
    }

    /// Return the program for `key`, compiling it with `compile` on first use.
    pub fn request<F>(&self, key: PipelineKey, compile: F) -> RasterResult<P>
    where
        F: FnOnce(PipelineKey) -> RasterResult<P>,
    {
        let mut state = self
            .state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        if let Some(p) = state.programs.get(&key) {
            let p = p.clone();
            state.stats.hits += 1;
            return Ok(p);
        }

        match compile(key) {
            Ok(p) => {
                tracing::debug!(program = %key.name(), "compiled pipeline");
                state.programs.insert(key, p.clone());
                state.stats.compiles += 1;
                state.stats.programs = state.programs.len();
                Ok(p)
            }
            Err(e) => {
                state.stats.failures += 1;
                Err(e)
            }
        }
    }

    pub fn contains(&self, key: &PipelineKey) -> bool {
        self.state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .programs
            .contains_key(key)
    }

    pub fn stats(&self) -> PipelineCacheStats {
        self.state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .stats
    }
}

impl<P: Clone> Default for PipelineCache<P> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/cache.rs"]
mod tests;
