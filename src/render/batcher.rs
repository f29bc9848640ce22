use std::sync::Arc;

use crate::device::{Backend, CommandBuffer, EncoderKind, WaitMode};
use crate::foundation::error::{RasterError, RasterResult};

/// Counters exposed for tests and logs.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BatchStats {
    /// Encoder requests served.
    pub requests: u64,
    /// Command buffers flushed because the dispatch limit was reached.
    pub flushes: u64,
    /// Encoders opened.
    pub encoders_opened: u64,
    /// Command buffers submitted, flushes included.
    pub submissions: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BatchState {
    Open,
    Committed,
    Aborted,
}

/// Groups encoder requests into command buffers of at most `limit` requests.
///
/// Each request counts against the limit. When the limit is reached the open command buffer is
/// submitted, the batcher waits until the device has scheduled it, and recording continues in
/// a fresh buffer. Dropping an open batcher submits its work without waiting.
pub(crate) struct CommandBatcher<B: Backend> {
    backend: Arc<B>,
    buffer: Option<B::CommandBuffer>,
    open: Option<EncoderKind>,
    counter: u32,
    limit: u32,
    state: BatchState,
    stats: BatchStats,
}

impl<B: Backend> CommandBatcher<B> {
    pub(crate) fn new(backend: Arc<B>, limit: u32) -> RasterResult<Self> {
        if limit == 0 {
            return Err(RasterError::validation("dispatch limit must be > 0"));
        }
        let buffer = backend.make_command_buffer()?;
        Ok(Self {
            backend,
            buffer: Some(buffer),
            open: None,
            counter: 0,
            limit,
            state: BatchState::Open,
            stats: BatchStats::default(),
        })
    }

    pub(crate) fn stats(&self) -> BatchStats {
        self.stats
    }

    #[cfg(test)]
    pub(crate) fn counter(&self) -> u32 {
        self.counter
    }

    #[cfg(test)]
    pub(crate) fn open_kind(&self) -> Option<EncoderKind> {
        self.open
    }

    pub(crate) fn ensure_open(&self) -> RasterResult<()> {
        match self.state {
            BatchState::Open => Ok(()),
            BatchState::Committed => Err(RasterError::SessionCommitted),
            BatchState::Aborted => Err(RasterError::SessionAborted),
        }
    }

    pub(crate) fn compute(&mut self) -> RasterResult<&mut B::CommandBuffer> {
        self.encoder(EncoderKind::Compute)
    }

    pub(crate) fn blit(&mut self) -> RasterResult<&mut B::CommandBuffer> {
        self.encoder(EncoderKind::Blit)
    }

    fn encoder(&mut self, kind: EncoderKind) -> RasterResult<&mut B::CommandBuffer> {
        self.ensure_open()?;
        if self.counter >= self.limit {
            self.flush()?;
        }
        self.counter += 1;
        self.stats.requests += 1;

        let open = self.open;
        let Some(buffer) = self.buffer.as_mut() else {
            return Err(RasterError::encoder("no active command buffer"));
        };
        if open != Some(kind) {
            if open.is_some() {
                buffer.end_encoder();
            }
            self.open = None;
            buffer.begin_encoder(kind)?;
            self.open = Some(kind);
            self.stats.encoders_opened += 1;
            tracing::debug!(?kind, "opened encoder");
        }
        Ok(buffer)
    }

    fn flush(&mut self) -> RasterResult<()> {
        let result = self.submit(WaitMode::Scheduled).and_then(|()| {
            self.buffer = Some(self.backend.make_command_buffer()?);
            Ok(())
        });
        match result {
            Ok(()) => {
                self.counter = 0;
                self.stats.flushes += 1;
                tracing::debug!(
                    backend = self.backend.name(),
                    flushes = self.stats.flushes,
                    "flushed command buffer at dispatch limit"
                );
                Ok(())
            }
            Err(e) => {
                self.state = BatchState::Aborted;
                tracing::warn!(error = %e, "command buffer flush failed; session aborted");
                Err(e)
            }
        }
    }

    fn submit(&mut self, wait: WaitMode) -> RasterResult<()> {
        let mut buffer = self
            .buffer
            .take()
            .ok_or_else(|| RasterError::encoder("no active command buffer"))?;
        if self.open.take().is_some() {
            buffer.end_encoder();
        }
        self.stats.submissions += 1;
        buffer.commit(wait)
    }

    /// Close the open encoder and submit. The batcher accepts no further work afterwards.
    pub(crate) fn commit(&mut self, wait_until_completed: bool) -> RasterResult<()> {
        self.ensure_open()?;
        self.state = BatchState::Committed;
        let wait = if wait_until_completed {
            WaitMode::Completed
        } else {
            WaitMode::None
        };
        self.submit(wait)
    }
}

impl<B: Backend> Drop for CommandBatcher<B> {
    fn drop(&mut self) {
        if self.state == BatchState::Open
            && let Err(e) = self.commit(false)
        {
            tracing::warn!(error = %e, "commit on drop failed");
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/batcher.rs"]
mod tests;
