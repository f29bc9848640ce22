//! Reference compute device running kernels on a rayon pool.
//!
//! Every program executes as a grid of independent invocations, exactly like a device
//! dispatch. Buffers are arrays of 32-bit atomic words so the stencil kernels can accumulate
//! with `fetch_add` while pixel kernels write disjoint words.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};

use crate::device::{Backend, CommandBuffer, EncoderKind, WaitMode};
use crate::foundation::core::MAX_COMPONENTS;
use crate::foundation::error::{RasterError, RasterResult};
use crate::kernels::params::params_fit;
use crate::pipeline::key::PipelineKey;

mod exec;
mod queue;

use queue::HostQueue;

/// Host device configuration.
#[derive(Debug, Clone, Default)]
pub struct HostDeviceOpts {
    /// Worker threads for kernel execution. `None` uses rayon defaults.
    pub threads: Option<usize>,
}

/// Compute device backed by host threads.
pub struct HostDevice {
    queue: HostQueue,
    next_buffer_id: AtomicU64,
}

impl HostDevice {
    /// Start a device with its own thread pool and queue thread.
    pub fn new(opts: HostDeviceOpts) -> RasterResult<Self> {
        let pool = Arc::new(build_thread_pool(opts.threads)?);
        Ok(Self {
            queue: HostQueue::spawn(pool)?,
            next_buffer_id: AtomicU64::new(1),
        })
    }

    fn make_buffer(&self, words: Box<[AtomicU32]>) -> HostBuffer {
        HostBuffer(Arc::new(BufferStore {
            id: self.next_buffer_id.fetch_add(1, Ordering::Relaxed),
            words,
        }))
    }
}

fn build_thread_pool(threads: Option<usize>) -> RasterResult<rayon::ThreadPool> {
    if threads == Some(0) {
        return Err(RasterError::validation(
            "host device 'threads' must be >= 1 when set",
        ));
    }

    let mut builder = rayon::ThreadPoolBuilder::new().thread_name(|i| format!("gpraster-host-{i}"));
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| RasterError::encoder(format!("failed to build rayon thread pool: {e}")))
}

struct BufferStore {
    id: u64,
    words: Box<[AtomicU32]>,
}

/// Host buffer handle. Clones share storage.
#[derive(Clone)]
pub struct HostBuffer(Arc<BufferStore>);

impl std::fmt::Debug for HostBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostBuffer")
            .field("id", &self.0.id)
            .field("words", &self.0.words.len())
            .finish()
    }
}

impl HostBuffer {
    fn words(&self) -> &[AtomicU32] {
        &self.0.words
    }

    pub(crate) fn word_len(&self) -> usize {
        self.0.words.len()
    }

    pub(crate) fn load_f32(&self, i: usize) -> f32 {
        self.words()
            .get(i)
            .map_or(0.0, |w| f32::from_bits(w.load(Ordering::Relaxed)))
    }

    pub(crate) fn store_f32(&self, i: usize, v: f32) {
        if let Some(w) = self.words().get(i) {
            w.store(v.to_bits(), Ordering::Relaxed);
        }
    }

    pub(crate) fn load_i32(&self, i: usize) -> i32 {
        self.words()
            .get(i)
            .map_or(0, |w| w.load(Ordering::Relaxed) as i32)
    }

    pub(crate) fn add_i32(&self, i: usize, v: i32) {
        if let Some(w) = self.words().get(i) {
            w.fetch_add(v as u32, Ordering::Relaxed);
        }
    }

    /// Read pixel `index` of an `n`-channel layer into `out[..n]`.
    pub(crate) fn read_pixel(&self, index: usize, n: usize, out: &mut [f32; MAX_COMPONENTS]) {
        let base = index * n;
        for (c, o) in out.iter_mut().take(n).enumerate() {
            *o = self.load_f32(base + c);
        }
    }

    pub(crate) fn write_pixel(&self, index: usize, px: &[f32]) {
        let base = index * px.len();
        for (c, &v) in px.iter().enumerate() {
            self.store_f32(base + c, v);
        }
    }

    fn zero(&self) {
        for w in self.words() {
            w.store(0, Ordering::Relaxed);
        }
    }

    fn copy_from(&self, src: &HostBuffer) {
        for (d, s) in self.words().iter().zip(src.words()) {
            d.store(s.load(Ordering::Relaxed), Ordering::Relaxed);
        }
    }
}

/// Program handle: the key plus the pixel layout it was specialized for.
#[derive(Clone, Debug)]
pub struct HostProgram {
    key: PipelineKey,
    components: usize,
}

pub(crate) enum HostCommand {
    Dispatch {
        program: HostProgram,
        params: Vec<u8>,
        bindings: Vec<HostBuffer>,
        grid: [u32; 2],
    },
    FillZero(HostBuffer),
    Copy {
        src: HostBuffer,
        dst: HostBuffer,
    },
}

/// Command buffer recording host commands for later submission.
pub struct HostCommandBuffer {
    queue: HostQueue,
    commands: Vec<HostCommand>,
    open: Option<EncoderKind>,
}

impl HostCommandBuffer {
    fn require(&self, kind: EncoderKind) -> RasterResult<()> {
        if self.open == Some(kind) {
            Ok(())
        } else {
            Err(RasterError::encoder(format!(
                "{kind:?} command recorded without an open {kind:?} encoder"
            )))
        }
    }
}

impl CommandBuffer for HostCommandBuffer {
    type Buffer = HostBuffer;
    type Program = HostProgram;

    fn begin_encoder(&mut self, kind: EncoderKind) -> RasterResult<()> {
        if let Some(open) = self.open {
            return Err(RasterError::encoder(format!(
                "cannot open a {kind:?} encoder while a {open:?} encoder is open"
            )));
        }
        self.open = Some(kind);
        Ok(())
    }

    fn end_encoder(&mut self) {
        self.open = None;
    }

    fn dispatch(
        &mut self,
        program: &HostProgram,
        params: &[u8],
        bindings: &[&HostBuffer],
        grid: [u32; 2],
    ) -> RasterResult<()> {
        self.require(EncoderKind::Compute)?;
        if bindings.len() != program.key.binding_count() {
            return Err(RasterError::validation(format!(
                "{} expects {} bindings, got {}",
                program.key.name(),
                program.key.binding_count(),
                bindings.len()
            )));
        }
        if !params_fit(program.key, params) {
            return Err(RasterError::validation(format!(
                "{} parameter block is too short ({} bytes)",
                program.key.name(),
                params.len()
            )));
        }
        self.commands.push(HostCommand::Dispatch {
            program: program.clone(),
            params: params.to_vec(),
            bindings: bindings.iter().map(|b| (*b).clone()).collect(),
            grid,
        });
        Ok(())
    }

    fn fill_zero(&mut self, buffer: &HostBuffer) -> RasterResult<()> {
        self.require(EncoderKind::Blit)?;
        self.commands.push(HostCommand::FillZero(buffer.clone()));
        Ok(())
    }

    fn copy_buffer(&mut self, src: &HostBuffer, dst: &HostBuffer) -> RasterResult<()> {
        self.require(EncoderKind::Blit)?;
        if src.word_len() > dst.word_len() {
            return Err(RasterError::validation(
                "copy source is larger than the destination",
            ));
        }
        self.commands.push(HostCommand::Copy {
            src: src.clone(),
            dst: dst.clone(),
        });
        Ok(())
    }

    fn commit(mut self, wait: WaitMode) -> RasterResult<()> {
        self.end_encoder();
        let ticket = self.queue.submit(std::mem::take(&mut self.commands))?;
        self.queue.wait(ticket, wait)
    }
}

impl Backend for HostDevice {
    type Buffer = HostBuffer;
    type Program = HostProgram;
    type CommandBuffer = HostCommandBuffer;

    fn name(&self) -> &'static str {
        "host"
    }

    fn compile(&self, key: PipelineKey, components: u32) -> RasterResult<HostProgram> {
        let n = components as usize;
        if !(2..=MAX_COMPONENTS).contains(&n) {
            return Err(RasterError::compilation(
                key.name(),
                format!("unsupported component count {components}"),
            ));
        }
        Ok(HostProgram { key, components: n })
    }

    fn alloc_buffer(&self, byte_len: usize) -> RasterResult<HostBuffer> {
        let words = byte_len.div_ceil(4);
        let mut v = Vec::new();
        v.try_reserve_exact(words).map_err(|e| {
            RasterError::allocation(format!("host buffer of {byte_len} bytes: {e}"))
        })?;
        v.extend((0..words).map(|_| AtomicU32::new(0)));
        Ok(self.make_buffer(v.into_boxed_slice()))
    }

    fn upload_buffer(&self, bytes: &[u8]) -> RasterResult<HostBuffer> {
        let buffer = self.alloc_buffer(bytes.len())?;
        for (w, chunk) in buffer.words().iter().zip(bytes.chunks(4)) {
            let mut word = [0u8; 4];
            word[..chunk.len()].copy_from_slice(chunk);
            w.store(u32::from_le_bytes(word), Ordering::Relaxed);
        }
        Ok(buffer)
    }

    fn read_buffer(&self, buffer: &HostBuffer) -> RasterResult<Vec<u8>> {
        self.queue.wait_idle()?;
        Ok(buffer
            .words()
            .iter()
            .flat_map(|w| w.load(Ordering::Relaxed).to_le_bytes())
            .collect())
    }

    fn buffer_len(&self, buffer: &HostBuffer) -> usize {
        buffer.word_len() * 4
    }

    fn same_buffer(&self, a: &HostBuffer, b: &HostBuffer) -> bool {
        Arc::ptr_eq(&a.0, &b.0)
    }

    fn make_command_buffer(&self) -> RasterResult<HostCommandBuffer> {
        Ok(HostCommandBuffer {
            queue: self.queue.clone(),
            commands: Vec::new(),
            open: None,
        })
    }
}

#[cfg(test)]
#[path = "../../../tests/unit/device/host.rs"]
mod tests;
