use crate::foundation::error::RasterResult;
use crate::pipeline::key::PipelineKey;

pub(crate) mod host;
#[cfg(feature = "gpu")]
pub(crate) mod wgpu;

/// Kind of encoder open on a command buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EncoderKind {
    Compute,
    Blit,
}

/// How long `commit` blocks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WaitMode {
    /// Return once the work is handed to the queue.
    None,
    /// Return once the device has picked the work up.
    Scheduled,
    /// Return once the work has finished executing.
    Completed,
}

/// A compute device and its submission queue.
///
/// Buffers and programs are cheap handles. Buffer contents are only observable through
/// [`Backend::read_buffer`], which waits for all submitted work to finish first.
pub trait Backend: Send + Sync + 'static {
    type Buffer: Clone + Send + Sync + std::fmt::Debug;
    type Program: Clone + Send + Sync;
    /// Command buffer recording into this device's queue.
    type CommandBuffer: CommandBuffer<Buffer = Self::Buffer, Program = Self::Program>;

    fn name(&self) -> &'static str;

    /// Build the program for `key`, specialized for pixels of `components` channels.
    fn compile(&self, key: PipelineKey, components: u32) -> RasterResult<Self::Program>;

    /// Zero-initialized buffer of at least `byte_len` bytes.
    fn alloc_buffer(&self, byte_len: usize) -> RasterResult<Self::Buffer>;

    /// Buffer initialized from `bytes`.
    fn upload_buffer(&self, bytes: &[u8]) -> RasterResult<Self::Buffer>;

    /// Contents of `buffer` once all submitted work has completed.
    fn read_buffer(&self, buffer: &Self::Buffer) -> RasterResult<Vec<u8>>;

    /// Size of `buffer` in bytes.
    fn buffer_len(&self, buffer: &Self::Buffer) -> usize;

    /// Whether two handles name the same storage.
    fn same_buffer(&self, a: &Self::Buffer, b: &Self::Buffer) -> bool;

    /// Fresh command buffer.
    fn make_command_buffer(&self) -> RasterResult<Self::CommandBuffer>;
}

/// Recorded work destined for a device queue.
///
/// At most one encoder is open at a time. Dispatches require an open compute encoder; fills
/// and copies require an open blit encoder.
pub trait CommandBuffer: Send {
    type Buffer;
    type Program;

    /// Open an encoder of `kind`. Fails if another encoder is open.
    fn begin_encoder(&mut self, kind: EncoderKind) -> RasterResult<()>;

    /// Close the open encoder, if any.
    fn end_encoder(&mut self);

    /// Record one dispatch of `program` over a `grid[0] x grid[1]` grid.
    fn dispatch(
        &mut self,
        program: &Self::Program,
        params: &[u8],
        bindings: &[&Self::Buffer],
        grid: [u32; 2],
    ) -> RasterResult<()>;

    /// Record a zero fill of the whole buffer.
    fn fill_zero(&mut self, buffer: &Self::Buffer) -> RasterResult<()>;

    /// Record a copy of `src` into the start of `dst`.
    fn copy_buffer(&mut self, src: &Self::Buffer, dst: &Self::Buffer) -> RasterResult<()>;

    /// Close any open encoder and submit.
    fn commit(self, wait: WaitMode) -> RasterResult<()>;
}
