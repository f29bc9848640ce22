//! Compute device running the kernels as WGSL compute shaders through `wgpu`.

use wgpu::util::DeviceExt as _;

use crate::device::{Backend, CommandBuffer, EncoderKind, WaitMode};
use crate::foundation::core::MAX_COMPONENTS;
use crate::foundation::error::{RasterError, RasterResult};
use crate::kernels::params::params_fit;
use crate::pipeline::key::PipelineKey;

mod shader;

const STORAGE_USAGE: wgpu::BufferUsages = wgpu::BufferUsages::STORAGE
    .union(wgpu::BufferUsages::COPY_SRC)
    .union(wgpu::BufferUsages::COPY_DST);

/// wgpu device configuration.
#[derive(Debug, Clone)]
pub struct WgpuDeviceOpts {
    /// Edge length of the square compute workgroup, in `1..=16`.
    pub workgroup_size: u32,
}

impl Default for WgpuDeviceOpts {
    fn default() -> Self {
        Self { workgroup_size: 8 }
    }
}

/// Compute device backed by a wgpu adapter.
pub struct WgpuDevice {
    device: wgpu::Device,
    queue: wgpu::Queue,
    adapter_name: String,
    workgroup_size: u32,
}

impl WgpuDevice {
    /// Open the highest-performance adapter available.
    ///
    /// Fails with an error mentioning `no gpu adapter available` on machines without one.
    pub fn new(opts: WgpuDeviceOpts) -> RasterResult<Self> {
        if !(1..=16).contains(&opts.workgroup_size) {
            return Err(RasterError::validation("workgroup_size must be in 1..=16"));
        }

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: None,
            force_fallback_adapter: false,
        }))
        .map_err(|e| match e {
            wgpu::RequestAdapterError::NotFound { .. } => {
                RasterError::encoder("no gpu adapter available")
            }
            other => RasterError::encoder(format!("wgpu request_adapter failed: {other:?}")),
        })?;

        let supported = adapter.limits();
        let (device, queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
            label: Some("gpraster"),
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits {
                max_storage_buffer_binding_size: supported.max_storage_buffer_binding_size,
                max_buffer_size: supported.max_buffer_size,
                ..wgpu::Limits::default()
            },
            experimental_features: wgpu::ExperimentalFeatures::default(),
            memory_hints: wgpu::MemoryHints::Performance,
            trace: wgpu::Trace::Off,
        }))
        .map_err(|e| RasterError::encoder(format!("wgpu request_device failed: {e:?}")))?;

        let adapter_name = adapter.get_info().name;
        tracing::debug!(adapter = %adapter_name, "opened wgpu device");
        Ok(Self {
            device,
            queue,
            adapter_name,
            workgroup_size: opts.workgroup_size,
        })
    }

    pub fn adapter_name(&self) -> &str {
        &self.adapter_name
    }

    fn storage_buffer(&self, byte_len: usize) -> RasterResult<wgpu::Buffer> {
        let size = padded_len(byte_len) as u64;
        if size > self.device.limits().max_buffer_size {
            return Err(RasterError::allocation(format!(
                "wgpu buffer of {byte_len} bytes exceeds the device limit"
            )));
        }
        self.device.push_error_scope(wgpu::ErrorFilter::OutOfMemory);
        let buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: None,
            size,
            usage: STORAGE_USAGE,
            mapped_at_creation: false,
        });
        if let Some(err) = pollster::block_on(self.device.pop_error_scope()) {
            return Err(RasterError::allocation(format!(
                "wgpu buffer of {byte_len} bytes: {err}"
            )));
        }
        Ok(buffer)
    }
}

fn padded_len(byte_len: usize) -> usize {
    byte_len.max(4).next_multiple_of(4)
}

/// wgpu buffer handle. Clones share storage.
#[derive(Clone, Debug)]
pub struct WgpuBuffer {
    buffer: wgpu::Buffer,
}

/// Compiled compute pipeline plus the layout of its bind group.
#[derive(Clone, Debug)]
pub struct WgpuProgram {
    key: PipelineKey,
    pipeline: wgpu::ComputePipeline,
    layout: wgpu::BindGroupLayout,
    workgroup_size: u32,
}

/// Command buffer wrapping a wgpu command encoder.
pub struct WgpuCommandBuffer {
    device: wgpu::Device,
    queue: wgpu::Queue,
    encoder: wgpu::CommandEncoder,
    pass: Option<wgpu::ComputePass<'static>>,
    open: Option<EncoderKind>,
}

impl WgpuCommandBuffer {
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

impl CommandBuffer for WgpuCommandBuffer {
    type Buffer = WgpuBuffer;
    type Program = WgpuProgram;

    fn begin_encoder(&mut self, kind: EncoderKind) -> RasterResult<()> {
        if let Some(open) = self.open {
            return Err(RasterError::encoder(format!(
                "cannot open a {kind:?} encoder while a {open:?} encoder is open"
            )));
        }
        if kind == EncoderKind::Compute {
            let pass = self
                .encoder
                .begin_compute_pass(&wgpu::ComputePassDescriptor {
                    label: Some("gpraster_compute"),
                    timestamp_writes: None,
                })
                .forget_lifetime();
            self.pass = Some(pass);
        }
        self.open = Some(kind);
        Ok(())
    }

    fn end_encoder(&mut self) {
        self.pass = None;
        self.open = None;
    }

    fn dispatch(
        &mut self,
        program: &WgpuProgram,
        params: &[u8],
        bindings: &[&WgpuBuffer],
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

        let mut block = Vec::with_capacity(8 + padded_len(params.len()));
        block.extend_from_slice(&grid[0].to_le_bytes());
        block.extend_from_slice(&grid[1].to_le_bytes());
        block.extend_from_slice(params);
        block.resize(padded_len(block.len()), 0);
        let params_buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("gpraster_params"),
                contents: &block,
                usage: wgpu::BufferUsages::STORAGE,
            });

        let mut entries = Vec::with_capacity(bindings.len() + 1);
        entries.push(wgpu::BindGroupEntry {
            binding: 0,
            resource: params_buffer.as_entire_binding(),
        });
        for (i, b) in bindings.iter().enumerate() {
            entries.push(wgpu::BindGroupEntry {
                binding: i as u32 + 1,
                resource: b.buffer.as_entire_binding(),
            });
        }
        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: None,
            layout: &program.layout,
            entries: &entries,
        });

        let pass = self
            .pass
            .as_mut()
            .ok_or_else(|| RasterError::encoder("compute pass is not open"))?;
        pass.set_pipeline(&program.pipeline);
        pass.set_bind_group(0, &bind_group, &[]);
        pass.dispatch_workgroups(
            grid[0].div_ceil(program.workgroup_size),
            grid[1].div_ceil(program.workgroup_size),
            1,
        );
        Ok(())
    }

    fn fill_zero(&mut self, buffer: &WgpuBuffer) -> RasterResult<()> {
        self.require(EncoderKind::Blit)?;
        self.encoder.clear_buffer(&buffer.buffer, 0, None);
        Ok(())
    }

    fn copy_buffer(&mut self, src: &WgpuBuffer, dst: &WgpuBuffer) -> RasterResult<()> {
        self.require(EncoderKind::Blit)?;
        let size = src.buffer.size();
        if size > dst.buffer.size() {
            return Err(RasterError::validation(
                "copy source is larger than the destination",
            ));
        }
        self.encoder
            .copy_buffer_to_buffer(&src.buffer, 0, &dst.buffer, 0, size);
        Ok(())
    }

    fn commit(mut self, wait: WaitMode) -> RasterResult<()> {
        self.end_encoder();
        self.queue.submit(Some(self.encoder.finish()));
        let poll = match wait {
            WaitMode::None => return Ok(()),
            WaitMode::Scheduled => wgpu::PollType::Poll,
            WaitMode::Completed => wgpu::PollType::wait_indefinitely(),
        };
        self.device
            .poll(poll)
            .map_err(|e| RasterError::encoder(format!("wgpu poll failed: {e:?}")))?;
        Ok(())
    }
}

impl Backend for WgpuDevice {
    type Buffer = WgpuBuffer;
    type Program = WgpuProgram;
    type CommandBuffer = WgpuCommandBuffer;

    fn name(&self) -> &'static str {
        "wgpu"
    }

    fn compile(&self, key: PipelineKey, components: u32) -> RasterResult<WgpuProgram> {
        let name = key.name();
        if !(2..=MAX_COMPONENTS as u32).contains(&components) {
            return Err(RasterError::compilation(
                name,
                format!("unsupported component count {components}"),
            ));
        }
        let source = shader::source(key, components, self.workgroup_size);

        self.device.push_error_scope(wgpu::ErrorFilter::Validation);
        let module = self
            .device
            .create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(&name),
                source: wgpu::ShaderSource::Wgsl(source.into()),
            });
        let pipeline = self
            .device
            .create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
                label: Some(&name),
                layout: None,
                module: &module,
                entry_point: Some("main"),
                compilation_options: wgpu::PipelineCompilationOptions::default(),
                cache: None,
            });
        if let Some(err) = pollster::block_on(self.device.pop_error_scope()) {
            return Err(RasterError::compilation(name, err.to_string()));
        }

        let layout = pipeline.get_bind_group_layout(0);
        Ok(WgpuProgram {
            key,
            pipeline,
            layout,
            workgroup_size: self.workgroup_size,
        })
    }

    fn alloc_buffer(&self, byte_len: usize) -> RasterResult<WgpuBuffer> {
        Ok(WgpuBuffer {
            buffer: self.storage_buffer(byte_len)?,
        })
    }

    fn upload_buffer(&self, bytes: &[u8]) -> RasterResult<WgpuBuffer> {
        let buffer = self.storage_buffer(bytes.len())?;
        let whole = bytes.len() / 4 * 4;
        self.queue.write_buffer(&buffer, 0, &bytes[..whole]);
        if whole < bytes.len() {
            let mut tail = [0u8; 4];
            tail[..bytes.len() - whole].copy_from_slice(&bytes[whole..]);
            self.queue.write_buffer(&buffer, whole as u64, &tail);
        }
        Ok(WgpuBuffer { buffer })
    }

    fn read_buffer(&self, buffer: &WgpuBuffer) -> RasterResult<Vec<u8>> {
        let size = buffer.buffer.size();
        let staging = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("gpraster_readback"),
            size,
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("gpraster_readback_encoder"),
            });
        encoder.copy_buffer_to_buffer(&buffer.buffer, 0, &staging, 0, size);
        self.queue.submit(Some(encoder.finish()));

        let slice = staging.slice(..);
        let (tx, rx) = std::sync::mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |res| {
            let _ = tx.send(res);
        });
        self.device
            .poll(wgpu::PollType::wait_indefinitely())
            .map_err(|e| RasterError::encoder(format!("wgpu poll failed: {e:?}")))?;
        rx.recv()
            .map_err(|_| RasterError::encoder("readback channel closed"))?
            .map_err(|e| RasterError::encoder(format!("readback map failed: {e:?}")))?;

        let mapped = slice.get_mapped_range();
        let out = mapped.to_vec();
        drop(mapped);
        staging.unmap();
        Ok(out)
    }

    fn buffer_len(&self, buffer: &WgpuBuffer) -> usize {
        buffer.buffer.size() as usize
    }

    fn same_buffer(&self, a: &WgpuBuffer, b: &WgpuBuffer) -> bool {
        a.buffer == b.buffer
    }

    fn make_command_buffer(&self) -> RasterResult<WgpuCommandBuffer> {
        Ok(WgpuCommandBuffer {
            device: self.device.clone(),
            queue: self.queue.clone(),
            encoder: self
                .device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("gpraster_commands"),
                }),
            pass: None,
            open: None,
        })
    }
}
