//! wgpu device adapter.
//!
//! Implements the capability interface over a real compute device. Recording
//! is deferred: the core's dispatches accumulate into a command list and
//! [`WgpuBackend::submit`] replays them, opening a new compute pass at every
//! barrier so each write→read edge maps onto a pass boundary. Compute
//! pipelines derive their bind group layouts from the shaders and are cached
//! per (program, entry point); shader modules are shared across pipelines and
//! transform plans.

use std::borrow::Cow;
use std::collections::HashMap;

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};
use wgpu::util::DeviceExt;

use crate::config::{natural_mip_levels, OceanConfig};
use crate::device::{
    BufferHandle, CommandEncoder, DrawEncoder, FrameContext, ImageHandle, OceanDevice,
    SamplerKind, TransformDesc, TransformHandle, TransformKind, TransformTarget,
};
use crate::error::{RenderError, RenderResult};
use crate::gpu::{align_copy_bpr, ctx, GpuContext};
use crate::graph::{AttachmentInfo, BufferInfo, ResourceGraph, ResourceHandle};
use crate::ocean::{
    PROGRAM_BAKE_MAPS, PROGRAM_CULL_BLOCKS, PROGRAM_GENERATE_SPECTRUM, PROGRAM_INIT_COUNTERS,
    PROGRAM_MIPMAP, PROGRAM_UPDATE_LOD,
};
use crate::render::OceanRenderInfo;

/// Internal program driving the Stockham transform stages.
const PROGRAM_FFT: &str = "ocean/fft";

const TARGET_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;

/// Per-stage parameters of the transform kernels.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
struct FftStageParams {
    n: u32,
    ls: u32,
    axis: u32,
    sign: f32,
}

struct GpuImage {
    #[allow(dead_code)]
    texture: wgpu::Texture,
    storage_views: Vec<wgpu::TextureView>,
    sampled_view: wgpu::TextureView,
}

struct FftPlan {
    desc: TransformDesc,
    ping: BufferHandle,
    pong: BufferHandle,
}

#[derive(Clone)]
enum Bind {
    Buffer(BufferHandle),
    StorageTexture(ImageHandle, u32),
    Sampled(ImageHandle, SamplerKind),
    Uniform(Vec<u8>),
}

struct DispatchCmd {
    program: String,
    entry: &'static str,
    binds: Vec<(u32, u32, Bind)>,
    params: Vec<u8>,
    groups: [u32; 3],
}

enum Cmd {
    Dispatch(DispatchCmd),
    Barrier,
}

#[derive(Clone, Copy)]
enum Declared {
    Image(ImageHandle),
    Buffer(BufferHandle),
}

pub struct WgpuBackend {
    gpu: &'static GpuContext,
    next_id: u64,
    buffers: HashMap<u64, wgpu::Buffer>,
    images: HashMap<u64, GpuImage>,
    transforms: HashMap<u64, FftPlan>,
    samplers: HashMap<SamplerKind, wgpu::Sampler>,
    modules: HashMap<String, wgpu::ShaderModule>,
    pipelines: HashMap<(String, &'static str), wgpu::ComputePipeline>,
    declared: Vec<Declared>,
    cmds: Vec<Cmd>,
    // live encoder state
    program: String,
    entry: &'static str,
    binds: Vec<(u32, u32, Bind)>,
    params: Vec<u8>,
}

impl Default for WgpuBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl WgpuBackend {
    pub fn new() -> Self {
        let gpu = ctx();
        let mut samplers = HashMap::new();
        for kind in [
            SamplerKind::NearestWrap,
            SamplerKind::LinearWrap,
            SamplerKind::TrilinearWrap,
        ] {
            samplers.insert(kind, create_sampler(&gpu.device, kind));
        }
        Self {
            gpu,
            next_id: 1,
            buffers: HashMap::new(),
            images: HashMap::new(),
            transforms: HashMap::new(),
            samplers,
            modules: HashMap::new(),
            pipelines: HashMap::new(),
            declared: Vec::new(),
            cmds: Vec::new(),
            program: String::new(),
            entry: "",
            binds: Vec::new(),
            params: Vec::new(),
        }
    }

    fn alloc_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn register_buffer(&mut self, buffer: wgpu::Buffer) -> BufferHandle {
        let id = self.alloc_id();
        self.buffers.insert(id, buffer);
        BufferHandle(id)
    }

    pub(crate) fn raw_buffer(&self, handle: BufferHandle) -> &wgpu::Buffer {
        &self.buffers[&handle.0]
    }

    fn raw_image(&self, handle: ImageHandle) -> &GpuImage {
        &self.images[&handle.0]
    }

    fn create_scratch_buffer(&mut self, label: &str, size: u64) -> BufferHandle {
        let buffer = self.gpu.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size,
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        self.register_buffer(buffer)
    }

    fn ensure_pipeline(&mut self, program: &str, entry: &'static str) {
        let key = (program.to_string(), entry);
        if self.pipelines.contains_key(&key) {
            return;
        }
        if !self.modules.contains_key(program) {
            let module = self
                .gpu
                .device
                .create_shader_module(wgpu::ShaderModuleDescriptor {
                    label: Some(program),
                    source: wgpu::ShaderSource::Wgsl(Cow::Borrowed(shader_source(program))),
                });
            self.modules.insert(program.to_string(), module);
        }
        let module = &self.modules[program];
        let pipeline = self
            .gpu
            .device
            .create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
                label: Some(&format!("{program}:{entry}")),
                layout: None,
                module,
                entry_point: entry,
            });
        self.pipelines.insert(key, pipeline);
    }

    fn build_bind_groups(
        &self,
        cmd: &DispatchCmd,
        pipeline: &wgpu::ComputePipeline,
    ) -> Vec<(u32, wgpu::BindGroup)> {
        let device = &self.gpu.device;
        let mut sets: Vec<u32> = cmd.binds.iter().map(|(set, _, _)| *set).collect();
        if !cmd.params.is_empty() {
            sets.push(1);
        }
        sets.sort_unstable();
        sets.dedup();

        let mut bind_groups = Vec::new();
        for set in sets {
            let mut entries = Vec::new();
            // Transient uniform blocks live just long enough to be captured
            // by the bind group.
            let mut transient: Vec<(u32, wgpu::Buffer)> = Vec::new();

            for (bind_set, binding, bind) in &cmd.binds {
                if *bind_set != set {
                    continue;
                }
                match bind {
                    Bind::Uniform(data) => {
                        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                            label: Some("ocean.uniform-data"),
                            contents: data,
                            usage: wgpu::BufferUsages::UNIFORM,
                        });
                        transient.push((*binding, buffer));
                    }
                    _ => {}
                }
            }
            if set == 1 && !cmd.params.is_empty() {
                let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("ocean.params"),
                    contents: &cmd.params,
                    usage: wgpu::BufferUsages::UNIFORM,
                });
                transient.push((0, buffer));
            }

            for (bind_set, binding, bind) in &cmd.binds {
                if *bind_set != set {
                    continue;
                }
                match bind {
                    Bind::Buffer(handle) => entries.push(wgpu::BindGroupEntry {
                        binding: *binding,
                        resource: self.raw_buffer(*handle).as_entire_binding(),
                    }),
                    Bind::StorageTexture(handle, level) => entries.push(wgpu::BindGroupEntry {
                        binding: *binding,
                        resource: wgpu::BindingResource::TextureView(
                            &self.raw_image(*handle).storage_views[*level as usize],
                        ),
                    }),
                    Bind::Sampled(handle, sampler) => {
                        entries.push(wgpu::BindGroupEntry {
                            binding: *binding,
                            resource: wgpu::BindingResource::TextureView(
                                &self.raw_image(*handle).sampled_view,
                            ),
                        });
                        entries.push(wgpu::BindGroupEntry {
                            binding: *binding + 8,
                            resource: wgpu::BindingResource::Sampler(&self.samplers[sampler]),
                        });
                    }
                    Bind::Uniform(_) => {}
                }
            }
            for (binding, buffer) in &transient {
                entries.push(wgpu::BindGroupEntry {
                    binding: *binding,
                    resource: buffer.as_entire_binding(),
                });
            }

            let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some(&format!("{}:{}:set{set}", cmd.program, cmd.entry)),
                layout: &pipeline.get_bind_group_layout(set),
                entries: &entries,
            });
            bind_groups.push((set, bind_group));
        }
        bind_groups
    }

    /// Replay the recorded command list. Barriers split compute passes;
    /// within a pass the device orders dispatch hazards itself.
    pub fn submit(&mut self) {
        let cmds = std::mem::take(&mut self.cmds);
        if cmds.is_empty() {
            return;
        }

        // Resolve pipelines first so replay can borrow the cache immutably.
        for cmd in &cmds {
            if let Cmd::Dispatch(dispatch) = cmd {
                self.ensure_pipeline(&dispatch.program, dispatch.entry);
            }
        }

        let mut pass_groups: Vec<Vec<(&DispatchCmd, Vec<(u32, wgpu::BindGroup)>)>> =
            vec![Vec::new()];
        for cmd in &cmds {
            match cmd {
                Cmd::Barrier => {
                    if !pass_groups.last().map_or(false, |group| group.is_empty()) {
                        pass_groups.push(Vec::new());
                    }
                }
                Cmd::Dispatch(dispatch) => {
                    let key = (dispatch.program.clone(), dispatch.entry);
                    let pipeline = &self.pipelines[&key];
                    let bind_groups = self.build_bind_groups(dispatch, pipeline);
                    pass_groups
                        .last_mut()
                        .expect("at least one pass group")
                        .push((dispatch, bind_groups));
                }
            }
        }

        let mut encoder = self
            .gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("ocean.compute"),
            });
        for group in &pass_groups {
            if group.is_empty() {
                continue;
            }
            let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some("ocean.compute-pass"),
                timestamp_writes: None,
            });
            for (dispatch, bind_groups) in group {
                let key = (dispatch.program.clone(), dispatch.entry);
                pass.set_pipeline(&self.pipelines[&key]);
                for (set, bind_group) in bind_groups {
                    pass.set_bind_group(*set, bind_group, &[]);
                }
                pass.dispatch_workgroups(
                    dispatch.groups[0],
                    dispatch.groups[1],
                    dispatch.groups[2],
                );
            }
        }
        self.gpu.queue.submit(Some(encoder.finish()));
    }

    fn push_fft_dispatch(
        &mut self,
        entry: &'static str,
        binds: Vec<(u32, u32, Bind)>,
        params: FftStageParams,
        groups: [u32; 3],
    ) {
        self.cmds.push(Cmd::Dispatch(DispatchCmd {
            program: PROGRAM_FFT.to_string(),
            entry,
            binds,
            params: bytemuck::bytes_of(&params).to_vec(),
            groups,
        }));
    }
}

fn create_sampler(device: &wgpu::Device, kind: SamplerKind) -> wgpu::Sampler {
    let (filter, mip_filter, label) = match kind {
        SamplerKind::NearestWrap => (
            wgpu::FilterMode::Nearest,
            wgpu::FilterMode::Nearest,
            "ocean.sampler.nearest-wrap",
        ),
        SamplerKind::LinearWrap => (
            wgpu::FilterMode::Linear,
            wgpu::FilterMode::Nearest,
            "ocean.sampler.linear-wrap",
        ),
        SamplerKind::TrilinearWrap => (
            wgpu::FilterMode::Linear,
            wgpu::FilterMode::Linear,
            "ocean.sampler.trilinear-wrap",
        ),
    };
    device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some(label),
        address_mode_u: wgpu::AddressMode::Repeat,
        address_mode_v: wgpu::AddressMode::Repeat,
        address_mode_w: wgpu::AddressMode::Repeat,
        mag_filter: filter,
        min_filter: filter,
        mipmap_filter: mip_filter,
        ..Default::default()
    })
}

fn shader_source(program: &str) -> &'static str {
    match program {
        PROGRAM_GENERATE_SPECTRUM => include_str!("../shaders/ocean_spectrum.wgsl"),
        PROGRAM_UPDATE_LOD => include_str!("../shaders/ocean_lod.wgsl"),
        PROGRAM_INIT_COUNTERS => include_str!("../shaders/ocean_counters.wgsl"),
        PROGRAM_CULL_BLOCKS => include_str!("../shaders/ocean_cull.wgsl"),
        PROGRAM_BAKE_MAPS => include_str!("../shaders/ocean_bake.wgsl"),
        PROGRAM_MIPMAP => include_str!("../shaders/ocean_mipmap.wgsl"),
        PROGRAM_FFT => include_str!("../shaders/ocean_fft.wgsl"),
        other => panic!("unknown compute program {other:?}"),
    }
}

fn resolve_entry(program: &str, variants: &[(&str, i32)]) -> &'static str {
    let has = |name: &str| variants.iter().any(|(key, _)| *key == name);
    match program {
        PROGRAM_GENERATE_SPECTRUM => {
            if has("GRADIENT_DISPLACEMENT") {
                "displacement_main"
            } else if has("GRADIENT_NORMAL") {
                "normal_main"
            } else {
                "height_main"
            }
        }
        PROGRAM_MIPMAP => {
            if has("MIPMAP_TEXEL_CENTER") {
                "cs_rgba_center"
            } else if has("MIPMAP_RG16F") {
                "cs_rg"
            } else {
                "cs_rgba"
            }
        }
        _ => "cs_main",
    }
}

impl OceanDevice for WgpuBackend {
    fn create_vertex_buffer(&mut self, label: &str, data: &[u8]) -> RenderResult<BufferHandle> {
        let buffer = self
            .gpu
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(label),
                contents: data,
                usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            });
        Ok(self.register_buffer(buffer))
    }

    fn create_index_buffer(&mut self, label: &str, data: &[u8]) -> RenderResult<BufferHandle> {
        let buffer = self
            .gpu
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(label),
                contents: data,
                usage: wgpu::BufferUsages::INDEX | wgpu::BufferUsages::COPY_DST,
            });
        Ok(self.register_buffer(buffer))
    }

    fn create_storage_buffer(&mut self, label: &str, size: u64) -> RenderResult<BufferHandle> {
        if size == 0 {
            return Err(RenderError::device("zero-sized storage buffer"));
        }
        // wgpu guarantees zero initialization of freshly created buffers.
        let buffer = self.gpu.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size,
            usage: wgpu::BufferUsages::STORAGE
                | wgpu::BufferUsages::COPY_DST
                | wgpu::BufferUsages::COPY_SRC,
            mapped_at_creation: false,
        });
        Ok(self.register_buffer(buffer))
    }

    fn write_buffer(&mut self, buffer: BufferHandle, offset: u64, data: &[u8]) -> RenderResult<()> {
        let raw = self
            .buffers
            .get(&buffer.0)
            .ok_or_else(|| RenderError::upload("unknown buffer"))?;
        self.gpu.queue.write_buffer(raw, offset, data);
        Ok(())
    }

    fn create_transform(&mut self, desc: TransformDesc) -> RenderResult<TransformHandle> {
        let scratch = u64::from(desc.size) * u64::from(desc.size) * 4;
        let ping = self.create_scratch_buffer("ocean.fft.ping", scratch);
        let pong = self.create_scratch_buffer("ocean.fft.pong", scratch);
        // Warm the shared program cache so plan creation, not the first
        // frame, pays for compilation.
        self.ensure_pipeline(PROGRAM_FFT, "cs_stage");
        self.ensure_pipeline(
            PROGRAM_FFT,
            match desc.kind {
                TransformKind::ComplexToReal => "cs_writeout_real",
                TransformKind::ComplexToComplex => "cs_writeout_complex",
            },
        );
        let id = self.alloc_id();
        self.transforms.insert(id, FftPlan { desc, ping, pong });
        Ok(TransformHandle(id))
    }
}

impl ResourceGraph for WgpuBackend {
    fn declare_storage_image(&mut self, name: &str, info: AttachmentInfo) -> ResourceHandle {
        let levels = if info.levels == 0 {
            natural_mip_levels(info.width, info.height)
        } else {
            info.levels
        };
        // Logical 16-bit formats widen to rgba16float: WebGPU storage images
        // do not support the one- and two-channel 16-bit variants.
        let texture = self.gpu.device.create_texture(&wgpu::TextureDescriptor {
            label: Some(name),
            size: wgpu::Extent3d {
                width: info.width,
                height: info.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: levels,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba16Float,
            usage: wgpu::TextureUsages::STORAGE_BINDING
                | wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let storage_views = (0..levels)
            .map(|level| {
                texture.create_view(&wgpu::TextureViewDescriptor {
                    label: Some(&format!("{name}.mip{level}")),
                    base_mip_level: level,
                    mip_level_count: Some(1),
                    ..Default::default()
                })
            })
            .collect();
        let sampled_view = texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some(name),
            ..Default::default()
        });

        let id = self.alloc_id();
        self.images.insert(
            id,
            GpuImage {
                texture,
                storage_views,
                sampled_view,
            },
        );
        self.declared.push(Declared::Image(ImageHandle(id)));
        ResourceHandle(self.declared.len() - 1)
    }

    fn declare_storage_buffer(&mut self, name: &str, info: BufferInfo) -> ResourceHandle {
        let mut usage = wgpu::BufferUsages::STORAGE
            | wgpu::BufferUsages::COPY_DST
            | wgpu::BufferUsages::COPY_SRC;
        if info.indirect {
            usage |= wgpu::BufferUsages::INDIRECT;
        }
        let buffer = self.gpu.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(name),
            size: info.size,
            usage,
            mapped_at_creation: false,
        });
        let handle = self.register_buffer(buffer);
        self.declared.push(Declared::Buffer(handle));
        ResourceHandle(self.declared.len() - 1)
    }
}

impl CommandEncoder for WgpuBackend {
    fn set_program(&mut self, name: &str, variants: &[(&str, i32)]) {
        self.program = name.to_string();
        self.entry = resolve_entry(name, variants);
        self.binds.clear();
        self.params.clear();
    }

    fn set_storage_buffer(&mut self, set: u32, binding: u32, buffer: BufferHandle) {
        self.binds.push((set, binding, Bind::Buffer(buffer)));
    }

    fn set_storage_texture(&mut self, set: u32, binding: u32, image: ImageHandle, level: u32) {
        self.binds
            .push((set, binding, Bind::StorageTexture(image, level)));
    }

    fn set_texture(&mut self, set: u32, binding: u32, image: ImageHandle, sampler: SamplerKind) {
        self.binds.push((set, binding, Bind::Sampled(image, sampler)));
    }

    fn bind_uniform_data(&mut self, set: u32, binding: u32, data: &[u8]) {
        self.binds
            .push((set, binding, Bind::Uniform(data.to_vec())));
    }

    fn push_constants(&mut self, data: &[u8]) {
        self.params = data.to_vec();
    }

    fn dispatch(&mut self, x: u32, y: u32, z: u32) {
        self.cmds.push(Cmd::Dispatch(DispatchCmd {
            program: self.program.clone(),
            entry: self.entry,
            binds: self.binds.clone(),
            params: self.params.clone(),
            groups: [x, y, z],
        }));
    }

    fn barrier(&mut self) {
        self.cmds.push(Cmd::Barrier);
    }

    fn transform(&mut self, plan: TransformHandle, output: TransformTarget, input: BufferHandle) {
        let (desc, ping, pong) = {
            let plan = &self.transforms[&plan.0];
            (plan.desc, plan.ping, plan.pong)
        };
        let n = desc.size;
        let stages = n.trailing_zeros();
        let stage_groups = [(n / 2 + 63) / 64, n, 1];

        let mut src = input;
        let mut dst = ping;
        for axis in 0..2u32 {
            let mut ls = 1u32;
            for _ in 0..stages {
                self.push_fft_dispatch(
                    "cs_stage",
                    vec![(0, 0, Bind::Buffer(src)), (0, 1, Bind::Buffer(dst))],
                    FftStageParams {
                        n,
                        ls,
                        axis,
                        sign: 1.0,
                    },
                    stage_groups,
                );
                self.cmds.push(Cmd::Barrier);
                src = dst;
                dst = if src == ping { pong } else { ping };
                ls <<= 1;
            }
        }

        let entry = match desc.kind {
            TransformKind::ComplexToReal => "cs_writeout_real",
            TransformKind::ComplexToComplex => "cs_writeout_complex",
        };
        self.push_fft_dispatch(
            entry,
            vec![
                (0, 0, Bind::Buffer(src)),
                (0, 2, Bind::StorageTexture(output.image, output.level)),
            ],
            FftStageParams {
                n,
                ls: 0,
                axis: 0,
                sign: 1.0,
            },
            [(n + 7) / 8, (n + 7) / 8, 1],
        );
    }
}

impl FrameContext for WgpuBackend {
    fn physical_image(&self, resource: ResourceHandle) -> ImageHandle {
        match self.declared[resource.0] {
            Declared::Image(handle) => handle,
            Declared::Buffer(_) => panic!("resource {} is a buffer", resource.0),
        }
    }

    fn physical_buffer(&self, resource: ResourceHandle) -> BufferHandle {
        match self.declared[resource.0] {
            Declared::Buffer(handle) => handle,
            Declared::Image(_) => panic!("resource {} is an image", resource.0),
        }
    }
}

// ---------- draw side ----------

/// Backend-neutral collection of the per-LOD indirect draws.
#[derive(Default)]
pub struct DrawList {
    pending: Option<(u32, BufferHandle, BufferHandle, u32)>,
    pub ops: Vec<DrawOp>,
}

pub struct DrawOp {
    pub lod: u32,
    pub vertex: BufferHandle,
    pub index: BufferHandle,
    pub instance_base: u32,
    pub indirect: BufferHandle,
    pub indirect_offset: u64,
}

impl DrawEncoder for DrawList {
    fn bind_mesh(
        &mut self,
        lod: u32,
        vertex: BufferHandle,
        index: BufferHandle,
        instance_base: u32,
    ) {
        self.pending = Some((lod, vertex, index, instance_base));
    }

    fn draw_indexed_indirect(&mut self, buffer: BufferHandle, offset: u64) {
        let (lod, vertex, index, instance_base) =
            self.pending.take().expect("bind_mesh precedes draw");
        self.ops.push(DrawOp {
            lod,
            vertex,
            index,
            instance_base,
            indirect: buffer,
            indirect_offset: offset,
        });
    }
}

/// Uniforms of the surface shaders; must match `Globals` in WGSL.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
struct SurfaceGlobals {
    view_proj: [[f32; 4]; 4],
    camera_pos: [f32; 4],
    inv_world_size: [f32; 2],
    inv_heightmap_size: [f32; 2],
    normal_uv_scale: [f32; 2],
    integer_to_world: [f32; 2],
    heightmap_range: [f32; 2],
    _pad: [f32; 2],
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
struct SurfaceDrawParams {
    instance_base: u32,
    lod: f32,
    _pad: [u32; 2],
}

/// Offscreen renderer consuming the assembled render info: one indexed
/// indirect draw per LOD bucket, triangle strips with primitive restart.
pub struct OceanRenderer {
    pipeline: wgpu::RenderPipeline,
    globals: wgpu::Buffer,
    target: wgpu::Texture,
    target_view: wgpu::TextureView,
    width: u32,
    height: u32,
}

impl OceanRenderer {
    pub fn new(width: u32, height: u32) -> RenderResult<Self> {
        let device = &ctx().device;
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("ocean.surface-shader"),
            source: wgpu::ShaderSource::Wgsl(Cow::Borrowed(include_str!(
                "../shaders/ocean_surface.wgsl"
            ))),
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("ocean.surface-pipeline"),
            layout: None,
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: "vs_main",
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: 8,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &wgpu::vertex_attr_array![0 => Uint8x4, 1 => Unorm8x4],
                }],
            },
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleStrip,
                strip_index_format: Some(wgpu::IndexFormat::Uint16),
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                unclipped_depth: false,
                polygon_mode: wgpu::PolygonMode::Fill,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: "fs_main",
                targets: &[Some(wgpu::ColorTargetState {
                    format: TARGET_FORMAT,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            multiview: None,
        });

        let globals = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("ocean.surface-globals"),
            size: std::mem::size_of::<SurfaceGlobals>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let target = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("ocean.surface-target"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: TARGET_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let target_view = target.create_view(&wgpu::TextureViewDescriptor::default());

        Ok(Self {
            pipeline,
            globals,
            target,
            target_view,
            width,
            height,
        })
    }

    /// Render one frame of the assembled ocean into the offscreen target.
    pub fn render(
        &self,
        backend: &WgpuBackend,
        info: &OceanRenderInfo,
        config: &OceanConfig,
        view_proj: Mat4,
        camera: Vec3,
    ) -> RenderResult<()> {
        let device = &ctx().device;
        let queue = &ctx().queue;

        let globals = SurfaceGlobals {
            view_proj: view_proj.to_cols_array_2d(),
            camera_pos: [camera.x, camera.y, camera.z, 1.0],
            inv_world_size: (glam::Vec2::ONE / config.world_size).to_array(),
            inv_heightmap_size: info.data.inv_heightmap_size,
            normal_uv_scale: info.data.normal_uv_scale,
            integer_to_world: info.data.integer_to_world,
            heightmap_range: info.data.heightmap_range,
            _pad: [0.0; 2],
        };
        queue.write_buffer(&self.globals, 0, bytemuck::bytes_of(&globals));

        let shared_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("ocean.surface-bind-group"),
            layout: &self.pipeline.get_bind_group_layout(0),
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: self.globals.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: backend.raw_buffer(info.instance_data).as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::TextureView(
                        &backend.raw_image(info.height_displacement).sampled_view,
                    ),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::TextureView(
                        &backend.raw_image(info.gradient_jacobian).sampled_view,
                    ),
                },
                wgpu::BindGroupEntry {
                    binding: 4,
                    resource: wgpu::BindingResource::TextureView(
                        &backend.raw_image(info.normal).sampled_view,
                    ),
                },
                wgpu::BindGroupEntry {
                    binding: 5,
                    resource: wgpu::BindingResource::Sampler(
                        &backend.samplers[&SamplerKind::LinearWrap],
                    ),
                },
                wgpu::BindGroupEntry {
                    binding: 6,
                    resource: wgpu::BindingResource::Sampler(
                        &backend.samplers[&SamplerKind::TrilinearWrap],
                    ),
                },
            ],
        });

        let mut draws = DrawList::default();
        crate::render::record_draws(info, &mut draws);

        let mut per_draw = Vec::new();
        for op in &draws.ops {
            let params = SurfaceDrawParams {
                instance_base: op.instance_base,
                lod: op.lod as f32,
                _pad: [0; 2],
            };
            let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("ocean.surface-draw-params"),
                contents: bytemuck::bytes_of(&params),
                usage: wgpu::BufferUsages::UNIFORM,
            });
            let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("ocean.surface-draw-bind-group"),
                layout: &self.pipeline.get_bind_group_layout(1),
                entries: &[wgpu::BindGroupEntry {
                    binding: 0,
                    resource: buffer.as_entire_binding(),
                }],
            });
            per_draw.push((buffer, bind_group));
        }

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("ocean.render"),
        });
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("ocean.surface-pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &self.target_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: 0.18,
                            g: 0.32,
                            b: 0.48,
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            pass.set_pipeline(&self.pipeline);
            pass.set_bind_group(0, &shared_bind_group, &[]);
            for (op, (_, bind_group)) in draws.ops.iter().zip(per_draw.iter()) {
                pass.set_bind_group(1, bind_group, &[]);
                pass.set_vertex_buffer(0, backend.raw_buffer(op.vertex).slice(..));
                pass.set_index_buffer(
                    backend.raw_buffer(op.index).slice(..),
                    wgpu::IndexFormat::Uint16,
                );
                pass.draw_indexed_indirect(
                    backend.raw_buffer(op.indirect),
                    op.indirect_offset,
                );
            }
        }
        queue.submit(Some(encoder.finish()));
        Ok(())
    }

    /// Read the target back as tightly packed RGBA8 rows.
    pub fn read_rgba(&self) -> RenderResult<Vec<u8>> {
        let device = &ctx().device;
        let queue = &ctx().queue;
        let bytes_per_row = align_copy_bpr(self.width * 4);

        let readback = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("ocean.surface-readback"),
            size: u64::from(bytes_per_row) * u64::from(self.height),
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("ocean.readback"),
        });
        encoder.copy_texture_to_buffer(
            wgpu::ImageCopyTexture {
                texture: &self.target,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::ImageCopyBuffer {
                buffer: &readback,
                layout: wgpu::ImageDataLayout {
                    offset: 0,
                    bytes_per_row: Some(bytes_per_row),
                    rows_per_image: Some(self.height),
                },
            },
            wgpu::Extent3d {
                width: self.width,
                height: self.height,
                depth_or_array_layers: 1,
            },
        );
        queue.submit(Some(encoder.finish()));

        let slice = readback.slice(..);
        let (sender, receiver) = std::sync::mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = sender.send(result);
        });
        device.poll(wgpu::Maintain::Wait);
        receiver
            .recv()
            .map_err(|_| RenderError::readback("map callback dropped"))?
            .map_err(|e| RenderError::readback(format!("failed to map readback buffer: {e:?}")))?;

        let data = slice.get_mapped_range();
        let mut pixels = vec![0u8; (self.width * self.height * 4) as usize];
        for y in 0..self.height as usize {
            let src = y * bytes_per_row as usize;
            let dst = y * self.width as usize * 4;
            let row = self.width as usize * 4;
            pixels[dst..dst + row].copy_from_slice(&data[src..src + row]);
        }
        drop(data);
        readback.unmap();
        Ok(pixels)
    }

    pub fn extent(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}
