//! Capability interface over the compute/draw device.
//!
//! The simulation core records all of its work through these traits and never
//! touches a concrete device type; adapters (the wgpu backend, the CPU
//! reference executor) supply the implementations. Handles are opaque cookies
//! issued by the adapter — they double as cache keys for render-info
//! assembly.

use crate::error::RenderResult;
use crate::graph::ResourceHandle;

/// Opaque device buffer identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BufferHandle(pub u64);

/// Opaque device image identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ImageHandle(pub u64);

/// Opaque transform-plan identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TransformHandle(pub u64);

/// Logical texel formats used by the pipeline. Adapters may widen these to
/// whatever their storage-image rules require, as long as sampling the
/// declared channels behaves as specified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageFormat {
    R16Float,
    Rg16Float,
    Rgba16Float,
}

impl ImageFormat {
    pub fn channels(self) -> u32 {
        match self {
            ImageFormat::R16Float => 1,
            ImageFormat::Rg16Float => 2,
            ImageFormat::Rgba16Float => 4,
        }
    }
}

/// Stock samplers, named the way the kernels use them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SamplerKind {
    NearestWrap,
    LinearWrap,
    TrilinearWrap,
}

/// What an inverse transform produces per bin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransformKind {
    /// Complex frequency input, real spatial output.
    ComplexToReal,
    /// Complex input, complex output.
    ComplexToComplex,
}

/// Inverse 2D spectral transform plan description. Input is a buffer of
/// packed 16-bit complex bins; output precision is 16-bit float throughout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TransformDesc {
    pub size: u32,
    pub kind: TransformKind,
}

/// Destination of a transform's spatial-domain output.
#[derive(Debug, Clone, Copy)]
pub struct TransformTarget {
    pub image: ImageHandle,
    pub level: u32,
}

impl TransformTarget {
    pub fn base(image: ImageHandle) -> Self {
        Self { image, level: 0 }
    }
}

/// Device-lifetime resource creation. Everything created here dies with the
/// device context; the per-frame transient resources come from
/// [`crate::graph::ResourceGraph`] instead.
pub trait OceanDevice {
    fn create_vertex_buffer(&mut self, label: &str, data: &[u8]) -> RenderResult<BufferHandle>;
    fn create_index_buffer(&mut self, label: &str, data: &[u8]) -> RenderResult<BufferHandle>;
    /// Zero-initialized storage buffer.
    fn create_storage_buffer(&mut self, label: &str, size: u64) -> RenderResult<BufferHandle>;
    fn write_buffer(&mut self, buffer: BufferHandle, offset: u64, data: &[u8]) -> RenderResult<()>;
    /// Build a transform plan. Adapters share compiled programs and twiddle
    /// data across plans internally.
    fn create_transform(&mut self, desc: TransformDesc) -> RenderResult<TransformHandle>;
}

/// Compute recording surface handed to each pass body.
///
/// Binding model: resources bind at (set, binding) slots matching the WGSL
/// declarations; samplers implied by [`CommandEncoder::set_texture`] occupy
/// `binding + 8` in the same set. A small Pod parameter block rides along
/// with the next dispatch.
pub trait CommandEncoder {
    /// Select a compute program by logical name, with preprocessor-style
    /// variant flags (adapter maps these to entry points / specializations).
    fn set_program(&mut self, name: &str, variants: &[(&str, i32)]);
    fn set_storage_buffer(&mut self, set: u32, binding: u32, buffer: BufferHandle);
    fn set_storage_texture(&mut self, set: u32, binding: u32, image: ImageHandle, level: u32);
    fn set_texture(&mut self, set: u32, binding: u32, image: ImageHandle, sampler: SamplerKind);
    /// Bind a transient block of constant data (frustum planes, counter
    /// seeds) at a (set, binding) slot.
    fn bind_uniform_data(&mut self, set: u32, binding: u32, data: &[u8]);
    /// Fixed-layout parameter block for the next dispatch.
    fn push_constants(&mut self, data: &[u8]);
    fn dispatch(&mut self, x: u32, y: u32, z: u32);
    /// Write→read ordering point: all writes recorded before the barrier are
    /// visible to everything recorded after it. Stages between two barriers
    /// may overlap on the device.
    fn barrier(&mut self);
    /// Run a transform plan: consume a frequency-domain input buffer, write
    /// the spatial-domain output. Ordering relative to surrounding work is
    /// the caller's responsibility via [`CommandEncoder::barrier`].
    fn transform(&mut self, plan: TransformHandle, output: TransformTarget, input: BufferHandle);
}

/// Per-frame recording context: compute recording plus resolution of declared
/// transient resources to this frame's physical handles.
pub trait FrameContext: CommandEncoder {
    fn physical_image(&self, resource: ResourceHandle) -> ImageHandle;
    fn physical_buffer(&self, resource: ResourceHandle) -> BufferHandle;
}

/// Indirect draw facility consumed by render-info assembly.
pub trait DrawEncoder {
    /// Bind one LOD's patch mesh (vertex + index buffer) and its instance
    /// region base within the shared cell-data buffer.
    fn bind_mesh(&mut self, lod: u32, vertex: BufferHandle, index: BufferHandle, instance_base: u32);
    /// Issue one indexed indirect draw sourcing its arguments from
    /// `buffer` at `offset`.
    fn draw_indexed_indirect(&mut self, buffer: BufferHandle, offset: u64);
}
