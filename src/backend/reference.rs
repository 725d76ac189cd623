//! CPU reference executor.
//!
//! Interprets the ocean's compute kernels on host memory with the same
//! contracts the device shaders implement: packed 16-bit storage, wrap
//! sampling, and an atomic fetch-and-increment for the cull append. Inverse
//! transforms run through rustfft with a planner shared across plans.
//!
//! This adapter exists for tests and for machines without a usable GPU; it is
//! deliberately exact rather than fast, though grid-shaped kernels still fan
//! out over rayon.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};

use glam::{Vec2, Vec3};
use half::f16;
use rayon::prelude::*;
use rustfft::num_complex::Complex;
use rustfft::FftPlanner;

use crate::config::natural_mip_levels;
use crate::device::{
    BufferHandle, CommandEncoder, FrameContext, ImageHandle, OceanDevice, SamplerKind,
    TransformDesc, TransformHandle, TransformKind, TransformTarget,
};
use crate::error::{RenderError, RenderResult};
use crate::graph::{AttachmentInfo, BufferInfo, ResourceGraph, ResourceHandle};
use crate::ocean::{
    BakeParams, CullParams, LodMapParams, MipParams, SpectrumParams, PROGRAM_BAKE_MAPS,
    PROGRAM_CULL_BLOCKS, PROGRAM_GENERATE_SPECTRUM, PROGRAM_INIT_COUNTERS, PROGRAM_MIPMAP,
    PROGRAM_UPDATE_LOD,
};

const GRAVITY: f32 = 9.81;

/// Quantize through 16-bit float, mirroring device storage precision.
#[inline]
fn q16(v: f32) -> f32 {
    f16::from_f32(v).to_f32()
}

fn pack_complex(value: Complex<f32>) -> u32 {
    u32::from(f16::from_f32(value.re).to_bits())
        | (u32::from(f16::from_f32(value.im).to_bits()) << 16)
}

fn unpack_complex(bits: u32) -> Complex<f32> {
    Complex::new(
        f16::from_bits((bits & 0xffff) as u16).to_f32(),
        f16::from_bits((bits >> 16) as u16).to_f32(),
    )
}

struct RefBuffer {
    data: Vec<u8>,
}

struct RefImage {
    width: u32,
    height: u32,
    levels: Vec<Vec<[f32; 4]>>,
}

impl RefImage {
    fn new(width: u32, height: u32, levels: u32) -> Self {
        let levels = (0..levels)
            .map(|level| {
                let w = (width >> level).max(1) as usize;
                let h = (height >> level).max(1) as usize;
                vec![[0.0; 4]; w * h]
            })
            .collect();
        Self {
            width,
            height,
            levels,
        }
    }

    fn extent(&self, level: u32) -> (i32, i32) {
        (
            (self.width >> level).max(1) as i32,
            (self.height >> level).max(1) as i32,
        )
    }

    fn texel(&self, level: u32, x: i32, y: i32) -> [f32; 4] {
        let (w, h) = self.extent(level);
        let x = x.rem_euclid(w);
        let y = y.rem_euclid(h);
        self.levels[level as usize][(y * w + x) as usize]
    }

    /// Bilinear sample with wrap addressing, matching the device's wrap
    /// samplers.
    fn sample_bilinear(&self, level: u32, u: f32, v: f32) -> [f32; 4] {
        let (w, h) = self.extent(level);
        let x = u * w as f32 - 0.5;
        let y = v * h as f32 - 0.5;
        let x0 = x.floor();
        let y0 = y.floor();
        let fx = x - x0;
        let fy = y - y0;
        let (x0, y0) = (x0 as i32, y0 as i32);

        let mut out = [0.0f32; 4];
        let t00 = self.texel(level, x0, y0);
        let t10 = self.texel(level, x0 + 1, y0);
        let t01 = self.texel(level, x0, y0 + 1);
        let t11 = self.texel(level, x0 + 1, y0 + 1);
        for c in 0..4 {
            let top = t00[c] + (t10[c] - t00[c]) * fx;
            let bottom = t01[c] + (t11[c] - t01[c]) * fx;
            out[c] = top + (bottom - top) * fy;
        }
        out
    }
}

#[derive(Clone)]
enum Binding {
    StorageBuffer(BufferHandle),
    StorageTexture(ImageHandle, u32),
    SampledTexture(ImageHandle, SamplerKind),
    UniformData(Vec<u8>),
}

#[derive(Clone, Copy)]
enum Declared {
    Image(ImageHandle),
    Buffer(BufferHandle),
}

/// The executor: device, resource graph and command encoder in one object,
/// interpreting dispatches eagerly in submission order (which trivially
/// satisfies every barrier).
pub struct ReferenceBackend {
    next_id: u64,
    buffers: HashMap<u64, RefBuffer>,
    images: HashMap<u64, RefImage>,
    transforms: HashMap<u64, TransformDesc>,
    planner: FftPlanner<f32>,
    declared: Vec<Declared>,
    program: (String, Vec<(String, i32)>),
    binds: HashMap<(u32, u32), Binding>,
    params: Vec<u8>,
}

impl Default for ReferenceBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl ReferenceBackend {
    pub fn new() -> Self {
        Self {
            next_id: 1,
            buffers: HashMap::new(),
            images: HashMap::new(),
            transforms: HashMap::new(),
            planner: FftPlanner::new(),
            declared: Vec::new(),
            program: (String::new(), Vec::new()),
            binds: HashMap::new(),
            params: Vec::new(),
        }
    }

    fn alloc_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn new_buffer(&mut self, size: usize) -> BufferHandle {
        let id = self.alloc_id();
        self.buffers.insert(
            id,
            RefBuffer {
                data: vec![0u8; size],
            },
        );
        BufferHandle(id)
    }

    // ---------- test/readback accessors ----------

    pub fn buffer_data(&self, buffer: BufferHandle) -> &[u8] {
        &self.buffers[&buffer.0].data
    }

    pub fn buffer_words(&self, buffer: BufferHandle) -> Vec<u32> {
        bytemuck::pod_collect_to_vec(self.buffer_data(buffer))
    }

    pub fn image_levels(&self, image: ImageHandle) -> u32 {
        self.images[&image.0].levels.len() as u32
    }

    pub fn image_texel(&self, image: ImageHandle, level: u32, x: u32, y: u32) -> [f32; 4] {
        self.images[&image.0].texel(level, x as i32, y as i32)
    }

    pub fn image_level_data(&self, image: ImageHandle, level: u32) -> &[[f32; 4]] {
        &self.images[&image.0].levels[level as usize]
    }

    // ---------- binding lookups ----------

    fn bound_buffer(&self, set: u32, binding: u32) -> BufferHandle {
        match self.binds.get(&(set, binding)) {
            Some(Binding::StorageBuffer(handle)) => *handle,
            _ => panic!("kernel expects a storage buffer at ({set}, {binding})"),
        }
    }

    fn bound_storage_image(&self, set: u32, binding: u32) -> (ImageHandle, u32) {
        match self.binds.get(&(set, binding)) {
            Some(Binding::StorageTexture(handle, level)) => (*handle, *level),
            _ => panic!("kernel expects a storage texture at ({set}, {binding})"),
        }
    }

    fn bound_texture(&self, set: u32, binding: u32) -> ImageHandle {
        match self.binds.get(&(set, binding)) {
            Some(Binding::SampledTexture(handle, _)) => *handle,
            _ => panic!("kernel expects a sampled texture at ({set}, {binding})"),
        }
    }

    fn bound_uniform(&self, set: u32, binding: u32) -> Vec<u8> {
        match self.binds.get(&(set, binding)) {
            Some(Binding::UniformData(data)) => data.clone(),
            _ => panic!("kernel expects uniform data at ({set}, {binding})"),
        }
    }

    fn params_as<T: bytemuck::AnyBitPattern>(&self) -> T {
        bytemuck::pod_read_unaligned(&self.params[..std::mem::size_of::<T>()])
    }

    fn has_variant(&self, name: &str) -> bool {
        self.program.1.iter().any(|(key, _)| key == name)
    }

    // ---------- kernels ----------

    fn exec_update_lod(&mut self) {
        let params: LodMapParams = self.params_as();
        let (image, level) = self.bound_storage_image(0, 0);
        let camera = Vec3::from_array(params.camera_pos);
        let grid_base = Vec2::from_array(params.grid_base);
        let cell = Vec2::from_array(params.grid_size);
        let width = params.num_threads[0] as usize;

        let target = self.images.get_mut(&image.0).expect("bound image exists");
        target.levels[level as usize]
            .par_chunks_mut(width)
            .enumerate()
            .for_each(|(y, row)| {
                for (x, texel) in row.iter_mut().enumerate() {
                    let center =
                        grid_base + (Vec2::new(x as f32, y as f32) + 0.5) * cell;
                    let distance = camera
                        .distance(Vec3::new(center.x, 0.0, center.y))
                        .max(cell.x);
                    let lod = ((distance / cell.x).log2() - 1.0).clamp(0.0, params.max_lod);
                    *texel = [q16(lod), 0.0, 0.0, 0.0];
                }
            });
    }

    fn exec_init_counters(&mut self) {
        let seeds: Vec<u32> = bytemuck::pod_collect_to_vec(&self.bound_uniform(0, 1));
        let counters = self.bound_buffer(0, 0);
        let mut words = self.buffer_words(counters);
        let buckets = words.len() / 8;
        for bucket in 0..buckets {
            let record = &mut words[bucket * 8..bucket * 8 + 8];
            record.fill(0);
            record[0] = seeds.get(bucket).copied().unwrap_or(0);
        }
        self.buffers.get_mut(&counters.0).expect("bound buffer").data =
            bytemuck::cast_slice(&words).to_vec();
    }

    fn exec_cull_blocks(&mut self) {
        let params: CullParams = self.params_as();
        let planes: [[f32; 4]; 6] = bytemuck::pod_read_unaligned(&self.bound_uniform(0, 3));
        let lod_map = self.bound_texture(0, 2);
        let instance_data = self.bound_buffer(0, 0);
        let counters = self.bound_buffer(0, 1);

        let (gw, gh) = (params.num_threads[0], params.num_threads[1]);
        let grid_base = Vec2::from_array(params.grid_base);
        let cell = Vec2::from_array(params.grid_size);
        let lod_stride = params.lod_stride as usize;

        let lod_image = &self.images[&lod_map.0];
        let counter_words: Vec<AtomicU32> = self.buffer_words(counters)
            .into_iter()
            .map(AtomicU32::new)
            .collect();
        let data_words: Vec<AtomicU32> = self.buffer_words(instance_data)
            .into_iter()
            .map(AtomicU32::new)
            .collect();
        let bucket_count = counter_words.len() / 8;

        (0..gw * gh).into_par_iter().for_each(|i| {
            let x = i % gw;
            let y = i / gw;
            let lod = lod_image.texel(0, x, y)[0];
            let bucket = (lod.floor() as i32).clamp(0, bucket_count as i32 - 1) as usize;

            let base = grid_base + Vec2::new(x as f32, y as f32) * cell;
            let aabb_min = Vec3::new(base.x, params.heightmap_range[0], base.y);
            let aabb_max = Vec3::new(
                base.x + cell.x,
                params.heightmap_range[1],
                base.y + cell.y,
            );

            let visible = planes.iter().all(|plane| {
                let positive = Vec3::new(
                    if plane[0] >= 0.0 { aabb_max.x } else { aabb_min.x },
                    if plane[1] >= 0.0 { aabb_max.y } else { aabb_min.y },
                    if plane[2] >= 0.0 { aabb_max.z } else { aabb_min.z },
                );
                plane[0] * positive.x + plane[1] * positive.y + plane[2] * positive.z + plane[3]
                    >= 0.0
            });
            if !visible {
                return;
            }

            // The dense lock-free append: one fetch-and-increment reserves a
            // unique slot in the bucket's region.
            let slot = counter_words[bucket * 8 + 1].fetch_add(1, Ordering::Relaxed) as usize;
            if slot >= lod_stride {
                // Bucket region full: degrade by dropping the cell.
                return;
            }

            let neighbors = [
                lod_image.texel(0, x - 1, y)[0],
                lod_image.texel(0, x + 1, y)[0],
                lod_image.texel(0, x, y - 1)[0],
                lod_image.texel(0, x, y + 1)[0],
            ];
            let record = [
                base.x, base.y, lod, 0.0,
                neighbors[0], neighbors[1], neighbors[2], neighbors[3],
            ];
            let word_base = (bucket * lod_stride + slot) * 8;
            for (offset, value) in record.iter().enumerate() {
                data_words[word_base + offset].store(value.to_bits(), Ordering::Relaxed);
            }
        });

        let counter_out: Vec<u32> = counter_words
            .iter()
            .map(|w| w.load(Ordering::Relaxed))
            .collect();
        let data_out: Vec<u32> = data_words
            .iter()
            .map(|w| w.load(Ordering::Relaxed))
            .collect();
        self.buffers.get_mut(&counters.0).expect("bound buffer").data =
            bytemuck::cast_slice(&counter_out).to_vec();
        self.buffers
            .get_mut(&instance_data.0)
            .expect("bound buffer")
            .data = bytemuck::cast_slice(&data_out).to_vec();
    }

    fn exec_generate_spectrum(&mut self) {
        let params: SpectrumParams = self.params_as();
        let distribution = self.bound_buffer(0, 0);
        let output = self.bound_buffer(0, 1);
        let n = params.n[0] as i32;
        let scale = Vec2::from_array(params.freq_scale);
        let time = params.time;
        let displacement = self.has_variant("GRADIENT_DISPLACEMENT");
        let gradient = self.has_variant("GRADIENT_NORMAL");

        let raw: Vec<f32> = bytemuck::pod_collect_to_vec(self.buffer_data(distribution));
        let bins: Vec<Complex<f32>> = raw
            .chunks_exact(2)
            .map(|bin| Complex::new(bin[0], bin[1]))
            .collect();

        let out: Vec<u32> = (0..n * n)
            .map(|i| {
                let (x, y) = (i % n, i / n);
                // Signed frequency index: the upper half of each axis aliases
                // to negative frequencies.
                let fx = if x <= n / 2 { x } else { x - n };
                let fy = if y <= n / 2 { y } else { y - n };
                let k = Vec2::new(fx as f32, fy as f32) * scale;
                let k_len = k.length();

                // Deep-water dispersion drives the phase evolution.
                let omega = (GRAVITY * k_len).sqrt();
                let rotation = Complex::new((omega * time).cos(), (omega * time).sin());
                let mut value = bins[i as usize] * rotation;

                if displacement {
                    let k_hat = if k_len > 0.0 { k / k_len } else { Vec2::ZERO };
                    value *= Complex::new(k_hat.y, -k_hat.x);
                } else if gradient {
                    value *= Complex::new(-k.y, k.x);
                }
                pack_complex(value)
            })
            .collect();

        self.buffers.get_mut(&output.0).expect("bound buffer").data =
            bytemuck::cast_slice(&out).to_vec();
    }

    fn exec_transform(
        &mut self,
        plan: TransformHandle,
        output: TransformTarget,
        input: BufferHandle,
    ) {
        let desc = self.transforms[&plan.0];
        let n = desc.size as usize;
        let packed: Vec<u32> = bytemuck::pod_collect_to_vec(self.buffer_data(input));
        let mut grid: Vec<Complex<f32>> =
            packed.iter().map(|&bits| unpack_complex(bits)).collect();
        assert_eq!(grid.len(), n * n, "transform input size mismatch");

        let fft = self.planner.plan_fft_inverse(n);
        for row in grid.chunks_exact_mut(n) {
            fft.process(row);
        }
        let mut column = vec![Complex::new(0.0, 0.0); n];
        for x in 0..n {
            for y in 0..n {
                column[y] = grid[y * n + x];
            }
            fft.process(&mut column);
            for y in 0..n {
                grid[y * n + x] = column[y];
            }
        }

        let target = self
            .images
            .get_mut(&output.image.0)
            .expect("transform output image exists");
        let texels = &mut target.levels[output.level as usize];
        assert_eq!(texels.len(), n * n, "transform output extent mismatch");
        for (texel, value) in texels.iter_mut().zip(grid.iter()) {
            *texel = match desc.kind {
                TransformKind::ComplexToReal => [q16(value.re), 0.0, 0.0, 0.0],
                TransformKind::ComplexToComplex => [q16(value.re), q16(value.im), 0.0, 0.0],
            };
        }
    }

    fn exec_bake_maps(&mut self) {
        let params: BakeParams = self.params_as();
        let height = self.bound_texture(0, 0);
        let displacement = self.bound_texture(0, 1);
        let (hd_image, hd_level) = self.bound_storage_image(0, 2);
        let (gj_image, gj_level) = self.bound_storage_image(0, 3);

        let height_image = &self.images[&height.0];
        let displacement_image = &self.images[&displacement.0];
        let inv = params.inv_size;
        let (w, _) = height_image.extent(0);
        let n = w as usize;

        let mut hd_out = vec![[0.0f32; 4]; n * n];
        let mut gj_out = vec![[0.0f32; 4]; n * n];
        hd_out
            .par_chunks_mut(n)
            .zip(gj_out.par_chunks_mut(n))
            .enumerate()
            .for_each(|(y, (hd_row, gj_row))| {
                for x in 0..n {
                    let uv = Vec2::new((x as f32 + 0.5) * inv[0], (y as f32 + 0.5) * inv[1]);
                    let h = height_image.sample_bilinear(0, uv.x, uv.y)[0];
                    let d = displacement_image.sample_bilinear(0, uv.x, uv.y);
                    hd_row[x] = [
                        q16(d[0] * params.scale[0]),
                        q16(h * params.scale[1]),
                        q16(d[1] * params.scale[2]),
                        0.0,
                    ];

                    // Central differences feed the shading gradient and the
                    // fold-detection jacobian.
                    let hx0 = height_image.sample_bilinear(0, uv.x - inv[0], uv.y)[0];
                    let hx1 = height_image.sample_bilinear(0, uv.x + inv[0], uv.y)[0];
                    let hy0 = height_image.sample_bilinear(0, uv.x, uv.y - inv[1])[0];
                    let hy1 = height_image.sample_bilinear(0, uv.x, uv.y + inv[1])[0];
                    let dx0 = displacement_image.sample_bilinear(0, uv.x - inv[2], uv.y);
                    let dx1 = displacement_image.sample_bilinear(0, uv.x + inv[2], uv.y);
                    let dy0 = displacement_image.sample_bilinear(0, uv.x, uv.y - inv[3]);
                    let dy1 = displacement_image.sample_bilinear(0, uv.x, uv.y + inv[3]);

                    let grad = Vec2::new(0.5 * (hx1 - hx0), 0.5 * (hy1 - hy0));
                    let jxx = 1.0 + 0.5 * (dx1[0] - dx0[0]);
                    let jyy = 1.0 + 0.5 * (dy1[1] - dy0[1]);
                    let jxy = 0.5 * (dy1[0] - dy0[0]);
                    let jyx = 0.5 * (dx1[1] - dx0[1]);
                    let jacobian = jxx * jyy - jxy * jyx;
                    gj_row[x] = [q16(grad.x), q16(grad.y), q16(jacobian), 0.0];
                }
            });

        self.images.get_mut(&hd_image.0).expect("bound image").levels[hd_level as usize] = hd_out;
        self.images.get_mut(&gj_image.0).expect("bound image").levels[gj_level as usize] = gj_out;
    }

    fn exec_mipmap(&mut self) {
        let params: MipParams = self.params_as();
        let (image, dst_level) = self.bound_storage_image(0, 0);
        let src_level = params.lod as u32;
        let texel_center = self.has_variant("MIPMAP_TEXEL_CENTER");
        let (dst_w, dst_h) = (params.count[0] as usize, params.count[1] as usize);

        let source = self.images[&image.0].levels[src_level as usize].clone();
        let target = self.images.get_mut(&image.0).expect("bound image");
        let (src_w, src_h) = target.extent(src_level);
        let snapshot = RefImage {
            width: src_w as u32,
            height: src_h as u32,
            levels: vec![source],
        };

        let mut out = vec![[0.0f32; 4]; dst_w * dst_h];
        for (y, row) in out.chunks_mut(dst_w).enumerate() {
            for (x, texel) in row.iter_mut().enumerate() {
                let value = if texel_center {
                    // Point sample at the covering texel's center: keeps the
                    // vertex-stage chain aligned with the patch grid.
                    snapshot.texel(0, (x * 2) as i32, (y * 2) as i32)
                } else {
                    let u = (2.0 * x as f32 + 1.0) * params.inv_resolution[0];
                    let v = (2.0 * y as f32 + 1.0) * params.inv_resolution[1];
                    snapshot.sample_bilinear(0, u, v)
                };
                *texel = [q16(value[0]), q16(value[1]), q16(value[2]), q16(value[3])];
            }
        }
        target.levels[dst_level as usize] = out;
    }
}

impl OceanDevice for ReferenceBackend {
    fn create_vertex_buffer(&mut self, _label: &str, data: &[u8]) -> RenderResult<BufferHandle> {
        let handle = self.new_buffer(data.len());
        self.buffers.get_mut(&handle.0).expect("just created").data = data.to_vec();
        Ok(handle)
    }

    fn create_index_buffer(&mut self, label: &str, data: &[u8]) -> RenderResult<BufferHandle> {
        self.create_vertex_buffer(label, data)
    }

    fn create_storage_buffer(&mut self, _label: &str, size: u64) -> RenderResult<BufferHandle> {
        Ok(self.new_buffer(size as usize))
    }

    fn write_buffer(&mut self, buffer: BufferHandle, offset: u64, data: &[u8]) -> RenderResult<()> {
        let target = self
            .buffers
            .get_mut(&buffer.0)
            .ok_or_else(|| RenderError::upload("unknown buffer"))?;
        let offset = offset as usize;
        if offset + data.len() > target.data.len() {
            return Err(RenderError::upload("write past end of buffer"));
        }
        target.data[offset..offset + data.len()].copy_from_slice(data);
        Ok(())
    }

    fn create_transform(&mut self, desc: TransformDesc) -> RenderResult<TransformHandle> {
        // Warm the shared planner cache so plan creation carries the
        // coefficient setup cost, not the first frame.
        self.planner.plan_fft_inverse(desc.size as usize);
        let id = self.alloc_id();
        self.transforms.insert(id, desc);
        Ok(TransformHandle(id))
    }
}

impl ResourceGraph for ReferenceBackend {
    fn declare_storage_image(&mut self, _name: &str, info: AttachmentInfo) -> ResourceHandle {
        let levels = if info.levels == 0 {
            natural_mip_levels(info.width, info.height)
        } else {
            info.levels
        };
        let id = self.alloc_id();
        self.images
            .insert(id, RefImage::new(info.width, info.height, levels));
        self.declared.push(Declared::Image(ImageHandle(id)));
        ResourceHandle(self.declared.len() - 1)
    }

    fn declare_storage_buffer(&mut self, _name: &str, info: BufferInfo) -> ResourceHandle {
        let handle = self.new_buffer(info.size as usize);
        self.declared.push(Declared::Buffer(handle));
        ResourceHandle(self.declared.len() - 1)
    }
}

impl CommandEncoder for ReferenceBackend {
    fn set_program(&mut self, name: &str, variants: &[(&str, i32)]) {
        self.program = (
            name.to_string(),
            variants
                .iter()
                .map(|(key, value)| (key.to_string(), *value))
                .collect(),
        );
        self.binds.clear();
        self.params.clear();
    }

    fn set_storage_buffer(&mut self, set: u32, binding: u32, buffer: BufferHandle) {
        self.binds
            .insert((set, binding), Binding::StorageBuffer(buffer));
    }

    fn set_storage_texture(&mut self, set: u32, binding: u32, image: ImageHandle, level: u32) {
        self.binds
            .insert((set, binding), Binding::StorageTexture(image, level));
    }

    fn set_texture(&mut self, set: u32, binding: u32, image: ImageHandle, sampler: SamplerKind) {
        self.binds
            .insert((set, binding), Binding::SampledTexture(image, sampler));
    }

    fn bind_uniform_data(&mut self, set: u32, binding: u32, data: &[u8]) {
        self.binds
            .insert((set, binding), Binding::UniformData(data.to_vec()));
    }

    fn push_constants(&mut self, data: &[u8]) {
        self.params = data.to_vec();
    }

    fn dispatch(&mut self, _x: u32, _y: u32, _z: u32) {
        let program = self.program.0.clone();
        match program.as_str() {
            PROGRAM_UPDATE_LOD => self.exec_update_lod(),
            PROGRAM_INIT_COUNTERS => self.exec_init_counters(),
            PROGRAM_CULL_BLOCKS => self.exec_cull_blocks(),
            PROGRAM_GENERATE_SPECTRUM => self.exec_generate_spectrum(),
            PROGRAM_BAKE_MAPS => self.exec_bake_maps(),
            PROGRAM_MIPMAP => self.exec_mipmap(),
            other => panic!("reference executor has no kernel named {other:?}"),
        }
    }

    fn barrier(&mut self) {
        // Sequential interpretation already satisfies every write→read
        // ordering point.
    }

    fn transform(&mut self, plan: TransformHandle, output: TransformTarget, input: BufferHandle) {
        self.exec_transform(plan, output, input);
    }
}

impl FrameContext for ReferenceBackend {
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
