//! Ocean surface simulation core.
//!
//! Owns the per-device state (patch LOD chain, transform plans, spectrum
//! distributions) and records the two per-frame compute passes: LOD
//! classification + cull, and wave-field synthesis. The core is a pure
//! function of (simulation time, camera position) plus its construction-time
//! configuration; all cross-stage ordering is expressed through explicit
//! barriers on the command encoder.

use bytemuck::{Pod, Zeroable};
use glam::{IVec2, Vec2, Vec3};

use crate::config::{natural_mip_levels, OceanConfig, MAX_LOD_BUCKETS};
use crate::device::{
    FrameContext, ImageFormat, OceanDevice, SamplerKind, TransformTarget,
};
use crate::error::{RenderError, RenderResult};
use crate::frustum::Frustum;
use crate::graph::{AttachmentInfo, BufferInfo, ResourceGraph, ResourceHandle};
use crate::mesh::{build_lod_chain, PatchLod};
use crate::render::OceanRenderInfo;
use crate::spectrum::{ComplexAmplitude, DistributionSet, WaveField};
use crate::transform::TransformSet;

pub const PROGRAM_GENERATE_SPECTRUM: &str = "ocean/generate_spectrum";
pub const PROGRAM_UPDATE_LOD: &str = "ocean/update_lod";
pub const PROGRAM_INIT_COUNTERS: &str = "ocean/init_counter_buffer";
pub const PROGRAM_CULL_BLOCKS: &str = "ocean/cull_blocks";
pub const PROGRAM_BAKE_MAPS: &str = "ocean/bake_maps";
pub const PROGRAM_MIPMAP: &str = "ocean/mipmap";

/// Bytes per cell instance record: world offset vec4 + neighbour-LOD vec4.
pub const INSTANCE_STRIDE: u64 = 32;
/// Bytes per bucket in the indirect counter buffer (8 x u32).
pub const COUNTER_STRIDE: u64 = 32;

/// Parameter block for the LOD classifier kernel.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct LodMapParams {
    pub camera_pos: [f32; 3],
    pub max_lod: f32,
    pub image_offset: [i32; 2],
    pub num_threads: [i32; 2],
    pub grid_base: [f32; 2],
    pub grid_size: [f32; 2],
}

/// Parameter block for the cull kernel.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct CullParams {
    pub image_offset: [i32; 2],
    pub num_threads: [i32; 2],
    pub inv_num_threads: [f32; 2],
    pub grid_base: [f32; 2],
    pub grid_size: [f32; 2],
    pub grid_resolution: [f32; 2],
    pub heightmap_range: [f32; 2],
    pub lod_stride: u32,
    pub _pad: u32,
}

/// Parameter block for the spectrum phase kernel.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct SpectrumParams {
    pub freq_scale: [f32; 2],
    pub n: [u32; 2],
    pub time: f32,
    pub _pad: [f32; 3],
}

/// Parameter block for the bake kernel.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct BakeParams {
    pub inv_size: [f32; 4],
    pub scale: [f32; 4],
}

/// Parameter block for one mip downsample dispatch.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct MipParams {
    pub inv_resolution: [f32; 2],
    pub count: [u32; 2],
    pub lod: f32,
    pub _pad: [f32; 3],
}

/// Handles of the transient resources the core declares on the graph.
#[derive(Debug, Clone, Copy)]
pub struct OceanResources {
    pub lod_map: ResourceHandle,
    pub counters: ResourceHandle,
    pub instance_data: ResourceHandle,
    pub height_input: ResourceHandle,
    pub displacement_input: ResourceHandle,
    pub normal_input: ResourceHandle,
    pub height_output: ResourceHandle,
    pub displacement_output: ResourceHandle,
    pub normal_output: ResourceHandle,
    pub height_displacement: ResourceHandle,
    pub gradient_jacobian: ResourceHandle,
}

/// Cached mip-chain lengths for the three output image chains. Built lazily
/// on first synthesis; rebuilding an already-populated cache is a no-op.
#[derive(Debug, Clone, Copy)]
struct MipChains {
    vertex_levels: u32,
    fragment_levels: u32,
    normal_levels: u32,
}

pub struct Ocean {
    pub(crate) config: OceanConfig,
    pub(crate) lods: Vec<PatchLod>,
    distributions: Option<DistributionSet>,
    transforms: Option<TransformSet>,
    pub(crate) resources: Option<OceanResources>,
    mip_chains: Option<MipChains>,
    pub(crate) render_cache: Option<(u64, OceanRenderInfo)>,
}

impl Ocean {
    pub fn new(config: OceanConfig) -> RenderResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            lods: Vec::new(),
            distributions: None,
            transforms: None,
            resources: None,
            mip_chains: None,
            render_cache: None,
        })
    }

    pub fn config(&self) -> &OceanConfig {
        &self.config
    }

    pub fn lods(&self) -> &[PatchLod] {
        &self.lods
    }

    pub fn is_initialized(&self) -> bool {
        !self.lods.is_empty()
    }

    /// Build all device-owned state: the patch LOD chain, the three
    /// transform plans and the zeroed spectrum distributions. Must be called
    /// again after every device recreation.
    pub fn initialize(&mut self, device: &mut dyn OceanDevice) -> RenderResult<()> {
        if self.is_initialized() {
            return Err(RenderError::device("ocean already initialized"));
        }
        self.lods = build_lod_chain(device, self.config.grid_resolution)?;
        self.transforms = Some(TransformSet::new(device, &self.config)?);
        self.distributions = Some(DistributionSet::new(device, &self.config)?);
        log::info!(
            "ocean initialized: {} LODs, {}x{} cell window",
            self.lods.len(),
            self.config.grid_width,
            self.config.grid_height
        );
        Ok(())
    }

    /// Drop every piece of device-owned state. Outside an
    /// initialize/teardown window the ocean holds no device references.
    pub fn teardown(&mut self) {
        self.lods.clear();
        self.transforms = None;
        self.distributions = None;
        self.resources = None;
        self.mip_chains = None;
        self.render_cache = None;
        log::info!("ocean torn down");
    }

    /// Seed one wave field's frequency-domain distribution. The spectrum
    /// model itself (Phillips or otherwise) is supplied by the caller.
    pub fn upload_distribution(
        &self,
        device: &mut dyn OceanDevice,
        field: WaveField,
        amplitudes: &[ComplexAmplitude],
    ) -> RenderResult<()> {
        let distributions = self
            .distributions
            .as_ref()
            .ok_or_else(|| RenderError::upload("ocean not initialized"))?;
        distributions.upload(device, field, amplitudes)
    }

    // ---------- camera-relative grid ----------

    /// World-space size of one grid cell.
    pub fn grid_cell_size(&self) -> Vec2 {
        self.config.world_size
            / Vec2::new(self.config.grid_width as f32, self.config.grid_height as f32)
    }

    /// Camera position snapped to the nearest cell, in cell units. Discrete
    /// snapping keeps the LOD grid on fixed cell boundaries while the camera
    /// moves continuously.
    pub fn snapped_grid_center(&self, camera: Vec3) -> Vec2 {
        let inv_cell = Vec2::new(self.config.grid_width as f32, self.config.grid_height as f32)
            / self.config.world_size;
        (Vec2::new(camera.x, camera.z) * inv_cell).round()
    }

    /// Integer base coordinate of the grid window in the conceptual infinite
    /// grid.
    pub fn grid_base_coord(&self, camera: Vec3) -> IVec2 {
        let center = self.snapped_grid_center(camera);
        IVec2::new(center.x as i32, center.y as i32)
            - IVec2::new(
                self.config.grid_width as i32 >> 1,
                self.config.grid_height as i32 >> 1,
            )
    }

    /// World-space position of the window's lower corner.
    fn grid_base_world(&self, camera: Vec3) -> Vec2 {
        self.snapped_grid_center(camera) * self.grid_cell_size() - 0.5 * self.config.world_size
    }

    // ---------- resource declaration ----------

    /// Declare every transient resource on the external graph. Sizes are
    /// absolute; the graph owns the allocations frame to frame.
    pub fn declare_resources(&mut self, graph: &mut dyn ResourceGraph) {
        let config = &self.config;
        let cells = u64::from(config.grid_width) * u64::from(config.grid_height);
        let hn = config.height_fft_size;
        let dn = config.displacement_fft_size;
        let nn = config.normal_fft_size;

        let lod_map = graph.declare_storage_image(
            "ocean-lods",
            AttachmentInfo::absolute(ImageFormat::R16Float, config.grid_width, config.grid_height),
        );
        let counters = graph.declare_storage_buffer(
            "ocean-lod-counter",
            BufferInfo::indirect(MAX_LOD_BUCKETS as u64 * COUNTER_STRIDE),
        );
        let instance_data = graph.declare_storage_buffer(
            "ocean-lod-data",
            BufferInfo::storage(cells * MAX_LOD_BUCKETS as u64 * INSTANCE_STRIDE),
        );

        // Packed 16-bit complex scratch, one u32 per bin.
        let height_input = graph.declare_storage_buffer(
            "ocean-height-fft-input",
            BufferInfo::storage(u64::from(hn) * u64::from(hn) * 4),
        );
        let displacement_input = graph.declare_storage_buffer(
            "ocean-displacement-fft-input",
            BufferInfo::storage(u64::from(dn) * u64::from(dn) * 4),
        );
        let normal_input = graph.declare_storage_buffer(
            "ocean-normal-fft-input",
            BufferInfo::storage(u64::from(nn) * u64::from(nn) * 4),
        );

        let height_output = graph.declare_storage_image(
            "ocean-height-fft-output",
            AttachmentInfo::absolute(ImageFormat::R16Float, hn, hn),
        );
        let displacement_output = graph.declare_storage_image(
            "ocean-displacement-fft-output",
            AttachmentInfo::absolute(ImageFormat::Rg16Float, dn, dn),
        );
        let normal_output = graph.declare_storage_image(
            "ocean-normal-fft-output",
            AttachmentInfo::absolute(ImageFormat::Rg16Float, nn, nn)
                .with_levels(natural_mip_levels(nn, nn)),
        );

        let height_displacement = graph.declare_storage_image(
            "ocean-height-displacement-output",
            AttachmentInfo::absolute(ImageFormat::Rgba16Float, hn, hn)
                .with_levels(config.height_displacement_levels()),
        );
        let gradient_jacobian = graph.declare_storage_image(
            "ocean-gradient-jacobian-output",
            AttachmentInfo::absolute(ImageFormat::Rgba16Float, hn, hn)
                .with_levels(natural_mip_levels(hn, hn)),
        );

        self.resources = Some(OceanResources {
            lod_map,
            counters,
            instance_data,
            height_input,
            displacement_input,
            normal_input,
            height_output,
            displacement_output,
            normal_output,
            height_displacement,
            gradient_jacobian,
        });
    }

    pub(crate) fn resources(&self) -> RenderResult<&OceanResources> {
        self.resources
            .as_ref()
            .ok_or_else(|| RenderError::render("ocean resources not declared"))
    }

    /// Lazily derive the three mip-chain lengths. A populated cache is left
    /// untouched, so this is safe to call every frame.
    fn ensure_mip_chains(&mut self) -> MipChains {
        if let Some(chains) = self.mip_chains {
            return chains;
        }
        let chains = MipChains {
            vertex_levels: self.config.height_displacement_levels(),
            fragment_levels: natural_mip_levels(
                self.config.height_fft_size,
                self.config.height_fft_size,
            ),
            normal_levels: natural_mip_levels(
                self.config.normal_fft_size,
                self.config.normal_fft_size,
            ),
        };
        log::debug!(
            "mip chains: vertex {}, fragment {}, normal {}",
            chains.vertex_levels,
            chains.fragment_levels,
            chains.normal_levels
        );
        self.mip_chains = Some(chains);
        chains
    }

    // ---------- LOD + cull pass ----------

    /// Record the LOD classification, counter reset and cull stages. The
    /// single barrier orders the LOD map / counter writes against the cull
    /// stage that reads both.
    pub fn record_lod_pass(
        &self,
        frame: &mut dyn FrameContext,
        camera: Vec3,
        frustum: &Frustum,
    ) -> RenderResult<()> {
        self.record_lod_map(frame, camera)?;
        self.record_init_counters(frame)?;
        frame.barrier();
        self.record_cull_blocks(frame, camera, frustum)?;
        Ok(())
    }

    fn record_lod_map(&self, frame: &mut dyn FrameContext, camera: Vec3) -> RenderResult<()> {
        let resources = *self.resources()?;
        let lod_map = frame.physical_image(resources.lod_map);
        let config = &self.config;

        frame.set_program(PROGRAM_UPDATE_LOD, &[]);
        frame.set_storage_texture(0, 0, lod_map, 0);
        let params = LodMapParams {
            camera_pos: camera.to_array(),
            max_lod: self.lods.len() as f32 - 1.0,
            image_offset: self.grid_base_coord(camera).to_array(),
            num_threads: [config.grid_width as i32, config.grid_height as i32],
            grid_base: self.grid_base_world(camera).to_array(),
            grid_size: self.grid_cell_size().to_array(),
        };
        frame.push_constants(bytemuck::bytes_of(&params));
        frame.dispatch(
            (config.grid_width + 7) / 8,
            (config.grid_height + 7) / 8,
            1,
        );
        Ok(())
    }

    fn record_init_counters(&self, frame: &mut dyn FrameContext) -> RenderResult<()> {
        let resources = *self.resources()?;
        let counters = frame.physical_buffer(resources.counters);

        frame.set_program(
            PROGRAM_INIT_COUNTERS,
            &[("NUM_COUNTERS", MAX_LOD_BUCKETS as i32)],
        );
        frame.set_storage_buffer(0, 0, counters);
        // The draw's index count is static per mesh LOD; seed it here so the
        // cull stage only ever touches instance counts.
        let mut index_counts = [0u32; 16];
        for (slot, lod) in index_counts.iter_mut().zip(self.lods.iter()) {
            *slot = lod.index_count;
        }
        frame.bind_uniform_data(0, 1, bytemuck::cast_slice(&index_counts));
        frame.dispatch(1, 1, 1);
        Ok(())
    }

    fn record_cull_blocks(
        &self,
        frame: &mut dyn FrameContext,
        camera: Vec3,
        frustum: &Frustum,
    ) -> RenderResult<()> {
        let resources = *self.resources()?;
        let config = &self.config;
        let lod_map = frame.physical_image(resources.lod_map);
        let instance_data = frame.physical_buffer(resources.instance_data);
        let counters = frame.physical_buffer(resources.counters);

        frame.set_program(PROGRAM_CULL_BLOCKS, &[]);
        frame.set_storage_buffer(0, 0, instance_data);
        frame.set_storage_buffer(0, 1, counters);
        frame.set_texture(0, 2, lod_map, SamplerKind::NearestWrap);
        frame.bind_uniform_data(0, 3, bytemuck::cast_slice(&frustum.plane_array()));

        let num_threads = [config.grid_width as i32, config.grid_height as i32];
        let params = CullParams {
            image_offset: self.grid_base_coord(camera).to_array(),
            num_threads,
            inv_num_threads: [1.0 / num_threads[0] as f32, 1.0 / num_threads[1] as f32],
            grid_base: self.grid_base_world(camera).to_array(),
            grid_size: self.grid_cell_size().to_array(),
            grid_resolution: [config.grid_resolution as f32; 2],
            heightmap_range: config.heightmap_range.to_array(),
            lod_stride: config.grid_width * config.grid_height,
            _pad: 0,
        };
        frame.push_constants(bytemuck::bytes_of(&params));
        frame.dispatch(
            (config.grid_width + 7) / 8,
            (config.grid_height + 7) / 8,
            1,
        );
        Ok(())
    }

    // ---------- synthesis pass ----------

    /// Record the full field-synthesis chain: phase update, the three
    /// inverse transforms, map baking and mip generation, with write→read
    /// barriers between each dependent stage.
    pub fn record_synthesis_pass(
        &mut self,
        frame: &mut dyn FrameContext,
        time: f64,
    ) -> RenderResult<()> {
        let chains = self.ensure_mip_chains();
        self.record_spectrum_updates(frame, time)?;
        frame.barrier();
        self.record_transforms(frame)?;
        frame.barrier();
        self.record_bake_maps(frame)?;
        self.record_mipmaps(frame, chains)?;
        Ok(())
    }

    fn record_spectrum_updates(&self, frame: &mut dyn FrameContext, time: f64) -> RenderResult<()> {
        let resources = *self.resources()?;
        let distributions = self
            .distributions
            .as_ref()
            .ok_or_else(|| RenderError::render("ocean not initialized"))?;
        let config = &self.config;
        let two_pi = 2.0 * std::f32::consts::PI;

        // Height and displacement share the primary tiling period; the
        // normal field is synthesized at its own, usually finer, period.
        let primary_scale = Vec2::splat(two_pi) / config.world_size;
        let normal_scale = Vec2::splat(two_pi) / config.normal_world_size;

        let fields = [
            (
                &[][..],
                distributions.height,
                resources.height_input,
                config.height_fft_size,
                primary_scale,
            ),
            (
                &[("GRADIENT_DISPLACEMENT", 1)][..],
                distributions.displacement,
                resources.displacement_input,
                config.displacement_fft_size,
                primary_scale,
            ),
            (
                &[("GRADIENT_NORMAL", 1)][..],
                distributions.normal,
                resources.normal_input,
                config.normal_fft_size,
                normal_scale,
            ),
        ];

        for (variants, distribution, input, n, scale) in fields {
            let scratch = frame.physical_buffer(input);
            frame.set_program(PROGRAM_GENERATE_SPECTRUM, variants);
            frame.set_storage_buffer(0, 0, distribution);
            frame.set_storage_buffer(0, 1, scratch);
            let params = SpectrumParams {
                freq_scale: scale.to_array(),
                n: [n, n],
                time: time as f32,
                _pad: [0.0; 3],
            };
            frame.push_constants(bytemuck::bytes_of(&params));
            frame.dispatch(n / 64, n, 1);
        }
        Ok(())
    }

    fn record_transforms(&self, frame: &mut dyn FrameContext) -> RenderResult<()> {
        let resources = *self.resources()?;
        let transforms = self
            .transforms
            .as_ref()
            .ok_or_else(|| RenderError::render("ocean not initialized"))?;

        // The three fields are data-independent; the device may overlap
        // them. Only the surrounding barriers order them against their
        // producers and consumers.
        let targets = [
            (
                transforms.height,
                frame.physical_image(resources.height_output),
                frame.physical_buffer(resources.height_input),
            ),
            (
                transforms.displacement,
                frame.physical_image(resources.displacement_output),
                frame.physical_buffer(resources.displacement_input),
            ),
            (
                transforms.normal,
                frame.physical_image(resources.normal_output),
                frame.physical_buffer(resources.normal_input),
            ),
        ];
        for (plan, output, input) in targets {
            frame.transform(plan, TransformTarget::base(output), input);
        }
        Ok(())
    }

    fn record_bake_maps(&self, frame: &mut dyn FrameContext) -> RenderResult<()> {
        let resources = *self.resources()?;
        let config = &self.config;
        let inv_h = 1.0 / config.height_fft_size as f32;
        let inv_d = 1.0 / config.displacement_fft_size as f32;

        let height = frame.physical_image(resources.height_output);
        let displacement = frame.physical_image(resources.displacement_output);
        let height_displacement = frame.physical_image(resources.height_displacement);
        let gradient_jacobian = frame.physical_image(resources.gradient_jacobian);

        frame.set_program(PROGRAM_BAKE_MAPS, &[]);
        frame.set_texture(0, 0, height, SamplerKind::LinearWrap);
        frame.set_texture(0, 1, displacement, SamplerKind::LinearWrap);
        frame.set_storage_texture(0, 2, height_displacement, 0);
        frame.set_storage_texture(0, 3, gradient_jacobian, 0);

        let params = BakeParams {
            inv_size: [inv_h, inv_h, inv_d, inv_d],
            scale: [1.0; 4],
        };
        frame.push_constants(bytemuck::bytes_of(&params));
        frame.dispatch(
            (config.height_fft_size + 7) / 8,
            (config.height_fft_size + 7) / 8,
            1,
        );
        Ok(())
    }

    fn record_mipmaps(&self, frame: &mut dyn FrameContext, chains: MipChains) -> RenderResult<()> {
        let resources = *self.resources()?;
        let config = &self.config;

        let hd_image = frame.physical_image(resources.height_displacement);
        let gj_image = frame.physical_image(resources.gradient_jacobian);
        let normal_image = frame.physical_image(resources.normal_output);

        let num_passes = chains
            .vertex_levels
            .max(chains.fragment_levels)
            .max(chains.normal_levels);

        // Level i reads level i-1, so every iteration starts with a
        // write→read barrier; the three chains within one level have no
        // mutual dependency.
        for level in 1..num_passes {
            frame.barrier();

            if level < chains.vertex_levels {
                frame.set_program(
                    PROGRAM_MIPMAP,
                    &[("MIPMAP_RGBA16F", 1), ("MIPMAP_TEXEL_CENTER", 1)],
                );
                self.record_mip_level(frame, hd_image, config.height_fft_size, level);
            }

            if level < chains.fragment_levels {
                frame.set_program(PROGRAM_MIPMAP, &[("MIPMAP_RGBA16F", 1)]);
                self.record_mip_level(frame, gj_image, config.height_fft_size, level);
            }

            if level < chains.normal_levels {
                frame.set_program(PROGRAM_MIPMAP, &[("MIPMAP_RG16F", 1)]);
                self.record_mip_level(frame, normal_image, config.normal_fft_size, level);
            }
        }
        Ok(())
    }

    fn record_mip_level(
        &self,
        frame: &mut dyn FrameContext,
        image: crate::device::ImageHandle,
        base_extent: u32,
        level: u32,
    ) {
        let src = mip_extent(base_extent, level - 1);
        let dst = mip_extent(base_extent, level);
        let params = MipParams {
            inv_resolution: [1.0 / src as f32; 2],
            count: [dst; 2],
            lod: (level - 1) as f32,
            _pad: [0.0; 3],
        };
        frame.push_constants(bytemuck::bytes_of(&params));
        frame.set_storage_texture(0, 0, image, level);
        frame.set_texture(0, 1, image, SamplerKind::LinearWrap);
        frame.dispatch((dst + 7) / 8, (dst + 7) / 8, 1);
    }
}

/// Extent of one mip level.
pub fn mip_extent(base: u32, level: u32) -> u32 {
    (base >> level).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_ocean() -> Ocean {
        Ocean::new(OceanConfig {
            world_size: Vec2::splat(100.0),
            grid_width: 32,
            grid_height: 32,
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn param_blocks_match_gpu_layouts() {
        assert_eq!(std::mem::size_of::<LodMapParams>(), 48);
        assert_eq!(std::mem::size_of::<CullParams>(), 64);
        assert_eq!(std::mem::size_of::<SpectrumParams>(), 32);
        assert_eq!(std::mem::size_of::<BakeParams>(), 32);
        assert_eq!(std::mem::size_of::<MipParams>(), 32);
    }

    #[test]
    fn grid_base_coord_centers_window() {
        let ocean = test_ocean();
        assert_eq!(ocean.grid_base_coord(Vec3::ZERO), IVec2::new(-16, -16));
    }

    #[test]
    fn snapping_is_stable_within_a_cell() {
        let ocean = test_ocean();
        let cell = ocean.grid_cell_size();
        assert_eq!(cell, Vec2::splat(100.0 / 32.0));

        let center = ocean.snapped_grid_center(Vec3::ZERO);
        // Motion inside the cell around the snap point does not move the
        // grid.
        for offset in [0.1, 0.4 * cell.x, -0.45 * cell.x] {
            let moved = ocean.snapped_grid_center(Vec3::new(offset, 3.0, 0.0));
            assert_eq!(moved, center);
        }
        // Crossing the half-cell boundary moves it by exactly one cell.
        let crossed = ocean.snapped_grid_center(Vec3::new(0.51 * cell.x, 0.0, 0.0));
        assert_eq!(crossed, center + Vec2::new(1.0, 0.0));
    }

    #[test]
    fn snapped_center_tracks_large_motion() {
        let ocean = test_ocean();
        let cell = ocean.grid_cell_size();
        let camera = Vec3::new(10.0 * cell.x, 5.0, -3.0 * cell.y);
        assert_eq!(
            ocean.snapped_grid_center(camera),
            Vec2::new(10.0, -3.0)
        );
        assert_eq!(ocean.grid_base_coord(camera), IVec2::new(-6, -19));
    }
}
