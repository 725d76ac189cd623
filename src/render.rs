//! Renderer-facing assembly of the per-frame ocean outputs.
//!
//! Gathers every resource the draw stage needs into one descriptor, keyed by
//! a content hash over the physical resource identities so repeated draws in
//! an unchanged frame configuration reuse the assembled info.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use bytemuck::{Pod, Zeroable};

use crate::device::{BufferHandle, DrawEncoder, FrameContext, ImageHandle};
use crate::error::RenderResult;
use crate::ocean::{Ocean, COUNTER_STRIDE, INSTANCE_STRIDE};

/// Uniform parameters the surface shaders consume, one copy per frame.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct OceanData {
    pub inv_heightmap_size: [f32; 2],
    pub normal_uv_scale: [f32; 2],
    pub integer_to_world: [f32; 2],
    pub heightmap_range: [f32; 2],
}

/// One LOD's mesh buffers as the draw stage binds them.
#[derive(Debug, Clone, Copy)]
pub struct LodMeshRef {
    pub vertex_buffer: BufferHandle,
    pub index_buffer: BufferHandle,
    pub index_count: u32,
}

/// Everything the draw stage binds for one frame.
#[derive(Debug, Clone)]
pub struct OceanRenderInfo {
    pub instance_key: u64,
    pub height_displacement: ImageHandle,
    pub gradient_jacobian: ImageHandle,
    pub normal: ImageHandle,
    pub lod_map: ImageHandle,
    pub instance_data: BufferHandle,
    pub indirect_counters: BufferHandle,
    /// Bytes per bucket region inside `instance_data`.
    pub lod_stride_bytes: u64,
    /// Cells per bucket region (instance index base multiplier).
    pub cells_per_bucket: u32,
    pub meshes: Vec<LodMeshRef>,
    pub data: OceanData,
}

impl Ocean {
    /// Assemble (or reuse) the frame's render info. The instance key hashes
    /// the identities of every consumed resource, so the cached descriptor
    /// is dropped exactly when the graph hands out different physical
    /// resources.
    pub fn render_info(&mut self, frame: &dyn FrameContext) -> RenderResult<&OceanRenderInfo> {
        let resources = *self.resources()?;

        let lod_map = frame.physical_image(resources.lod_map);
        let normal = frame.physical_image(resources.normal_output);
        let height_displacement = frame.physical_image(resources.height_displacement);
        let gradient_jacobian = frame.physical_image(resources.gradient_jacobian);
        let instance_data = frame.physical_buffer(resources.instance_data);
        let indirect_counters = frame.physical_buffer(resources.counters);

        let mut hasher = DefaultHasher::new();
        "ocean".hash(&mut hasher);
        lod_map.hash(&mut hasher);
        normal.hash(&mut hasher);
        height_displacement.hash(&mut hasher);
        gradient_jacobian.hash(&mut hasher);
        instance_data.hash(&mut hasher);
        indirect_counters.hash(&mut hasher);
        let instance_key = hasher.finish();

        if self
            .render_cache
            .as_ref()
            .map(|(key, _)| *key != instance_key)
            .unwrap_or(true)
        {
            let config = self.config();
            let cells_per_bucket = config.grid_width * config.grid_height;
            let inv_heightmap = 1.0 / config.height_fft_size as f32;
            let cell = self.grid_cell_size();

            let info = OceanRenderInfo {
                instance_key,
                height_displacement,
                gradient_jacobian,
                normal,
                lod_map,
                instance_data,
                indirect_counters,
                lod_stride_bytes: u64::from(cells_per_bucket) * INSTANCE_STRIDE,
                cells_per_bucket,
                meshes: self
                    .lods
                    .iter()
                    .map(|lod| LodMeshRef {
                        vertex_buffer: lod.vertex_buffer,
                        index_buffer: lod.index_buffer,
                        index_count: lod.index_count,
                    })
                    .collect(),
                data: OceanData {
                    inv_heightmap_size: [inv_heightmap; 2],
                    normal_uv_scale: (config.world_size / config.normal_world_size).to_array(),
                    integer_to_world: (cell / config.grid_resolution as f32).to_array(),
                    heightmap_range: config.heightmap_range.to_array(),
                },
            };
            self.render_cache = Some((instance_key, info));
        }

        Ok(&self.render_cache.as_ref().unwrap().1)
    }
}

/// Issue one indexed indirect draw per LOD bucket, instance counts sourced
/// from the counter buffer the cull pass filled.
pub fn record_draws(info: &OceanRenderInfo, encoder: &mut dyn DrawEncoder) {
    for (lod, mesh) in info.meshes.iter().enumerate() {
        let lod = lod as u32;
        encoder.bind_mesh(
            lod,
            mesh.vertex_buffer,
            mesh.index_buffer,
            lod * info.cells_per_bucket,
        );
        encoder.draw_indexed_indirect(info.indirect_counters, u64::from(lod) * COUNTER_STRIDE);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ocean_data_is_tightly_packed() {
        assert_eq!(std::mem::size_of::<OceanData>(), 32);
    }
}
