//! Patch mesh LOD chain.
//!
//! Builds the nested square grid meshes the cull pass selects between. Each
//! LOD halves the sampled resolution and doubles the stride of the one before
//! it, down to 2x2 quads. Vertices are 8 bytes: integer grid coordinates, the
//! inner-half flags used for geomorphing, and one border weight per patch
//! edge so the vertex stage can stitch neighbouring patches of different LOD.

use bytemuck::{Pod, Zeroable};

use crate::device::{BufferHandle, OceanDevice};
use crate::error::RenderResult;

/// Primitive-restart sentinel separating triangle-strip rows.
pub const STRIP_RESTART_INDEX: u16 = 0xffff;

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
pub struct PatchVertex {
    /// x, y grid coordinate plus the per-axis inner-half flag
    /// (coordinate < half of the base resolution).
    pub pos: [u8; 4],
    /// Border weights: -x, +x, -y, +y. Exactly one is 255 for edge vertices,
    /// all zero for interior ones.
    pub weights: [u8; 4],
}

/// One immutable mesh LOD: device buffers plus the static index count the
/// counter-reset pass seeds into the indirect draw arguments.
#[derive(Debug)]
pub struct PatchLod {
    pub vertex_buffer: BufferHandle,
    pub index_buffer: BufferHandle,
    pub index_count: u32,
}

/// CPU-side geometry for one (resolution, stride) pair.
pub fn build_patch_geometry(
    grid_resolution: u32,
    size: u32,
    stride: u32,
) -> (Vec<PatchVertex>, Vec<u16>) {
    let size_1 = size + 1;
    let half = grid_resolution >> 1;

    let mut vertices = Vec::with_capacity((size_1 * size_1) as usize);
    let mut y = 0;
    while y <= grid_resolution {
        let mut x = 0;
        while x <= grid_resolution {
            let mut v = PatchVertex::zeroed();
            v.pos = [
                x as u8,
                y as u8,
                u8::from(x < half),
                u8::from(y < half),
            ];
            if x == 0 {
                v.weights[0] = 255;
            } else if x == grid_resolution {
                v.weights[1] = 255;
            } else if y == 0 {
                v.weights[2] = 255;
            } else if y == grid_resolution {
                v.weights[3] = 255;
            }
            vertices.push(v);
            x += stride;
        }
        y += stride;
    }

    let mut indices = Vec::with_capacity((size * (2 * size_1 + 1)) as usize);
    for slice in 0..size {
        let base = (slice * size_1) as u16;
        for x in 0..=size as u16 {
            indices.push(base + x);
            indices.push(base + size_1 as u16 + x);
        }
        indices.push(STRIP_RESTART_INDEX);
    }

    (vertices, indices)
}

/// Build the full descending LOD chain on the device. Buffer creation
/// failure is fatal and propagates.
pub fn build_lod_chain(
    device: &mut dyn OceanDevice,
    grid_resolution: u32,
) -> RenderResult<Vec<PatchLod>> {
    let mut lods = Vec::new();
    let mut size = grid_resolution;
    let mut stride = 1;
    while size >= 2 {
        let (vertices, indices) = build_patch_geometry(grid_resolution, size, stride);
        let vertex_buffer = device.create_vertex_buffer(
            &format!("ocean.patch-vbo.lod{}", lods.len()),
            bytemuck::cast_slice(&vertices),
        )?;
        let index_buffer = device.create_index_buffer(
            &format!("ocean.patch-ibo.lod{}", lods.len()),
            bytemuck::cast_slice(&indices),
        )?;
        lods.push(PatchLod {
            vertex_buffer,
            index_buffer,
            index_count: indices.len() as u32,
        });
        size >>= 1;
        stride <<= 1;
    }
    log::info!(
        "built {} patch LODs (base resolution {})",
        lods.len(),
        grid_resolution
    );
    Ok(lods)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertex_is_eight_bytes() {
        assert_eq!(std::mem::size_of::<PatchVertex>(), 8);
    }

    #[test]
    fn finest_lod_counts() {
        let resolution = 16;
        let (vertices, indices) = build_patch_geometry(resolution, resolution, 1);
        let size_1 = (resolution + 1) as usize;
        assert_eq!(vertices.len(), size_1 * size_1);
        // Per strip row: 2 * (size + 1) indices plus one restart sentinel.
        assert_eq!(indices.len(), resolution as usize * (2 * size_1 + 1));
    }

    #[test]
    fn coarser_lod_spans_full_patch() {
        let (vertices, _) = build_patch_geometry(16, 4, 4);
        assert_eq!(vertices.len(), 5 * 5);
        assert_eq!(vertices.first().unwrap().pos[0], 0);
        assert_eq!(vertices.last().unwrap().pos[0], 16);
        assert_eq!(vertices.last().unwrap().pos[1], 16);
    }

    #[test]
    fn border_weights_mark_edges_only() {
        let resolution = 8;
        let (vertices, _) = build_patch_geometry(resolution, resolution, 1);
        for v in &vertices {
            let on_edge = v.pos[0] == 0
                || u32::from(v.pos[0]) == resolution
                || v.pos[1] == 0
                || u32::from(v.pos[1]) == resolution;
            let weight_sum: u32 = v.weights.iter().map(|&w| u32::from(w)).sum();
            if on_edge {
                assert_eq!(weight_sum, 255, "edge vertex needs exactly one full weight");
            } else {
                assert_eq!(weight_sum, 0, "interior vertex must carry no border weight");
            }
        }
    }

    #[test]
    fn inner_half_flags() {
        let resolution = 8;
        let (vertices, _) = build_patch_geometry(resolution, resolution, 1);
        for v in &vertices {
            assert_eq!(v.pos[2], u8::from(u32::from(v.pos[0]) < resolution / 2));
            assert_eq!(v.pos[3], u8::from(u32::from(v.pos[1]) < resolution / 2));
        }
    }

    #[test]
    fn restart_sentinel_terminates_each_row() {
        let (_, indices) = build_patch_geometry(8, 8, 1);
        let rows: Vec<_> = indices.split(|&i| i == STRIP_RESTART_INDEX).collect();
        // split() yields one trailing empty slice after the final sentinel.
        assert_eq!(rows.len(), 9);
        assert!(rows.last().unwrap().is_empty());
        for row in &rows[..8] {
            assert_eq!(row.len(), 2 * 9);
        }
    }
}
