//! Construction-time configuration for the ocean surface.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::{RenderError, RenderResult};

/// Hard cap on discrete LOD buckets; sizes the counter buffer and the
/// per-bucket regions of the instance data buffer.
pub const MAX_LOD_BUCKETS: usize = 8;

/// Ocean configuration. All fields are fixed at construction time; changing
/// them requires a full teardown/initialize cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OceanConfig {
    /// World-space extent of one heightfield tiling period (meters).
    pub world_size: Vec2,
    /// World-space tiling period of the normal field. Usually smaller than
    /// `world_size` so the normal map carries higher-frequency detail.
    pub normal_world_size: Vec2,
    /// Grid window dimensions in cells (camera-snapped region processed per
    /// frame).
    pub grid_width: u32,
    pub grid_height: u32,
    /// Vertex resolution of the finest patch mesh. Each coarser LOD halves
    /// this until reaching 2.
    pub grid_resolution: u32,
    /// Transform sizes for the three wave fields.
    pub height_fft_size: u32,
    pub displacement_fft_size: u32,
    pub normal_fft_size: u32,
    /// Conservative vertical bounds used for cull AABBs and height encoding.
    /// Kept as a fixed interval rather than derived from field extrema.
    pub heightmap_range: Vec2,
}

impl Default for OceanConfig {
    fn default() -> Self {
        Self {
            world_size: Vec2::splat(512.0),
            normal_world_size: Vec2::splat(64.0),
            grid_width: 32,
            grid_height: 32,
            grid_resolution: 128,
            height_fft_size: 256,
            displacement_fft_size: 128,
            normal_fft_size: 256,
            heightmap_range: Vec2::new(-10.0, 10.0),
        }
    }
}

impl OceanConfig {
    /// Number of discrete mesh LODs the chain builder will produce:
    /// resolution halves per step until it reaches 2.
    pub fn lod_count(&self) -> usize {
        (self.grid_resolution.trailing_zeros() as usize).max(1)
    }

    /// Mip levels of the baked height+displacement image; must back one
    /// sampling level per mesh LOD.
    pub fn height_displacement_levels(&self) -> u32 {
        let natural = natural_mip_levels(self.height_fft_size, self.height_fft_size);
        (self.lod_count() as u32).min(natural)
    }

    pub fn validate(&self) -> RenderResult<()> {
        if self.world_size.min_element() <= 0.0 || self.normal_world_size.min_element() <= 0.0 {
            return Err(RenderError::render("world sizes must be positive"));
        }
        if self.heightmap_range.x >= self.heightmap_range.y {
            return Err(RenderError::render("heightmap range must be a non-empty interval"));
        }
        if self.grid_width < 2 || self.grid_height < 2 {
            return Err(RenderError::render("grid window must be at least 2x2 cells"));
        }
        if !self.grid_resolution.is_power_of_two()
            || self.grid_resolution < 4
            || self.grid_resolution > 128
        {
            // Patch vertices store coordinates in u8, so the finest mesh is
            // capped at 128 (inclusive edge vertex at grid_resolution).
            return Err(RenderError::render(
                "grid resolution must be a power of two in [4, 128]",
            ));
        }
        if self.lod_count() > MAX_LOD_BUCKETS {
            return Err(RenderError::render("too many mesh LODs for the counter buffer"));
        }
        for (name, n) in [
            ("height", self.height_fft_size),
            ("displacement", self.displacement_fft_size),
            ("normal", self.normal_fft_size),
        ] {
            if !n.is_power_of_two() || n < 64 || n > 2048 {
                return Err(RenderError::render(format!(
                    "{name} transform size must be a power of two in [64, 2048]"
                )));
            }
        }
        if self.height_fft_size < self.grid_resolution {
            return Err(RenderError::render(
                "height transform must be at least the base mesh resolution",
            ));
        }
        Ok(())
    }
}

/// Full mip chain length for a 2D extent.
pub fn natural_mip_levels(width: u32, height: u32) -> u32 {
    32 - width.max(height).max(1).leading_zeros()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = OceanConfig::default();
        config.validate().unwrap();
        assert_eq!(config.lod_count(), 7);
    }

    #[test]
    fn height_displacement_levels_match_lod_count() {
        // The baked chain backs vertex sampling: one level per mesh LOD.
        for resolution in [4u32, 8, 16, 32, 64, 128] {
            let config = OceanConfig {
                grid_resolution: resolution,
                ..Default::default()
            };
            config.validate().unwrap();
            assert_eq!(
                config.height_displacement_levels() as usize,
                config.lod_count()
            );
        }
    }

    #[test]
    fn rejects_bad_sizes() {
        let mut config = OceanConfig::default();
        config.grid_resolution = 96;
        assert!(config.validate().is_err());

        let mut config = OceanConfig::default();
        config.height_fft_size = 48;
        assert!(config.validate().is_err());

        let mut config = OceanConfig::default();
        config.height_fft_size = 64;
        config.grid_resolution = 128;
        assert!(config.validate().is_err());
    }

    #[test]
    fn natural_levels() {
        assert_eq!(natural_mip_levels(256, 256), 9);
        assert_eq!(natural_mip_levels(1, 1), 1);
        assert_eq!(natural_mip_levels(128, 64), 8);
    }
}
