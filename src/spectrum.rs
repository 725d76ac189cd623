//! Frequency-domain distribution store.
//!
//! Holds the static complex amplitude buffers the per-frame phase kernel
//! reads. The buffers live for one device lifecycle: created zeroed when the
//! device comes up, seeded once from an externally supplied statistical
//! spectrum, dropped wholesale on teardown.

use bytemuck::{Pod, Zeroable};

use crate::config::OceanConfig;
use crate::device::{BufferHandle, OceanDevice};
use crate::error::{RenderError, RenderResult};

/// One complex amplitude per frequency bin.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, Pod, Zeroable)]
pub struct ComplexAmplitude {
    pub re: f32,
    pub im: f32,
}

/// Which wave field a distribution feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaveField {
    Height,
    Displacement,
    Normal,
}

/// The three device-resident distribution buffers.
#[derive(Debug)]
pub struct DistributionSet {
    pub height: BufferHandle,
    pub displacement: BufferHandle,
    pub normal: BufferHandle,
    height_size: u32,
    displacement_size: u32,
    normal_size: u32,
}

impl DistributionSet {
    /// Allocate all three buffers zero-initialized, sized by the respective
    /// transform sizes.
    pub fn new(device: &mut dyn OceanDevice, config: &OceanConfig) -> RenderResult<Self> {
        let bin = std::mem::size_of::<ComplexAmplitude>() as u64;
        let height = device.create_storage_buffer(
            "ocean.distribution.height",
            u64::from(config.height_fft_size).pow(2) * bin,
        )?;
        let displacement = device.create_storage_buffer(
            "ocean.distribution.displacement",
            u64::from(config.displacement_fft_size).pow(2) * bin,
        )?;
        let normal = device.create_storage_buffer(
            "ocean.distribution.normal",
            u64::from(config.normal_fft_size).pow(2) * bin,
        )?;
        log::info!(
            "allocated spectrum distributions ({}² / {}² / {}² bins)",
            config.height_fft_size,
            config.displacement_fft_size,
            config.normal_fft_size
        );
        Ok(Self {
            height,
            displacement,
            normal,
            height_size: config.height_fft_size,
            displacement_size: config.displacement_fft_size,
            normal_size: config.normal_fft_size,
        })
    }

    pub fn buffer(&self, field: WaveField) -> BufferHandle {
        match field {
            WaveField::Height => self.height,
            WaveField::Displacement => self.displacement,
            WaveField::Normal => self.normal,
        }
    }

    pub fn size(&self, field: WaveField) -> u32 {
        match field {
            WaveField::Height => self.height_size,
            WaveField::Displacement => self.displacement_size,
            WaveField::Normal => self.normal_size,
        }
    }

    /// Seed one field's distribution from host data. `amplitudes` is row
    /// major, one bin per texel of the field's transform grid.
    pub fn upload(
        &self,
        device: &mut dyn OceanDevice,
        field: WaveField,
        amplitudes: &[ComplexAmplitude],
    ) -> RenderResult<()> {
        let size = self.size(field) as usize;
        if amplitudes.len() != size * size {
            return Err(RenderError::upload(format!(
                "distribution upload expects {} bins, got {}",
                size * size,
                amplitudes.len()
            )));
        }
        device.write_buffer(self.buffer(field), 0, bytemuck::cast_slice(amplitudes))
    }
}
