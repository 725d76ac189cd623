//! Inverse spectral transform plans.
//!
//! Three independent plans turn the phase-rotated frequency buffers back into
//! spatial fields each frame. Plans are created at device initialization and
//! the adapter shares compiled programs and twiddle data between them; the
//! plans themselves are stateless — identical input bits give identical
//! output bits, modulo the 16-bit storage precision.

use crate::config::OceanConfig;
use crate::device::{OceanDevice, TransformDesc, TransformHandle, TransformKind};
use crate::error::RenderResult;

/// The three per-field plans, in the order synthesis runs them.
#[derive(Debug)]
pub struct TransformSet {
    pub height: TransformHandle,
    pub displacement: TransformHandle,
    pub normal: TransformHandle,
}

impl TransformSet {
    pub fn new(device: &mut dyn OceanDevice, config: &OceanConfig) -> RenderResult<Self> {
        let height = device.create_transform(TransformDesc {
            size: config.height_fft_size,
            kind: TransformKind::ComplexToReal,
        })?;
        let displacement = device.create_transform(TransformDesc {
            size: config.displacement_fft_size,
            kind: TransformKind::ComplexToComplex,
        })?;
        let normal = device.create_transform(TransformDesc {
            size: config.normal_fft_size,
            kind: TransformKind::ComplexToComplex,
        })?;
        log::info!(
            "created transform plans: height {n0}x{n0} c2r, displacement {n1}x{n1} c2c, normal {n2}x{n2} c2c",
            n0 = config.height_fft_size,
            n1 = config.displacement_fft_size,
            n2 = config.normal_fft_size,
        );
        Ok(Self {
            height,
            displacement,
            normal,
        })
    }
}
