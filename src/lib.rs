//! GPU ocean surface: spectral wave synthesis feeding an LOD-culled,
//! indirect-drawn patch grid.
//!
//! The per-frame work is generated and consumed on the compute device: a
//! phase-rotation kernel animates three frequency-domain distributions,
//! inverse transforms bring them back to spatial height/displacement/normal
//! fields, a bake step packs them into mip-chained maps, and a cull pass
//! classifies the camera-snapped cell window into LOD buckets whose atomic
//! counters drive one indirect draw per bucket. Host code only orchestrates
//! pass order through the capability interface in [`device`]; the [`backend`]
//! module provides the wgpu adapter and a CPU reference executor.

pub mod backend;
pub mod config;
pub mod device;
pub mod error;
pub mod frustum;
pub mod gpu;
pub mod graph;
pub mod mesh;
pub mod ocean;
pub mod render;
pub mod spectrum;
pub mod transform;

pub use config::{OceanConfig, MAX_LOD_BUCKETS};
pub use error::{RenderError, RenderResult};
pub use frustum::Frustum;
pub use ocean::Ocean;
pub use render::{record_draws, OceanRenderInfo};
pub use spectrum::{ComplexAmplitude, WaveField};
