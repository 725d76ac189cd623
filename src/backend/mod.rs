//! Device adapters implementing the capability interface.

pub mod reference;
pub mod wgpu;
