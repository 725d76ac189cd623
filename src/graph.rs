//! Resource-graph contract.
//!
//! The core declares named transient resources once, then resolves them to
//! physical device handles each frame through [`crate::device::FrameContext`].
//! The graph implementation owns allocation, aliasing and inter-pass memory
//! barriers; the core only names what it needs.

use crate::device::ImageFormat;

/// Identifier for a declared transient resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceHandle(pub usize);

/// Sizing mode for declared images. The ocean only ever declares absolute
/// sizes; swapchain-relative sizing exists for the surrounding graph's own
/// passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeClass {
    /// Fixed resolution in texels.
    Absolute,
    /// Fraction of the swapchain extent.
    SwapchainRelative,
}

/// Declaration of a storage image output.
#[derive(Debug, Clone)]
pub struct AttachmentInfo {
    pub format: ImageFormat,
    pub width: u32,
    pub height: u32,
    /// 0 means the natural full mip chain for the extent.
    pub levels: u32,
    pub size_class: SizeClass,
}

impl AttachmentInfo {
    pub fn absolute(format: ImageFormat, width: u32, height: u32) -> Self {
        Self {
            format,
            width,
            height,
            levels: 1,
            size_class: SizeClass::Absolute,
        }
    }

    pub fn with_levels(mut self, levels: u32) -> Self {
        self.levels = levels;
        self
    }
}

/// Declaration of a storage buffer output.
#[derive(Debug, Clone, Copy)]
pub struct BufferInfo {
    pub size: u64,
    /// Consumed by an indirect draw in addition to compute access.
    pub indirect: bool,
}

impl BufferInfo {
    pub fn storage(size: u64) -> Self {
        Self {
            size,
            indirect: false,
        }
    }

    pub fn indirect(size: u64) -> Self {
        Self {
            size,
            indirect: true,
        }
    }
}

/// Declaration surface of the external resource graph.
pub trait ResourceGraph {
    fn declare_storage_image(&mut self, name: &str, info: AttachmentInfo) -> ResourceHandle;
    fn declare_storage_buffer(&mut self, name: &str, info: BufferInfo) -> ResourceHandle;
}
