//! Block device implementations

pub mod image;
pub mod memory;

pub use image::ImageBlockDevice;
pub use memory::MemoryBlockDevice;
