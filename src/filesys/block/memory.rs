//! In-memory block device implementation

use crate::constants::fat12::BOOT_SECTOR_SIZE;
use crate::filesys::{BlockDevice, FsError};
use core::result::Result;

/// Block device backed by a byte buffer holding a whole image
pub struct MemoryBlockDevice {
    /// Image contents
    data: Vec<u8>,

    /// Size of each block in bytes
    block_size: usize,
}

impl MemoryBlockDevice {
    /// Wraps an existing image; the block size starts at one boot sector
    pub fn from_bytes(data: Vec<u8>) -> Self {
        Self {
            data,
            block_size: BOOT_SECTOR_SIZE,
        }
    }

    /// Validates the byte range is within the image
    fn validate_range(&self, offset: u64, len: usize) -> Result<usize, FsError> {
        let start = usize::try_from(offset).map_err(|_| FsError::IOError)?;
        match start.checked_add(len) {
            Some(end) if end <= self.data.len() => Ok(start),
            _ => Err(FsError::IOError),
        }
    }
}

impl BlockDevice for MemoryBlockDevice {
    fn read_at(&self, offset: u64, buf: &mut [u8]) -> Result<(), FsError> {
        let start = self.validate_range(offset, buf.len())?;
        buf.copy_from_slice(&self.data[start..start + buf.len()]);
        Ok(())
    }

    fn block_size(&self) -> usize {
        self.block_size
    }

    fn set_block_size(&mut self, block_size: usize) {
        self.block_size = block_size;
    }

    fn byte_len(&self) -> u64 {
        self.data.len() as u64
    }
}
