//! Block device over a disk image file

use crate::constants::fat12::BOOT_SECTOR_SIZE;
use crate::filesys::{BlockDevice, FsError};
use spin::Mutex;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

/// Read-only block device backed by an image file.
/// Reads take `&self`, so the seek position lives behind a lock.
pub struct ImageBlockDevice {
    file: Mutex<File>,
    len: u64,
    block_size: usize,
}

impl ImageBlockDevice {
    /// Opens the image at `path` for reading
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, FsError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            log::warn!("open {}: {}", path.display(), e);
            FsError::IOError
        })?;
        Self::from_file(file)
    }

    /// Wraps an already open file
    pub fn from_file(file: File) -> Result<Self, FsError> {
        let len = file
            .metadata()
            .map_err(|e| {
                log::warn!("image metadata: {}", e);
                FsError::IOError
            })?
            .len();
        Ok(Self {
            file: Mutex::new(file),
            len,
            block_size: BOOT_SECTOR_SIZE,
        })
    }
}

impl BlockDevice for ImageBlockDevice {
    fn read_at(&self, offset: u64, buf: &mut [u8]) -> Result<(), FsError> {
        let mut file = self.file.lock();
        file.seek(SeekFrom::Start(offset))
            .and_then(|_| file.read_exact(buf))
            .map_err(|e| {
                log::warn!("read of {} bytes at {:#x}: {}", buf.len(), offset, e);
                FsError::IOError
            })
    }

    fn block_size(&self) -> usize {
        self.block_size
    }

    fn set_block_size(&mut self, block_size: usize) {
        self.block_size = block_size;
    }

    fn byte_len(&self) -> u64 {
        self.len
    }
}
