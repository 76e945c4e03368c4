use core::fmt;
use core::result::Result;

pub mod block;
pub mod fat12;

// Define error types for the filesystem operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FsError {
    /// The backing store could not satisfy an exact read
    IOError,
    /// A structure is too short (or, in strict mode, malformed)
    FormatError,
    /// Lookup found no matching directory entry
    NotFound,
    /// The FAT entry of the given cluster carries the bad-cluster marker
    BadCluster(u16),
    /// A chain references a cluster that cannot be part of a file
    InvalidCluster(u16),
    /// The chain is longer than the FAT can describe, so it loops
    ChainTooLong,
}

impl fmt::Display for FsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FsError::IOError => write!(f, "I/O error"),
            FsError::FormatError => write!(f, "malformed on-disk structure"),
            FsError::NotFound => write!(f, "file not found"),
            FsError::BadCluster(cluster) => {
                write!(f, "bad cluster marker after cluster {}", cluster)
            }
            FsError::InvalidCluster(cluster) => write!(f, "invalid cluster {:#05x}", cluster),
            FsError::ChainTooLong => write!(f, "cluster chain does not terminate"),
        }
    }
}

impl std::error::Error for FsError {}

/// Represents a read-only block device addressed in fixed-size sectors
pub trait BlockDevice: Send + Sync {
    /// Fills `buf` from byte `offset`. A short read is an error.
    fn read_at(&self, offset: u64, buf: &mut [u8]) -> Result<(), FsError>;

    /// Size of each block in bytes
    fn block_size(&self) -> usize;

    /// Sets the block size, normally from the boot sector geometry
    fn set_block_size(&mut self, block_size: usize);

    /// Size of the whole device in bytes
    fn byte_len(&self) -> u64;

    /// Total number of whole blocks on the device
    fn total_blocks(&self) -> u64 {
        self.byte_len()
            .checked_div(self.block_size() as u64)
            .unwrap_or(0)
    }

    /// Fails with `IOError` unless `count` blocks from `lba` lie on the
    /// device. Returns the byte offset and length of the range.
    fn sector_range(&self, lba: u64, count: usize) -> Result<(u64, usize), FsError> {
        let end = lba.checked_add(count as u64).ok_or(FsError::IOError)?;
        if end > self.total_blocks() {
            log::warn!(
                "sectors {}..{} are past the end of the device ({} blocks)",
                lba,
                end,
                self.total_blocks()
            );
            return Err(FsError::IOError);
        }
        let block_size = self.block_size();
        let len = count.checked_mul(block_size).ok_or(FsError::IOError)?;
        Ok((lba * block_size as u64, len))
    }

    /// Reads a single block into `buf`, which must be one block long
    fn read_block(&self, block_num: u64, buf: &mut [u8]) -> Result<(), FsError> {
        if buf.len() != self.block_size() {
            return Err(FsError::IOError);
        }
        self.read_at(block_num * self.block_size() as u64, buf)
    }

    /// Reads `count` consecutive sectors starting at `lba`
    fn read_sectors(&self, lba: u64, count: usize) -> Result<Vec<u8>, FsError> {
        let (offset, len) = self.sector_range(lba, count)?;
        let mut buf = vec![0u8; len];
        self.read_at(offset, &mut buf)?;
        Ok(buf)
    }

    /// Appends `count` sectors starting at `lba` to `out`.
    /// On failure `out` is left as it was before the call.
    fn append_sectors(&self, lba: u64, count: usize, out: &mut Vec<u8>) -> Result<(), FsError> {
        let (offset, len) = self.sector_range(lba, count)?;
        let start = out.len();
        out.resize(start + len, 0);
        let result = self.read_at(offset, &mut out[start..]);
        if result.is_err() {
            out.truncate(start);
        }
        result
    }
}
