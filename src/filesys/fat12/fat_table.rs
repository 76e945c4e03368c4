//! In-memory copy of the first FAT with on-demand 12-bit decoding.
//!
//! Two consecutive entries share three bytes:
//!
//! ```text
//! bytes:   [ b0 ][ b1 ][ b2 ]
//! entry n (even):  b0 | (b1 & 0x0F) << 8
//! entry n+1 (odd): (b1 >> 4) | b2 << 4
//! ```
//!
//! Reading the little-endian word at `n * 3 / 2` and keeping the low 12 bits
//! (even) or shifting out the low 4 bits (odd) recovers either entry.

use super::{fat_entry::FatEntry, le16};
use crate::constants::fat12::{FAT12_ENTRY_MASK, FIRST_DATA_CLUSTER};
use crate::filesys::{fat12::Geometry, BlockDevice, FsError};

/// The FAT region, kept verbatim
pub struct FatTable {
    bytes: Vec<u8>,
}

impl FatTable {
    /// Reads `sectors_per_fat` sectors starting right after the reserved area
    pub fn load(device: &dyn BlockDevice, geometry: &Geometry) -> Result<Self, FsError> {
        let bytes = device.read_sectors(geometry.fat_lba(), geometry.sectors_per_fat as usize)?;
        log::debug!(
            "FAT: loaded {} bytes from LBA {}",
            bytes.len(),
            geometry.fat_lba()
        );
        Ok(Self { bytes })
    }

    /// Wraps an already loaded FAT region
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Number of entries the table can hold, the two reserved ones included
    pub fn entry_count(&self) -> usize {
        self.bytes.len() * 2 / 3
    }

    /// Decodes the 12-bit entry of `cluster`
    pub fn decode_entry(&self, cluster: u16) -> Result<u16, FsError> {
        let offset = cluster as usize * 3 / 2;
        if offset + 1 >= self.bytes.len() {
            return Err(FsError::InvalidCluster(cluster));
        }

        let word = le16(&self.bytes, offset);
        if cluster % 2 == 0 {
            Ok(word & FAT12_ENTRY_MASK)
        } else {
            Ok(word >> 4)
        }
    }

    /// Decodes and classifies the entry of `cluster`
    pub fn entry(&self, cluster: u16) -> Result<FatEntry, FsError> {
        self.decode_entry(cluster).map(FatEntry::from)
    }

    /// Lazily walks the chain starting at `start`
    pub fn chain(&self, start: u16) -> Chain<'_> {
        Chain {
            fat: self,
            state: ChainState::Pending(start),
            steps: 0,
            limit: self.entry_count(),
        }
    }
}

enum ChainState {
    Pending(u16),
    Failed(FsError),
    Done,
}

/// Iterator over the clusters of one chain.
///
/// Yields each cluster before the one its entry points to. A bad-cluster
/// marker, a free or reserved reference, or a chain longer than the table
/// surfaces as a final `Err` after the last good cluster.
pub struct Chain<'a> {
    fat: &'a FatTable,
    state: ChainState,
    steps: usize,
    limit: usize,
}

impl Iterator for Chain<'_> {
    type Item = Result<u16, FsError>;

    fn next(&mut self) -> Option<Self::Item> {
        match core::mem::replace(&mut self.state, ChainState::Done) {
            ChainState::Done => None,
            ChainState::Failed(err) => Some(Err(err)),
            ChainState::Pending(cluster) => {
                if cluster < FIRST_DATA_CLUSTER {
                    return Some(Err(FsError::InvalidCluster(cluster)));
                }
                self.steps += 1;
                if self.steps > self.limit {
                    log::warn!("chain exceeds {} clusters", self.limit);
                    return Some(Err(FsError::ChainTooLong));
                }

                self.state = match self.fat.entry(cluster) {
                    Ok(entry) if entry.is_end_of_chain() => ChainState::Done,
                    Ok(entry) if entry.is_bad() => ChainState::Failed(FsError::BadCluster(cluster)),
                    Ok(entry) => match entry.next() {
                        Some(next) => ChainState::Pending(next),
                        None => ChainState::Failed(FsError::InvalidCluster(entry.cluster)),
                    },
                    Err(err) => ChainState::Failed(err),
                };
                log::trace!("chain: cluster {}", cluster);
                Some(Ok(cluster))
            }
        }
    }
}
