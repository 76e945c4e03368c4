//! FAT12 file allocation table entry

use crate::constants::fat12::{BAD_CLUSTER, END_OF_CHAIN_MIN, FIRST_DATA_CLUSTER};

/// A decoded 12-bit FAT entry: the next cluster in a chain or a special value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FatEntry {
    /// Cluster number or special value (0=free, 0xFF7=bad, >=0xFF8=end)
    pub cluster: u16,
}

impl FatEntry {
    /// Returns true if this entry marks the end of a cluster chain
    pub fn is_end_of_chain(&self) -> bool {
        self.cluster >= END_OF_CHAIN_MIN
    }

    /// Returns true if this entry carries the bad-cluster marker
    pub fn is_bad(&self) -> bool {
        self.cluster == BAD_CLUSTER
    }

    /// Returns true if this cluster is unused/free
    pub fn is_free(&self) -> bool {
        self.cluster == 0
    }

    /// Returns the next cluster if this entry is a valid chain reference
    pub fn next(&self) -> Option<u16> {
        (FIRST_DATA_CLUSTER..BAD_CLUSTER)
            .contains(&self.cluster)
            .then_some(self.cluster)
    }
}

impl From<u16> for FatEntry {
    fn from(cluster: u16) -> Self {
        Self { cluster }
    }
}
