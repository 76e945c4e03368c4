//! Fixed-size FAT12 root directory

use super::dir_entry::{DirEntry83, ShortName};
use crate::constants::fat12::DIR_ENTRY_SIZE;
use crate::filesys::{fat12::Geometry, BlockDevice, FsError};

/// The root directory region, loaded whole
pub struct RootDirectory {
    /// Raw slots, padded to whole sectors
    bytes: Vec<u8>,
    /// Number of slots declared by the boot sector
    entry_count: usize,
    /// Starting sector of the region
    start_lba: u64,
    /// First sector after the region; the data region starts here
    end_lba: u64,
}

impl RootDirectory {
    pub fn load(device: &dyn BlockDevice, geometry: &Geometry) -> Result<Self, FsError> {
        let start_lba = geometry.root_dir_lba();
        let sectors = geometry.root_dir_sectors();
        let bytes = device.read_sectors(start_lba, sectors as usize)?;
        log::debug!(
            "root directory: {} entries in {} sectors at LBA {}",
            geometry.dir_entry_count,
            sectors,
            start_lba
        );

        Ok(Self {
            bytes,
            entry_count: geometry.dir_entry_count as usize,
            start_lba,
            end_lba: start_lba + sectors,
        })
    }

    pub fn start_lba(&self) -> u64 {
        self.start_lba
    }

    /// First sector after the directory, which is where cluster 2 lives
    pub fn end_lba(&self) -> u64 {
        self.end_lba
    }

    pub fn entry_count(&self) -> usize {
        self.entry_count
    }

    /// Decodes the slot at `index`
    pub fn entry(&self, index: usize) -> Option<DirEntry83> {
        if index >= self.entry_count {
            return None;
        }
        let start = index * DIR_ENTRY_SIZE;
        let raw = self.bytes.get(start..start + DIR_ENTRY_SIZE)?;
        DirEntry83::parse(raw).ok()
    }

    /// Every slot in scan order, unused and deleted ones included
    pub fn slots(&self) -> impl Iterator<Item = DirEntry83> + '_ {
        (0..self.entry_count).map_while(|i| self.entry(i))
    }

    /// Slots holding an entry: not free, not deleted
    pub fn entries(&self) -> impl Iterator<Item = DirEntry83> + '_ {
        self.slots()
            .filter(|entry| !entry.is_free() && !entry.is_deleted())
    }

    /// Returns the first slot whose name equals `name` byte for byte.
    /// No case folding or padding is applied to `name`.
    pub fn find(&self, name: &ShortName) -> Option<DirEntry83> {
        self.slots().find(|entry| entry.name == *name)
    }

    /// Like `find`, but never matches an unused or deleted slot
    pub fn find_live(&self, name: &ShortName) -> Option<DirEntry83> {
        self.entries().find(|entry| entry.name == *name)
    }
}
