//! Builds synthetic FAT12 images in memory

use super::{dir_entry::DirEntry83, Geometry};
use crate::constants::fat12::{DIR_ENTRY_SIZE, END_OF_CHAIN, FAT12_ENTRY_MASK, FIRST_DATA_CLUSTER};

/// Stores the 12-bit `value` as the entry of `cluster` in a packed FAT buffer
pub fn encode_entry(fat: &mut [u8], cluster: u16, value: u16) {
    let offset = cluster as usize * 3 / 2;
    let value = value & FAT12_ENTRY_MASK;
    let word = u16::from_le_bytes([fat[offset], fat[offset + 1]]);
    let word = if cluster % 2 == 0 {
        (word & 0xF000) | value
    } else {
        (word & 0x000F) | (value << 4)
    };
    fat[offset..offset + 2].copy_from_slice(&word.to_le_bytes());
}

/// Lays out a fresh image: boot sector, identical FAT copies, root directory
/// and data region, sized by `Geometry::sector_count`.
pub struct ImageBuilder {
    geometry: Geometry,
    image: Vec<u8>,
    fat: Vec<u8>,
    next_slot: usize,
    next_cluster: u16,
}

impl ImageBuilder {
    pub fn new(geometry: Geometry) -> Self {
        let bps = geometry.bytes_per_sector as usize;
        let mut image = vec![0u8; geometry.sector_count() as usize * bps];
        image[..bps.min(512)].copy_from_slice(&geometry.to_bytes()[..bps.min(512)]);

        // First two FAT entries are reserved
        let mut fat = vec![0u8; geometry.fat_size()];
        encode_entry(&mut fat, 0, 0xF00 | geometry.media_descriptor as u16);
        encode_entry(&mut fat, 1, END_OF_CHAIN);

        Self {
            geometry,
            image,
            fat,
            next_slot: 0,
            next_cluster: FIRST_DATA_CLUSTER,
        }
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    /// Sets the FAT entry of `cluster`
    pub fn set_entry(&mut self, cluster: u16, value: u16) -> &mut Self {
        encode_entry(&mut self.fat, cluster, value);
        self
    }

    /// Fills `cluster` with `data`, zero padding the rest of the cluster
    pub fn write_cluster(&mut self, cluster: u16, data: &[u8]) -> &mut Self {
        let size = self.geometry.cluster_size();
        let start = self.geometry.cluster_lba(cluster) as usize * self.geometry.bytes_per_sector as usize;
        let len = data.len().min(size);
        self.image[start..start + len].copy_from_slice(&data[..len]);
        self.image[start + len..start + size].fill(0);
        self
    }

    /// Writes `entry` into the next root directory slot
    pub fn add_entry(&mut self, entry: DirEntry83) -> &mut Self {
        let bps = self.geometry.bytes_per_sector as usize;
        let start = self.geometry.root_dir_lba() as usize * bps + self.next_slot * DIR_ENTRY_SIZE;
        self.image[start..start + DIR_ENTRY_SIZE].copy_from_slice(&entry.to_bytes());
        self.next_slot += 1;
        self
    }

    /// Stores `contents` in fresh consecutive clusters, links them and adds
    /// a directory entry. Returns the first cluster, or 0 for an empty file.
    pub fn add_file(&mut self, name: [u8; 11], contents: &[u8]) -> u16 {
        let clusters = contents.chunks(self.geometry.cluster_size()).count() as u16;
        if clusters == 0 {
            self.add_entry(DirEntry83::new_file(name, 0, 0));
            return 0;
        }

        let first = self.next_cluster;
        for (i, chunk) in contents.chunks(self.geometry.cluster_size()).enumerate() {
            let cluster = first + i as u16;
            let next = if i as u16 + 1 == clusters {
                END_OF_CHAIN
            } else {
                cluster + 1
            };
            self.write_cluster(cluster, chunk);
            self.set_entry(cluster, next);
        }
        self.next_cluster = first + clusters;
        self.add_entry(DirEntry83::new_file(name, first, contents.len() as u32));
        first
    }

    /// Produces the image bytes with every FAT copy in place
    pub fn build(&self) -> Vec<u8> {
        let mut image = self.image.clone();
        let fat_start = self.geometry.fat_lba() as usize * self.geometry.bytes_per_sector as usize;
        for copy in 0..self.geometry.fat_count as usize {
            let start = fat_start + copy * self.fat.len();
            image[start..start + self.fat.len()].copy_from_slice(&self.fat);
        }
        image
    }
}
