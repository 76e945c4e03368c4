//! FAT12 boot sector (BPB + EBR) decoding

use super::{le16, le32};
use crate::constants::fat12::*;
use crate::filesys::FsError;

/// Volume geometry decoded from the boot sector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    /// Name of the system that formatted the volume
    pub oem_id: [u8; 8],

    /// Number of bytes per sector
    pub bytes_per_sector: u16,

    /// Number of sectors per cluster
    pub sectors_per_cluster: u8,

    /// Number of reserved sectors at start of volume, including the boot sector
    pub reserved_sectors: u16,

    /// Number of FAT copies
    pub fat_count: u8,

    /// Number of root directory slots
    pub dir_entry_count: u16,

    /// Total number of sectors (16-bit)
    pub total_sectors: u16,

    /// Media type descriptor
    pub media_descriptor: u8,

    /// Size of each FAT copy in sectors
    pub sectors_per_fat: u16,

    /// Sectors per track for interrupt 0x13
    pub sectors_per_track: u16,

    /// Number of heads for interrupt 0x13
    pub heads: u16,

    /// Number of hidden sectors preceding the partition
    pub hidden_sectors: u32,

    /// Total number of sectors (32-bit), for volumes past the 16-bit range
    pub large_sector_count: u32,

    /// INT 13h drive number
    pub drive_number: u8,

    /// Extended boot signature
    pub signature: u8,

    /// Volume serial number
    pub volume_id: u32,

    /// Volume label
    pub volume_label: [u8; 11],

    /// Filesystem type string
    pub system_id: [u8; 8],
}

impl Default for Geometry {
    /// A 1.44 MB floppy
    fn default() -> Self {
        Self {
            oem_id: *b"MSWIN4.1",
            bytes_per_sector: 512,
            sectors_per_cluster: 1,
            reserved_sectors: 1,
            fat_count: 2,
            dir_entry_count: 224,
            total_sectors: 2880,
            media_descriptor: 0xF0,
            sectors_per_fat: 9,
            sectors_per_track: 18,
            heads: 2,
            hidden_sectors: 0,
            large_sector_count: 0,
            drive_number: 0,
            signature: 0x29,
            volume_id: 0x1234_5678,
            volume_label: *b"NO NAME    ",
            system_id: *b"FAT12   ",
        }
    }
}

impl Geometry {
    /// Decodes the fixed BPB + EBR record from the start of `raw`.
    ///
    /// Only the length and a nonzero sector size are checked; every other
    /// value is trusted as stored.
    pub fn parse(raw: &[u8]) -> Result<Self, FsError> {
        if raw.len() < BPB_RECORD_SIZE {
            return Err(FsError::FormatError);
        }
        // Every derived LBA divides by the sector size
        let bytes_per_sector = le16(raw, BPB_BYTES_PER_SECTOR);
        if bytes_per_sector == 0 {
            log::warn!("boot sector has a sector size of 0");
            return Err(FsError::FormatError);
        }

        let mut oem_id = [0u8; 8];
        oem_id.copy_from_slice(&raw[BPB_OEM_ID..BPB_OEM_ID + 8]);
        let mut volume_label = [0u8; 11];
        volume_label.copy_from_slice(&raw[EBR_VOLUME_LABEL..EBR_VOLUME_LABEL + 11]);
        let mut system_id = [0u8; 8];
        system_id.copy_from_slice(&raw[EBR_SYSTEM_ID..EBR_SYSTEM_ID + 8]);

        let geometry = Self {
            oem_id,
            bytes_per_sector,
            sectors_per_cluster: raw[BPB_SECTORS_PER_CLUSTER],
            reserved_sectors: le16(raw, BPB_RESERVED_SECTORS),
            fat_count: raw[BPB_FAT_COUNT],
            dir_entry_count: le16(raw, BPB_DIR_ENTRY_COUNT),
            total_sectors: le16(raw, BPB_TOTAL_SECTORS),
            media_descriptor: raw[BPB_MEDIA_DESCRIPTOR],
            sectors_per_fat: le16(raw, BPB_SECTORS_PER_FAT),
            sectors_per_track: le16(raw, BPB_SECTORS_PER_TRACK),
            heads: le16(raw, BPB_HEADS),
            hidden_sectors: le32(raw, BPB_HIDDEN_SECTORS),
            large_sector_count: le32(raw, BPB_LARGE_SECTOR_COUNT),
            drive_number: raw[EBR_DRIVE_NUMBER],
            signature: raw[EBR_SIGNATURE],
            volume_id: le32(raw, EBR_VOLUME_ID),
            volume_label,
            system_id,
        };

        log::debug!(
            "BPB: {} bytes/sector, {} sectors/cluster, {} reserved",
            geometry.bytes_per_sector,
            geometry.sectors_per_cluster,
            geometry.reserved_sectors
        );
        log::debug!(
            "BPB: {} FATs of {} sectors, {} root entries, media {:#04x}",
            geometry.fat_count,
            geometry.sectors_per_fat,
            geometry.dir_entry_count,
            geometry.media_descriptor
        );

        Ok(geometry)
    }

    /// Like `parse`, but also rejects boot sectors no FAT12 driver could use:
    /// a missing 0x55AA trailer, a sector size outside 512..=4096 or not a
    /// power of two, and zero cluster size, FAT count or FAT size.
    pub fn parse_strict(raw: &[u8]) -> Result<Self, FsError> {
        let geometry = Self::parse(raw)?;

        if raw.len() < BOOT_SECTOR_SIZE || raw[510..512] != BOOT_SIGNATURE {
            log::warn!("boot sector has no 0x55AA signature");
            return Err(FsError::FormatError);
        }
        let bps = geometry.bytes_per_sector;
        if !bps.is_power_of_two() || !(512..=4096).contains(&bps) {
            log::warn!("unsupported sector size {}", bps);
            return Err(FsError::FormatError);
        }
        if geometry.sectors_per_cluster == 0
            || geometry.fat_count == 0
            || geometry.sectors_per_fat == 0
        {
            log::warn!("boot sector describes an empty FAT layout");
            return Err(FsError::FormatError);
        }

        Ok(geometry)
    }

    /// Encodes a full boot sector, trailer included
    pub fn to_bytes(&self) -> [u8; BOOT_SECTOR_SIZE] {
        let mut raw = [0u8; BOOT_SECTOR_SIZE];
        raw[0..3].copy_from_slice(&[0xEB, 0x3C, 0x90]);
        raw[BPB_OEM_ID..BPB_OEM_ID + 8].copy_from_slice(&self.oem_id);
        put16(&mut raw, BPB_BYTES_PER_SECTOR, self.bytes_per_sector);
        raw[BPB_SECTORS_PER_CLUSTER] = self.sectors_per_cluster;
        put16(&mut raw, BPB_RESERVED_SECTORS, self.reserved_sectors);
        raw[BPB_FAT_COUNT] = self.fat_count;
        put16(&mut raw, BPB_DIR_ENTRY_COUNT, self.dir_entry_count);
        put16(&mut raw, BPB_TOTAL_SECTORS, self.total_sectors);
        raw[BPB_MEDIA_DESCRIPTOR] = self.media_descriptor;
        put16(&mut raw, BPB_SECTORS_PER_FAT, self.sectors_per_fat);
        put16(&mut raw, BPB_SECTORS_PER_TRACK, self.sectors_per_track);
        put16(&mut raw, BPB_HEADS, self.heads);
        raw[BPB_HIDDEN_SECTORS..BPB_HIDDEN_SECTORS + 4]
            .copy_from_slice(&self.hidden_sectors.to_le_bytes());
        raw[BPB_LARGE_SECTOR_COUNT..BPB_LARGE_SECTOR_COUNT + 4]
            .copy_from_slice(&self.large_sector_count.to_le_bytes());
        raw[EBR_DRIVE_NUMBER] = self.drive_number;
        raw[EBR_SIGNATURE] = self.signature;
        raw[EBR_VOLUME_ID..EBR_VOLUME_ID + 4].copy_from_slice(&self.volume_id.to_le_bytes());
        raw[EBR_VOLUME_LABEL..EBR_VOLUME_LABEL + 11].copy_from_slice(&self.volume_label);
        raw[EBR_SYSTEM_ID..EBR_SYSTEM_ID + 8].copy_from_slice(&self.system_id);
        raw[510..512].copy_from_slice(&BOOT_SIGNATURE);
        raw
    }

    /// Starting sector of the first FAT
    pub fn fat_lba(&self) -> u64 {
        self.reserved_sectors as u64
    }

    /// Size of one FAT copy in bytes
    pub fn fat_size(&self) -> usize {
        self.sectors_per_fat as usize * self.bytes_per_sector as usize
    }

    /// Starting sector of the root directory
    pub fn root_dir_lba(&self) -> u64 {
        self.reserved_sectors as u64 + self.sectors_per_fat as u64 * self.fat_count as u64
    }

    /// Sectors covered by the root directory, rounded up
    pub fn root_dir_sectors(&self) -> u64 {
        let size = (DIR_ENTRY_SIZE * self.dir_entry_count as usize) as u64;
        size.div_ceil(self.bytes_per_sector as u64)
    }

    /// Starting sector of the data region, right after the root directory
    pub fn data_lba(&self) -> u64 {
        self.root_dir_lba() + self.root_dir_sectors()
    }

    /// Size of each cluster in bytes
    pub fn cluster_size(&self) -> usize {
        self.sectors_per_cluster as usize * self.bytes_per_sector as usize
    }

    /// Converts cluster number to absolute sector number
    pub fn cluster_lba(&self, cluster: u16) -> u64 {
        let index = cluster as u64 - FIRST_DATA_CLUSTER as u64;
        self.data_lba() + index * self.sectors_per_cluster as u64
    }

    /// Sector count, preferring the 32-bit field when the 16-bit one is zero
    pub fn sector_count(&self) -> u32 {
        if self.total_sectors == 0 {
            self.large_sector_count
        } else {
            self.total_sectors as u32
        }
    }
}

fn put16(raw: &mut [u8], offset: usize, value: u16) {
    raw[offset..offset + 2].copy_from_slice(&value.to_le_bytes());
}
