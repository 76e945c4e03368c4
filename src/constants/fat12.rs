//! FAT12 on-disk layout constants

/// Size of the boot sector as read from offset 0 of the image
pub const BOOT_SECTOR_SIZE: usize = 512;

/// Size of the fixed BPB + EBR record in bytes
pub const BPB_RECORD_SIZE: usize = 62;

/// Size of a directory entry in bytes
pub const DIR_ENTRY_SIZE: usize = 32;

/// Length of an 8.3 name field (name + extension, space padded)
pub const SHORT_NAME_LENGTH: usize = 11;

/// Length of the base name portion of an 8.3 name
pub const MAX_FILENAME_LENGTH: usize = 8;

/// Length of the extension portion of an 8.3 name
pub const MAX_EXTENSION_LENGTH: usize = 3;

/// First cluster number that maps to the data region
pub const FIRST_DATA_CLUSTER: u16 = 2;

/// Mask for a decoded 12-bit FAT entry
pub const FAT12_ENTRY_MASK: u16 = 0x0FFF;

/// Marks a cluster that must not be trusted
pub const BAD_CLUSTER: u16 = 0x0FF7;

/// Smallest value marking the last cluster of a chain
pub const END_OF_CHAIN_MIN: u16 = 0x0FF8;

/// Value written for end of chain by most formatters
pub const END_OF_CHAIN: u16 = 0x0FFF;

/// Marker for deleted directory entries
pub const DELETED_ENTRY_MARKER: u8 = 0xE5;

/// Marker for an unused directory entry (and all entries after it)
pub const FREE_ENTRY_MARKER: u8 = 0x00;

/// Boot signature bytes at offsets 510 and 511
pub const BOOT_SIGNATURE: [u8; 2] = [0x55, 0xAA];

/// File attribute: Read-only
pub const ATTR_READ_ONLY: u8 = 0x01;

/// File attribute: Hidden
pub const ATTR_HIDDEN: u8 = 0x02;

/// File attribute: System
pub const ATTR_SYSTEM: u8 = 0x04;

/// File attribute: Volume label
pub const ATTR_VOLUME_ID: u8 = 0x08;

/// File attribute: Directory
pub const ATTR_DIRECTORY: u8 = 0x10;

/// File attribute: Archive
pub const ATTR_ARCHIVE: u8 = 0x20;

// BPB field offsets
pub const BPB_OEM_ID: usize = 3;
pub const BPB_BYTES_PER_SECTOR: usize = 11;
pub const BPB_SECTORS_PER_CLUSTER: usize = 13;
pub const BPB_RESERVED_SECTORS: usize = 14;
pub const BPB_FAT_COUNT: usize = 16;
pub const BPB_DIR_ENTRY_COUNT: usize = 17;
pub const BPB_TOTAL_SECTORS: usize = 19;
pub const BPB_MEDIA_DESCRIPTOR: usize = 21;
pub const BPB_SECTORS_PER_FAT: usize = 22;
pub const BPB_SECTORS_PER_TRACK: usize = 24;
pub const BPB_HEADS: usize = 26;
pub const BPB_HIDDEN_SECTORS: usize = 28;
pub const BPB_LARGE_SECTOR_COUNT: usize = 32;

// EBR field offsets
pub const EBR_DRIVE_NUMBER: usize = 36;
pub const EBR_SIGNATURE: usize = 38;
pub const EBR_VOLUME_ID: usize = 39;
pub const EBR_VOLUME_LABEL: usize = 43;
pub const EBR_SYSTEM_ID: usize = 54;

// Directory entry field offsets
pub const DIR_NAME: usize = 0;
pub const DIR_ATTRIBUTES: usize = 11;
pub const DIR_CREATED_TIME_TENTHS: usize = 13;
pub const DIR_CREATED_TIME: usize = 14;
pub const DIR_CREATED_DATE: usize = 16;
pub const DIR_ACCESSED_DATE: usize = 18;
pub const DIR_FIRST_CLUSTER_HIGH: usize = 20;
pub const DIR_MODIFIED_TIME: usize = 22;
pub const DIR_MODIFIED_DATE: usize = 24;
pub const DIR_FIRST_CLUSTER_LOW: usize = 26;
pub const DIR_SIZE: usize = 28;
