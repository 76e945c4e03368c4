//! Process exit codes, one per failure stage of the reader.

pub const MISSING_ARGUMENTS: i32 = 1;
pub const IMAGE_OPEN_FAILED: i32 = 2;
pub const BOOT_SECTOR_FAILED: i32 = 3;
pub const FAT_LOAD_FAILED: i32 = 4;
pub const ROOT_DIR_LOAD_FAILED: i32 = 5;
pub const FILE_NOT_FOUND: i32 = 6;
pub const FILE_READ_FAILED: i32 = 7;
