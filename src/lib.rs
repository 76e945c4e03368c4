#![cfg_attr(feature = "strict", deny(warnings))]

//! Read-only access to FAT12 disk images: boot sector decoding, packed
//! 12-bit FAT entries, root directory lookup and cluster chain reads.

pub mod constants;
pub mod filesys;
pub mod logging;

pub use filesys::block::{ImageBlockDevice, MemoryBlockDevice};
pub use filesys::fat12::{
    short_name, DirEntry83, Fat12, FatTable, FileReader, Geometry, OpenError, OpenOptions,
    OpenStage, RootDirectory,
};
pub use filesys::{BlockDevice, FsError};
