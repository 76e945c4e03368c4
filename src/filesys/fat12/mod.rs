//! FAT12 filesystem implementation (read-only, root directory only)

use super::*;
use crate::constants::fat12::BOOT_SECTOR_SIZE;

mod boot_sector;
mod dir_entry;
mod fat_entry;
mod fat_table;
mod file;
#[doc(hidden)]
pub mod image;
mod root_dir;

pub use boot_sector::Geometry;
pub use dir_entry::{short_name, DirEntry83, ShortName};
pub use fat_entry::FatEntry;
pub use fat_table::{Chain, FatTable};
pub use file::{ClusterReader, FileReader};
pub use root_dir::RootDirectory;

pub(crate) fn le16(raw: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([raw[offset], raw[offset + 1]])
}

pub(crate) fn le32(raw: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([raw[offset], raw[offset + 1], raw[offset + 2], raw[offset + 3]])
}

/// Options that change how an image is opened
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenOptions {
    /// Validate the boot sector beyond its length
    pub strict: bool,
    /// Never match unused (0x00) or deleted (0xE5) directory slots
    pub skip_free_entries: bool,
}

/// Loading step that failed while opening an image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenStage {
    BootSector,
    Fat,
    RootDirectory,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenError {
    pub stage: OpenStage,
    pub error: FsError,
}

impl fmt::Display for OpenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stage = match self.stage {
            OpenStage::BootSector => "boot sector",
            OpenStage::Fat => "FAT",
            OpenStage::RootDirectory => "root directory",
        };
        write!(f, "could not read {}: {}", stage, self.error)
    }
}

impl std::error::Error for OpenError {}

/// An open FAT12 image: the device plus everything loaded from it
pub struct Fat12<'a> {
    /// Underlying block device
    device: Box<dyn BlockDevice + 'a>,
    /// Geometry decoded from the boot sector
    geometry: Geometry,
    /// First FAT copy
    fat: FatTable,
    /// Root directory region
    root_dir: RootDirectory,
    options: OpenOptions,
}

impl<'a> Fat12<'a> {
    pub fn open(device: Box<dyn BlockDevice + 'a>) -> Result<Self, OpenError> {
        Self::open_with(device, OpenOptions::default())
    }

    /// Reads the boot sector, then loads the FAT and the root directory
    pub fn open_with(
        mut device: Box<dyn BlockDevice + 'a>,
        options: OpenOptions,
    ) -> Result<Self, OpenError> {
        let geometry =
            read_geometry(device.as_ref(), options).map_err(at(OpenStage::BootSector))?;
        device.set_block_size(geometry.bytes_per_sector as usize);

        let fat = FatTable::load(device.as_ref(), &geometry).map_err(at(OpenStage::Fat))?;
        let root_dir =
            RootDirectory::load(device.as_ref(), &geometry).map_err(at(OpenStage::RootDirectory))?;
        log::info!(
            "opened FAT12 volume {:?}: {} sectors, data at LBA {}",
            core::str::from_utf8(&geometry.volume_label).unwrap_or("?").trim_end(),
            geometry.sector_count(),
            root_dir.end_lba()
        );

        Ok(Self {
            device,
            geometry,
            fat,
            root_dir,
            options,
        })
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    pub fn fat(&self) -> &FatTable {
        &self.fat
    }

    pub fn root_directory(&self) -> &RootDirectory {
        &self.root_dir
    }

    /// Looks `name` up in the root directory; see `RootDirectory::find`
    pub fn find(&self, name: &ShortName) -> Option<DirEntry83> {
        if self.options.skip_free_entries {
            self.root_dir.find_live(name)
        } else {
            self.root_dir.find(name)
        }
    }

    /// Live root directory entries in slot order
    pub fn entries(&self) -> impl Iterator<Item = DirEntry83> + '_ {
        self.root_dir.entries()
    }

    pub fn reader(&self) -> FileReader<'_> {
        FileReader::new(
            self.device.as_ref(),
            &self.fat,
            &self.geometry,
            self.root_dir.end_lba(),
        )
    }

    /// Reads every cluster of `entry`; the result is not truncated
    pub fn read_entry(&self, entry: &DirEntry83) -> Result<Vec<u8>, FsError> {
        self.reader().read(entry)
    }

    /// Finds `name` and returns exactly `size` bytes of its contents
    pub fn read_file(&self, name: &ShortName) -> Result<Vec<u8>, FsError> {
        let entry = self.find(name).ok_or(FsError::NotFound)?;
        let mut contents = self.read_entry(&entry)?;
        contents.truncate(entry.size as usize);
        Ok(contents)
    }
}

fn at(stage: OpenStage) -> impl FnOnce(FsError) -> OpenError {
    move |error| OpenError { stage, error }
}

/// Reads up to one boot sector from the start of the device. An image
/// shorter than that is handed to the parser as is, which decides whether
/// the record fits.
fn read_geometry(device: &dyn BlockDevice, options: OpenOptions) -> Result<Geometry, FsError> {
    let available = device.byte_len().min(BOOT_SECTOR_SIZE as u64) as usize;
    let mut raw = [0u8; BOOT_SECTOR_SIZE];
    device.read_at(0, &mut raw[..available])?;

    if options.strict {
        Geometry::parse_strict(&raw[..available])
    } else {
        Geometry::parse(&raw[..available])
    }
}
