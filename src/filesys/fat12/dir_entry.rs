//! FAT12 directory entry structure and 8.3 names

use super::{le16, le32};
use crate::constants::fat12::*;
use crate::filesys::FsError;
use arrayvec::ArrayString;

/// An 11-byte space-padded 8.3 name, exactly as stored on disk
pub type ShortName = [u8; SHORT_NAME_LENGTH];

/// 8.3 format directory entry (32 bytes), decoded field by field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirEntry83 {
    /// 8 character filename followed by 3 character extension
    pub name: ShortName,

    /// File attributes (read-only, directory, etc)
    pub attributes: u8,

    /// Creation time, tenths of a second
    pub created_time_tenths: u8,

    /// Creation time
    pub created_time: u16,

    /// Creation date
    pub created_date: u16,

    /// Last access date
    pub accessed_date: u16,

    /// High half of the first cluster; always zero on FAT12
    pub first_cluster_high: u16,

    /// Modification time
    pub modified_time: u16,

    /// Modification date
    pub modified_date: u16,

    /// First cluster number
    pub first_cluster_low: u16,

    /// File size in bytes
    pub size: u32,
}

impl DirEntry83 {
    /// Decodes one 32-byte slot
    pub fn parse(raw: &[u8]) -> Result<Self, FsError> {
        if raw.len() < DIR_ENTRY_SIZE {
            return Err(FsError::FormatError);
        }

        let mut name = [0u8; SHORT_NAME_LENGTH];
        name.copy_from_slice(&raw[DIR_NAME..DIR_NAME + SHORT_NAME_LENGTH]);

        Ok(Self {
            name,
            attributes: raw[DIR_ATTRIBUTES],
            created_time_tenths: raw[DIR_CREATED_TIME_TENTHS],
            created_time: le16(raw, DIR_CREATED_TIME),
            created_date: le16(raw, DIR_CREATED_DATE),
            accessed_date: le16(raw, DIR_ACCESSED_DATE),
            first_cluster_high: le16(raw, DIR_FIRST_CLUSTER_HIGH),
            modified_time: le16(raw, DIR_MODIFIED_TIME),
            modified_date: le16(raw, DIR_MODIFIED_DATE),
            first_cluster_low: le16(raw, DIR_FIRST_CLUSTER_LOW),
            size: le32(raw, DIR_SIZE),
        })
    }

    /// Creates a new file entry with given name, starting cluster and size
    pub fn new_file(name: ShortName, first_cluster: u16, size: u32) -> Self {
        Self {
            name,
            attributes: ATTR_ARCHIVE,
            created_time_tenths: 0,
            created_time: 0,
            created_date: 0,
            accessed_date: 0,
            first_cluster_high: 0,
            modified_time: 0,
            modified_date: 0,
            first_cluster_low: first_cluster,
            size,
        }
    }

    /// Encodes the entry back into its 32-byte slot form
    pub fn to_bytes(&self) -> [u8; DIR_ENTRY_SIZE] {
        let mut raw = [0u8; DIR_ENTRY_SIZE];
        raw[DIR_NAME..DIR_NAME + SHORT_NAME_LENGTH].copy_from_slice(&self.name);
        raw[DIR_ATTRIBUTES] = self.attributes;
        raw[DIR_CREATED_TIME_TENTHS] = self.created_time_tenths;
        let words = [
            (DIR_CREATED_TIME, self.created_time),
            (DIR_CREATED_DATE, self.created_date),
            (DIR_ACCESSED_DATE, self.accessed_date),
            (DIR_FIRST_CLUSTER_HIGH, self.first_cluster_high),
            (DIR_MODIFIED_TIME, self.modified_time),
            (DIR_MODIFIED_DATE, self.modified_date),
            (DIR_FIRST_CLUSTER_LOW, self.first_cluster_low),
        ];
        for (offset, value) in words {
            raw[offset..offset + 2].copy_from_slice(&value.to_le_bytes());
        }
        raw[DIR_SIZE..DIR_SIZE + 4].copy_from_slice(&self.size.to_le_bytes());
        raw
    }

    /// Returns true if entry is marked as deleted
    pub fn is_deleted(&self) -> bool {
        self.name[0] == DELETED_ENTRY_MARKER
    }

    /// Returns true if entry is empty/unused
    pub fn is_free(&self) -> bool {
        self.name[0] == FREE_ENTRY_MARKER
    }

    /// Returns true if entry is a directory
    pub fn is_directory(&self) -> bool {
        self.attributes & ATTR_DIRECTORY != 0
    }

    /// Returns true if entry holds the volume label
    pub fn is_volume_label(&self) -> bool {
        self.attributes & ATTR_VOLUME_ID != 0
    }

    /// First cluster of the file; FAT12 only uses the low half
    pub fn first_cluster(&self) -> u16 {
        self.first_cluster_low
    }

    /// Returns the filename as `NAME.EXT`, or `NAME` without an extension
    pub fn display_name(&self) -> ArrayString<12> {
        let mut out = ArrayString::new();
        let base = trim_padding(&self.name[..MAX_FILENAME_LENGTH]);
        let ext = trim_padding(&self.name[MAX_FILENAME_LENGTH..]);

        for &b in base {
            out.push(printable(b));
        }
        if !ext.is_empty() {
            out.push('.');
            for &b in ext {
                out.push(printable(b));
            }
        }
        out
    }

    /// Attributes as a fixed `RHSVDA` flag string, `-` where unset
    pub fn attribute_flags(&self) -> ArrayString<6> {
        let flags = [
            (ATTR_READ_ONLY, 'R'),
            (ATTR_HIDDEN, 'H'),
            (ATTR_SYSTEM, 'S'),
            (ATTR_VOLUME_ID, 'V'),
            (ATTR_DIRECTORY, 'D'),
            (ATTR_ARCHIVE, 'A'),
        ];
        let mut out = ArrayString::new();
        for (mask, c) in flags {
            out.push(if self.attributes & mask != 0 { c } else { '-' });
        }
        out
    }
}

fn trim_padding(field: &[u8]) -> &[u8] {
    let end = field.iter().rposition(|&b| b != b' ').map_or(0, |i| i + 1);
    &field[..end]
}

fn printable(b: u8) -> char {
    if b.is_ascii_graphic() {
        b as char
    } else {
        '?'
    }
}

/// Builds the on-disk 8.3 form of `name`.
///
/// An argument of exactly 11 bytes is taken as already padded. Otherwise the
/// part before the last `.` becomes the base (at most 8 bytes) and the part
/// after it the extension (at most 3 bytes). Case is left untouched.
pub fn short_name(name: &str) -> Option<ShortName> {
    let bytes = name.as_bytes();
    let mut out = [b' '; SHORT_NAME_LENGTH];

    if bytes.len() == SHORT_NAME_LENGTH {
        out.copy_from_slice(bytes);
        return Some(out);
    }

    let (base, ext) = match bytes.iter().rposition(|&b| b == b'.') {
        Some(dot) if dot > 0 => (&bytes[..dot], &bytes[dot + 1..]),
        _ => (bytes, &[][..]),
    };
    if base.is_empty() || base.len() > MAX_FILENAME_LENGTH || ext.len() > MAX_EXTENSION_LENGTH {
        return None;
    }

    out[..base.len()].copy_from_slice(base);
    out[MAX_FILENAME_LENGTH..MAX_FILENAME_LENGTH + ext.len()].copy_from_slice(ext);
    Some(out)
}
