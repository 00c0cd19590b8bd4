// FAT16 short (8.3) directory entry decoding

use crate::fat_common::constants::*;
use crate::fat_common::fields::{read_u16, read_u32, trim_padding};
use crate::fat_common::FatTimestamp;
use serde::Serialize;
use std::fmt;

/// FAT directory entry attribute byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(transparent)]
pub struct FatAttributes(pub u8);

impl FatAttributes {
    pub const READ_ONLY: u8 = 0x01;
    pub const HIDDEN: u8 = 0x02;
    pub const SYSTEM: u8 = 0x04;
    pub const VOLUME_ID: u8 = 0x08;
    pub const DIRECTORY: u8 = 0x10;
    pub const ARCHIVE: u8 = 0x20;

    const NAMES: [(u8, &'static str); 6] = [
        (Self::READ_ONLY, "Read-Only"),
        (Self::HIDDEN, "Hidden"),
        (Self::SYSTEM, "System"),
        (Self::VOLUME_ID, "Volume Label"),
        (Self::DIRECTORY, "Directory"),
        (Self::ARCHIVE, "Archive"),
    ];

    pub fn is_read_only(&self) -> bool {
        self.0 & Self::READ_ONLY != 0
    }

    pub fn is_hidden(&self) -> bool {
        self.0 & Self::HIDDEN != 0
    }

    pub fn is_system(&self) -> bool {
        self.0 & Self::SYSTEM != 0
    }

    pub fn is_volume_id(&self) -> bool {
        self.0 & Self::VOLUME_ID != 0
    }

    pub fn is_directory(&self) -> bool {
        self.0 & Self::DIRECTORY != 0
    }

    pub fn is_archive(&self) -> bool {
        self.0 & Self::ARCHIVE != 0
    }
}

impl fmt::Display for FatAttributes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (bit, name) in Self::NAMES {
            if self.0 & bit != 0 {
                if !first {
                    f.write_str(" ")?;
                }
                f.write_str(name)?;
                first = false;
            }
        }
        Ok(())
    }
}

/// One decoded short-name directory record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DirEntry {
    pub name: String,
    pub size_bytes: u32,
    pub attributes: FatAttributes,
    pub first_cluster: u16,
    pub modified: Option<FatTimestamp>,
}

impl DirEntry {
    pub fn is_directory(&self) -> bool {
        self.attributes.is_directory()
    }

    /// The `.` and `..` links every subdirectory starts with.
    pub fn is_dot_entry(&self) -> bool {
        self.name == "." || self.name == ".."
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryOutcome {
    /// First byte 0x00: no further entries in this directory.
    EndOfDirectory,
    Deleted,
    /// Volume label, including VFAT long-name slots which carry the same bit.
    VolumeLabel,
    Valid(DirEntry),
    /// Name bytes outside `[A-Za-z0-9_]`; the record is skipped.
    Rejected { raw_name: [u8; 11] },
}

/// Decode one 32-byte directory record.
pub fn decode_entry(raw: &[u8; DIR_ENTRY_SIZE]) -> EntryOutcome {
    match raw[DIR_NAME] {
        ENTRY_END_OF_DIRECTORY => return EntryOutcome::EndOfDirectory,
        ENTRY_DELETED => return EntryOutcome::Deleted,
        _ => {}
    }

    let attributes = FatAttributes(raw[DIR_ATTR]);
    if attributes.is_volume_id() {
        return EntryOutcome::VolumeLabel;
    }

    let mut raw_name = [0u8; 11];
    raw_name.copy_from_slice(&raw[DIR_NAME..DIR_NAME + 11]);
    let name = match decode_short_name(&raw_name) {
        Some(name) => name,
        None => return EntryOutcome::Rejected { raw_name },
    };

    // Offsets are fixed inside a 32-byte record, so these reads cannot miss.
    let time = read_u16(raw, DIR_WRT_TIME).unwrap_or(0);
    let date = read_u16(raw, DIR_WRT_DATE).unwrap_or(0);

    EntryOutcome::Valid(DirEntry {
        name,
        size_bytes: read_u32(raw, DIR_FILE_SIZE).unwrap_or(0),
        attributes,
        first_cluster: read_u16(raw, DIR_FST_CLUS_LO).unwrap_or(0),
        modified: FatTimestamp::decode(date, time),
    })
}

/// Join the space-padded base and extension of an 8.3 name.
///
/// Returns `None` if either part holds a byte outside `[A-Za-z0-9_]` or the
/// base is blank. The dot links are the only names allowed to break that rule.
pub fn decode_short_name(raw_name: &[u8; 11]) -> Option<String> {
    let base = trim_padding(&raw_name[..8]);
    let ext = trim_padding(&raw_name[DIR_EXT..]);

    if ext.is_empty() && (base == b"." || base == b"..") {
        return Some(String::from_utf8_lossy(base).into_owned());
    }
    if base.is_empty() || !base.iter().chain(ext).all(|&b| is_name_byte(b)) {
        return None;
    }

    let mut name = String::with_capacity(12);
    name.extend(base.iter().map(|&b| b as char));
    if !ext.is_empty() {
        name.push('.');
        name.extend(ext.iter().map(|&b| b as char));
    }
    Some(name)
}

fn is_name_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}
