// Read-only FAT16 volume inspection

pub mod fat16;
pub mod fat_common;

#[cfg(test)]
pub mod test_helpers;

pub use fat16::{
    DirEntry, DirectoryLocation, DirectoryWalker, Fat16Reader, FatAttributes, FatTable, Finding,
    FindingKind, ScanReport, TraversalNode, VolumeGeometry, VolumeInfo,
};
pub use fat_common::FatTimestamp;
