// FAT16 module - boot sector, FAT, directory entries and the tree walker

pub mod boot_sector;
pub mod directory_entry;
pub mod fat_table;
pub mod findings;
pub mod reader;
pub mod walker;


pub use boot_sector::{parse_boot_sector, VolumeGeometry};
pub use directory_entry::{decode_entry, DirEntry, EntryOutcome, FatAttributes};
pub use fat_table::{ClusterLink, FatTable};
pub use findings::{Finding, FindingKind};
pub use reader::{Fat16Reader, ScanReport, VolumeInfo};
pub use walker::{DirectoryLocation, DirectoryWalker, TraversalNode, WalkState};
