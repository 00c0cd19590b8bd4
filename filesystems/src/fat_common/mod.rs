// Shared FAT on-disk helpers

pub mod constants;
pub mod fields;
pub mod timestamps;

pub use timestamps::FatTimestamp;
