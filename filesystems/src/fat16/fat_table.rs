// FAT16 allocation table: loaded once from the first FAT copy, read-only after

use super::boot_sector::VolumeGeometry;
use crate::fat_common::constants::{FAT16_BAD, FAT16_EOC, FAT16_FIRST_DATA_CLUSTER};
use byteorder::{ByteOrder, LittleEndian};
use fatwalk_core::{ByteSource, FatwalkError, Result};
use log::debug;

/// What a FAT entry says about the cluster that follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClusterLink {
    Next(u16),
    EndOfChain,
    /// 0xFFF7, the cluster is marked unreadable.
    Bad,
    /// 0 or 1, never a valid chain target.
    Corrupt(u16),
}

impl ClusterLink {
    pub fn classify(value: u16) -> Self {
        match value {
            v if v >= FAT16_EOC => ClusterLink::EndOfChain,
            FAT16_BAD => ClusterLink::Bad,
            v if v < FAT16_FIRST_DATA_CLUSTER => ClusterLink::Corrupt(v),
            v => ClusterLink::Next(v),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FatTable {
    entries: Vec<u16>,
}

impl FatTable {
    /// Load the first FAT copy described by `geometry`.
    pub fn load<S: ByteSource + ?Sized>(source: &S, geometry: &VolumeGeometry) -> Result<Self> {
        let offset = geometry.fat_offset();
        let expected = geometry.fat_size_bytes() as u64;
        if !source.contains_range(offset, expected) {
            return Err(FatwalkError::TruncatedFat {
                expected,
                available: source.len().saturating_sub(offset),
            });
        }

        let raw = source.read_vec(offset, expected as usize)?;
        let table = Self::from_bytes(&raw);
        debug!(
            "Loaded FAT at offset {:#x}: {} entries",
            offset,
            table.len()
        );
        Ok(table)
    }

    /// Interpret raw bytes as little-endian entries; a trailing odd byte is ignored.
    pub fn from_bytes(raw: &[u8]) -> Self {
        let mut entries = vec![0u16; raw.len() / 2];
        LittleEndian::read_u16_into(&raw[..entries.len() * 2], &mut entries);
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, cluster: u16) -> bool {
        (cluster as usize) < self.entries.len()
    }

    /// Raw entry for `cluster`.
    pub fn next(&self, cluster: u16) -> Result<u16> {
        self.entries
            .get(cluster as usize)
            .copied()
            .ok_or(FatwalkError::ClusterOutOfRange {
                cluster,
                len: self.entries.len(),
            })
    }

    pub fn link(&self, cluster: u16) -> Result<ClusterLink> {
        self.next(cluster).map(ClusterLink::classify)
    }
}
