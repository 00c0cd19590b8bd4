// Test helpers: synthetic FAT16 images built in memory

use crate::fat16::FatAttributes;
use crate::fat_common::constants::*;

/// Geometry of a synthetic image. Defaults describe a tiny volume:
/// 512-byte sectors, 4 sectors per cluster, 1 reserved sector, two 1-sector
/// FATs and a 16-entry root directory.
#[derive(Debug, Clone)]
pub struct ImageLayout {
    pub bytes_per_sector: u16,
    pub sectors_per_cluster: u8,
    pub reserved_sectors: u16,
    pub fat_count: u8,
    pub fat_size_sectors: u16,
    pub root_entries: u16,
}

impl Default for ImageLayout {
    fn default() -> Self {
        Self {
            bytes_per_sector: 512,
            sectors_per_cluster: 4,
            reserved_sectors: 1,
            fat_count: 2,
            fat_size_sectors: 1,
            root_entries: 16,
        }
    }
}

impl ImageLayout {
    pub fn boot_sector(&self) -> [u8; 512] {
        let mut sector = [0u8; 512];
        sector[0..3].copy_from_slice(&[0xEB, 0x3C, 0x90]);
        sector[BS_OEM_NAME..BS_OEM_NAME + 8].copy_from_slice(b"MSWIN4.1");
        sector[BPB_BYTES_PER_SEC..BPB_BYTES_PER_SEC + 2]
            .copy_from_slice(&self.bytes_per_sector.to_le_bytes());
        sector[BPB_SEC_PER_CLUS] = self.sectors_per_cluster;
        sector[BPB_RSVD_SEC_CNT..BPB_RSVD_SEC_CNT + 2]
            .copy_from_slice(&self.reserved_sectors.to_le_bytes());
        sector[BPB_NUM_FATS] = self.fat_count;
        sector[BPB_ROOT_ENT_CNT..BPB_ROOT_ENT_CNT + 2]
            .copy_from_slice(&self.root_entries.to_le_bytes());
        sector[BPB_TOT_SEC16..BPB_TOT_SEC16 + 2].copy_from_slice(&4096u16.to_le_bytes());
        sector[BPB_MEDIA] = 0xF8;
        sector[BPB_FAT_SZ16..BPB_FAT_SZ16 + 2]
            .copy_from_slice(&self.fat_size_sectors.to_le_bytes());
        sector[BS16_BOOT_SIG] = EXTENDED_BOOT_SIGNATURE;
        sector[BS16_VOL_LAB..BS16_VOL_LAB + 11].copy_from_slice(b"FATWALK    ");
        sector[BS16_FIL_SYS_TYPE..BS16_FIL_SYS_TYPE + 8].copy_from_slice(b"FAT16   ");
        sector[BOOT_SIGNATURE_OFFSET..BOOT_SIGNATURE_OFFSET + 2]
            .copy_from_slice(&BOOT_SIGNATURE.to_le_bytes());
        sector
    }

    fn sector_bytes(&self, sectors: usize) -> usize {
        sectors * self.bytes_per_sector as usize
    }

    pub fn root_dir_sectors(&self) -> usize {
        (self.root_entries as usize * DIR_ENTRY_SIZE).div_ceil(self.bytes_per_sector as usize)
    }

    pub fn root_offset(&self) -> usize {
        let fat_sectors = self.fat_count as usize * self.fat_size_sectors as usize;
        self.sector_bytes(self.reserved_sectors as usize + fat_sectors)
    }

    pub fn data_offset(&self) -> usize {
        self.root_offset() + self.sector_bytes(self.root_dir_sectors())
    }

    pub fn cluster_size(&self) -> usize {
        self.sector_bytes(self.sectors_per_cluster as usize)
    }

    pub fn cluster_offset(&self, cluster: u16) -> usize {
        self.data_offset() + (cluster as usize - 2) * self.cluster_size()
    }

    /// A formatted, empty image with `clusters` data clusters (numbered from 2).
    pub fn blank_image(&self, clusters: u16) -> Vec<u8> {
        let mut image = vec![0u8; self.data_offset() + clusters as usize * self.cluster_size()];
        image[..512].copy_from_slice(&self.boot_sector());
        self.set_fat_entry(&mut image, 0, 0xFFF8);
        self.set_fat_entry(&mut image, 1, 0xFFFF);
        image
    }

    /// Write a FAT entry into every FAT copy.
    pub fn set_fat_entry(&self, image: &mut [u8], cluster: u16, value: u16) {
        for copy in 0..self.fat_count as usize {
            let fat_start = self.sector_bytes(
                self.reserved_sectors as usize + copy * self.fat_size_sectors as usize,
            );
            let offset = fat_start + cluster as usize * 2;
            image[offset..offset + 2].copy_from_slice(&value.to_le_bytes());
        }
    }

    /// Link `clusters` into one chain terminated by 0xFFFF.
    pub fn set_chain(&self, image: &mut [u8], clusters: &[u16]) {
        for pair in clusters.windows(2) {
            self.set_fat_entry(image, pair[0], pair[1]);
        }
        if let Some(&last) = clusters.last() {
            self.set_fat_entry(image, last, 0xFFFF);
        }
    }

    pub fn write_root_entry(&self, image: &mut [u8], index: usize, entry: &RawEntry) {
        let offset = self.root_offset() + index * DIR_ENTRY_SIZE;
        image[offset..offset + DIR_ENTRY_SIZE].copy_from_slice(&entry.to_bytes());
    }

    pub fn write_cluster_entry(
        &self,
        image: &mut [u8],
        cluster: u16,
        index: usize,
        entry: &RawEntry,
    ) {
        let offset = self.cluster_offset(cluster) + index * DIR_ENTRY_SIZE;
        image[offset..offset + DIR_ENTRY_SIZE].copy_from_slice(&entry.to_bytes());
    }

    /// Write the `.` and `..` links of a subdirectory.
    pub fn write_dot_entries(&self, image: &mut [u8], cluster: u16, parent: u16) {
        self.write_cluster_entry(image, cluster, 0, &RawEntry::directory(".", cluster));
        self.write_cluster_entry(image, cluster, 1, &RawEntry::directory("..", parent));
    }
}

/// Builder for one raw 32-byte directory record.
#[derive(Debug, Clone)]
pub struct RawEntry {
    name: [u8; 11],
    attributes: u8,
    first_cluster: u16,
    size: u32,
    date: u16,
    time: u16,
}

fn padded<const N: usize>(text: &str) -> [u8; N] {
    let mut field = [b' '; N];
    field[..text.len()].copy_from_slice(text.as_bytes());
    field
}

impl RawEntry {
    pub fn file(base: &str, ext: &str, size: u32, first_cluster: u16) -> Self {
        let mut name = [b' '; 11];
        name[..8].copy_from_slice(&padded::<8>(base));
        name[8..].copy_from_slice(&padded::<3>(ext));
        Self {
            name,
            attributes: FatAttributes::ARCHIVE,
            first_cluster,
            size,
            date: 0,
            time: 0,
        }
    }

    pub fn directory(base: &str, first_cluster: u16) -> Self {
        Self {
            attributes: FatAttributes::DIRECTORY,
            ..Self::file(base, "", 0, first_cluster)
        }
    }

    pub fn volume_label(label: &str) -> Self {
        Self {
            name: padded::<11>(label),
            attributes: FatAttributes::VOLUME_ID,
            ..Self::file("", "", 0, 0)
        }
    }

    pub fn attributes(mut self, attributes: u8) -> Self {
        self.attributes = attributes;
        self
    }

    pub fn modified(mut self, date: u16, time: u16) -> Self {
        self.date = date;
        self.time = time;
        self
    }

    pub fn to_bytes(&self) -> [u8; DIR_ENTRY_SIZE] {
        let mut raw = [0u8; DIR_ENTRY_SIZE];
        raw[DIR_NAME..DIR_NAME + 11].copy_from_slice(&self.name);
        raw[DIR_ATTR] = self.attributes;
        raw[DIR_WRT_TIME..DIR_WRT_TIME + 2].copy_from_slice(&self.time.to_le_bytes());
        raw[DIR_WRT_DATE..DIR_WRT_DATE + 2].copy_from_slice(&self.date.to_le_bytes());
        raw[DIR_FST_CLUS_LO..DIR_FST_CLUS_LO + 2]
            .copy_from_slice(&self.first_cluster.to_le_bytes());
        raw[DIR_FILE_SIZE..DIR_FILE_SIZE + 4].copy_from_slice(&self.size.to_le_bytes());
        raw
    }
}
