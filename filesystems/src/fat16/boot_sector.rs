// FAT16 boot sector (BPB) parsing into an immutable volume geometry

use crate::fat_common::constants::*;
use crate::fat_common::fields::padded_ascii;
use byteorder::{ByteOrder, LittleEndian};
use fatwalk_core::{ByteSource, FatwalkError, Result};
use serde::Serialize;

/// Volume layout decoded from sector 0.
///
/// Derived offsets are computed once by [`parse_boot_sector`]; the value has
/// no mutators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VolumeGeometry {
    bytes_per_sector: u16,
    sectors_per_cluster: u8,
    reserved_sectors: u16,
    fat_count: u8,
    fat_size_sectors: u16,
    root_entry_count: u16,
    boot_signature: u16,

    oem_name: String,
    total_sectors: u32,
    media_descriptor: u8,
    volume_label: Option<String>,
    fs_type: Option<String>,

    root_dir_start_sector: u32,
    root_dir_sectors: u32,
    data_region_start_sector: u32,
}

/// Parse the BIOS Parameter Block from the first bytes of a volume.
pub fn parse_boot_sector(bytes: &[u8]) -> Result<VolumeGeometry> {
    let sector: &[u8; BOOT_SECTOR_SIZE] = bytes
        .get(..BOOT_SECTOR_SIZE)
        .and_then(|head| <&[u8; BOOT_SECTOR_SIZE]>::try_from(head).ok())
        .ok_or_else(|| {
            FatwalkError::MalformedBootSector(format!(
                "boot sector needs {} bytes, got {}",
                BOOT_SECTOR_SIZE,
                bytes.len()
            ))
        })?;
    let le16 = |offset: usize| LittleEndian::read_u16(&sector[offset..offset + 2]);
    let text = |offset: usize, len: usize| padded_ascii(&sector[offset..offset + len]);

    let bytes_per_sector = le16(BPB_BYTES_PER_SEC);
    let sectors_per_cluster = sector[BPB_SEC_PER_CLUS];
    let reserved_sectors = le16(BPB_RSVD_SEC_CNT);
    let fat_count = sector[BPB_NUM_FATS];
    let root_entry_count = le16(BPB_ROOT_ENT_CNT);
    let fat_size_sectors = le16(BPB_FAT_SZ16);
    let boot_signature = le16(BOOT_SIGNATURE_OFFSET);

    if bytes_per_sector == 0 {
        return Err(FatwalkError::MalformedBootSector(
            "bytes per sector is zero".to_string(),
        ));
    }
    if sectors_per_cluster == 0 {
        return Err(FatwalkError::MalformedBootSector(
            "sectors per cluster is zero".to_string(),
        ));
    }

    let total_sectors = match le16(BPB_TOT_SEC16) {
        0 => LittleEndian::read_u32(&sector[BPB_TOT_SEC32..BPB_TOT_SEC32 + 4]),
        small => small as u32,
    };
    let oem_name = text(BS_OEM_NAME, 8).unwrap_or_default();
    let (volume_label, fs_type) = if sector[BS16_BOOT_SIG] == EXTENDED_BOOT_SIGNATURE {
        (text(BS16_VOL_LAB, 11), text(BS16_FIL_SYS_TYPE, 8))
    } else {
        (None, None)
    };

    // 32-bit arithmetic: 65535 + 255 * 65535 still fits comfortably.
    let root_dir_start_sector =
        reserved_sectors as u32 + fat_count as u32 * fat_size_sectors as u32;
    let root_dir_sectors = (root_entry_count as u32 * DIR_ENTRY_SIZE as u32)
        .div_ceil(bytes_per_sector as u32);
    let data_region_start_sector = root_dir_start_sector + root_dir_sectors;

    Ok(VolumeGeometry {
        bytes_per_sector,
        sectors_per_cluster,
        reserved_sectors,
        fat_count,
        fat_size_sectors,
        root_entry_count,
        boot_signature,
        oem_name,
        total_sectors,
        media_descriptor: sector[BPB_MEDIA],
        volume_label,
        fs_type,
        root_dir_start_sector,
        root_dir_sectors,
        data_region_start_sector,
    })
}

impl VolumeGeometry {
    /// Read and parse sector 0 of `source`.
    pub fn read_from<S: ByteSource + ?Sized>(source: &S) -> Result<Self> {
        let available = source.len().min(BOOT_SECTOR_SIZE as u64) as usize;
        let bytes = source.read_vec(0, available)?;
        parse_boot_sector(&bytes)
    }

    pub fn bytes_per_sector(&self) -> u16 {
        self.bytes_per_sector
    }

    pub fn sectors_per_cluster(&self) -> u8 {
        self.sectors_per_cluster
    }

    pub fn reserved_sectors(&self) -> u16 {
        self.reserved_sectors
    }

    pub fn fat_count(&self) -> u8 {
        self.fat_count
    }

    pub fn fat_size_sectors(&self) -> u16 {
        self.fat_size_sectors
    }

    pub fn root_entry_count(&self) -> u16 {
        self.root_entry_count
    }

    pub fn boot_signature(&self) -> u16 {
        self.boot_signature
    }

    pub fn has_valid_signature(&self) -> bool {
        self.boot_signature == BOOT_SIGNATURE
    }

    pub fn oem_name(&self) -> &str {
        &self.oem_name
    }

    pub fn total_sectors(&self) -> u32 {
        self.total_sectors
    }

    pub fn media_descriptor(&self) -> u8 {
        self.media_descriptor
    }

    pub fn volume_label(&self) -> Option<&str> {
        self.volume_label.as_deref()
    }

    pub fn fs_type(&self) -> Option<&str> {
        self.fs_type.as_deref()
    }

    pub fn root_dir_start_sector(&self) -> u32 {
        self.root_dir_start_sector
    }

    pub fn root_dir_sectors(&self) -> u32 {
        self.root_dir_sectors
    }

    pub fn data_region_start_sector(&self) -> u32 {
        self.data_region_start_sector
    }

    /// Size of the fixed root directory region as declared by the entry count.
    pub fn root_dir_byte_size(&self) -> u32 {
        self.root_entry_count as u32 * DIR_ENTRY_SIZE as u32
    }

    pub fn root_dir_offset(&self) -> u64 {
        self.sector_offset(self.root_dir_start_sector)
    }

    pub fn fat_offset(&self) -> u64 {
        self.sector_offset(self.reserved_sectors as u32)
    }

    pub fn fat_size_bytes(&self) -> u32 {
        self.fat_size_sectors as u32 * self.bytes_per_sector as u32
    }

    pub fn bytes_per_cluster(&self) -> u32 {
        self.sectors_per_cluster as u32 * self.bytes_per_sector as u32
    }

    pub fn sector_offset(&self, sector: u32) -> u64 {
        sector as u64 * self.bytes_per_sector as u64
    }

    /// First sector of a data cluster; `None` for the reserved numbers 0 and 1.
    pub fn cluster_to_sector(&self, cluster: u16) -> Option<u32> {
        if cluster < FAT16_FIRST_DATA_CLUSTER {
            return None;
        }
        Some(
            self.data_region_start_sector
                + (cluster - FAT16_FIRST_DATA_CLUSTER) as u32 * self.sectors_per_cluster as u32,
        )
    }

    pub fn cluster_offset(&self, cluster: u16) -> Option<u64> {
        self.cluster_to_sector(cluster)
            .map(|sector| self.sector_offset(sector))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::ImageLayout;

    #[test]
    fn test_parse_standard_layout() {
        let layout = ImageLayout::default();
        let geometry = parse_boot_sector(&layout.boot_sector()).unwrap();

        assert_eq!(geometry.bytes_per_sector(), 512);
        assert_eq!(geometry.sectors_per_cluster(), 4);
        assert_eq!(geometry.reserved_sectors(), 1);
        assert_eq!(geometry.fat_count(), 2);
        assert_eq!(geometry.fat_size_sectors(), 1);
        assert_eq!(geometry.root_entry_count(), 16);
        assert!(geometry.has_valid_signature());
        assert_eq!(geometry.oem_name(), "MSWIN4.1");
        assert_eq!(geometry.volume_label(), Some("FATWALK"));
        assert_eq!(geometry.fs_type(), Some("FAT16"));

        // 1 reserved + 2 FATs of 1 sector
        assert_eq!(geometry.root_dir_start_sector(), 3);
        // 16 entries * 32 bytes = exactly one sector
        assert_eq!(geometry.root_dir_sectors(), 1);
        assert_eq!(geometry.data_region_start_sector(), 4);
        assert_eq!(geometry.root_dir_byte_size(), 512);
        assert_eq!(geometry.fat_size_bytes(), 512);
        assert_eq!(geometry.bytes_per_cluster(), 2048);
    }

    #[test]
    fn test_root_dir_sectors_round_up() {
        let layout = ImageLayout {
            root_entries: 17,
            ..ImageLayout::default()
        };
        let geometry = parse_boot_sector(&layout.boot_sector()).unwrap();
        assert_eq!(geometry.root_dir_sectors(), 2);
        assert_eq!(geometry.data_region_start_sector(), 5);
    }

    #[test]
    fn test_derived_offsets_are_ordered() {
        let layouts = [(1, 2, 1, 16), (4, 1, 200, 512), (32, 2, 256, 0)];
        for (reserved, fats, fat_size, root) in layouts {
            let layout = ImageLayout {
                reserved_sectors: reserved,
                fat_count: fats,
                fat_size_sectors: fat_size,
                root_entries: root,
                ..ImageLayout::default()
            };
            let geometry = parse_boot_sector(&layout.boot_sector()).unwrap();
            assert!(geometry.root_dir_start_sector() > 0);
            assert!(geometry.root_dir_start_sector() <= geometry.data_region_start_sector());
            assert_eq!(
                geometry.cluster_to_sector(2),
                Some(geometry.data_region_start_sector())
            );
        }
    }

    #[test]
    fn test_maximal_fields_do_not_overflow() {
        let layout = ImageLayout {
            reserved_sectors: u16::MAX,
            fat_count: u8::MAX,
            fat_size_sectors: u16::MAX,
            root_entries: u16::MAX,
            bytes_per_sector: 1,
            sectors_per_cluster: u8::MAX,
            ..ImageLayout::default()
        };
        let geometry = parse_boot_sector(&layout.boot_sector()).unwrap();
        assert_eq!(geometry.root_dir_start_sector(), 65_535 + 255 * 65_535);
        assert_eq!(geometry.root_dir_sectors(), 65_535 * 32);
        assert!(geometry.cluster_to_sector(u16::MAX).is_some());
    }

    #[test]
    fn test_cluster_to_sector() {
        let geometry = parse_boot_sector(&ImageLayout::default().boot_sector()).unwrap();
        assert_eq!(geometry.cluster_to_sector(0), None);
        assert_eq!(geometry.cluster_to_sector(1), None);
        assert_eq!(geometry.cluster_to_sector(2), Some(4));
        assert_eq!(geometry.cluster_to_sector(5), Some(4 + 3 * 4));
        assert_eq!(geometry.cluster_offset(3), Some(8 * 512));
    }

    #[test]
    fn test_byte_fields_and_wide_total_sectors() {
        let mut image = ImageLayout::default().boot_sector().to_vec();
        image[BPB_MEDIA] = 0xF0;
        image[BPB_SEC_PER_CLUS] = 0x80;
        image[BPB_NUM_FATS] = 0xFF;
        image[BPB_TOT_SEC16..BPB_TOT_SEC16 + 2].copy_from_slice(&0u16.to_le_bytes());
        image[BPB_TOT_SEC32..BPB_TOT_SEC32 + 4].copy_from_slice(&0x0001_2345u32.to_le_bytes());
        // Bytes past sector 0 are never consulted.
        image.extend_from_slice(&[0xAB; 512]);

        let geometry = parse_boot_sector(&image).unwrap();
        assert_eq!(geometry.media_descriptor(), 0xF0);
        assert_eq!(geometry.sectors_per_cluster(), 0x80);
        assert_eq!(geometry.fat_count(), 0xFF);
        assert_eq!(geometry.total_sectors(), 0x0001_2345);
        assert_eq!(geometry.bytes_per_cluster(), 0x80 * 512);
    }

    #[test]
    fn test_short_boot_sector_is_malformed() {
        let err = parse_boot_sector(&[0u8; 511]).unwrap_err();
        assert!(matches!(err, FatwalkError::MalformedBootSector(_)));

        let short: Vec<u8> = vec![0u8; 100];
        let err = VolumeGeometry::read_from(&short).unwrap_err();
        assert!(matches!(err, FatwalkError::MalformedBootSector(_)));
    }

    #[test]
    fn test_zero_geometry_fields_are_malformed() {
        let mut sector = ImageLayout::default().boot_sector();
        sector[BPB_BYTES_PER_SEC..BPB_BYTES_PER_SEC + 2].copy_from_slice(&0u16.to_le_bytes());
        assert!(matches!(
            parse_boot_sector(&sector),
            Err(FatwalkError::MalformedBootSector(_))
        ));

        let mut sector = ImageLayout::default().boot_sector();
        sector[BPB_SEC_PER_CLUS] = 0;
        assert!(matches!(
            parse_boot_sector(&sector),
            Err(FatwalkError::MalformedBootSector(_))
        ));
    }

    #[test]
    fn test_bad_signature_still_parses() {
        let mut sector = ImageLayout::default().boot_sector();
        sector[BOOT_SIGNATURE_OFFSET] = 0;
        sector[BOOT_SIGNATURE_OFFSET + 1] = 0;
        let geometry = parse_boot_sector(&sector).unwrap();
        assert!(!geometry.has_valid_signature());
        assert_eq!(geometry.boot_signature(), 0);
    }

    #[test]
    fn test_missing_extended_bpb_hides_label() {
        let mut sector = ImageLayout::default().boot_sector();
        sector[BS16_BOOT_SIG] = 0;
        let geometry = parse_boot_sector(&sector).unwrap();
        assert_eq!(geometry.volume_label(), None);
        assert_eq!(geometry.fs_type(), None);
    }
}
