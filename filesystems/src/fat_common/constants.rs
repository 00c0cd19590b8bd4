// FAT16 on-disk constants: BPB offsets, entry layout and FAT values

// Boot sector offsets
pub const BS_OEM_NAME: usize = 0x03;
pub const BPB_BYTES_PER_SEC: usize = 0x0B;
pub const BPB_SEC_PER_CLUS: usize = 0x0D;
pub const BPB_RSVD_SEC_CNT: usize = 0x0E;
pub const BPB_NUM_FATS: usize = 0x10;
pub const BPB_ROOT_ENT_CNT: usize = 0x11;
pub const BPB_TOT_SEC16: usize = 0x13;
pub const BPB_MEDIA: usize = 0x15;
pub const BPB_FAT_SZ16: usize = 0x16;
pub const BPB_TOT_SEC32: usize = 0x20;

// FAT16 extended BPB (starts at 36)
pub const BS16_BOOT_SIG: usize = 0x26;
pub const BS16_VOL_LAB: usize = 0x2B;
pub const BS16_FIL_SYS_TYPE: usize = 0x36;
pub const EXTENDED_BOOT_SIGNATURE: u8 = 0x29;

// Boot sector signature
pub const BOOT_SECTOR_SIZE: usize = 512;
pub const BOOT_SIGNATURE: u16 = 0xAA55;
pub const BOOT_SIGNATURE_OFFSET: usize = 0x1FE;

// Directory entry layout
pub const DIR_ENTRY_SIZE: usize = 32;
pub const DIR_NAME: usize = 0x00;
pub const DIR_EXT: usize = 0x08;
pub const DIR_ATTR: usize = 0x0B;
pub const DIR_WRT_TIME: usize = 0x16;
pub const DIR_WRT_DATE: usize = 0x18;
pub const DIR_FST_CLUS_LO: usize = 0x1A;
pub const DIR_FILE_SIZE: usize = 0x1C;

// First byte markers
pub const ENTRY_END_OF_DIRECTORY: u8 = 0x00;
pub const ENTRY_DELETED: u8 = 0xE5;

// FAT entry values
pub const FAT16_FIRST_DATA_CLUSTER: u16 = 2;
pub const FAT16_BAD: u16 = 0xFFF7; // Bad cluster marker
pub const FAT16_EOC: u16 = 0xFFF8; // End of chain, anything at or above
