// Bounds-checked little-endian field readers for on-disk structures
// Every read names its offset and width; nothing reinterprets a buffer as a struct

use byteorder::{ByteOrder, LittleEndian};

pub fn read_u16(buf: &[u8], offset: usize) -> Option<u16> {
    buf.get(offset..offset.checked_add(2)?)
        .map(LittleEndian::read_u16)
}

pub fn read_u32(buf: &[u8], offset: usize) -> Option<u32> {
    buf.get(offset..offset.checked_add(4)?)
        .map(LittleEndian::read_u32)
}

/// Strip trailing space padding from a fixed-width name field.
pub fn trim_padding(field: &[u8]) -> &[u8] {
    let end = field
        .iter()
        .rposition(|&b| b != b' ')
        .map_or(0, |pos| pos + 1);
    &field[..end]
}

/// Decode a space-padded ASCII label, `None` when it is blank.
pub fn padded_ascii(field: &[u8]) -> Option<String> {
    let trimmed = trim_padding(field);
    if trimmed.is_empty() {
        None
    } else {
        Some(String::from_utf8_lossy(trimmed).into_owned())
    }
}
