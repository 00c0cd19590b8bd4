// MS-DOS date/time decoding for FAT directory entries
// FAT date: bits 15-9: year (0=1980), bits 8-5: month, bits 4-0: day
// FAT time: bits 15-11: hours, bits 10-5: minutes, bits 4-0: seconds/2

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use std::fmt;

/// A decoded FAT timestamp, 2-second resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct FatTimestamp {
    pub year: u16,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

impl FatTimestamp {
    /// Split the packed words into their fields without validating them.
    pub fn unpack(date: u16, time: u16) -> Self {
        Self {
            year: 1980 + ((date >> 9) & 0x7F),
            month: ((date >> 5) & 0x0F) as u8,
            day: (date & 0x1F) as u8,
            hour: ((time >> 11) & 0x1F) as u8,
            minute: ((time >> 5) & 0x3F) as u8,
            second: ((time & 0x1F) * 2) as u8,
        }
    }

    /// Decode a write date/time pair.
    ///
    /// Returns `None` when no date was recorded (`date == 0`) or when the
    /// fields do not name a real calendar instant.
    pub fn decode(date: u16, time: u16) -> Option<Self> {
        if date == 0 {
            return None;
        }
        let ts = Self::unpack(date, time);
        ts.to_naive().map(|_| ts)
    }

    pub fn to_naive(&self) -> Option<NaiveDateTime> {
        NaiveDate::from_ymd_opt(self.year as i32, self.month as u32, self.day as u32)?
            .and_hms_opt(self.hour as u32, self.minute as u32, self.second as u32)
    }
}

impl fmt::Display for FatTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
            self.year, self.month, self.day, self.hour, self.minute, self.second
        )
    }
}
