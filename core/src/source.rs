// Random-access byte sources for volume images
// Reads are offset-parameterized so several walkers can share one source

use crate::error::{FatwalkError, Result};
use log::debug;
use std::fs::File;
use std::io;
use std::path::Path;

/// Offset-addressable, read-only view over a volume image.
pub trait ByteSource {
    /// Total number of addressable bytes.
    fn len(&self) -> u64;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Fill `buf` with the bytes starting at `offset`.
    ///
    /// Fails with an `UnexpectedEof` IO error if the range runs past the end.
    fn read_at(&self, offset: u64, buf: &mut [u8]) -> Result<()>;

    fn read_vec(&self, offset: u64, len: usize) -> Result<Vec<u8>> {
        let mut buf = vec![0u8; len];
        self.read_at(offset, &mut buf)?;
        Ok(buf)
    }

    /// Whether `len` bytes starting at `offset` lie inside the source.
    fn contains_range(&self, offset: u64, len: u64) -> bool {
        offset
            .checked_add(len)
            .map_or(false, |end| end <= self.len())
    }
}

fn out_of_bounds(offset: u64, wanted: usize, available: u64) -> FatwalkError {
    FatwalkError::IoError(io::Error::new(
        io::ErrorKind::UnexpectedEof,
        format!(
            "read of {} bytes at offset {:#x} exceeds image size {}",
            wanted, offset, available
        ),
    ))
}

impl ByteSource for [u8] {
    fn len(&self) -> u64 {
        <[u8]>::len(self) as u64
    }

    fn read_at(&self, offset: u64, buf: &mut [u8]) -> Result<()> {
        let available = <[u8]>::len(self) as u64;
        if !ByteSource::contains_range(self, offset, buf.len() as u64) {
            return Err(out_of_bounds(offset, buf.len(), available));
        }
        let start = offset as usize;
        buf.copy_from_slice(&self[start..start + buf.len()]);
        Ok(())
    }
}

impl ByteSource for Vec<u8> {
    fn len(&self) -> u64 {
        ByteSource::len(self.as_slice())
    }

    fn read_at(&self, offset: u64, buf: &mut [u8]) -> Result<()> {
        ByteSource::read_at(self.as_slice(), offset, buf)
    }
}

impl<T: ByteSource + ?Sized> ByteSource for &T {
    fn len(&self) -> u64 {
        (**self).len()
    }

    fn read_at(&self, offset: u64, buf: &mut [u8]) -> Result<()> {
        (**self).read_at(offset, buf)
    }
}

/// A volume image backed by a file on disk.
#[derive(Debug)]
pub struct FileSource {
    file: File,
    len: u64,
}

impl FileSource {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let len = file.metadata()?.len();
        debug!("Opened image {} ({} bytes)", path.display(), len);
        Ok(Self { file, len })
    }
}

impl ByteSource for FileSource {
    fn len(&self) -> u64 {
        self.len
    }

    #[cfg(unix)]
    fn read_at(&self, offset: u64, buf: &mut [u8]) -> Result<()> {
        use std::os::unix::fs::FileExt;

        if !self.contains_range(offset, buf.len() as u64) {
            return Err(out_of_bounds(offset, buf.len(), self.len));
        }
        self.file.read_exact_at(buf, offset)?;
        Ok(())
    }

    #[cfg(windows)]
    fn read_at(&self, offset: u64, buf: &mut [u8]) -> Result<()> {
        use std::os::windows::fs::FileExt;

        if !self.contains_range(offset, buf.len() as u64) {
            return Err(out_of_bounds(offset, buf.len(), self.len));
        }
        let mut filled = 0;
        while filled < buf.len() {
            let read = self.file.seek_read(&mut buf[filled..], offset + filled as u64)?;
            if read == 0 {
                return Err(out_of_bounds(offset, buf.len(), self.len));
            }
            filled += read;
        }
        Ok(())
    }
}
