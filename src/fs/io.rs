use crate::fs::consts::{BLOCK_COUNT, BLOCK_SIZE};
use crate::fs::error::{FsError, Result};
use std::fs::{File, OpenOptions};
use std::io::{Read, Write};
use std::path::Path;

const DISK_BYTES: usize = BLOCK_COUNT as usize * BLOCK_SIZE;

/// The backing store: `BLOCK_COUNT` blocks of `BLOCK_SIZE` bytes held in memory.
pub struct Disk {
    bytes: Vec<u8>,
}

impl Disk {
    /// A zero-filled disk.
    pub fn new() -> Self {
        Self {
            bytes: vec![0u8; DISK_BYTES],
        }
    }

    fn span(block_index: u32) -> Result<std::ops::Range<usize>> {
        if block_index >= BLOCK_COUNT {
            return Err(FsError::Corrupt(format!(
                "block {} outside of disk ({} blocks)",
                block_index, BLOCK_COUNT
            )));
        }
        let start = block_index as usize * BLOCK_SIZE;
        Ok(start..start + BLOCK_SIZE)
    }

    pub fn block(&self, block_index: u32) -> Result<&[u8]> {
        let range = Self::span(block_index)?;
        Ok(&self.bytes[range])
    }

    pub fn block_mut(&mut self, block_index: u32) -> Result<&mut [u8]> {
        let range = Self::span(block_index)?;
        Ok(&mut self.bytes[range])
    }

    #[cfg(test)]
    pub(crate) fn read_block(&self, block_index: u32, buf: &mut [u8]) -> Result<()> {
        debug_assert_eq!(buf.len(), BLOCK_SIZE);
        buf.copy_from_slice(self.block(block_index)?);
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn write_block(&mut self, block_index: u32, buf: &[u8]) -> Result<()> {
        debug_assert_eq!(buf.len(), BLOCK_SIZE);
        self.block_mut(block_index)?.copy_from_slice(buf);
        Ok(())
    }

    pub fn zero_block(&mut self, block_index: u32) -> Result<()> {
        self.block_mut(block_index)?.fill(0);
        Ok(())
    }

    /// Reads the whole image from a host file. The file must be exactly one disk long.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut f = File::open(&path)?;
        let len = f.metadata()?.len();
        if len != DISK_BYTES as u64 {
            return Err(FsError::Corrupt(format!(
                "image is {} B, expected {} B",
                len, DISK_BYTES
            )));
        }
        let mut bytes = vec![0u8; DISK_BYTES];
        f.read_exact(&mut bytes)?;
        Ok(Self { bytes })
    }

    /// Writes the whole image to a host file, creating or truncating it.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut f = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&path)?;
        f.write_all(&self.bytes)?;
        f.flush()?;
        Ok(())
    }
}

impl Default for Disk {
    fn default() -> Self {
        Self::new()
    }
}
