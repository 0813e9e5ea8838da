//! The open-file table. It lives in the reserved descriptor blocks of the disk
//! itself, one fixed-width slot per handle. A slot with a zero reference
//! count is free.

use crate::fs::consts::{DESCRIPTOR_COUNT, DESCRIPTOR_SIZE, DESCRIPTORS_PER_BLOCK, FD_TABLE_BLOCKS, FD_TABLE_START};
use crate::fs::error::{FsError, Result};
use crate::fs::io::Disk;
use crate::fs::layout::{BlockId, FileDescriptor, InodeId};
use enumflags2::{BitFlags, bitflags};

pub type Fd = u32;

#[rustfmt::skip]
#[bitflags]
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenFlag {
    Read   = 0b0000_0001,
    Write  = 0b0000_0010,
    /// Create the file if it does not exist
    Create = 0b0100_0000,
}

impl OpenFlag {
    #[inline]
    pub fn read_write() -> BitFlags<OpenFlag> {
        OpenFlag::Read | OpenFlag::Write
    }
}

pub fn descriptor_location(fd: Fd) -> (BlockId, usize) {
    let block = FD_TABLE_START + fd / DESCRIPTORS_PER_BLOCK;
    let offset = (fd % DESCRIPTORS_PER_BLOCK) as usize * DESCRIPTOR_SIZE;
    (block, offset)
}

fn read_slot(disk: &Disk, fd: Fd) -> Result<FileDescriptor> {
    let (block, offset) = descriptor_location(fd);
    let data = disk.block(block)?;
    Ok(FileDescriptor::deserialize(&data[offset..offset + DESCRIPTOR_SIZE]))
}

fn write_slot(disk: &mut Disk, fd: Fd, slot: &FileDescriptor) -> Result<()> {
    let (block, offset) = descriptor_location(fd);
    let data = disk.block_mut(block)?;
    slot.serialize(&mut data[offset..offset + DESCRIPTOR_SIZE]);
    Ok(())
}

/// Claims the first free slot for `inode_id` with offset 0 and one reference.
pub fn allocate(disk: &mut Disk, inode_id: InodeId, flags: BitFlags<OpenFlag>) -> Result<Fd> {
    for fd in 0..DESCRIPTOR_COUNT {
        if read_slot(disk, fd)?.is_free() {
            let slot = FileDescriptor {
                inode_id,
                flags: flags.bits(),
                offset: 0,
                ref_count: 1,
            };
            write_slot(disk, fd, &slot)?;
            return Ok(fd);
        }
    }
    log::warn!("descriptor table full");
    Err(FsError::ResourceExhausted("no free file descriptor"))
}

/// The live slot behind `fd`.
pub fn lookup(disk: &Disk, fd: Fd) -> Result<FileDescriptor> {
    if fd >= DESCRIPTOR_COUNT {
        return Err(FsError::invalid(format!("bad file descriptor {}", fd)));
    }
    let slot = read_slot(disk, fd)?;
    if slot.is_free() {
        return Err(FsError::invalid(format!("file descriptor {} is not open", fd)));
    }
    Ok(slot)
}

/// A live slot for `inode_id` that was opened with exactly `flags`.
pub fn find_open(disk: &Disk, inode_id: InodeId, flags: BitFlags<OpenFlag>) -> Result<Option<Fd>> {
    for fd in 0..DESCRIPTOR_COUNT {
        let slot = read_slot(disk, fd)?;
        if !slot.is_free() && slot.inode_id == inode_id && slot.flags == flags.bits() {
            return Ok(Some(fd));
        }
    }
    Ok(None)
}

pub fn retain(disk: &mut Disk, fd: Fd) -> Result<()> {
    let mut slot = lookup(disk, fd)?;
    slot.ref_count += 1;
    write_slot(disk, fd, &slot)
}

/// Drops one reference; the slot is zeroed when none remain.
/// Returns the remaining reference count.
pub fn release(disk: &mut Disk, fd: Fd) -> Result<u32> {
    let mut slot = lookup(disk, fd)?;
    slot.ref_count -= 1;
    if slot.ref_count == 0 {
        slot = FileDescriptor::default();
    }
    write_slot(disk, fd, &slot)?;
    Ok(slot.ref_count)
}

pub fn set_offset(disk: &mut Disk, fd: Fd, offset: u64) -> Result<()> {
    let mut slot = lookup(disk, fd)?;
    slot.offset = offset;
    write_slot(disk, fd, &slot)
}

pub fn is_inode_open(disk: &Disk, inode_id: InodeId) -> Result<bool> {
    for fd in 0..DESCRIPTOR_COUNT {
        let slot = read_slot(disk, fd)?;
        if !slot.is_free() && slot.inode_id == inode_id {
            return Ok(true);
        }
    }
    Ok(false)
}

pub fn open_count(disk: &Disk) -> Result<u32> {
    let mut n = 0;
    for fd in 0..DESCRIPTOR_COUNT {
        if !read_slot(disk, fd)?.is_free() {
            n += 1;
        }
    }
    Ok(n)
}

/// Zeroes the whole table. Handles do not survive a remount.
pub fn reset_table(disk: &mut Disk) -> Result<()> {
    for b in FD_TABLE_START..FD_TABLE_START + FD_TABLE_BLOCKS {
        disk.zero_block(b)?;
    }
    Ok(())
}
