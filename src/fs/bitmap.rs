//! Free/used tracking for inodes and data blocks.
//!
//! Each class has one bitmap block; bit `i` set means resource `i` is in use.
//! The data bitmap is indexed by absolute block number, so every reserved
//! block below `DATA_START` stays permanently set.

use crate::fs::consts::{BLOCK_COUNT, DATA_BITMAP_BLOCK, DATA_START, INODE_BITMAP_BLOCK, INODE_COUNT, ROOT_INODE};
use crate::fs::error::{FsError, Result};
use crate::fs::io::Disk;
use crate::fs::layout::{BlockId, InodeId};

fn bit_position(index: u32) -> (usize, u8) {
    ((index / 8) as usize, 1u8 << (index % 8))
}

pub fn bitmap_is_set(bitmap: &[u8], index: u32) -> bool {
    let (byte, mask) = bit_position(index);
    bitmap[byte] & mask != 0
}

fn bitmap_set(bitmap: &mut [u8], index: u32, used: bool) {
    let (byte, mask) = bit_position(index);
    if used {
        bitmap[byte] |= mask;
    } else {
        bitmap[byte] &= !mask;
    }
}

/// First-fit scan of `[from, to)`; sets and returns the first clear bit.
fn claim_first_clear(bitmap: &mut [u8], from: u32, to: u32) -> Option<u32> {
    let mut index = from;
    while index < to {
        // whole byte taken, skip to the next byte boundary
        if index % 8 == 0 && bitmap[(index / 8) as usize] == 0xFF {
            index += 8;
            continue;
        }
        if !bitmap_is_set(bitmap, index) {
            bitmap_set(bitmap, index, true);
            return Some(index);
        }
        index += 1;
    }
    None
}

fn count_set(bitmap: &[u8], from: u32, to: u32) -> u32 {
    (from..to).filter(|&i| bitmap_is_set(bitmap, i)).count() as u32
}

pub fn find_free_inode(disk: &mut Disk) -> Result<Option<InodeId>> {
    let bitmap = disk.block_mut(INODE_BITMAP_BLOCK)?;
    let id = claim_first_clear(bitmap, ROOT_INODE + 1, INODE_COUNT);
    match id {
        Some(id) => log::trace!("allocated inode {}", id),
        None => log::warn!("inode bitmap exhausted"),
    }
    Ok(id)
}

pub fn find_free_data_block(disk: &mut Disk) -> Result<Option<BlockId>> {
    let bitmap = disk.block_mut(DATA_BITMAP_BLOCK)?;
    let block = claim_first_clear(bitmap, DATA_START, BLOCK_COUNT);
    match block {
        Some(b) => log::trace!("allocated data block {}", b),
        None => log::warn!("data bitmap exhausted"),
    }
    Ok(block)
}

pub fn free_inode(disk: &mut Disk, id: InodeId) -> Result<()> {
    if id == ROOT_INODE || id >= INODE_COUNT {
        return Err(FsError::invalid(format!("inode {} cannot be freed", id)));
    }
    bitmap_set(disk.block_mut(INODE_BITMAP_BLOCK)?, id, false);
    log::trace!("freed inode {}", id);
    Ok(())
}

/// Clears the block's bit and zero-fills its contents.
pub fn free_data_block(disk: &mut Disk, block: BlockId) -> Result<()> {
    if !(DATA_START..BLOCK_COUNT).contains(&block) {
        return Err(FsError::invalid(format!("block {} is not a data block", block)));
    }
    bitmap_set(disk.block_mut(DATA_BITMAP_BLOCK)?, block, false);
    disk.zero_block(block)?;
    log::trace!("freed data block {}", block);
    Ok(())
}

#[cfg(test)]
pub(crate) fn inode_in_use(disk: &Disk, id: InodeId) -> Result<bool> {
    Ok(id < INODE_COUNT && bitmap_is_set(disk.block(INODE_BITMAP_BLOCK)?, id))
}

#[cfg(test)]
pub(crate) fn data_block_in_use(disk: &Disk, block: BlockId) -> Result<bool> {
    Ok(block < BLOCK_COUNT && bitmap_is_set(disk.block(DATA_BITMAP_BLOCK)?, block))
}

/// Marks the root inode and every reserved block as used. Called once by format.
pub fn reserve_system_areas(disk: &mut Disk) -> Result<()> {
    let inodes = disk.block_mut(INODE_BITMAP_BLOCK)?;
    inodes.fill(0);
    bitmap_set(inodes, ROOT_INODE, true);

    let blocks = disk.block_mut(DATA_BITMAP_BLOCK)?;
    blocks.fill(0);
    for b in 0..DATA_START {
        bitmap_set(blocks, b, true);
    }
    Ok(())
}

pub fn free_inode_count(disk: &Disk) -> Result<u32> {
    let used = count_set(disk.block(INODE_BITMAP_BLOCK)?, 0, INODE_COUNT);
    Ok(INODE_COUNT - used)
}

pub fn free_data_block_count(disk: &Disk) -> Result<u32> {
    let used = count_set(disk.block(DATA_BITMAP_BLOCK)?, DATA_START, BLOCK_COUNT);
    Ok(BLOCK_COUNT - DATA_START - used)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reserved_disk() -> Disk {
        let mut disk = Disk::new();
        reserve_system_areas(&mut disk).unwrap();
        disk
    }

    #[test]
    fn first_fit_starts_above_reserved_range() {
        let mut disk = reserved_disk();
        assert_eq!(find_free_inode(&mut disk).unwrap(), Some(1));
        assert_eq!(find_free_inode(&mut disk).unwrap(), Some(2));
        assert_eq!(find_free_data_block(&mut disk).unwrap(), Some(DATA_START));
        assert_eq!(find_free_data_block(&mut disk).unwrap(), Some(DATA_START + 1));
    }

    #[test]
    fn freed_slot_is_reused_first() {
        let mut disk = reserved_disk();
        let a = find_free_inode(&mut disk).unwrap().unwrap();
        let b = find_free_inode(&mut disk).unwrap().unwrap();
        free_inode(&mut disk, a).unwrap();
        assert!(inode_in_use(&disk, b).unwrap());
        assert!(!inode_in_use(&disk, a).unwrap());
        assert_eq!(find_free_inode(&mut disk).unwrap(), Some(a));
    }

    #[test]
    fn inode_exhaustion_leaves_bitmap_usable() {
        let mut disk = reserved_disk();
        let mut last = 0;
        while let Some(id) = find_free_inode(&mut disk).unwrap() {
            last = id;
        }
        assert_eq!(last, INODE_COUNT - 1);
        assert_eq!(free_inode_count(&disk).unwrap(), 0);
        assert_eq!(find_free_inode(&mut disk).unwrap(), None);

        free_inode(&mut disk, 1234).unwrap();
        assert_eq!(free_inode_count(&disk).unwrap(), 1);
        assert_eq!(find_free_inode(&mut disk).unwrap(), Some(1234));
        assert_eq!(find_free_inode(&mut disk).unwrap(), None);
    }

    #[test]
    fn data_block_exhaustion_and_recovery() {
        let mut disk = reserved_disk();
        let mut count = 0;
        while find_free_data_block(&mut disk).unwrap().is_some() {
            count += 1;
        }
        assert_eq!(count, BLOCK_COUNT - DATA_START);
        free_data_block(&mut disk, DATA_START + 10).unwrap();
        assert_eq!(find_free_data_block(&mut disk).unwrap(), Some(DATA_START + 10));
    }

    #[test]
    fn freeing_a_data_block_scrubs_it() {
        let mut disk = reserved_disk();
        let b = find_free_data_block(&mut disk).unwrap().unwrap();
        disk.block_mut(b).unwrap().fill(0x5A);
        free_data_block(&mut disk, b).unwrap();
        assert!(disk.block(b).unwrap().iter().all(|&x| x == 0));
    }

    #[test]
    fn reserved_resources_cannot_be_freed() {
        let mut disk = reserved_disk();
        assert!(matches!(free_inode(&mut disk, ROOT_INODE), Err(FsError::InvalidInput(_))));
        assert!(matches!(
            free_data_block(&mut disk, DATA_START - 1),
            Err(FsError::InvalidInput(_))
        ));
        assert!(data_block_in_use(&disk, 0).unwrap());
    }
}
