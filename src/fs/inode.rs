use crate::fs::bitmap::find_free_data_block;
use crate::fs::consts::{INODE_COUNT, INODE_SIZE, INODE_TABLE_START, INODES_PER_BLOCK};
use crate::fs::error::{FsError, Result};
use crate::fs::io::Disk;
use crate::fs::layout::{BlockId, Inode, InodeId, NodeKind};
use std::time::{SystemTime, UNIX_EPOCH};

/// Seconds since the Unix epoch, truncated to the 32-bit on-disk width.
pub fn unix_now() -> u32 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as u32)
        .unwrap_or(0)
}

/// Block and byte offset of inode `id` inside the inode table.
pub fn inode_number_to_disk_location(id: InodeId) -> (BlockId, usize) {
    let block = INODE_TABLE_START + id / INODES_PER_BLOCK;
    let offset = (id % INODES_PER_BLOCK) as usize * INODE_SIZE;
    (block, offset)
}

fn check_id(id: InodeId) -> Result<()> {
    if id >= INODE_COUNT {
        return Err(FsError::invalid(format!("inode {} out of range", id)));
    }
    Ok(())
}

pub fn read_inode(disk: &Disk, id: InodeId) -> Result<Inode> {
    check_id(id)?;
    let (block, offset) = inode_number_to_disk_location(id);
    let data = disk.block(block)?;
    Ok(Inode::deserialize(&data[offset..offset + INODE_SIZE]))
}

pub fn write_inode(disk: &mut Disk, id: InodeId, inode: &Inode) -> Result<()> {
    check_id(id)?;
    let (block, offset) = inode_number_to_disk_location(id);
    let data = disk.block_mut(block)?;
    inode.serialize(&mut data[offset..offset + INODE_SIZE]);
    Ok(())
}

/// Builds a fresh inode for `id` and gives it one data block as its first
/// direct block. The caller owns the inode bit and must release it if this fails.
pub fn init_inode(disk: &mut Disk, id: InodeId, kind: NodeKind, owner_id: u16) -> Result<Inode> {
    check_id(id)?;
    let first = find_free_data_block(disk)?.ok_or(FsError::ResourceExhausted("no free data block"))?;
    let mut inode = Inode::new(kind, owner_id, unix_now());
    inode.direct_blocks[0] = first;
    write_inode(disk, id, &inode)?;
    Ok(inode)
}
