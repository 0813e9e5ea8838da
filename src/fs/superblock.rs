use crate::fs::consts::*;
use crate::fs::error::{FsError, Result};
use crate::fs::io::Disk;

// Superblock - 48 B at the start of block 0
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Superblock {
    pub magic: [u8; 4],          // 4 B (offset 0..3)
    pub version: u16,            // 2 B (offset 4..5)
    pub block_size: u16,         // 2 B (offset 6..7)
    pub block_count: u32,        // 4 B (offset 8..11)
    pub inode_count: u32,        // 4 B (offset 12..15)
    pub inode_bitmap_block: u32, // 4 B (offset 16..19)
    pub data_bitmap_block: u32,  // 4 B (offset 20..23)
    pub inode_table_start: u32,  // 4 B (offset 24..27)
    pub inode_table_blocks: u32, // 4 B (offset 28..31)
    pub root_dir_block: u32,     // 4 B (offset 32..35)
    pub fd_table_start: u32,     // 4 B (offset 36..39)
    pub fd_table_blocks: u32,    // 4 B (offset 40..43)
    pub data_start: u32,         // 4 B (offset 44..47)
}

impl Superblock {
    /// The superblock describing the compiled-in layout.
    pub fn standard() -> Self {
        Self {
            magic: FS_MAGIC,
            version: FS_VERSION,
            block_size: BLOCK_SIZE as u16,
            block_count: BLOCK_COUNT,
            inode_count: INODE_COUNT,
            inode_bitmap_block: INODE_BITMAP_BLOCK,
            data_bitmap_block: DATA_BITMAP_BLOCK,
            inode_table_start: INODE_TABLE_START,
            inode_table_blocks: INODE_TABLE_BLOCKS,
            root_dir_block: ROOT_DIR_BLOCK,
            fd_table_start: FD_TABLE_START,
            fd_table_blocks: FD_TABLE_BLOCKS,
            data_start: DATA_START,
        }
    }

    pub fn serialize(&self, out: &mut [u8]) {
        out[0..4].copy_from_slice(&self.magic);
        out[4..6].copy_from_slice(&self.version.to_le_bytes());
        out[6..8].copy_from_slice(&self.block_size.to_le_bytes());
        let words = [
            self.block_count,
            self.inode_count,
            self.inode_bitmap_block,
            self.data_bitmap_block,
            self.inode_table_start,
            self.inode_table_blocks,
            self.root_dir_block,
            self.fd_table_start,
            self.fd_table_blocks,
            self.data_start,
        ];
        for (i, w) in words.iter().enumerate() {
            let at = 8 + i * 4;
            out[at..at + 4].copy_from_slice(&w.to_le_bytes());
        }
    }

    pub fn deserialize(inp: &[u8]) -> Self {
        let word = |i: usize| {
            let at = 8 + i * 4;
            u32::from_le_bytes([inp[at], inp[at + 1], inp[at + 2], inp[at + 3]])
        };
        Self {
            magic: [inp[0], inp[1], inp[2], inp[3]],
            version: u16::from_le_bytes([inp[4], inp[5]]),
            block_size: u16::from_le_bytes([inp[6], inp[7]]),
            block_count: word(0),
            inode_count: word(1),
            inode_bitmap_block: word(2),
            data_bitmap_block: word(3),
            inode_table_start: word(4),
            inode_table_blocks: word(5),
            root_dir_block: word(6),
            fd_table_start: word(7),
            fd_table_blocks: word(8),
            data_start: word(9),
        }
    }
}

pub fn write_superblock(disk: &mut Disk, sb: &Superblock) -> Result<()> {
    let block0 = disk.block_mut(SUPERBLOCK_BLOCK)?;
    block0.fill(0);
    sb.serialize(block0);
    Ok(())
}

/// Reads block 0 and checks it against the compiled-in layout.
pub fn read_superblock(disk: &Disk) -> Result<Superblock> {
    let sb = Superblock::deserialize(disk.block(SUPERBLOCK_BLOCK)?);
    if sb.magic != FS_MAGIC {
        return Err(FsError::Corrupt("bad fs magic".into()));
    }
    if sb.version != FS_VERSION {
        return Err(FsError::Corrupt(format!("unsupported version {}", sb.version)));
    }
    if sb != Superblock::standard() {
        return Err(FsError::Corrupt(
            "layout does not match this build's geometry".into(),
        ));
    }
    Ok(sb)
}
