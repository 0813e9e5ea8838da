pub const FS_MAGIC: [u8; 4] = *b"INFS";
pub const FS_VERSION: u16 = 1;

pub const BLOCK_SIZE: usize = 2048; // 2 KiB
pub const BLOCK_COUNT: u32 = 16384; // 32 MiB address space

// Reserved regions, in on-disk order
pub const SUPERBLOCK_BLOCK: u32 = 0;
pub const INODE_BITMAP_BLOCK: u32 = 1;
pub const DATA_BITMAP_BLOCK: u32 = 2;
pub const INODE_TABLE_START: u32 = 3;
pub const INODE_TABLE_BLOCKS: u32 = 512;
pub const ROOT_DIR_BLOCK: u32 = INODE_TABLE_START + INODE_TABLE_BLOCKS; // 515
pub const FD_TABLE_START: u32 = ROOT_DIR_BLOCK + 1; // 516
pub const FD_TABLE_BLOCKS: u32 = 17;
pub const DATA_START: u32 = FD_TABLE_START + FD_TABLE_BLOCKS; // 533

pub const INODE_SIZE: usize = 64; // 64 B
pub const INODES_PER_BLOCK: u32 = (BLOCK_SIZE / INODE_SIZE) as u32; // 32
pub const INODE_COUNT: u32 = INODE_TABLE_BLOCKS * INODES_PER_BLOCK; // 16384
pub const ROOT_INODE: u32 = 0;

pub const DESCRIPTOR_SIZE: usize = 64; // 64 B
pub const DESCRIPTORS_PER_BLOCK: u32 = (BLOCK_SIZE / DESCRIPTOR_SIZE) as u32; // 32
pub const DESCRIPTOR_COUNT: u32 = FD_TABLE_BLOCKS * DESCRIPTORS_PER_BLOCK; // 544

pub const NUM_DIRECT: usize = 6;
pub const MAX_FILE_SIZE: u64 = (NUM_DIRECT * BLOCK_SIZE) as u64;

pub const DIR_ENTRY_HEADER: usize = 8; // inode(4) + record_length(2) + name_length(1) + pad(1)
pub const MAX_NAME_LEN: usize = 255;

// 0o644: rw-r--r--
pub const DEFAULT_PERMISSIONS: u16 = 0o644;
