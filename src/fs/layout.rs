use crate::fs::consts::{DEFAULT_PERMISSIONS, DESCRIPTOR_SIZE, DIR_ENTRY_HEADER, INODE_SIZE, MAX_NAME_LEN, NUM_DIRECT};
use crate::fs::error::{FsError, Result};
use enumflags2::{BitFlags, bitflags};
use std::fmt;

pub type InodeId = u32;
pub type BlockId = u32;

#[rustfmt::skip]
#[bitflags]
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InodeFlag {
    File          = 0b001,
    Directory     = 0b010,
    IndirectBlock = 0b100,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    File,
    Directory,
}

impl From<NodeKind> for InodeFlag {
    fn from(kind: NodeKind) -> Self {
        match kind {
            NodeKind::File => InodeFlag::File,
            NodeKind::Directory => InodeFlag::Directory,
        }
    }
}

// Structure that represents one inode - 64 B
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inode {
    pub owner_id: u16,                   // 2  (offset 0..1)
    pub permissions: u16,                // 2  (offset 2..3)
    pub file_size: u32,                  // 4  (offset 4..7)
    pub direct_blocks: [u32; NUM_DIRECT], // 24 (offset 8..31)
    pub single_indirect: u32,            // 4  (offset 32..35)
    pub double_indirect: u32,            // 4  (offset 36..39)
    pub atime: u32,                      // 4  (offset 40..43) last access
    pub ctime: u32,                      // 4  (offset 44..47) creation
    pub mtime: u32,                      // 4  (offset 48..51) last modification
    pub dtime: u32,                      // 4  (offset 52..55) deletion
    pub flags: BitFlags<InodeFlag>,      // 1  (offset 56)
                                         // 7  (offset 57..63) reserved
}

impl Inode {
    pub fn new(kind: NodeKind, owner_id: u16, now: u32) -> Self {
        Self {
            owner_id,
            permissions: DEFAULT_PERMISSIONS,
            file_size: 0,
            direct_blocks: [0; NUM_DIRECT],
            single_indirect: 0,
            double_indirect: 0,
            atime: now,
            ctime: now,
            mtime: now,
            dtime: 0,
            flags: InodeFlag::from(kind).into(),
        }
    }

    pub fn is_dir(&self) -> bool {
        self.flags.contains(InodeFlag::Directory)
    }

    pub fn is_file(&self) -> bool {
        self.flags.contains(InodeFlag::File)
    }

    pub fn serialize(&self, out: &mut [u8]) {
        debug_assert_eq!(out.len(), INODE_SIZE);
        out.fill(0);
        out[0..2].copy_from_slice(&self.owner_id.to_le_bytes());
        out[2..4].copy_from_slice(&self.permissions.to_le_bytes());
        out[4..8].copy_from_slice(&self.file_size.to_le_bytes());
        for (i, b) in self.direct_blocks.iter().enumerate() {
            out[8 + i * 4..12 + i * 4].copy_from_slice(&b.to_le_bytes());
        }
        out[32..36].copy_from_slice(&self.single_indirect.to_le_bytes());
        out[36..40].copy_from_slice(&self.double_indirect.to_le_bytes());
        out[40..44].copy_from_slice(&self.atime.to_le_bytes());
        out[44..48].copy_from_slice(&self.ctime.to_le_bytes());
        out[48..52].copy_from_slice(&self.mtime.to_le_bytes());
        out[52..56].copy_from_slice(&self.dtime.to_le_bytes());
        out[56] = self.flags.bits();
    }

    pub fn deserialize(inp: &[u8]) -> Self {
        debug_assert_eq!(inp.len(), INODE_SIZE);
        let u32_at = |at: usize| u32::from_le_bytes([inp[at], inp[at + 1], inp[at + 2], inp[at + 3]]);
        let mut direct_blocks = [0u32; NUM_DIRECT];
        for (i, b) in direct_blocks.iter_mut().enumerate() {
            *b = u32_at(8 + i * 4);
        }
        Self {
            owner_id: u16::from_le_bytes([inp[0], inp[1]]),
            permissions: u16::from_le_bytes([inp[2], inp[3]]),
            file_size: u32_at(4),
            direct_blocks,
            single_indirect: u32_at(32),
            double_indirect: u32_at(36),
            atime: u32_at(40),
            ctime: u32_at(44),
            mtime: u32_at(48),
            dtime: u32_at(52),
            flags: BitFlags::from_bits_truncate(inp[56]),
        }
    }
}

/// Variable-length directory record: header, name bytes, NUL terminator.
#[derive(Clone, PartialEq, Eq)]
pub struct DirectoryEntry {
    pub inode_id: InodeId,
    pub record_length: u16,
    pub name: Vec<u8>,
}

impl DirectoryEntry {
    pub fn record_length_for(name_len: usize) -> usize {
        DIR_ENTRY_HEADER + name_len + 1
    }

    pub fn from_name(name: &[u8], inode_id: InodeId) -> Result<Self> {
        if name.is_empty() || name.len() > MAX_NAME_LEN {
            return Err(FsError::invalid("invalid name length"));
        }
        Ok(Self {
            inode_id,
            record_length: Self::record_length_for(name.len()) as u16,
            name: name.to_vec(),
        })
    }

    pub fn name_str(&self) -> &str {
        std::str::from_utf8(&self.name).unwrap_or("<invalid>")
    }

    pub fn is_dot_or_dotdot(&self) -> bool {
        self.name == b"." || self.name == b".."
    }

    /// Writes the record at the start of `out`, which must hold `record_length` bytes.
    pub fn serialize(&self, out: &mut [u8]) {
        let name_len = self.name.len();
        out[0..4].copy_from_slice(&self.inode_id.to_le_bytes());
        out[4..6].copy_from_slice(&self.record_length.to_le_bytes());
        out[6] = name_len as u8;
        out[7] = 0;
        out[DIR_ENTRY_HEADER..DIR_ENTRY_HEADER + name_len].copy_from_slice(&self.name);
        out[DIR_ENTRY_HEADER + name_len] = 0;
    }

    /// Decodes the record starting at `offset`, refusing records that overrun `data`.
    pub fn deserialize(data: &[u8], offset: usize) -> Result<Self> {
        let corrupt = || FsError::Corrupt(format!("directory record at offset {}", offset));
        if offset + DIR_ENTRY_HEADER > data.len() {
            return Err(corrupt());
        }
        let inp = &data[offset..];
        let inode_id = u32::from_le_bytes([inp[0], inp[1], inp[2], inp[3]]);
        let record_length = u16::from_le_bytes([inp[4], inp[5]]);
        let name_len = inp[6] as usize;
        let rec = record_length as usize;
        if name_len == 0 || rec < Self::record_length_for(name_len) || offset + rec > data.len() {
            return Err(corrupt());
        }
        Ok(Self {
            inode_id,
            record_length,
            name: inp[DIR_ENTRY_HEADER..DIR_ENTRY_HEADER + name_len].to_vec(),
        })
    }
}

impl fmt::Debug for DirectoryEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "DirectoryEntry({}, inode={}, rec_len={})",
            self.name_str(),
            self.inode_id,
            self.record_length
        )
    }
}

// One slot of the descriptor table - 64 B
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileDescriptor {
    pub inode_id: InodeId, // 4 (offset 0..3)
    pub flags: u32,        // 4 (offset 4..7)
    pub offset: u64,       // 8 (offset 8..15)
    pub ref_count: u32,    // 4 (offset 16..19)
                           // 44 (offset 20..63) reserved
}

impl FileDescriptor {
    pub fn is_free(&self) -> bool {
        self.ref_count == 0
    }

    pub fn serialize(&self, out: &mut [u8]) {
        debug_assert_eq!(out.len(), DESCRIPTOR_SIZE);
        out.fill(0);
        out[0..4].copy_from_slice(&self.inode_id.to_le_bytes());
        out[4..8].copy_from_slice(&self.flags.to_le_bytes());
        out[8..16].copy_from_slice(&self.offset.to_le_bytes());
        out[16..20].copy_from_slice(&self.ref_count.to_le_bytes());
    }

    pub fn deserialize(inp: &[u8]) -> Self {
        debug_assert_eq!(inp.len(), DESCRIPTOR_SIZE);
        let mut offset = [0u8; 8];
        offset.copy_from_slice(&inp[8..16]);
        Self {
            inode_id: u32::from_le_bytes([inp[0], inp[1], inp[2], inp[3]]),
            flags: u32::from_le_bytes([inp[4], inp[5], inp[6], inp[7]]),
            offset: u64::from_le_bytes(offset),
            ref_count: u32::from_le_bytes([inp[16], inp[17], inp[18], inp[19]]),
        }
    }
}
