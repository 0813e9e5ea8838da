//! An inode-based file system emulated inside one in-memory disk image.

pub mod fs;
