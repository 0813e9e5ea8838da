pub mod bitmap;
pub mod consts;
pub mod descriptor;
pub mod directory;
pub mod error;
pub mod filesystem;
pub mod inode;
pub mod io;
pub mod layout;
pub mod path;
pub mod search;
pub mod session;
pub mod superblock;

pub use descriptor::{Fd, OpenFlag};
pub use error::{FsError, Result};
pub use filesystem::{DirListing, FileSystem, FsStats};
pub use layout::{Inode, InodeId, NodeKind};
pub use session::Session;
