use crate::commands::expect_args;
use crate::context::Context;

/// stat <path>
/// Prints the inode record behind a path.
pub fn handle_argv(argv: &[&str], context: &mut Context) -> anyhow::Result<()> {
    expect_args(argv, 1, 1, "stat <path>")?;
    let fs = context.fs();
    let id = fs.traverse(argv[0])?;
    let inode = fs.read_inode(id)?;

    let kind = if inode.is_dir() { "directory" } else { "regular file" };
    let blocks: Vec<String> = inode
        .direct_blocks
        .iter()
        .filter(|&&b| b != 0)
        .map(|b| b.to_string())
        .collect();

    println!("  path: {}", argv[0]);
    println!("  type: {}  i-node: {}", kind, id);
    println!("  size: {} B  blocks: [{}]", inode.file_size, blocks.join(", "));
    println!("  owner: {}  mode: {:04o}", inode.owner_id, inode.permissions);
    println!(
        "  atime: {}  mtime: {}  ctime: {}",
        inode.atime, inode.mtime, inode.ctime
    );
    Ok(())
}
