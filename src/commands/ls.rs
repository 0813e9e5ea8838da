use crate::commands::expect_args;
use crate::context::Context;
use crate::fs::DirListing;
use colored::Colorize;

fn kind(entry: &DirListing) -> &'static str {
    if entry.inode.is_dir() { "DIR" } else { "FILE" }
}

/// ls [path]
///
/// Short form prints `DIR: <name>` / `FILE: <name>` per entry.
/// With `--verbose` on the command line each row also carries the permission
/// bits, owner, size and inode number.
pub fn handle_argv(argv: &[&str], context: &mut Context) -> anyhow::Result<()> {
    expect_args(argv, 0, 1, "ls [path]")?;
    let target = argv.first().copied().unwrap_or(".");
    let fs = context.fs();
    let entries = fs.list_directory(target)?;

    for entry in &entries {
        let name = if entry.inode.is_dir() {
            entry.name.blue().to_string()
        } else {
            entry.name.clone()
        };
        if fs.session().verbose {
            println!(
                "{:<4} {:04o} {:>5} {:>6} B  i-node {:>5}  {}",
                kind(entry),
                entry.inode.permissions,
                entry.inode.owner_id,
                entry.inode.file_size,
                entry.inode_id,
                name
            );
        } else {
            println!("{}: {}", kind(entry), name);
        }
    }
    Ok(())
}
