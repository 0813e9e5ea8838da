use crate::commands::expect_args;
use crate::context::Context;

/// mkdir <name>
/// Creates a directory in the current directory.
/// Outputs: OK
pub fn handle_argv(argv: &[&str], context: &mut Context) -> anyhow::Result<()> {
    expect_args(argv, 1, 1, "mkdir <name>")?;
    let id = context.fs_mut().create_directory(argv[0])?;
    log::debug!("mkdir {} -> inode {}", argv[0], id);
    println!("OK");
    Ok(())
}
