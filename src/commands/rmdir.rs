use crate::commands::expect_args;
use crate::context::Context;

/// rmdir <path>
/// The directory must be empty and must not be the current one.
pub fn handle_argv(argv: &[&str], context: &mut Context) -> anyhow::Result<()> {
    expect_args(argv, 1, 1, "rmdir <path>")?;
    context.fs_mut().remove_directory(argv[0])?;
    println!("OK");
    Ok(())
}
