use crate::commands::expect_args;
use crate::context::Context;

/// rm <path>
/// Removes a regular file that no descriptor holds open.
pub fn handle_argv(argv: &[&str], context: &mut Context) -> anyhow::Result<()> {
    expect_args(argv, 1, 1, "rm <path>")?;
    context.fs_mut().delete_file(argv[0])?;
    println!("OK");
    Ok(())
}
