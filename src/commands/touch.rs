use crate::commands::expect_args;
use crate::context::Context;

/// touch <name>
/// Creates an empty file in the current directory.
/// Outputs: OK
pub fn handle_argv(argv: &[&str], context: &mut Context) -> anyhow::Result<()> {
    expect_args(argv, 1, 1, "touch <name>")?;
    context.fs_mut().create_file(argv[0])?;
    println!("OK");
    Ok(())
}
