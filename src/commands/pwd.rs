use crate::context::Context;

// pwd: prints the absolute path of the current directory, tracked by the session on every cd.
pub fn handle_argv(_argv: &[&str], context: &mut Context) -> anyhow::Result<()> {
    println!("{}", context.fs().pwd());
    Ok(())
}
