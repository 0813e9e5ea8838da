use crate::commands::expect_args;
use crate::context::Context;

/// cd [path]
/// Without an argument returns to the root.
pub fn handle_argv(argv: &[&str], context: &mut Context) -> anyhow::Result<()> {
    expect_args(argv, 0, 1, "cd [path]")?;
    let target = argv.first().copied().unwrap_or("/");
    context.fs_mut().cd(target)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn walks_down_and_back() {
        let mut ctx = Context::scratch();
        ctx.fs_mut().create_directory("a").unwrap();
        handle_argv(&["a"], &mut ctx).unwrap();
        assert_eq!(ctx.fs().pwd(), "/a");
        handle_argv(&[], &mut ctx).unwrap();
        assert_eq!(ctx.fs().pwd(), "/");
        assert!(handle_argv(&["missing"], &mut ctx).is_err());
    }
}
