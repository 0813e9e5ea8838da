use crate::commands::{expect_args, parse_count};
use crate::context::Context;

const DEFAULT_MAX_RESULTS: usize = 100;

/// find <start> <pattern> [max]
/// Prints the path of every regular file below `start` whose name contains `pattern`.
pub fn handle_argv(argv: &[&str], context: &mut Context) -> anyhow::Result<()> {
    expect_args(argv, 2, 3, "find <start> <pattern> [max]")?;
    let max = match argv.get(2) {
        Some(arg) => parse_count(arg)? as usize,
        None => DEFAULT_MAX_RESULTS,
    };
    let found = context.fs().search_files_by_name(argv[0], argv[1], max)?;
    for path in &found {
        println!("{}", path);
    }
    if found.is_empty() {
        println!("no match");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn searches_from_start() {
        let mut ctx = Context::scratch();
        ctx.fs_mut().create_file("log.txt").unwrap();
        handle_argv(&["/", "log"], &mut ctx).unwrap();
        handle_argv(&["/", "zzz", "5"], &mut ctx).unwrap();
        assert!(handle_argv(&["/", "log", "0"], &mut ctx).is_err());
        assert!(handle_argv(&["/log.txt", "log"], &mut ctx).is_err());
    }
}
