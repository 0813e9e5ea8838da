use crate::context::Context;
use anyhow::{Context as _, bail};
use std::collections::HashMap;

pub type Handler = fn(&[&str], &mut Context) -> anyhow::Result<()>;

pub struct Registry {
    pub map: HashMap<&'static str, Handler>,
}

impl Registry {
    pub fn new() -> Self {
        let mut map = HashMap::new();
        map.insert("mkdir", crate::commands::mkdir::handle_argv as Handler);
        map.insert("touch", crate::commands::touch::handle_argv as Handler);
        map.insert("cd", crate::commands::cd::handle_argv as Handler);
        map.insert("pwd", crate::commands::pwd::handle_argv as Handler);
        map.insert("ls", crate::commands::ls::handle_argv as Handler);
        map.insert("open", crate::commands::open::handle_argv as Handler);
        map.insert("close", crate::commands::close::handle_argv as Handler);
        map.insert("read", crate::commands::read::handle_argv as Handler);
        map.insert("write", crate::commands::write::handle_argv as Handler);
        map.insert("seek", crate::commands::seek::handle_argv as Handler);
        map.insert("cat", crate::commands::cat::handle_argv as Handler);
        map.insert("find", crate::commands::find::handle_argv as Handler);
        map.insert("chmod", crate::commands::chmod::handle_argv as Handler);
        map.insert("stat", crate::commands::stat::handle_argv as Handler);
        map.insert("rm", crate::commands::rm::handle_argv as Handler);
        map.insert("rmdir", crate::commands::rmdir::handle_argv as Handler);
        map.insert("statfs", crate::commands::statfs::handle_argv as Handler);
        map.insert("save", crate::commands::save::handle_argv as Handler);
        map.insert("format", crate::commands::format::handle_argv as Handler);
        map.insert("clear", crate::commands::clear::handle_argv as Handler);
        map.insert("help", crate::commands::help::handle_argv as Handler);
        map.insert("exit", crate::commands::exit::handle_argv as Handler);

        Self { map }
    }

    pub fn dispatch(&self, name: &str, argv: &[&str], context: &mut Context) -> anyhow::Result<()> {
        match self.map.get(name) {
            Some(handler) => handler(argv, context),
            None => bail!("unknown command: {name}"),
        }
    }
}

/// Fails unless `argv` holds between `min` and `max` arguments.
pub(crate) fn expect_args(argv: &[&str], min: usize, max: usize, usage: &str) -> anyhow::Result<()> {
    if argv.len() < min || argv.len() > max {
        bail!("usage: {usage}");
    }
    Ok(())
}

pub(crate) fn parse_fd(arg: &str) -> anyhow::Result<crate::fs::Fd> {
    arg.parse()
        .with_context(|| format!("invalid file descriptor '{arg}'"))
}

pub(crate) fn parse_count(arg: &str) -> anyhow::Result<u64> {
    arg.parse()
        .with_context(|| format!("invalid number '{arg}'"))
}

pub mod cat;
pub mod cd;
pub mod chmod;
pub mod clear;
pub mod close;
pub mod exit;
pub mod find;
pub mod format;
pub mod help;
pub mod ls;
pub mod mkdir;
pub mod open;
pub mod pwd;
pub mod read;
pub mod rm;
pub mod rmdir;
pub mod save;
pub mod seek;
pub mod stat;
pub mod statfs;
pub mod touch;
pub mod write;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_help_entry_is_registered() {
        let registry = Registry::new();
        for (name, _) in crate::commands::help::USAGE {
            assert!(registry.map.contains_key(name), "{name} missing");
        }
        assert_eq!(registry.map.len(), crate::commands::help::USAGE.len());
    }

    #[test]
    fn unknown_command_is_an_error() {
        let mut ctx = Context::scratch();
        assert!(Registry::new().dispatch("frobnicate", &[], &mut ctx).is_err());
    }

    #[test]
    fn argument_helpers() {
        assert!(expect_args(&["a"], 1, 1, "x").is_ok());
        assert!(expect_args(&[], 1, 2, "x").is_err());
        assert_eq!(parse_fd("3").unwrap(), 3);
        assert!(parse_fd("-1").is_err());
        assert!(parse_count("ten").is_err());
    }
}
