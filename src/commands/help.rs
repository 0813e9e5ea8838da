use crate::context::Context;
use colored::Colorize;

pub(crate) const USAGE: &[(&str, &str)] = &[
    ("mkdir", "mkdir <name>            create a directory here"),
    ("touch", "touch <name>            create an empty file here"),
    ("cd", "cd [path]               change directory"),
    ("pwd", "pwd                     print current directory"),
    ("ls", "ls [path]               list a directory"),
    ("open", "open <path> <r|w|rw>[c] open a file, print its fd"),
    ("close", "close <fd>              close a descriptor"),
    ("read", "read <fd> <count>       read from a descriptor"),
    ("write", "write <fd> <text...>    write to a descriptor"),
    ("seek", "seek <fd> <offset>      set a descriptor's offset"),
    ("cat", "cat <path>              print a file"),
    ("find", "find <start> <pattern> [max]  search files by name"),
    ("chmod", "chmod <octal> <path>    change permissions"),
    ("stat", "stat <path>             show an inode"),
    ("rm", "rm <path>               delete a file"),
    ("rmdir", "rmdir <path>            delete an empty directory"),
    ("statfs", "statfs                  usage summary"),
    ("save", "save [path]             write the disk image"),
    ("format", "format                  start from an empty file system"),
    ("clear", "clear                   clear the screen"),
    ("help", "help                    this list"),
    ("exit", "exit                    leave (unsaved changes are lost)"),
];

pub fn handle_argv(_argv: &[&str], _context: &mut Context) -> anyhow::Result<()> {
    for (name, usage) in USAGE {
        let rest = usage.strip_prefix(name).unwrap_or(usage);
        println!("  {}{}", name.green(), rest);
    }
    Ok(())
}
