use crate::commands::Registry;
use crate::context::Context;
use colored::Colorize;
use std::io;

fn write_greet() {
    println!("{} - {}", "Inode File System".green(), env!("CARGO_PKG_VERSION").yellow());
    println!("type {} for the command list", "help".cyan());
}

fn write_prefix(context: &Context) {
    eprint!("{}> ", context.fs().pwd().blue());
}

/// Splits one input line and dispatches it. Errors are printed, never returned.
pub fn run_line(registry: &Registry, line: &str, context: &mut Context) {
    let mut it = line.split_whitespace();
    let Some(command) = it.next() else {
        return;
    };
    let args: Vec<&str> = it.collect();

    if let Err(e) = registry.dispatch(command, &args, context) {
        eprintln!("{}", format!("{:#}", e).red());
    }
}

pub fn handle_app_loop(context: &mut Context) {
    let stdin = io::stdin();
    let registry = Registry::new();

    write_greet();
    while context.is_running() {
        write_prefix(context);
        let mut user_input = String::new();
        match stdin.read_line(&mut user_input) {
            Ok(0) => break,
            Ok(_) => run_line(&registry, user_input.trim(), context),
            Err(e) => {
                eprintln!("{}", format!("cannot read input: {}", e).red());
                break;
            }
        }
    }
}
