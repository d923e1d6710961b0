//! Shell completion scripts

use crate::cli::build_command;
use clap_complete::{generate, Shell};
use std::io::Write;

/// Write the completion script for `shell`
pub fn print_completions<W: Write>(shell: Shell, out: &mut W) {
    let mut command = build_command();
    let name = command.get_name().to_string();
    generate(shell, &mut command, name, out);
}
