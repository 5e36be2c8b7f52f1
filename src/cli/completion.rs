//! Shell completion scripts

use clap::Command;
use clap_complete::{generate, Shell};
use std::io::Write;

/// Write a completion script for `shell` covering every target subcommand
pub fn write_completions<W: Write>(shell: Shell, cmd: &mut Command, out: &mut W) {
    let bin_name = cmd.get_name().to_string();
    generate(shell, cmd, bin_name, out);
}
