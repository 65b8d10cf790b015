//! Shell completion scripts

use clap::CommandFactory;
use clap_complete::Shell;

use super::Cli;
use crate::exit_code::ExitCode;

#[derive(clap::Args, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

/// Render the completion script for a shell
pub fn render(shell: Shell) -> Vec<u8> {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    let mut buf = Vec::new();
    clap_complete::generate(shell, &mut cmd, name, &mut buf);
    buf
}

pub fn execute(args: CompletionsArgs) -> ExitCode {
    use std::io::Write;

    match std::io::stdout().write_all(&render(args.shell)) {
        Ok(()) => ExitCode::Success,
        Err(e) => {
            eprintln!("Failed to write completions: {e}");
            ExitCode::GeneralError
        }
    }
}
