//! dmdc - Command-line previewer for colorized DMD scenes

use std::process::ExitCode;

use dmdcolor::cli;

fn main() -> ExitCode {
    cli::run()
}
