mod args;

use crate::args::Args;
use clap::Parser;
use std::process::ExitCode;
use yansi::Paint;

fn main() -> ExitCode {
    yansi::whenever(yansi::Condition::STDERR_IS_TTY);
    let args = Args::parse();

    match args.run() {
        Err(err) => {
            let root = err.root_cause();

            eprintln!("{}", format!("Error: {}", err).red());
            eprintln!();
            eprintln!("{}", "Caused by:".red());
            eprintln!("{}", format!("  {}", root).red());
            ExitCode::from(1)
        }
        Ok(_) => ExitCode::from(0),
    }
}
