use clap::Parser;
use kabuto::cli::{run, Cli};

fn main() -> std::process::ExitCode {
    run(Cli::parse())
}
