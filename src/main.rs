use clap::Parser;
use quantdesk::cli::{run, Cli};

fn main() -> std::process::ExitCode {
    tracing_subscriber::fmt::init();
    run(Cli::parse())
}
