//! macbuild CLI - toolchain bootstrap and build driver for the macOS PDF viewer

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Mode};
use macbuild::util::diagnostic::emit;
use macbuild::util::errors::find_build_error;
use macbuild::util::shell::Shell;

fn main() {
    let cli = Cli::parse();
    let shell = Shell::from_flags(cli.quiet, cli.verbose, cli.color);

    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("macbuild=debug")
    } else if cli.quiet {
        EnvFilter::new("macbuild=warn")
    } else {
        EnvFilter::new("macbuild=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(shell.use_color())
        .with_target(false)
        .without_time()
        .init();

    if let Err(e) = run(&cli, &shell) {
        report(&e, &shell);
        std::process::exit(1);
    }
}

fn run(cli: &Cli, shell: &Shell) -> Result<()> {
    match cli.mode() {
        Mode::Build => commands::build::execute(cli, shell),
        Mode::Setup => commands::setup::execute(cli, shell),
        Mode::Update => commands::update::execute(cli, shell),
    }
}

fn report(err: &anyhow::Error, shell: &Shell) {
    match find_build_error(err) {
        Some(build_err) => {
            let mut diag = build_err.to_diagnostic();
            let outer = err.to_string();
            if outer != build_err.to_string() {
                diag = diag.with_context(outer);
            }
            emit(&diag, shell.use_color());
        }
        None => eprintln!("error: {:#}", err),
    }
}
