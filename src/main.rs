use std::{
    io,
    path::PathBuf,
    process::{Command, ExitCode},
};

use clap::Parser;
use colored::*;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::{
    config::Settings,
    repl::{Flow, Repl},
    ui::Console,
};

mod config;
mod models;
mod repl;
mod services;
mod storage;
mod ui;

#[derive(Parser)]
#[command(
    name = "platecore",
    about = "An interactive console for logbooks, profiles and projects"
)]
struct Cli {
    /// Directory holding the data files and the session token
    #[arg(long, env = "PLATECORE_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// IANA time zone for displayed times and log dates (default: system zone)
    #[arg(long, env = "PLATECORE_TZ")]
    time_zone: Option<String>,

    /// Do not add sample records to empty collections
    #[arg(long, env = "PLATECORE_NO_SEED")]
    no_seed: bool,
}

/// Diagnostics go to stderr so the console output stays clean
fn init_tracing() {
    let directives = std::env::var("PLATECORE_LOG")
        .or_else(|_| std::env::var("RUST_LOG"))
        .unwrap_or_else(|_| "platecore=warn".into());

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(directives))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing();

    let settings = match Settings::resolve(cli.data_dir, cli.time_zone.as_deref(), !cli.no_seed)
    {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("{} {}", "Error:".red(), e);
            return ExitCode::FAILURE;
        }
    };
    if let Err(e) = settings.ensure_data_dir() {
        eprintln!("{} {}", "Error:".red(), e);
        return ExitCode::FAILURE;
    }
    tracing::debug!(data_dir = %settings.data_dir.display(), "starting");

    let console = Console::interactive(io::stdin().lock(), io::stdout());
    let mut repl = match Repl::open(settings, console) {
        Ok(repl) => repl,
        Err(e) => {
            tracing::error!(error = %e, "startup failed");
            eprintln!("{} {}", "Error:".red(), e);
            return ExitCode::FAILURE;
        }
    };

    match repl.run() {
        Ok(Flow::Restart) => {
            drop(repl);
            restart()
        }
        Ok(Flow::Exit | Flow::Continue) => ExitCode::SUCCESS,
        // Already reported and recorded by the loop.
        Err(_) => ExitCode::FAILURE,
    }
}

/// Replaces this process with a fresh copy started with the same arguments.
fn restart() -> ExitCode {
    let exe = match std::env::current_exe() {
        Ok(exe) => exe,
        Err(e) => {
            eprintln!("{} Failed to locate executable: {}", "Error:".red(), e);
            return ExitCode::FAILURE;
        }
    };
    let mut command = Command::new(exe);
    command.args(std::env::args_os().skip(1));
    hand_off(command)
}

#[cfg(unix)]
fn hand_off(mut command: Command) -> ExitCode {
    use std::os::unix::process::CommandExt;

    // `exec` only returns on failure.
    let e = command.exec();
    eprintln!("{} Failed to restart: {}", "Error:".red(), e);
    ExitCode::FAILURE
}

#[cfg(not(unix))]
fn hand_off(mut command: Command) -> ExitCode {
    match command.status() {
        Ok(status) if status.success() => ExitCode::SUCCESS,
        Ok(_) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("{} Failed to restart: {}", "Error:".red(), e);
            ExitCode::FAILURE
        }
    }
}
