//! # Hold'em CLI Library
//!
//! Command-line front end for the `holdem-engine` table and the `holdem-ai`
//! opponents.
//!
//! ## Main Entry Point
//!
//! [`run`] parses the arguments, dispatches to a subcommand and returns the
//! process exit code. Output goes to the given writers, so the whole CLI can
//! be driven in-process.
//!
//! ```
//! let mut out = Vec::new();
//! let mut err = Vec::new();
//! let code = holdem_cli::run(["holdem", "eval", "As", "Ks", "Qs", "Js", "Ts"], &mut out, &mut err);
//! assert_eq!(code, 0);
//! assert!(String::from_utf8(out).unwrap().contains("Royal Flush"));
//! ```
//!
//! ## Available Subcommands
//!
//! - `cfg`: Effective configuration with the source of each value
//! - `deal`: Deal one hand and rank the showdown
//! - `eval`: Rank five to seven cards, optionally against a second hand
//! - `sim`: AI-only table for N hands with chip-conservation checks
//! - `bench`: Hand evaluation throughput

use clap::Parser;
use std::io::Write;

pub mod cli;
mod commands;
pub mod config;
mod error;
pub mod exit_code;
pub mod formatters;
pub mod logging;
pub mod ui;

use cli::{Commands, HoldemCli};
use commands::{
    handle_bench_command, handle_cfg_command, handle_deal_command, handle_eval_command,
    handle_sim_command,
};

pub use error::CliError;

/// Main entry point for the CLI application.
///
/// # Arguments
///
/// * `args` - Command-line arguments including the program name
/// * `out` - Output stream for normal output (typically `stdout`)
/// * `err` - Output stream for error messages (typically `stderr`)
///
/// # Returns
///
/// [`exit_code::SUCCESS`] or [`exit_code::ERROR`]. Help and version requests
/// print to `out` and succeed.
pub fn run<I, S>(args: I, out: &mut dyn Write, err: &mut dyn Write) -> i32
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    const COMMANDS: &[&str] = &["cfg", "deal", "eval", "sim", "bench"];
    let argv: Vec<String> = args.into_iter().map(|s| s.as_ref().to_string()).collect();

    let parsed = HoldemCli::try_parse_from(&argv);
    let cli = match parsed {
        Ok(cli) => cli,
        Err(e) => {
            use clap::error::ErrorKind;

            // Help and version should print to stdout and exit 0
            return match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                    if write!(out, "{}", e).is_err() {
                        return exit_code::ERROR;
                    }
                    exit_code::SUCCESS
                }
                _ => {
                    let _ = write_usage(err, &e, COMMANDS);
                    exit_code::ERROR
                }
            };
        }
    };

    let result = match cli.cmd {
        Commands::Cfg { table } => handle_cfg_command(&table.overrides(), out, err),
        Commands::Deal { seed, players } => handle_deal_command(seed, players, out),
        Commands::Eval { cards, against } => handle_eval_command(&cards, against.as_deref(), out),
        Commands::Sim {
            hands,
            output,
            table,
        } => handle_sim_command(hands, output, &table.overrides(), out, err),
        Commands::Bench { iterations, seed } => handle_bench_command(iterations, seed, out),
    };

    match result {
        Ok(()) => exit_code::SUCCESS,
        Err(e) => {
            let _ = ui::write_error(err, &e.to_string());
            exit_code::ERROR
        }
    }
}

fn write_usage(err: &mut dyn Write, e: &clap::Error, commands: &[&str]) -> std::io::Result<()> {
    writeln!(err, "{}", e)?;
    writeln!(err)?;
    writeln!(err, "Hold'em CLI")?;
    writeln!(err, "Usage: holdem <command> [options]\n")?;
    writeln!(err, "Commands:")?;
    for c in commands {
        writeln!(err, "  {}", c)?;
    }
    writeln!(err, "\nFor full help, run: holdem --help")
}
