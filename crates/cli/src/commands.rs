//! clap command definitions for the `lockstep` binary.

use clap::{value_parser, Arg, ArgAction, Command};

/// Build the CLI surface.
pub fn build_cli() -> Command {
    Command::new("lockstep")
        .about("Strict two-phase locking simulator")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::Count)
                .global(true)
                .help("Increase log verbosity (-v debug, -vv trace)"),
        )
        .subcommand(
            Command::new("run")
                .about("Run transaction scripts interleaved against a shared store")
                .arg(
                    Arg::new("items")
                        .required(true)
                        .value_parser(value_parser!(usize))
                        .help("Number of store slots"),
                )
                .arg(
                    Arg::new("scripts")
                        .required(true)
                        .num_args(1..)
                        .help("Transaction script files, one transaction each"),
                )
                .arg(
                    Arg::new("seed")
                        .long("seed")
                        .value_parser(value_parser!(u64))
                        .help("Fix the scheduling RNG seed for a reproducible run"),
                )
                .arg(
                    Arg::new("numbered")
                        .long("numbered")
                        .action(ArgAction::SetTrue)
                        .help("Initialize slot i to i+1 instead of 0"),
                )
                .arg(
                    Arg::new("on-deadlock")
                        .long("on-deadlock")
                        .value_parser(["halt", "abort-victim"])
                        .default_value("abort-victim")
                        .help("Halt the run on deadlock, or abort one victim and continue"),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Print the run report as JSON instead of trace lines"),
                ),
        )
}
