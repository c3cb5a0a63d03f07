//! Lockstep CLI — run scripted transactions under strict two-phase locking.
//!
//! ```text
//! lockstep run <ITEMS> <SCRIPT>... [--seed N] [--numbered]
//!              [--on-deadlock halt|abort-victim] [--json]
//! ```
//!
//! Each script file becomes one transaction (ids follow argument order).
//! The trace prints one line per lock decision and per executed command,
//! then a final store dump. Exit codes: 0 success, 1 load failure, 2 the
//! run halted on deadlock.

mod commands;

use std::process;

use anyhow::{Context, Result};
use clap::ArgMatches;
use tracing_subscriber::EnvFilter;

use lockstep_engine::{
    load_script, DeadlockPolicy, RunOutcome, RunReport, Scheduler, SchedulerConfig, Script,
};
use lockstep_storage::Store;

use commands::build_cli;

fn main() {
    let matches = build_cli().get_matches();
    init_logging(matches.get_count("verbose"));

    let exit_code = match matches.subcommand() {
        Some(("run", sub)) => match run_command(sub) {
            Ok(report) => {
                print_report(&report, sub.get_flag("json"));
                match report.outcome {
                    RunOutcome::Completed => 0,
                    RunOutcome::Deadlock => 2,
                }
            }
            Err(e) => {
                eprintln!("error: {e:#}");
                1
            }
        },
        _ => unreachable!("subcommand is required"),
    };
    process::exit(exit_code);
}

fn init_logging(verbosity: u8) {
    let default_level = match verbosity {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run_command(matches: &ArgMatches) -> Result<RunReport> {
    let items = *matches
        .get_one::<usize>("items")
        .context("items is required")?;

    let mut scripts: Vec<Script> = Vec::new();
    for path in matches
        .get_many::<String>("scripts")
        .context("scripts are required")?
    {
        let script = load_script(path).with_context(|| format!("loading script '{path}'"))?;
        scripts.push(script);
    }

    let store = if matches.get_flag("numbered") {
        Store::numbered(items)
    } else {
        Store::zeroed(items)
    };

    let policy = match matches
        .get_one::<String>("on-deadlock")
        .map(String::as_str)
    {
        Some("halt") => DeadlockPolicy::Halt,
        _ => DeadlockPolicy::AbortVictim,
    };
    let config = SchedulerConfig {
        seed: matches.get_one::<u64>("seed").copied(),
        policy,
    };

    Ok(Scheduler::new(store, scripts, config).run())
}

fn print_report(report: &RunReport, json: bool) {
    if json {
        match serde_json::to_string_pretty(report) {
            Ok(out) => println!("{out}"),
            Err(e) => eprintln!("error: serializing report: {e}"),
        }
        return;
    }
    for event in &report.events {
        println!("{event}");
    }
    println!("final store: {:?}", report.final_store);
}
