//! Intcode CLI - run a program or search for the inputs that produce a target

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use intcode_core::machine::Machine;
use intcode_core::memory::Memory;
use intcode_core::program::Program;
use intcode_core::search::{
    seeded_memory, FaultPolicy, Parameters, Search, DEFAULT_RANGE, OUTPUT_ADDRESS,
};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Mode {
    /// Run once with the given noun and verb and print address 0
    Run,
    /// Find the noun and verb that produce the target and print 100 * noun + verb
    Search,
}

/// Intcode runner
#[derive(Parser, Debug)]
#[command(name = "intcode")]
#[command(about = "Run an Intcode program or search for its inputs", long_about = None)]
struct Args {
    /// Path to a file holding one line of comma-separated integers
    input: PathBuf,

    #[arg(short, long, value_enum, default_value_t = Mode::Search)]
    mode: Mode,

    /// Value written to address 1 in run mode
    #[arg(long, default_value_t = 12)]
    noun: i64,

    /// Value written to address 2 in run mode
    #[arg(long, default_value_t = 2)]
    verb: i64,

    /// Output the search looks for at address 0
    #[arg(short, long, default_value_t = 19690720, allow_negative_numbers = true)]
    target: i64,

    /// Exclusive upper bound for noun and verb in search mode
    #[arg(short, long, default_value_t = DEFAULT_RANGE)]
    range: i64,

    /// Spread search trials across all cores
    #[arg(short, long)]
    parallel: bool,

    /// Treat faulting trials as non-matches instead of aborting the search
    #[arg(long)]
    skip_faults: bool,

    /// Dump final memory to stderr after a run
    #[arg(short, long)]
    dump: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    if let Err(e) = run(&args) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(args: &Args) -> Result<()> {
    let program = Program::from_file(&args.input)
        .with_context(|| format!("failed to load program from {}", args.input.display()))?;
    tracing::info!(cells = program.len(), path = %args.input.display(), "loaded program");

    match args.mode {
        Mode::Run => run_once(&program, Parameters::new(args.noun, args.verb), args.dump),
        Mode::Search => search(&program, args),
    }
}

fn run_once(program: &Program, parameters: Parameters, dump: bool) -> Result<()> {
    let memory = seeded_memory(program.as_slice(), parameters)
        .with_context(|| format!("cannot seed program with {}", parameters))?;

    let mut machine = Machine::new(memory);
    let outcome = machine.run();
    tracing::info!(steps = machine.steps(), ip = machine.ip(), "machine stopped");

    if dump {
        dump_memory(&machine);
    }
    outcome.context("program faulted")?;

    let value = machine.memory().read(OUTPUT_ADDRESS)?;
    println!("Value at position 0 after program halts: {}", value);
    Ok(())
}

fn search(program: &Program, args: &Args) -> Result<()> {
    let policy = if args.skip_faults {
        FaultPolicy::Skip
    } else {
        FaultPolicy::Abort
    };
    let found = Search::new(args.range)
        .on_fault(policy)
        .parallel(args.parallel)
        .run(program.as_slice(), args.target)?;

    tracing::info!(%found, "search succeeded");
    println!("100 * noun + verb = {}", found.answer());
    Ok(())
}

fn dump_memory(machine: &Machine) {
    eprintln!("\nMachine State:");
    eprintln!("  State: {:?}", machine.state());
    eprintln!("  IP:    {}", machine.ip());
    eprintln!("  Steps: {}", machine.steps());
    eprintln!("  Memory: {}", Program::new(machine.memory().to_vec()));
}
