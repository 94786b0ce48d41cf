use anyhow::{bail, Context, Result};
use clap::Parser;
use machina::tape::shared;
use machina::{
    analyze, ArrayTape, Definition, ProgramLoader, ProgramManager, RunConfig, Simulator, Speed,
};
use std::path::PathBuf;
use std::process::ExitCode;
use std::thread;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[clap(author, version, about, long_about = None, arg_required_else_help = true)]
struct Cli {
    /// Machine definition to run (`.tm` or `.json`)
    #[clap(short, long, conflicts_with = "example")]
    machine: Option<PathBuf>,

    /// Name of a built-in sample machine (see --list)
    #[clap(short, long)]
    example: Option<String>,

    /// Initial tape content; defaults to the tape stored with the machine
    #[clap(short, long)]
    input: Option<String>,

    /// Step limit for the run, 0 for unlimited
    #[clap(long)]
    max_steps: Option<usize>,

    /// Seed for resolving nondeterministic choices
    #[clap(long)]
    seed: Option<u64>,

    /// Delay between printed steps in debug mode: slow, normal, fast or fastest
    #[clap(long)]
    speed: Option<Speed>,

    /// JSON run configuration; command-line flags take precedence
    #[clap(long)]
    config: Option<PathBuf>,

    /// Validate the machine instead of running it
    #[clap(long)]
    check: bool,

    /// List the built-in sample machines
    #[clap(long)]
    list: bool,

    /// Print each step of the execution
    #[clap(short = 'd', long)]
    debug: bool,

    /// Log every configuration and debug output from the engine
    #[clap(short, long, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log errors
    #[clap(short, long)]
    quiet: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(&cli);

    match run(&cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

/// `RUST_LOG` applies unless `-v` or `-q` picks the level explicitly.
fn init_tracing(cli: &Cli) {
    let filter = match (cli.verbose, cli.quiet) {
        (true, _) => EnvFilter::new("debug"),
        (_, true) => EnvFilter::new("error"),
        _ => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

fn run(cli: &Cli) -> Result<bool> {
    if cli.list {
        list_examples()?;
        return Ok(true);
    }

    let definition = load_definition(cli)?;
    let config = run_config(cli)?;

    if cli.check {
        return check(&definition);
    }

    let input = cli.input.as_deref().unwrap_or(&definition.tape);
    let tape = shared(ArrayTape::new(input));
    let mut simulator = Simulator::from_config(definition.machine, tape, &config);

    let accepted = if cli.debug {
        run_debug(&mut simulator, &config)?
    } else {
        simulator
            .run(&config)
            .context("machine stopped with an error")?
    };

    println!("{}", simulator.configuration());
    println!("{}", if accepted { "accepted" } else { "rejected" });
    Ok(accepted)
}

fn load_definition(cli: &Cli) -> Result<Definition> {
    match (&cli.machine, &cli.example) {
        (Some(path), _) => ProgramLoader::load_program(path)
            .with_context(|| format!("failed to load {}", path.display())),
        (None, Some(name)) => ProgramManager::get_program_by_name(name)
            .with_context(|| format!("no sample machine named '{name}', try --list")),
        (None, None) => bail!("either --machine or --example is required"),
    }
}

fn run_config(cli: &Cli) -> Result<RunConfig> {
    let mut config = match &cli.config {
        Some(path) => RunConfig::load(path)
            .with_context(|| format!("failed to load configuration {}", path.display()))?,
        None => RunConfig::default(),
    };

    if let Some(max_steps) = cli.max_steps {
        config.max_steps = max_steps;
    }
    if cli.seed.is_some() {
        config.seed = cli.seed;
    }
    if let Some(speed) = cli.speed {
        config.speed = speed;
    }
    config.verbose |= cli.verbose;

    debug!(?config, "run configuration");
    Ok(config)
}

fn list_examples() -> Result<()> {
    for index in 0..ProgramManager::get_program_count() {
        let info = ProgramManager::get_program_info(index)?;
        println!(
            "{:<24} {:<5} {} states, {} transitions, tape \"{}\"",
            info.name, info.kind, info.state_count, info.transition_count, info.initial_tape
        );
    }
    Ok(())
}

/// Prints every validation finding. Fatal findings fail the check.
fn check(definition: &Definition) -> Result<bool> {
    let warnings = analyze(&definition.machine)
        .with_context(|| format!("'{}' is not runnable", definition.name()))?;

    for warning in &warnings {
        println!("warning: {}", machina::MachineError::from(warning.clone()));
    }
    println!(
        "{}: {} states, {} transitions, {} warning(s)",
        definition.name(),
        definition.machine.state_count(),
        definition.machine.transition_count(),
        warnings.len()
    );
    Ok(true)
}

/// Steps one transition at a time, printing each configuration at the configured speed.
fn run_debug(simulator: &mut Simulator, config: &RunConfig) -> Result<bool> {
    println!("{}", simulator.configuration());

    let accepted = simulator.run_observed(config.max_steps, |simulator| {
        println!("Step {}: {}", simulator.step_count(), simulator.configuration());
        if simulator.halt().is_none() {
            thread::sleep(config.speed.interval());
        }
    })?;

    if let Some(halt) = simulator.halt() {
        println!("\nMachine halted: {halt:?}");
    }
    Ok(accepted)
}
