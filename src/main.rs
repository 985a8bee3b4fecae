use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use semgus::{
    Config, InputMode, LogLevel, OutputFormat, SemgusError, SemgusProblem, dump_problem,
    parse_problem_with_mode,
};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::FmtSubscriber;

#[derive(Debug, Parser)]
#[command(name = "semgus")]
#[command(about = "SemGuS problem decoder and assembler")]
struct Cli {
    /// TOML settings file; flags given on the command line take precedence.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Raise log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Args)]
struct InputArgs {
    file: PathBuf,
    #[arg(long, value_enum)]
    mode: Option<InputMode>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the assembled problem.
    Dump {
        #[command(flatten)]
        input: InputArgs,
        #[arg(long, value_enum)]
        format: Option<OutputFormat>,
    },
    /// Assemble the problem and print a one-line summary.
    Check {
        #[command(flatten)]
        input: InputArgs,
    },
}

fn init_logging(level: LevelFilter) {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(false)
        .without_time()
        .finish();
    if let Err(err) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("failed to install log subscriber: {err}");
    }
}

fn main() {
    let cli = Cli::parse();
    let exit_code = match run(cli) {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("{}", err.report());
            1
        }
    };
    std::process::exit(exit_code);
}

fn run(cli: Cli) -> Result<(), SemgusError> {
    let config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    let level = if cli.verbose > 0 {
        LogLevel::from_verbosity(cli.verbose)
    } else {
        config.output.log_level.unwrap_or_default()
    };
    init_logging(level.filter());

    match cli.command {
        Command::Dump { input, format } => {
            let problem = load_problem(&input, &config)?;
            match format.unwrap_or(config.output.format) {
                OutputFormat::Text => print!("{}", dump_problem(&problem)),
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&problem)?),
            }
            Ok(())
        }
        Command::Check { input } => {
            let problem = load_problem(&input, &config)?;
            println!("{}", summary(&problem));
            Ok(())
        }
    }
}

fn load_problem(input: &InputArgs, config: &Config) -> Result<SemgusProblem, SemgusError> {
    let src = read_source(&input.file)?;
    parse_problem_with_mode(&src, input.mode.unwrap_or(config.input.mode))
}

fn read_source(path: &Path) -> Result<String, SemgusError> {
    fs::read_to_string(path).map_err(|source| SemgusError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn summary(problem: &SemgusProblem) -> String {
    format!(
        "ok: target {}, {} non-terminals, {} productions, {} constraints",
        problem.target_name(),
        problem.non_terminals().len(),
        problem.production_count(),
        problem.constraints().len()
    )
}
