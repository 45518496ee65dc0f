use crate::utils::Result;
use clap::{ArgAction, ArgGroup, Parser, Subcommand};
use env_logger::fmt::Color;
use log::{Level, LevelFilter};
use once_cell::sync::Lazy;
use std::{
    io::Write,
    path::{Path, PathBuf},
};

pub static FULL_VERSION: Lazy<String> = Lazy::new(|| {
    format!(
        "{}-{}",
        env!("CARGO_PKG_VERSION"),
        env!("VERGEN_GIT_DESCRIBE")
    )
});

#[derive(Parser)]
#[command(name="dhmm",
          author="Emre Celikten",
          version=&**FULL_VERSION,
          about="Forward evaluation and Viterbi decoding for discrete hidden Markov models",
          long_about = None,
          disable_help_subcommand = true,
          help_template = "{name} {version}\n{author}\n{about-section}\n{usage-heading}\n    {usage}\n\n{all-args}{after-help}",
          )]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[clap(short = 'v')]
    #[clap(long = "verbose")]
    #[clap(global = true)]
    #[clap(action = ArgAction::Count, help = "Specify multiple times to increase verbosity level (e.g., -vv for more verbosity)")]
    pub verbosity: u8,
}

#[derive(Subcommand)]
pub enum Command {
    #[clap(about = "Likelihood of each observation sequence (forward algorithm)")]
    Evaluate(InferenceArgs),
    #[clap(about = "Most probable state path of each observation sequence (Viterbi algorithm)")]
    Decode(InferenceArgs),
    #[clap(about = "Write a flat-start or random-start model")]
    Init(InitArgs),
}

#[derive(Parser, Debug, Clone)]
#[command(arg_required_else_help(true))]
pub struct InferenceArgs {
    #[clap(required = true)]
    #[clap(short = 'm')]
    #[clap(long = "model")]
    #[clap(help = "Model file with initial, transition and emission probabilities")]
    #[clap(value_name = "MODEL")]
    #[arg(value_parser = check_file_exists)]
    pub model_path: PathBuf,

    #[clap(required = true)]
    #[clap(short = 'i')]
    #[clap(long = "observations")]
    #[clap(help = "Observation sequences, one 'id symbols' record per line")]
    #[clap(value_name = "OBSERVATIONS")]
    #[arg(value_parser = check_file_exists)]
    pub observations_path: PathBuf,

    #[clap(short = 'o')]
    #[clap(long = "output")]
    #[clap(help = "Output TSV path [default: stdout]")]
    #[clap(value_name = "OUTPUT")]
    #[arg(value_parser = check_prefix_path)]
    pub output_path: Option<PathBuf>,

    #[clap(short = 't')]
    #[clap(long = "threads")]
    #[clap(help = "Number of threads")]
    #[clap(value_name = "THREADS")]
    #[clap(default_value = "1")]
    #[arg(value_parser = threads_in_range)]
    pub num_threads: usize,

    #[clap(help_heading("Advanced"))]
    #[clap(long = "log-space")]
    #[clap(help = "Compute in natural-log space to avoid underflow on long sequences")]
    pub log_space: bool,

    #[clap(help_heading("Advanced"))]
    #[clap(long = "explain")]
    #[clap(conflicts_with = "log_space")]
    #[clap(help = "Write one row per table cell with the predecessor terms it was computed from")]
    pub explain: bool,

    #[clap(help_heading("Advanced"))]
    #[clap(long = "strict")]
    #[clap(help = "Reject models whose distributions do not sum to one")]
    pub strict: bool,

    #[clap(help_heading("Advanced"))]
    #[clap(long = "tolerance")]
    #[clap(value_name = "TOLERANCE")]
    #[clap(help = "Allowed deviation from one in --strict mode")]
    #[clap(default_value = "1e-6")]
    #[arg(value_parser = ensure_unit_float)]
    pub tolerance: f64,
}

#[derive(Parser, Debug)]
#[command(group(ArgGroup::new("alphabet_size").required(true).args(["num_symbols", "alphabet"])))]
#[command(arg_required_else_help(true))]
pub struct InitArgs {
    #[clap(required = true)]
    #[clap(short = 'n')]
    #[clap(long = "states")]
    #[clap(help = "Number of hidden states")]
    #[clap(value_name = "STATES")]
    #[arg(value_parser = positive_count)]
    pub num_states: usize,

    #[clap(short = 'k')]
    #[clap(long = "symbols")]
    #[clap(help = "Number of observation symbols")]
    #[clap(value_name = "SYMBOLS")]
    #[arg(value_parser = positive_count)]
    pub num_symbols: Option<usize>,

    #[clap(short = 'a')]
    #[clap(long = "alphabet")]
    #[clap(help = "Comma-separated observation symbol names")]
    #[clap(value_name = "ALPHABET")]
    #[arg(value_parser = symbol_names_from_string)]
    pub alphabet: Option<SymbolNames>,

    #[clap(long = "random")]
    #[clap(help = "Draw random normalized probabilities instead of a flat start")]
    pub random: bool,

    #[clap(long = "seed")]
    #[clap(value_name = "SEED")]
    #[clap(help = "Seed for --random")]
    #[clap(requires = "random")]
    pub seed: Option<u64>,

    #[clap(required = true)]
    #[clap(short = 'o')]
    #[clap(long = "output")]
    #[clap(help = "Output model path")]
    #[clap(value_name = "MODEL")]
    #[arg(value_parser = check_prefix_path)]
    pub output_path: PathBuf,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SymbolNames(pub Vec<String>);

pub fn init_verbose(args: &Cli) {
    let filter_level: LevelFilter = match args.verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    env_logger::Builder::from_default_env()
        .format(|buf, record| {
            let level = record.level();
            let mut style = buf.style();
            match record.level() {
                Level::Error => style.set_color(Color::Red),
                Level::Warn => style.set_color(Color::Yellow),
                Level::Info => style.set_color(Color::Green),
                Level::Debug => style.set_color(Color::Blue),
                Level::Trace => style.set_color(Color::Cyan),
            };

            writeln!(
                buf,
                "{} [{}] - {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                style.value(level),
                record.args()
            )
        })
        .filter_level(filter_level)
        .init();
}

fn check_prefix_path(s: &str) -> Result<PathBuf> {
    let path = Path::new(s);
    if let Some(parent_dir) = path.parent() {
        if !parent_dir.as_os_str().is_empty() && !parent_dir.exists() {
            return Err(format!("Path does not exist: {}", parent_dir.display()));
        }
    }
    Ok(path.to_path_buf())
}

fn threads_in_range(s: &str) -> Result<usize> {
    let thread: usize = s
        .parse()
        .map_err(|_| format!("`{}` is not a valid thread number", s))?;
    if thread >= 1 {
        Ok(thread)
    } else {
        Err("Number of threads must be at least 1".into())
    }
}

fn positive_count(s: &str) -> Result<usize> {
    let count: usize = s
        .parse()
        .map_err(|_| format!("`{}` is not a valid count", s))?;
    if count >= 1 {
        Ok(count)
    } else {
        Err("Count must be at least 1".into())
    }
}

fn check_file_exists(s: &str) -> Result<PathBuf> {
    let path = Path::new(s);
    if !path.exists() {
        Err(format!("File does not exist: {}", path.display()))
    } else {
        Ok(path.to_path_buf())
    }
}

fn ensure_unit_float(s: &str) -> Result<f64> {
    let value = s
        .parse::<f64>()
        .map_err(|e| format!("Could not parse float: {}", e))?;
    if !(0.0..=1.0).contains(&value) {
        Err(format!(
            "The value must be between 0.0 and 1.0, got: {}",
            value
        ))
    } else {
        Ok(value)
    }
}

fn symbol_names_from_string(s: &str) -> Result<SymbolNames> {
    let names: Vec<String> = s.split(',').map(|x| x.trim().to_string()).collect();
    if names.iter().any(|name| name.is_empty() || name.contains(char::is_whitespace)) {
        return Err(format!(
            "Symbol names must be non-empty and contain no whitespace. Got {}",
            s
        ));
    }
    Ok(SymbolNames(names))
}
