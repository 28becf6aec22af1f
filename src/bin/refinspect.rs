//! refinspect CLI
//!
//! Prints the records stored in a joined sequence index, either as FASTA or
//! as a list of record names.
//!
//! ```text
//! refinspect indexes/lambda_virus            # FASTA, 60 symbols per line
//! refinspect -a 80 indexes/lambda_virus      # FASTA, 80 symbols per line
//! refinspect -n indexes/lambda_virus         # record names only
//! ```

use clap::{ArgAction, Parser};
use refinspect::index::Endianness;
use refinspect::{inspect, InspectMode, JoinedIndex, LineWidth, DEFAULT_LINE_WIDTH};
use std::io::{self, BufWriter, IsTerminal, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "refinspect")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Print the records stored in a joined sequence index")]
#[command(long_about = "refinspect - print the records stored in a joined sequence index\n\n\
    Reconstructs every record from the index's joined, 2-bit packed sequence\n\
    and writes it as FASTA. Stretches that were masked out of the joined\n\
    sequence are restored as N.\n\n\
    The index is named by its base path: refinspect reads <base>.1.jdx and\n\
    <base>.2.jdx. Either file may be gzip-compressed.")]
#[command(disable_help_flag = true)]
struct Cli {
    /// Index base path (without the trailing .1.jdx / .2.jdx)
    #[arg(value_name = "INDEX_BASE")]
    index: PathBuf,

    /// Number of sequence symbols per FASTA line
    #[arg(
        short = 'a',
        long = "across",
        value_name = "N",
        default_value_t = LineWidth::default(),
        value_parser = parse_across,
        allow_negative_numbers = true
    )]
    across: LineWidth,

    /// Print record names only, one per line
    #[arg(short = 'n', long = "names")]
    names: bool,

    /// Echo parameters and index details on stderr
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,

    /// Print help
    #[arg(short = 'h', long = "help", action = ArgAction::HelpLong)]
    help: Option<bool>,
}

fn parse_across(s: &str) -> Result<LineWidth, String> {
    s.parse::<LineWidth>()
        .map_err(|_| "-a/--across arg must be at least 1".to_string())
}

/// Settings resolved from the command line
#[derive(Debug)]
struct InspectOptions {
    index: PathBuf,
    mode: InspectMode,
    verbose: bool,
}

impl From<Cli> for InspectOptions {
    fn from(cli: Cli) -> Self {
        let mode = if cli.names {
            InspectMode::Names
        } else {
            InspectMode::Sequences(cli.across)
        };
        Self {
            index: cli.index,
            mode,
            verbose: cli.verbose,
        }
    }
}

/// Log filter from `RUST_LOG`, falling back to `debug` with `-v` and `warn`
/// without
///
/// `-v` always lets this crate's events through at `debug`, even when
/// `RUST_LOG` asks for less.
fn log_filter(verbose: bool, rust_log: Option<&str>) -> EnvFilter {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = rust_log
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(default_level));

    let quieter_than_debug = filter
        .max_level_hint()
        .map_or(true, |hint| hint < LevelFilter::DEBUG);
    if verbose && quieter_than_debug {
        if let Ok(directive) = "refinspect=debug".parse() {
            return filter.add_directive(directive);
        }
    }
    filter
}

fn init_logging(verbose: bool) {
    let rust_log = std::env::var("RUST_LOG").ok();
    let filter = log_filter(verbose, rust_log.as_deref());

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .with_target(false)
        .init();
}

fn echo_options(opts: &InspectOptions) {
    info!(index = %opts.index.display(), "input index");
    match opts.mode {
        InspectMode::Sequences(width) => info!(across = %width, "output: FASTA"),
        InspectMode::Names => info!("output: names only"),
    }
    info!(
        local_endianness = %Endianness::native(),
        debug_assertions = cfg!(debug_assertions),
        default_across = DEFAULT_LINE_WIDTH,
        "environment"
    );
}

fn echo_index(index: &JoinedIndex) {
    let byte_order = index
        .endianness()
        .map_or_else(|| "native".to_string(), |order| order.to_string());
    info!(
        byte_order = %byte_order,
        records = index.records().len(),
        joined_len = index.joined_len(),
        mapped = index.joined().is_mapped(),
        "index loaded"
    );
}

fn run(opts: &InspectOptions) -> refinspect::Result<()> {
    let index = JoinedIndex::load(&opts.index)?;
    if opts.verbose {
        echo_index(&index);
    }

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    let written = inspect(&index, opts.mode, &mut out)?;
    out.flush()?;

    if opts.verbose {
        info!(written, "done");
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            // Help and version go to stdout and are not failures
            let code = if err.use_stderr() { 1 } else { 0 };
            let _ = err.print();
            return ExitCode::from(code);
        }
    };

    let opts = InspectOptions::from(cli);
    init_logging(opts.verbose);
    if opts.verbose {
        echo_options(&opts);
    }

    match run(&opts) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) if err.is_broken_pipe() => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {}", err);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["refinspect", "idx"]).unwrap();
        let opts = InspectOptions::from(cli);
        assert_eq!(opts.index, PathBuf::from("idx"));
        assert_eq!(opts.mode, InspectMode::Sequences(LineWidth::default()));
        assert!(!opts.verbose);
    }

    #[test]
    fn test_across_and_names() {
        let cli = Cli::try_parse_from(["refinspect", "-a", "7", "idx"]).unwrap();
        assert_eq!(cli.across.get(), 7);

        let cli = Cli::try_parse_from(["refinspect", "-n", "-a", "7", "idx"]).unwrap();
        let opts = InspectOptions::from(cli);
        assert_eq!(opts.mode, InspectMode::Names);
    }

    #[test]
    fn test_across_rejects_zero_and_negative() {
        for bad in ["0", "-3", "x"] {
            let err = Cli::try_parse_from(["refinspect", "-a", bad, "idx"]).unwrap_err();
            assert!(err.use_stderr());
            assert!(err.to_string().contains("-a/--across arg must be at least 1"));
        }
    }

    #[test]
    fn test_index_is_required() {
        let err = Cli::try_parse_from(["refinspect"]).unwrap_err();
        assert!(err.use_stderr());
    }

    #[test]
    fn test_log_filter_levels() {
        let hint = |verbose: bool, rust_log: Option<&str>| {
            log_filter(verbose, rust_log).max_level_hint()
        };

        assert_eq!(hint(false, None), Some(LevelFilter::WARN));
        assert_eq!(hint(true, None), Some(LevelFilter::DEBUG));
        assert_eq!(hint(false, Some("info")), Some(LevelFilter::INFO));
    }

    #[test]
    fn test_verbose_raises_quiet_rust_log() {
        let filter = log_filter(true, Some("warn"));
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::DEBUG));
        assert!(filter.to_string().contains("refinspect=debug"));

        // Already at least as verbose: left alone
        let filter = log_filter(true, Some("trace"));
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::TRACE));
        assert!(!filter.to_string().contains("refinspect"));
    }

    #[test]
    fn test_help_is_not_an_error() {
        let err = Cli::try_parse_from(["refinspect", "-h"]).unwrap_err();
        assert!(!err.use_stderr());
    }
}
