use std::{io::Write, path::PathBuf, process::ExitCode};

use clap::Parser;
use log::LevelFilter;
use scripts::sod_final;
use submodules::{errors::ComparatorResult, plot_config::{ComparisonConfig, MissingRunPolicy}};

mod scripts;
mod submodules;

/// Overlay final-time shock-tube profiles from several runs on the exact solution
#[derive(Parser, Debug)]
#[command(name = "sod-compare")]
#[command(version, long_about = None)]
struct Args {
    /// JSON comparison config; defaults to the built-in test1 comparison
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    /// Directory holding `exact/` and the run directories
    #[arg(long = "data-dir", default_value = ".")]
    data_dir: PathBuf,

    /// Where `<problem>-final.png` and `<problem>-final.eps` are written
    #[arg(long = "out-dir", default_value = ".")]
    out_dir: PathBuf,

    /// Leave out solver runs that cannot be loaded instead of aborting
    #[arg(long = "skip-missing")]
    skip_missing: bool,

    /// Also write every loaded dataset as JSON into this directory
    #[arg(long = "dump-data")]
    dump_data: Option<PathBuf>,

    /// Print the effective config as JSON and exit
    #[arg(long = "print-config")]
    print_config: bool,

    /// Debug logging
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,
}

fn init_logging(verbose: bool) {
    let level = if verbose { LevelFilter::Debug } else { LevelFilter::Info };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format(|buf, record| writeln!(buf, "[{:5}] {}", record.level(), record.args()))
        .init();
}

fn load_config(args: &Args) -> ComparatorResult<ComparisonConfig> {
    let mut config = match &args.config {
        Some(path) => ComparisonConfig::from_json_file(path)?,
        None => ComparisonConfig::default(),
    };
    if args.skip_missing {
        config.missing_runs = MissingRunPolicy::Skip;
    }
    Ok(config)
}

fn run(args: &Args) -> ComparatorResult<()> {
    let config = load_config(args)?;
    if args.print_config {
        println!("{}", config.to_json_string()?);
        return Ok(());
    }
    sod_final::run(config, &args.data_dir, &args.out_dir, args.dump_data.as_deref())?;
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
