use clap::Parser;
use clap_verbosity_flag::{Verbosity, WarnLevel};
use lazyjit_rt::DispatcherConfig;
use std::path::PathBuf;

mod commands;
mod error;
mod io;

#[derive(Parser, Debug)]
#[command(name = "dispatcher")]
#[command(about = "Runs a program, compiling each function on its first call", long_about = None)]
struct Args {
    /// Source file to run
    #[arg(value_name = "FILE")]
    source: PathBuf,

    /// Write the skeleton and every compiled function to dump_wasm/
    #[arg(long)]
    dump_wasm: bool,

    /// Compiler service artifact
    #[arg(long, value_name = "PATH", default_value = lazyjit_service::DEFAULT_SERVICE_PATH)]
    service: PathBuf,

    /// Export called once the skeleton is loaded
    #[arg(long, value_name = "NAME", default_value = lazyjit_rt::config::DEFAULT_ENTRY_POINT)]
    entry: String,

    #[command(flatten)]
    verbose: Verbosity<WarnLevel>,
}

fn main() -> miette::Result<()> {
    let args = Args::parse();
    env_logger::Builder::new()
        .filter_level(args.verbose.log_level_filter())
        .init();

    let config = DispatcherConfig::default()
        .with_service_path(args.service)
        .with_entry_point(args.entry)
        .with_dump_wasm(args.dump_wasm);

    let result = commands::run::handle_run(&args.source, &config)?;
    log::info!("`{}` returned {}", config.entry_point, result);
    Ok(())
}
