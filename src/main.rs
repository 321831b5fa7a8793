use anyhow::Result;
use clap::Parser;
use pl0::config::Config;

mod args;
mod commands;

use args::{Cli, Commands};
use commands::{compile, disassemble, run, tokens};

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    match &cli.command {
        Commands::Tokens { path, no_color } => tokens::dump_tokens(path, *no_color),
        Commands::Compile {
            path,
            output,
            binary,
            listing,
            symbols,
        } => compile::compile_file(
            path,
            output.as_deref(),
            *binary,
            *listing,
            *symbols,
            &config,
        ),
        Commands::Run { path, input, trace } => {
            run::run_file(path, input.as_deref(), trace.as_deref(), &config)
        }
        Commands::Disassemble { path } => disassemble::disassemble_file(path, &config),
    }
}

fn init_logging(verbose: bool) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.init();
}
