mod cli;
mod config;
mod run;
mod tasks;

use std::process::ExitCode;

use clap::Parser;

use mctl_core::prelude::EXIT_FAILURE;
use mctl_observe::{LoggerConfig, init_local_offset, init_logger};

use crate::{
    cli::{Cli, Commands, run_help, usage_exit_code},
    config::Config,
};

fn main() -> ExitCode {
    // Offset detection only works while the process is single-threaded.
    init_local_offset();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let code = usage_exit_code(&e);
            let _ = e.print();
            return exit_code(code);
        }
    };
    match dispatch(cli) {
        Ok(code) => exit_code(code),
        Err(e) => {
            eprintln!("mctl: {e:#}");
            exit_code(EXIT_FAILURE)
        }
    }
}

fn exit_code(code: i32) -> ExitCode {
    ExitCode::from(u8::try_from(code).unwrap_or(1))
}

fn logger_config(cli: &Cli, config: &Config) -> LoggerConfig {
    let mut cfg = config.logger.clone();
    if let Some(level) = &cli.log_level {
        cfg.level = level.clone();
    }
    if let Some(format) = cli.log_format {
        cfg.format = format;
    }
    cfg
}

fn dispatch(cli: Cli) -> anyhow::Result<i32> {
    let config = Config::load(cli.config.as_deref())?;
    init_logger(&logger_config(&cli, &config))?;

    match cli.command {
        Commands::Run(args) => {
            if args.is_missing_input() {
                print!("{}", run_help());
                return Ok(EXIT_FAILURE);
            }
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()?;
            runtime.block_on(run::execute(args, config))
        }
    }
}
