//! Liftbook CLI - workout templates, sessions and set logging
//!
//! This is the command-line interface for Liftbook. It resolves the acting
//! user and database from flags and config, then drives the core store.

mod app;
mod cli;
mod commands;
mod config;
mod constants;
mod errors;
mod helpers;
mod logging;
mod output;

use clap::Parser;
use liftbook_core::VERSION;

use crate::app::AppContext;
use crate::cli::{Cli, Commands};
use crate::commands::{exercises, init, maintenance, misc, sessions, sets, workouts};
use crate::errors::CliError;

fn main() {
    let cli = Cli::parse();
    let ctx = AppContext::new(&cli);
    logging::init(&ctx);

    if let Err(e) = run(&ctx, &cli) {
        CliError::from(e).exit();
    }
}

fn run(ctx: &AppContext, cli: &Cli) -> anyhow::Result<()> {
    match &cli.command {
        Some(Commands::Init(args)) => init::handle_init(ctx, args),
        Some(Commands::Exercise(command)) => exercises::handle(ctx, command),
        Some(Commands::Workout(command)) => workouts::handle(ctx, command),
        Some(Commands::Session(command)) => sessions::handle(ctx, command),
        Some(Commands::Set(command)) => sets::handle(ctx, command),
        Some(Commands::Check) => maintenance::handle_check(ctx),
        Some(Commands::Completions(args)) => misc::handle_completions(args.shell),
        None => {
            println!("Liftbook v{}", VERSION);
            println!("\nRun `liftbook --help` for usage information.");
            Ok(())
        }
    }
}
