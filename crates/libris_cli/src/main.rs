//! Console entry point for the Libris book catalog.
//!
//! # Responsibility
//! - Parse configuration, start logging, wire the service graph.
//! - Hand stdin/stdout to the menu loop.

mod args;
mod console;
mod seed;

use anyhow::Context;
use args::Args;
use clap::Parser;
use console::Console;
use libris_core::{BookService, InMemoryBookRepository, InMemoryUnitOfWork};
use log::info;
use std::io;

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_dir = args.effective_log_dir();
    let log_dir = log_dir.to_string_lossy();
    if let Err(err) = libris_core::init_logging(args.effective_log_level(), &log_dir) {
        eprintln!("libris: continuing without file logs: {err}");
    }

    let repository = InMemoryBookRepository::new();
    let unit_of_work = InMemoryUnitOfWork::new(repository);
    let service = BookService::new(unit_of_work);

    if !args.no_seed {
        seed::seed_sample_data(&service);
    }

    info!(
        "event=console_start module=cli status=ok version={}",
        libris_core::core_version()
    );

    let stdin = io::stdin();
    let stdout = io::stdout();
    Console::new(&service, stdin.lock(), stdout.lock())
        .run()
        .context("console i/o failed")?;

    info!("event=console_exit module=cli status=ok");
    Ok(())
}
