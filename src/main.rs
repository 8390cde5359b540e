//! Oven - a static site generator built on concurrent processing chains.

#![allow(dead_code)]

mod asset;
mod bake;
mod cli;
mod config;
mod core;
mod i18n;
mod logger;
mod pipeline;
mod stage;
mod utils;
mod view;
mod watch;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use cli::{Cli, Commands};
use config::SiteConfig;

fn main() -> Result<()> {
    // Setup global Ctrl+C handler (before any blocking operations)
    core::setup_shutdown_handler()?;

    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }
    logger::set_verbose(cli.verbose);

    let config = SiteConfig::load(&cli)?;
    debug!("config"; "root {}", config.get_root().display());

    match &cli.command {
        Commands::Init { .. } => cli::init::new_site(&config),
        Commands::Build { build_args } => cli::build::build_site(config, build_args),
        Commands::Serve { .. } => cli::serve::serve_site(config),
    }
}
