//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::CONFIG_FILE;

/// Oven static site generator CLI
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Project root (default: search upward from the current directory)
    #[arg(short, long, global = true, value_hint = clap::ValueHint::DirPath)]
    pub root: Option<PathBuf>,

    /// Config file name
    #[arg(short = 'C', long, global = true, default_value = CONFIG_FILE, value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Create a new site with a starter layout and page
    #[command(visible_alias = "i")]
    Init {
        /// Site directory name/path (relative to current directory)
        #[arg(value_hint = clap::ValueHint::DirPath)]
        name: Option<PathBuf>,
    },

    /// Bake the site into the destination directory
    #[command(visible_alias = "b")]
    Build {
        #[command(flatten)]
        build_args: BuildArgs,
    },

    /// Bake, then serve the destination directory and rebuild on changes
    #[command(visible_alias = "s")]
    Serve {
        /// Network interface to bind (e.g., 127.0.0.1, 0.0.0.0)
        #[arg(short, long)]
        interface: Option<std::net::IpAddr>,

        /// Port number to listen on
        #[arg(short, long)]
        port: Option<u16>,

        /// Enable file watching for auto-rebuild
        #[arg(short, long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
        watch: Option<bool>,
    },
}

/// Build command arguments
#[derive(clap::Args, Debug, Clone, Default)]
pub struct BuildArgs {
    /// Skip cleaning and minification
    #[arg(short, long)]
    pub fast: bool,

    /// Workers per chain (overrides build.workers)
    #[arg(short, long)]
    pub workers: Option<usize>,
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
    fn test_parse_build() {
        let cli = Cli::parse_from(["oven", "-v", "build", "--fast", "-w", "4"]);
        assert!(cli.verbose);
        assert_eq!(cli.config, PathBuf::from(CONFIG_FILE));
        match cli.command {
            Commands::Build { build_args } => {
                assert!(build_args.fast);
                assert_eq!(build_args.workers, Some(4));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_parse_serve() {
        let cli = Cli::parse_from(["oven", "--root", "site", "serve", "-p", "8080", "--watch", "false"]);
        assert_eq!(cli.root, Some(PathBuf::from("site")));
        match cli.command {
            Commands::Serve { port, watch, interface } => {
                assert_eq!(port, Some(8080));
                assert_eq!(watch, Some(false));
                assert!(interface.is_none());
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
