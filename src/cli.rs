// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, Subcommand, ValueEnum};

use crate::engine::TaskKind;

/// Command-line arguments for `assetpipe`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "assetpipe",
    version,
    about = "Compile styles, bundle scripts and optimize images, once or on change.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// If omitted, `Assetpipe.toml` in the current directory is used when it
    /// exists; otherwise built-in defaults apply.
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<String>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `ASSETPIPE_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL", global = true)]
    pub log_level: Option<LogLevel>,

    /// Validate config, print task definitions and watch bindings, run nothing.
    #[arg(long, global = true)]
    pub dry_run: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Named tasks exposed on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Compile styles to CSS with vendor prefixes and source maps.
    Css,
    /// Bundle and minify the script entry.
    Js,
    /// Optimize all images (cached by content).
    Images,
    /// Write WebP copies of PNG/JPEG images.
    Webp,
    /// Write AVIF copies of PNG/JPEG images.
    Avif,
    /// Run every task once, concurrently.
    Build,
    /// Run every task once, then watch sources and re-run on change.
    Dev,
}

impl Command {
    /// Tasks this command runs before (optionally) watching.
    pub fn tasks(self) -> Vec<TaskKind> {
        match self {
            Command::Css => vec![TaskKind::Css],
            Command::Js => vec![TaskKind::Js],
            Command::Images => vec![TaskKind::Images],
            Command::Webp => vec![TaskKind::Webp],
            Command::Avif => vec![TaskKind::Avif],
            Command::Build | Command::Dev => TaskKind::ALL.to_vec(),
        }
    }

    pub fn watches(self) -> bool {
        matches!(self, Command::Dev)
    }
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
