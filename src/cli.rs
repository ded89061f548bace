//! Command line interface definition using clap.
//!
//! This module defines the [`Cli`] structure and its subcommands. It only
//! depends on `clap` and `std` so `build.rs` can include it to render the
//! manual page.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Largest resolution depth accepted on the command line.
const MAX_DEPTH_LIMIT: usize = 65_536;

fn parse_depth(s: &str) -> Result<usize, String> {
    let value: usize = s
        .parse()
        .map_err(|_| format!("{s} is not a valid number"))?;
    if (1..=MAX_DEPTH_LIMIT).contains(&value) {
        Ok(value)
    } else {
        Err(format!("max depth must be between 1 and {MAX_DEPTH_LIMIT}"))
    }
}

/// Resolve a declarative wiring manifest into an application graph.
#[derive(Debug, Parser)]
#[command(name = "wirespec", author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the wiring manifest to use.
    #[arg(short, long, value_name = "FILE", default_value = "Wiringfile")]
    pub file: PathBuf,

    /// Resolve the manifest and outputs relative to this directory.
    #[arg(short = 'C', long, value_name = "DIR")]
    pub directory: Option<PathBuf>,

    /// Enable verbose logging output.
    #[arg(short, long)]
    pub verbose: bool,

    /// Maximum number of nested builds in progress at once.
    #[arg(long, value_name = "N", value_parser = parse_depth, global = true)]
    pub max_depth: Option<usize>,

    /// Optional subcommand to execute; defaults to `build` when omitted.
    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// Apply the default command if none was specified.
    #[must_use]
    pub fn with_default_command(mut self) -> Self {
        if self.command.is_none() {
            self.command = Some(Commands::Build(BuildArgs::default()));
        }
        self
    }
}

/// Arguments accepted by the `build` command.
#[derive(Debug, Args, PartialEq, Eq, Clone, Default)]
pub struct BuildArgs {
    /// Write the rendered graph to this path instead of standard output.
    #[arg(long, value_name = "FILE")]
    pub emit: Option<PathBuf>,

    /// Render the graph as JSON.
    #[arg(long)]
    pub json: bool,

    /// Wrap floating components and processes into default namespaces.
    #[arg(long)]
    pub wrap_defaults: bool,

    /// Accept build functions that return a node of another kind than
    /// declared.
    #[arg(long)]
    pub allow_kind_mismatch: bool,

    /// Names to instantiate; the manifest's `instantiate` list when empty.
    pub roots: Vec<String>,
}

/// Arguments accepted by the `graph` command.
#[derive(Debug, Args, PartialEq, Eq, Clone, Default)]
pub struct GraphArgs {
    /// Names to instantiate; the manifest's `instantiate` list when empty.
    pub roots: Vec<String>,
}

/// Available top-level commands.
#[derive(Debug, Subcommand, PartialEq, Eq, Clone)]
pub enum Commands {
    /// Build the IR and print it (default).
    Build(BuildArgs),

    /// List the definitions and aliases declared by the manifest.
    Defs,

    /// Print the dependency graph in DOT format for visualisation.
    Graph(GraphArgs),

    /// Validate the manifest and build every root without printing the graph.
    Check,
}
