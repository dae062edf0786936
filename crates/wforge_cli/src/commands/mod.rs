//! CLI command definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub mod build;
pub mod explain;
pub mod knowledge;
pub mod patterns;

/// wForge - self-healing widget build assistant
#[derive(Parser)]
#[command(name = "wforge")]
#[command(version, about = "wForge - self-healing widget build assistant")]
#[command(long_about = r#"
wForge generates a pluggable widget from a declarative config, builds it, and
repairs common build failures automatically using a learned pattern store.

COMMANDS:
  build      → Generate, build and repair a widget
  patterns   → Inspect the fix-pattern store
  knowledge  → Add to or search the knowledge cache
  explain    → Explain a saved build failure

EXIT CODES:
  0 - Success
  1 - General error
  2 - Invalid arguments or configuration
  3 - Build failed
  4 - Cancelled
"#)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Settings file (defaults to ./wforge.toml)
    #[arg(long, global = true, env = "WFORGE_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate and build a widget, repairing failures
    Build(build::BuildArgs),

    /// Inspect the fix-pattern store
    Patterns(patterns::PatternsArgs),

    /// Manage the knowledge cache
    Knowledge(knowledge::KnowledgeArgs),

    /// Explain a build failure saved to a file
    Explain(explain::ExplainArgs),
}
