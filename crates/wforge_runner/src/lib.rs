//! # wforge_runner
//!
//! Package-manager execution wrapper for wForge.
//!
//! Widgets are installed and built by shelling out to npm, pnpm or yarn. The
//! [`PackageRunner`] trait is the seam the build loop depends on; the
//! [`MockRunner`] stands in for it in tests.
//!
//! # Features
//!
//! - **Manager detection**: lockfile first, then preference, then whatever is installed
//! - **Timeouts**: every command is bounded by [`RunConfig::timeout_seconds`]
//! - **Dry-run mode**: log commands without executing them
//! - **Mock runner**: scripted responses and recorded calls
//!
//! # Example
//!
//! ```rust,no_run
//! use std::path::Path;
//! use wforge_runner::{CliRunner, CliRunnerOptions, PackageRunner, RunConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let runner = CliRunner::new(CliRunnerOptions::default()).await?;
//!     let result = runner.build(Path::new("widgets/badge"), &RunConfig::default()).await?;
//!     println!("Exit code: {}", result.exit_code);
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod mock;
pub mod runner;

pub use cli::{CliRunner, CliRunnerOptions, LogHandler, LogLine, LogStream, PackageManager};
pub use config::{RunConfig, DEFAULT_TIMEOUT_SECONDS};
pub use error::{RunnerError, RunnerResult};
pub use mock::{MockResponse, MockRunner, RunnerCall};
pub use runner::{ExecutionResult, PackageRunner};
