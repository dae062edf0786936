//! # wforge_core
//!
//! Self-healing build loop for pluggable widgets.
//!
//! # Architecture
//!
//! - **Executor**: generates the widget package and compiles it
//! - **Fix chain**: repairs a failed attempt in place (see `wforge_fixes`)
//! - **Build loop**: retries attempts, records fixes and feeds successful
//!   repairs back into the nucleus
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use wforge_core::{BuildLoop, BuildOptions, CancellationFlag, WidgetExecutor};
//! use wforge_fixes::FixChain;
//! use wforge_nucleus::SharedNucleus;
//! use wforge_runner::CliRunner;
//!
//! let nucleus = SharedNucleus::in_memory();
//! let runner = CliRunner::new(Default::default()).await?;
//! let executor = Arc::new(WidgetExecutor::new(Arc::new(runner)));
//! let build = BuildLoop::new(executor, chain, nucleus);
//!
//! let report = build
//!     .execute(config, &BuildOptions::new("widgets"), &CancellationFlag::new())
//!     .await?;
//! println!("{}", report.summary());
//! ```

pub mod attempt;
pub mod build_loop;
pub mod context;
pub mod error;
pub mod executor;

pub use attempt::{AppliedFix, AttemptOutcome, BuildAttempt, BuildEvent, ProgressHandler};
pub use build_loop::{BuildLoop, BuildOutcome, BuildReport};
pub use context::{BuildOptions, CancellationFlag, DEFAULT_MAX_ATTEMPTS};
pub use error::{CoreError, CoreResult};
pub use executor::{find_artifact, AttemptExecutor, ExecutionOutput, WidgetExecutor};
