//! wForge Fixes
//!
//! Strategies that repair a failed widget build in place, consulted in
//! priority order by the build loop:
//!
//! 1. **nucleus**: confident patterns from the pattern store
//! 2. **knowledge**: file edits recorded in the knowledge cache
//! 3. **heuristic**: a fixed rule table for common failures
//! 4. **generative**: an edit plan from the language model
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use wforge_assist::DiagnosisHelper;
//! use wforge_fixes::{FixChain, FixContext};
//! use wforge_nucleus::{KnowledgeCache, SharedNucleus};
//! use wforge_runner::RunConfig;
//! use wforge_spec::WidgetConfig;
//!
//! # async fn example() {
//! let chain = FixChain::standard(
//!     SharedNucleus::in_memory(),
//!     Arc::new(KnowledgeCache::in_memory()),
//!     None,
//!     RunConfig::default(),
//!     DiagnosisHelper::offline(),
//! );
//! let context = FixContext::new(
//!     "error TS2304: Cannot find name 'React'.",
//!     "widgets/badge",
//!     WidgetConfig::new("Badge"),
//! );
//! let outcome = chain.try_fix(&context).await;
//! println!("{}: {}", outcome.strategy, outcome.description);
//! # }
//! ```

pub mod apply;
pub mod chain;
pub mod error;
pub mod generative;
pub mod heuristic;
pub mod knowledge;
pub mod nucleus;
pub mod strategy;

pub use apply::{apply_file_edit, apply_fix_action, apply_planned_edit, ensure_scripts, ActionReport};
pub use chain::FixChain;
pub use error::{FixError, FixResult};
pub use generative::GenerativeStrategy;
pub use heuristic::HeuristicStrategy;
pub use knowledge::KnowledgeStrategy;
pub use nucleus::NucleusStrategy;
pub use strategy::{FixContext, FixOutcome, FixStrategy, LearnCandidate};
