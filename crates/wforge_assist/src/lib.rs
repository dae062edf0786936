//! wForge Assist
//!
//! Turns build diagnostics into explanations and structured edit plans. A
//! hosted language model is used when configured; otherwise explanations come
//! from a canned offline table and no edit plans are produced.
//!
//! # Example
//!
//! ```rust,no_run
//! use wforge_assist::DiagnosisHelper;
//!
//! # async fn example() {
//! let helper = DiagnosisHelper::from_env();
//! let explanation = helper.explain("error TS2304: Cannot find name 'React'.").await;
//! println!("{}", explanation.summary);
//! # }
//! ```

pub mod canned;
pub mod completion;
pub mod error;
pub mod helper;
pub mod llm;
pub mod plan;

pub use canned::canned_explanation;
pub use completion::TextCompletion;
pub use error::{AssistError, AssistResult};
pub use helper::{DiagnosisHelper, Explanation, ExplanationSource, PlanRequest};
pub use llm::{LlmAdapter, LlmProvider};
pub use plan::{extract_json_object, EditAction, EditPlan, PlannedEdit};
