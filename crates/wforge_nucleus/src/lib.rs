//! # wforge_nucleus
//!
//! The adaptive fix-pattern store ("nucleus") and the knowledge cache.
//!
//! Patterns are ranked against diagnostic text by signature and keyword
//! overlap weighted by confidence. Confidence moves with every observed
//! outcome, and successful ad-hoc fixes are promoted into learned patterns.
//!
//! ## Example
//!
//! ```rust
//! use wforge_nucleus::{FixAction, LearnOutcome, PatternStore};
//!
//! let mut store = PatternStore::in_memory();
//! let diagnostic = "src/Badge.tsx(1,1): error TS2304: Cannot find name 'React'.";
//! let best = &store.match_fixes(diagnostic)[0];
//! assert_eq!(best.id, "builtin-react-import");
//!
//! let outcome = store
//!     .learn("Unexpected token '<' in Badge.editorPreview.tsx", "rename", FixAction::Manual {
//!         instructions: "rename to .tsx".into(),
//!     }, true)
//!     .unwrap();
//! assert!(matches!(outcome, LearnOutcome::Created(_)));
//! ```

pub mod builtin;
pub mod error;
pub mod knowledge;
pub mod location;
pub mod pattern;
pub mod records;
pub mod shared;
pub mod signature;
pub mod store;

pub use error::{NucleusError, NucleusResult};
pub use knowledge::{ConfidenceTier, KnowledgeCache, KnowledgeEntry, KnowledgeMatch};
pub use location::{knowledge_path_for, locate_store};
pub use pattern::{FixAction, FixPattern, Provenance, AUTO_APPLY_THRESHOLD};
pub use records::{BestPractice, SdkApiNote, WidgetTemplate};
pub use shared::SharedNucleus;
pub use store::{LearnOutcome, NucleusDocument, PatternMatch, PatternStore, StoreStats};
