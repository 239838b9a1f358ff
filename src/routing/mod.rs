//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Registration:
//!     rule string ("POST /items/<id>/ i")
//!     → route.rs (split verbs, resolve allow list)
//!     → pattern.rs (split flags, fold options)
//!     → tokenizer.rs (flat parts)
//!     → pattern.rs (compile matcher + capture names)
//!     → router.rs (append, index by name, count verbs)
//!
//! Lookup (verb, path):
//!     → router.rs (reject unknown verb, scan in order)
//!     → route.rs (path match + verb check)
//!     → Found | MethodNotAllowed(allow list) | NotFound
//! ```
//!
//! # Design Decisions
//! - Ordered scan, first eligible route wins
//! - Regex automaton per pattern; no backtracking blowup
//! - Lookups never fail; only compilation returns errors
//! - `SharedRouter` swaps whole tables for concurrent readers

pub mod encoding;
pub mod error;
pub mod names;
pub mod pattern;
pub mod route;
pub mod router;
pub mod shared;
pub mod tokenizer;

pub use error::PatternError;
pub use names::{NameGenerator, SequentialNames, UuidNames};
pub use pattern::{ParamValue, Params, Pattern, PatternOptions};
pub use route::{Route, RouteMatch};
pub use router::{Lookup, Router};
pub use shared::SharedRouter;
