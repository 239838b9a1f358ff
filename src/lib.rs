//! Verb-aware request router.
//!
//! # Architecture Overview
//!
//! ```text
//!     rule string ──▶ routing::route ──▶ routing::pattern ──▶ routing::tokenizer
//!     "POST /a/<id>/ i"  verbs + body     flags + matcher       parts
//!                             │
//!                             ▼
//!     (verb, path) ─────▶ routing::router ──▶ Lookup::{Found, MethodNotAllowed, NotFound}
//!                             ▲
//!                             │
//!     routes.toml ──▶ config ─┘  (load, validate, watch)
//!
//!     Cross-cutting: observability (tracing + metrics facade)
//! ```

// Core subsystems
pub mod config;
pub mod routing;

// Cross-cutting concerns
pub mod observability;

pub use config::schema::RouterConfig;
pub use routing::{
    Lookup, ParamValue, Params, Pattern, PatternError, PatternOptions, Route, Router,
    SharedRouter,
};
