//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! routing + config produce:
//!     → tracing events (registration, lookups, reloads)
//!     → metrics.rs (lookup outcomes, route count)
//!
//! Consumers:
//!     → logging.rs subscriber (routectl, embedding services)
//!     → any `metrics` recorder the embedder installs
//! ```
//!
//! # Design Decisions
//! - The library only emits; installing subscribers/recorders is the
//!   binary's job
//! - Metrics go through the `metrics` facade and are no-ops without a
//!   recorder

pub mod logging;
pub mod metrics;
