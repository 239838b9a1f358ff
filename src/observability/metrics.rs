//! Router metrics.
//!
//! # Metrics
//! - `router_lookups_total` (counter): lookups by `outcome`
//!   (`found`, `method_not_allowed`, `not_found`)
//! - `router_routes` (gauge): routes currently registered

/// Count a lookup by outcome label.
pub fn record_lookup(outcome: &'static str) {
    ::metrics::counter!("router_lookups_total", "outcome" => outcome).increment(1);
}

/// Publish the number of registered routes.
pub fn record_route_count(count: usize) {
    ::metrics::gauge!("router_routes").set(count as f64);
}
