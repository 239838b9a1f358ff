//! Name generation for routes registered without an explicit name.

use uuid::Uuid;

/// Supplies unique names for anonymous routes.
pub trait NameGenerator: Send + Sync {
    fn next_name(&mut self) -> String;
}

/// Random v4 UUIDs.
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidNames;

impl NameGenerator for UuidNames {
    fn next_name(&mut self) -> String {
        Uuid::new_v4().to_string()
    }
}

/// Deterministic `prefix-1`, `prefix-2`, ...
#[derive(Debug, Clone)]
pub struct SequentialNames {
    prefix: String,
    next: u64,
}

impl SequentialNames {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: 1,
        }
    }
}

impl Default for SequentialNames {
    fn default() -> Self {
        Self::new("route")
    }
}

impl NameGenerator for SequentialNames {
    fn next_name(&mut self) -> String {
        let name = format!("{}-{}", self.prefix, self.next);
        self.next += 1;
        name
    }
}

impl<F> NameGenerator for F
where
    F: FnMut() -> String + Send + Sync,
{
    fn next_name(&mut self) -> String {
        self()
    }
}
