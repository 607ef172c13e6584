use crate::SessionStore;

/// Explicit set of working keys owned by one engine. Keys are
/// `<name>.<field>` and clearing deletes exactly the declared fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Namespace {
    name: &'static str,
    fields: &'static [&'static str],
}

impl Namespace {
    pub const fn new(name: &'static str, fields: &'static [&'static str]) -> Self {
        Self { name, fields }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn key(&self, field: &str) -> String {
        debug_assert!(
            self.fields.iter().any(|f| *f == field),
            "`{field}` is not declared in namespace `{}`",
            self.name
        );
        format!("{}.{}", self.name, field)
    }

    pub fn keys(&self) -> impl Iterator<Item = String> + '_ {
        self.fields.iter().map(|field| format!("{}.{}", self.name, field))
    }

    /// Deletes every declared key; returns how many were present.
    pub fn clear<S: SessionStore + ?Sized>(&self, store: &mut S) -> usize {
        let mut cleared = 0;
        for key in self.keys() {
            if store.contains(&key) {
                store.delete(&key);
                cleared += 1;
            }
        }
        tracing::debug!(namespace = self.name, cleared, "cleared namespace");
        cleared
    }
}
