pub mod namespace;
pub mod store;

pub use namespace::Namespace;
pub use store::{Atom, MemoryStore, SessionStore, StoreError, load, save};
