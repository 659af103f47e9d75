//! In-memory collection indexed by an `(id, name)` composite key, with
//! secondary lookups by id alone and by name alone.

mod collection;
mod error;
mod index;
mod key;
pub mod stats;

pub use collection::{Entry, IndexedCollection};
pub use error::CollectionError;
pub use key::{CompositeKey, KeyPart};
