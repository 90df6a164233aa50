//! Adapters implementing the domain ports.

pub mod memory;
pub mod mock;
pub mod pronoundb;
pub mod sqlite;

pub use memory::InMemoryKeyValueStore;
pub use mock::MockPronounSource;
pub use pronoundb::PronounDbClient;
pub use sqlite::SqliteKeyValueStore;
