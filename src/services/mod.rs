//! Service layer: caching, coalescing and the public resolver.

pub mod batch_dispatcher;
pub mod format;
pub mod override_store;
pub mod request_coalescer;
pub mod resolver;
pub mod result_cache;

pub use batch_dispatcher::{Batch, BatchDispatcher, Waiter};
pub use format::{display_text, format_pronouns, should_display};
pub use override_store::{override_storage_key, OverrideStore, OVERRIDE_INDEX_KEY, OVERRIDE_KEY_PREFIX};
pub use request_coalescer::{DebounceTimer, RequestCoalescer, TimerState};
pub use resolver::Resolver;
pub use result_cache::ResultCache;
