pub mod cache;
pub mod coordinator;
pub mod filters;
pub mod pagination;
pub mod persist;

pub use cache::{DetailCache, EvictionPolicy};
pub use coordinator::{ListState, PropertyListCoordinator};
pub use filters::{FilterState, SortBy};
pub use pagination::{PaginationState, PAGE_SIZE};
pub use persist::{FileStateStore, MemoryStateStore, PersistedState, StateStore, STORE_KEY};
