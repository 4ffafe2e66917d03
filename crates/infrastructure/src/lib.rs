//! Infrastructure adapters for access resolution ports.

#![forbid(unsafe_code)]

mod in_memory_access_context_cache;
mod in_memory_access_directory;
mod postgres_access_repository;

pub use in_memory_access_context_cache::InMemoryAccessContextCache;
pub use in_memory_access_directory::InMemoryAccessDirectory;
pub use postgres_access_repository::PostgresAccessRepository;
