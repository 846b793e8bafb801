//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod http_role_admin_repository;
mod in_memory_query_cache;

pub use http_role_admin_repository::HttpRoleAdminRepository;
pub use in_memory_query_cache::InMemoryQueryCache;
