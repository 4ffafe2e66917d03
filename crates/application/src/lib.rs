//! Application services and ports for access resolution.

#![forbid(unsafe_code)]

mod access_ports;
mod access_resolver;
mod access_service;
mod access_session;
mod resolution_config;

#[cfg(test)]
mod test_fakes;

pub use access_ports::{AccessContextCache, GrantRepository, IdentityStore, ModuleCatalog};
pub use access_resolver::AccessResolver;
pub use access_service::AccessService;
pub use access_session::{AccessSession, AccessStatus};
pub use resolution_config::{ResolutionConfig, parse_flag};
