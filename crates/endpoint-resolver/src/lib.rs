//! Backend endpoint resolution for the waste reporting client.
//!
//! [`EndpointResolver`] picks a backend base URL for the active
//! [`Environment`] and derives an [`EndpointMap`] from it. It is owned by the
//! application's composition root and shared by reference; nothing here is
//! global.

mod address;
mod cache;
mod candidates;
pub mod config;
pub mod constants;
mod endpoints;
mod environment;
mod error;
mod http;
mod probe;
mod resolver;

pub use address::{AddressSource, CachedAddressSource, InterfaceAddressSource};
pub use cache::ResolutionCache;
pub use candidates::development_candidates;
pub use config::{DevelopmentConfig, ProbeConfig, ResolverConfig};
pub use endpoints::{EndpointMap, static_endpoints};
pub use environment::{Environment, EnvironmentInfo};
pub use error::{ConfigError, ParseEnvironmentError, Result};
pub use probe::{HttpProbe, Probe};
pub use resolver::{DefaultResolver, EndpointResolver};

pub use netinfo::NetworkInfo;
