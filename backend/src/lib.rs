//! Recipe backend library: configuration, connection lifecycle, domain
//! services, and the adapters that expose and persist them.

pub mod config;
pub mod connections;
pub mod container;
pub mod doc;
pub mod domain;
pub mod inbound;
pub mod logging;
pub mod middleware;
pub mod outbound;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
