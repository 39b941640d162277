//! Registry adapters for fetching the latest published version of a package
//!
//! This module provides:
//! - The `RegistryAdapter` seam used by the registry-backed version checker
//! - npm Registry adapter

mod npm;

pub use npm::{NpmAdapter, NPM_REGISTRY_URL};

use crate::domain::Language;
use crate::error::RegistryError;
use crate::http::HttpFailure;
use async_trait::async_trait;

/// Trait for registry adapters
#[async_trait]
pub trait RegistryAdapter: Send + Sync {
    /// Get the language this adapter handles
    fn language(&self) -> Language;

    /// Get the registry name
    fn registry_name(&self) -> &'static str;

    /// Fetch the version the registry currently tags as latest
    async fn latest_version(&self, package: &str) -> Result<String, RegistryError>;
}

/// Translate a transport failure into a registry error for `package`
pub(crate) fn registry_error(failure: HttpFailure, package: &str, registry: &str) -> RegistryError {
    match failure {
        HttpFailure::NotFound => RegistryError::package_not_found(package, registry),
        HttpFailure::Timeout => RegistryError::timeout(package, registry),
        HttpFailure::RateLimited => RegistryError::RateLimitExceeded {
            registry: registry.to_string(),
        },
        HttpFailure::Decode(message) => RegistryError::InvalidResponse {
            package: package.to_string(),
            registry: registry.to_string(),
            message,
        },
        other => RegistryError::network_error(package, registry, other.to_string()),
    }
}
