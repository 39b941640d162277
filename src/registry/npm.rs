//! npm Registry adapter
//!
//! Fetches the `latest` dist-tag of a package from the npm registry.
//! API endpoint: https://registry.npmjs.org/{package}

use crate::domain::Language;
use crate::error::RegistryError;
use crate::http::HttpClient;
use crate::registry::{registry_error, RegistryAdapter};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use serde::Deserialize;
use std::collections::HashMap;

/// npm registry base URL
pub const NPM_REGISTRY_URL: &str = "https://registry.npmjs.org";

/// Abbreviated metadata media type; much smaller than the full packument
const ABBREVIATED_METADATA: &str = "application/vnd.npm.install-v1+json";

/// npm Registry adapter
pub struct NpmAdapter {
    client: HttpClient,
    base_url: String,
}

/// npm package metadata response
#[derive(Debug, Deserialize)]
struct NpmPackageResponse {
    /// Dist tags (`latest`, `next`, ...)
    #[serde(rename = "dist-tags", default)]
    dist_tags: HashMap<String, String>,
}

impl NpmAdapter {
    /// Create a new npm adapter against the public registry
    pub fn new(client: HttpClient) -> Self {
        Self::with_base_url(client, NPM_REGISTRY_URL)
    }

    /// Create a new npm adapter against a custom registry
    pub fn with_base_url(client: HttpClient, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Build the URL for a package
    ///
    /// Scoped names keep their `@` but the separating slash is encoded.
    fn build_url(&self, package: &str) -> String {
        format!("{}/{}", self.base_url, package.replace('/', "%2f"))
    }
}

#[async_trait]
impl RegistryAdapter for NpmAdapter {
    fn language(&self) -> Language {
        Language::NodeJs
    }

    fn registry_name(&self) -> &'static str {
        "npm"
    }

    async fn latest_version(&self, package: &str) -> Result<String, RegistryError> {
        let url = self.build_url(package);
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(ABBREVIATED_METADATA));

        let response: NpmPackageResponse = self
            .client
            .get_json(&url, headers)
            .await
            .map_err(|e| registry_error(e, package, self.registry_name()))?;

        response
            .dist_tags
            .get("latest")
            .cloned()
            .ok_or_else(|| RegistryError::InvalidResponse {
                package: package.to_string(),
                registry: self.registry_name().to_string(),
                message: "no 'latest' dist-tag".to_string(),
            })
    }
}
