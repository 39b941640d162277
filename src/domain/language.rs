//! Language type definitions for supported package ecosystems

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Supported programming languages/ecosystems
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// Node.js ecosystem (package.json, optionally with workspaces)
    #[serde(rename = "nodejs")]
    NodeJs,
}

impl Language {
    /// Returns the manifest filename for this language
    pub fn manifest_filename(&self) -> &'static str {
        match self {
            Language::NodeJs => "package.json",
        }
    }

    /// Code fence language used when rendering a manifest in a report
    pub fn content_type(&self) -> &'static str {
        match self {
            Language::NodeJs => "json",
        }
    }

    /// Directory names that hold installed dependencies and must never be
    /// treated as project manifests
    pub fn dependency_cache_dirs(&self) -> &'static [&'static str] {
        match self {
            Language::NodeJs => &["node_modules"],
        }
    }

    /// Returns the identifier used in configuration
    pub fn id(&self) -> &'static str {
        match self {
            Language::NodeJs => "nodejs",
        }
    }

    /// Returns the display name for this language
    pub fn display_name(&self) -> &'static str {
        match self {
            Language::NodeJs => "Node.js",
        }
    }
}

impl FromStr for Language {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "nodejs" | "node" | "javascript" | "typescript" => Ok(Language::NodeJs),
            _ => Err(ConfigError::UnsupportedLanguage {
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}
