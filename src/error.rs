//! Application error types using thiserror
//!
//! Error hierarchy:
//! - ConfigError: Invalid or missing configuration (fatal before any work starts)
//! - ManifestError: Issues reading, parsing or writing manifest files
//! - DiscoveryError: The version checker could not produce updates
//! - RegistryError: Issues with package registry communication
//! - GitError: A git operation failed
//! - HostingError: The code hosting API rejected or failed a request

use std::path::PathBuf;
use thiserror::Error;

/// Application-level error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration related errors
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Manifest file related errors
    #[error(transparent)]
    Manifest(#[from] ManifestError),

    /// Update discovery errors
    #[error(transparent)]
    Discovery(#[from] DiscoveryError),

    /// Git operation errors
    #[error(transparent)]
    Git(#[from] GitError),

    /// Hosting provider errors
    #[error(transparent)]
    Hosting(#[from] HostingError),
}

/// Errors related to configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Configured manifest does not exist
    #[error("manifest file not found at {path}")]
    ManifestNotFound { path: PathBuf },

    /// Language has no providers
    #[error("language '{value}' is not supported (expected 'nodejs')")]
    UnsupportedLanguage { value: String },

    /// Unknown version checker
    #[error("unknown version checker '{value}' (expected 'registry' or 'ncu')")]
    UnknownChecker { value: String },

    /// Config file could not be read
    #[error("failed to read config file {path}: {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid TOML or has unexpected keys
    #[error("invalid config file {path}: {message}")]
    InvalidFile { path: PathBuf, message: String },

    /// Required environment variable is missing
    #[error("environment variable {name} is not set")]
    MissingEnv { name: &'static str },

    /// Repository slug is not in owner/name form
    #[error("invalid repository '{value}': expected 'owner/name'")]
    InvalidRepository { value: String },

    /// Event payload could not be read
    #[error("failed to read event payload {path}: {message}")]
    EventPayload { path: PathBuf, message: String },

    /// Access token is required for upstream operations
    #[error("an access token is required (set --access-token or GITHUB_TOKEN)")]
    MissingToken,

    /// Access token cannot be sent as a header
    #[error("access token contains characters not allowed in an HTTP header")]
    InvalidToken,

    /// HTTP client could not be built
    #[error("failed to create HTTP client: {message}")]
    HttpClient { message: String },
}

/// Errors related to manifest file operations
#[derive(Error, Debug)]
pub enum ManifestError {
    /// Failed to read manifest file
    #[error("failed to read manifest file {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write manifest file
    #[error("failed to write manifest file {path}: {source}")]
    WriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON parsing error
    #[error("failed to parse JSON in {path}: {message}")]
    JsonParseError { path: PathBuf, message: String },

    /// Manifest parsed but is not a JSON object
    #[error("manifest {path} is not a JSON object")]
    NotAnObject { path: PathBuf },

    /// Workspace member glob could not be compiled
    #[error("invalid workspace pattern '{pattern}': {message}")]
    InvalidWorkspacePattern { pattern: String, message: String },
}

/// Errors produced while asking the version checker for updates
#[derive(Error, Debug)]
pub enum DiscoveryError {
    /// Registry lookup failed
    #[error("version check failed for {path}: {source}")]
    Registry {
        path: PathBuf,
        #[source]
        source: RegistryError,
    },

    /// External checker command could not run or exited unsuccessfully
    #[error("version checker command '{command}' failed: {message}")]
    Command { command: String, message: String },

    /// Checker produced output we could not understand
    #[error("unexpected version checker output for {path}: {message}")]
    InvalidOutput { path: PathBuf, message: String },

    /// Checker could not read the manifest it was pointed at
    #[error(transparent)]
    Manifest(#[from] ManifestError),
}

/// Errors related to package registry communication
#[derive(Error, Debug)]
pub enum RegistryError {
    /// Package not found in registry
    #[error("package '{package}' not found in {registry} registry")]
    PackageNotFound { package: String, registry: String },

    /// Network request failed
    #[error("failed to fetch package '{package}' from {registry}: {message}")]
    NetworkError {
        package: String,
        registry: String,
        message: String,
    },

    /// Rate limit exceeded
    #[error("rate limit exceeded for {registry} registry")]
    RateLimitExceeded { registry: String },

    /// Invalid response from registry
    #[error("invalid response from {registry} for '{package}': {message}")]
    InvalidResponse {
        package: String,
        registry: String,
        message: String,
    },

    /// Timeout
    #[error("timeout while fetching '{package}' from {registry}")]
    Timeout { package: String, registry: String },
}

/// Errors related to git operations
#[derive(Error, Debug)]
pub enum GitError {
    /// git could not be spawned
    #[error("failed to run git {args}: {source}")]
    Spawn {
        args: String,
        #[source]
        source: std::io::Error,
    },

    /// git exited with a non-zero status
    #[error("git {args} failed: {stderr}")]
    CommandFailed { args: String, stderr: String },
}

/// Errors related to the code hosting API
#[derive(Error, Debug)]
pub enum HostingError {
    /// Transport level failure
    #[error("request to {url} failed: {message}")]
    Request { url: String, message: String },

    /// API answered with an error status
    #[error("{method} {url} returned HTTP {status}: {message}")]
    Status {
        method: String,
        url: String,
        status: u16,
        message: String,
    },

    /// API answered with a body we could not decode
    #[error("invalid response from {url}: {message}")]
    InvalidResponse { url: String, message: String },
}

impl ManifestError {
    /// Creates a new ReadError
    pub fn read_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ManifestError::ReadError {
            path: path.into(),
            source,
        }
    }

    /// Creates a new WriteError
    pub fn write_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ManifestError::WriteError {
            path: path.into(),
            source,
        }
    }

    /// Creates a new JsonParseError
    pub fn json_parse_error(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        ManifestError::JsonParseError {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl RegistryError {
    /// Creates a new PackageNotFound error
    pub fn package_not_found(package: impl Into<String>, registry: impl Into<String>) -> Self {
        RegistryError::PackageNotFound {
            package: package.into(),
            registry: registry.into(),
        }
    }

    /// Creates a new NetworkError
    pub fn network_error(
        package: impl Into<String>,
        registry: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        RegistryError::NetworkError {
            package: package.into(),
            registry: registry.into(),
            message: message.into(),
        }
    }

    /// Creates a new Timeout error
    pub fn timeout(package: impl Into<String>, registry: impl Into<String>) -> Self {
        RegistryError::Timeout {
            package: package.into(),
            registry: registry.into(),
        }
    }
}

impl GitError {
    /// Creates a new CommandFailed error
    pub fn command_failed(args: &[&str], stderr: impl Into<String>) -> Self {
        GitError::CommandFailed {
            args: args.join(" "),
            stderr: stderr.into(),
        }
    }
}

impl HostingError {
    /// Creates a new Request error
    pub fn request(url: impl Into<String>, message: impl Into<String>) -> Self {
        HostingError::Request {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Creates a new InvalidResponse error
    pub fn invalid_response(url: impl Into<String>, message: impl Into<String>) -> Self {
        HostingError::InvalidResponse {
            url: url.into(),
            message: message.into(),
        }
    }
}
