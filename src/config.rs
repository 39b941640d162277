//! Run configuration
//!
//! Settings come from three layers, highest priority first:
//! 1. Command line arguments (and their environment fallbacks)
//! 2. `outdater.toml` in the working directory, or the file given by `--config`
//! 3. Built-in defaults

use crate::checker::CheckerKind;
use crate::cli::CliArgs;
use crate::domain::Language;
use crate::engine::{CommitIdentity, DEFAULT_REMOTE};
use crate::error::ConfigError;
use crate::hosting::GITHUB_API_URL;
use crate::package_manager::InstallStrategy;
use crate::registry::NPM_REGISTRY_URL;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Config file looked up in the working directory
pub const CONFIG_FILENAME: &str = "outdater.toml";

/// Contents of the TOML config file. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileConfig {
    pub language: Option<String>,
    pub manifest: Option<PathBuf>,
    pub package_manager: Option<String>,
    pub checker: Option<String>,
    pub registry: Option<String>,
    pub remote: Option<String>,
    pub base: Option<String>,
    pub commit_name: Option<String>,
    pub commit_email: Option<String>,
    pub dry_run: Option<bool>,
}

impl FileConfig {
    /// Load and parse a config file
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(path, &content)
    }

    /// Parse config file content; `path` is only used in errors
    pub fn parse(path: &Path, content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::InvalidFile {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Load the explicit config file, or `outdater.toml` in `dir` if present.
    ///
    /// An explicit file must exist; the default one is optional.
    pub fn discover(explicit: Option<&Path>, dir: &Path) -> Result<Self, ConfigError> {
        match explicit {
            Some(path) => Self::load_from(path),
            None => {
                let default = dir.join(CONFIG_FILENAME);
                if default.is_file() {
                    Self::load_from(&default)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }
}

/// Fully resolved settings of one run
#[derive(Debug, Clone)]
pub struct Settings {
    pub language: Language,
    pub manifest: PathBuf,
    pub install: InstallStrategy,
    pub checker: CheckerKind,
    pub registry_url: String,
    pub remote: String,
    /// Base branch override for new pull requests
    pub base: Option<String>,
    /// Commit id override
    pub commit: Option<String>,
    pub identity: CommitIdentity,
    pub dry_run: bool,
    pub access_token: Option<String>,
    pub api_url: String,
    /// `owner/name` of the hosting repository
    pub repository: Option<String>,
}

impl Settings {
    /// Merge command line arguments over the config file over defaults
    pub fn resolve(args: &CliArgs, file: FileConfig) -> Result<Self, ConfigError> {
        let language = match args.language.as_deref().or(file.language.as_deref()) {
            Some(value) => value.parse()?,
            None => Language::NodeJs,
        };

        let manifest = args
            .manifest
            .clone()
            .or(file.manifest)
            .unwrap_or_else(|| PathBuf::from(language.manifest_filename()));

        let install = args
            .package_manager
            .as_deref()
            .or(file.package_manager.as_deref())
            .map(InstallStrategy::from_id)
            .unwrap_or_default();

        let checker = match args.checker.as_deref().or(file.checker.as_deref()) {
            Some(value) => value.parse()?,
            None => CheckerKind::default(),
        };

        let default_identity = CommitIdentity::default();
        let identity = CommitIdentity {
            name: args
                .commit_name
                .clone()
                .or(file.commit_name)
                .unwrap_or(default_identity.name),
            email: args
                .commit_email
                .clone()
                .or(file.commit_email)
                .unwrap_or(default_identity.email),
        };

        Ok(Self {
            language,
            manifest,
            install,
            checker,
            registry_url: args
                .registry
                .clone()
                .or(file.registry)
                .unwrap_or_else(|| NPM_REGISTRY_URL.to_string()),
            remote: args
                .remote
                .clone()
                .or(file.remote)
                .unwrap_or_else(|| DEFAULT_REMOTE.to_string()),
            base: args.base.clone().or(file.base),
            commit: args.commit.clone(),
            identity,
            dry_run: args.dry_run || file.dry_run.unwrap_or(false),
            access_token: args.access_token.clone().filter(|t| !t.trim().is_empty()),
            api_url: args
                .api_url
                .clone()
                .unwrap_or_else(|| GITHUB_API_URL.to_string()),
            repository: args.repository.clone().filter(|r| !r.trim().is_empty()),
        })
    }

    /// Directory holding the manifest; `.` for a bare file name
    pub fn project_dir(&self) -> PathBuf {
        match self.manifest.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::package_manager::PackageManager;
    use clap::Parser;
    use tempfile::TempDir;

    fn args(extra: &[&str]) -> CliArgs {
        let mut argv = vec!["outdater"];
        argv.extend_from_slice(extra);
        CliArgs::parse_from(argv)
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::resolve(&args(&[]), FileConfig::default()).unwrap();
        assert_eq!(settings.language, Language::NodeJs);
        assert_eq!(settings.manifest, PathBuf::from("package.json"));
        assert_eq!(
            settings.install,
            InstallStrategy::Fixed(PackageManager::Yarn)
        );
        assert_eq!(settings.checker, CheckerKind::Registry);
        assert_eq!(settings.registry_url, NPM_REGISTRY_URL);
        assert_eq!(settings.remote, "origin");
        assert!(settings.base.is_none());
        assert!(!settings.dry_run);
        assert_eq!(settings.identity, CommitIdentity::default());
    }

    #[test]
    fn test_parse_file() {
        let file = FileConfig::parse(
            Path::new("outdater.toml"),
            r#"
manifest = "web/package.json"
package-manager = "pnpm"
checker = "ncu"
remote = "upstream"
commit-name = "deps-bot"
dry-run = true
"#,
        )
        .unwrap();

        assert_eq!(file.manifest, Some(PathBuf::from("web/package.json")));
        assert_eq!(file.package_manager.as_deref(), Some("pnpm"));
        assert_eq!(file.checker.as_deref(), Some("ncu"));
        assert_eq!(file.dry_run, Some(true));
    }

    #[test]
    fn test_parse_file_rejects_unknown_keys() {
        let err = FileConfig::parse(Path::new("outdater.toml"), "manifets = \"x\"").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidFile { .. }));
    }

    #[test]
    fn test_file_values_apply() {
        let file = FileConfig {
            manifest: Some(PathBuf::from("web/package.json")),
            package_manager: Some("auto".to_string()),
            checker: Some("ncu".to_string()),
            remote: Some("upstream".to_string()),
            commit_email: Some("bot@example.com".to_string()),
            dry_run: Some(true),
            ..FileConfig::default()
        };
        let settings = Settings::resolve(&args(&[]), file).unwrap();

        assert_eq!(settings.manifest, PathBuf::from("web/package.json"));
        assert_eq!(settings.install, InstallStrategy::Auto);
        assert_eq!(settings.checker, CheckerKind::Ncu);
        assert_eq!(settings.remote, "upstream");
        assert_eq!(settings.identity.email, "bot@example.com");
        assert_eq!(settings.identity.name, "github-actions[bot]");
        assert!(settings.dry_run);
        assert_eq!(settings.project_dir(), PathBuf::from("web"));
    }

    #[test]
    fn test_cli_wins_over_file() {
        let file = FileConfig {
            manifest: Some(PathBuf::from("web/package.json")),
            package_manager: Some("pnpm".to_string()),
            remote: Some("upstream".to_string()),
            ..FileConfig::default()
        };
        let settings = Settings::resolve(
            &args(&[
                "--manifest",
                "api/package.json",
                "--package-manager",
                "none",
                "--remote",
                "fork",
            ]),
            file,
        )
        .unwrap();

        assert_eq!(settings.manifest, PathBuf::from("api/package.json"));
        assert_eq!(settings.install, InstallStrategy::Disabled);
        assert_eq!(settings.remote, "fork");
    }

    #[test]
    fn test_unsupported_language() {
        let err = Settings::resolve(&args(&["--language", "python"]), FileConfig::default())
            .unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedLanguage { .. }));
    }

    #[test]
    fn test_unknown_checker_from_file() {
        let file = FileConfig {
            checker: Some("dependabot".to_string()),
            ..FileConfig::default()
        };
        let err = Settings::resolve(&args(&[]), file).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownChecker { .. }));
    }

    #[test]
    fn test_project_dir_of_bare_manifest() {
        let settings = Settings::resolve(&args(&[]), FileConfig::default()).unwrap();
        assert_eq!(settings.project_dir(), PathBuf::from("."));
    }

    #[test]
    fn test_discover_default_file() {
        let temp_dir = TempDir::new().unwrap();
        assert_eq!(
            FileConfig::discover(None, temp_dir.path()).unwrap(),
            FileConfig::default()
        );

        std::fs::write(temp_dir.path().join(CONFIG_FILENAME), "remote = \"upstream\"\n").unwrap();
        let file = FileConfig::discover(None, temp_dir.path()).unwrap();
        assert_eq!(file.remote.as_deref(), Some("upstream"));
    }

    #[test]
    fn test_discover_missing_explicit_file() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("custom.toml");
        let err = FileConfig::discover(Some(&missing), temp_dir.path()).unwrap_err();
        assert!(matches!(err, ConfigError::ReadFile { .. }));
    }
}
