//! Workspace member resolution
//!
//! Expands the member globs declared by a workspace root into concrete
//! manifest paths, in declaration order then glob order.

use crate::domain::Language;
use crate::error::ManifestError;
use glob::{glob, Pattern};
use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};

/// Resolve the manifests of every workspace member.
///
/// Each member glob is expanded as `<root dir>/<member>/**/<manifest>`.
/// Paths inside dependency caches (`node_modules`), the root manifest itself
/// and duplicates are dropped. Members starting with `!` exclude matches.
pub fn resolve_workspace_manifests(
    root_manifest: &Path,
    members: &[String],
    language: Language,
) -> Result<Vec<PathBuf>, ManifestError> {
    let root_dir = root_manifest.parent().unwrap_or_else(|| Path::new(""));
    let manifest_name = language.manifest_filename();

    let mut exclusions = Vec::new();
    for member in members.iter().filter_map(|m| m.strip_prefix('!')) {
        let pattern = member_pattern(root_dir, member, manifest_name);
        exclusions.push(Pattern::new(&pattern).map_err(|e| {
            ManifestError::InvalidWorkspacePattern {
                pattern: member.to_string(),
                message: e.to_string(),
            }
        })?);
    }

    let mut seen = HashSet::new();
    seen.insert(normalize(root_manifest));

    let mut manifests = Vec::new();
    for member in members.iter().filter(|m| !m.starts_with('!')) {
        let pattern = member_pattern(root_dir, member, manifest_name);
        let paths = glob(&pattern).map_err(|e| ManifestError::InvalidWorkspacePattern {
            pattern: member.clone(),
            message: e.to_string(),
        })?;

        for path in paths.flatten() {
            if is_in_dependency_cache(&path, language) {
                continue;
            }
            if exclusions.iter().any(|p| p.matches_path(&path)) {
                continue;
            }
            if seen.insert(normalize(&path)) {
                manifests.push(path);
            }
        }
    }

    Ok(manifests)
}

/// Build the glob for one member relative to the workspace root
fn member_pattern(root_dir: &Path, member: &str, manifest_name: &str) -> String {
    let member = member.trim_end_matches('/');
    let root = root_dir.to_string_lossy();
    if root.is_empty() {
        format!("{}/**/{}", member, manifest_name)
    } else {
        format!(
            "{}/{}/**/{}",
            Pattern::escape(root.trim_end_matches('/')),
            member,
            manifest_name
        )
    }
}

/// Returns true if any path component is a dependency cache directory
fn is_in_dependency_cache(path: &Path, language: Language) -> bool {
    let caches = language.dependency_cache_dirs();
    path.components().any(|component| match component {
        Component::Normal(name) => caches.iter().any(|cache| name == *cache),
        _ => false,
    })
}

/// Drop `.` components so `./a/package.json` and `a/package.json` compare equal
fn normalize(path: &Path) -> PathBuf {
    path.components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect()
}
