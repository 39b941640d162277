//! Node.js (npm/yarn/pnpm) version specification parser
//!
//! Handles version formats:
//! - Exact: `1.2.3`, `=1.2.3`, `v1.2.3`
//! - Caret: `^1.2.3`
//! - Tilde: `~1.2.3`
//! - Comparison: `>=1.2.3`, `>1.2.3`, `<=1.2.3`, `<1.2.3`
//! - Wildcard: `*`, `1.x`, `1.2.*`
//! - Range: `>=1.0.0 <2.0.0`, `1.0.0 - 2.0.0`

use crate::domain::{Language, VersionSpec, VersionSpecKind};
use crate::parser::VersionParser;
use regex::Regex;
use std::sync::LazyLock;

/// Node.js version specification parser
pub struct NodeVersionParser;

/// Optional comparison operator followed by a full version
static SINGLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\^|~|>=|>|<=|<|=)?\s*v?(\d+\.\d+\.\d+(?:-[0-9A-Za-z.-]+)?(?:\+[0-9A-Za-z.-]+)?)$")
        .unwrap()
});
static WILDCARD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+(?:\.\d+)?\.)?[xX*]$|^\*$").unwrap());
static RANGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[<>=]+\d+\.\d+\.\d+\s+[<>=]+\d+\.\d+\.\d+$|^\d+\.\d+\.\d+\s*-\s*\d+\.\d+\.\d+$|\|\|")
        .unwrap()
});

/// Maps an operator to the kind it denotes
fn kind_for_operator(operator: Option<&str>) -> VersionSpecKind {
    match operator {
        Some("^") => VersionSpecKind::Caret,
        Some("~") => VersionSpecKind::Tilde,
        Some(">=") => VersionSpecKind::GreaterOrEqual,
        Some(">") => VersionSpecKind::Greater,
        Some("<=") => VersionSpecKind::LessOrEqual,
        Some("<") => VersionSpecKind::Less,
        _ => VersionSpecKind::Exact,
    }
}

impl VersionParser for NodeVersionParser {
    fn parse(&self, version_str: &str) -> Option<VersionSpec> {
        let trimmed = version_str.trim();

        if trimmed.is_empty() {
            return None;
        }

        if RANGE_RE.is_match(trimmed) {
            let first_version = trimmed
                .split_whitespace()
                .next()
                .map(|s| s.trim_start_matches(|c: char| !c.is_ascii_digit()))
                .unwrap_or_default();
            return Some(VersionSpec::new(
                VersionSpecKind::Range,
                trimmed,
                first_version,
            ));
        }

        if WILDCARD_RE.is_match(trimmed) {
            return Some(VersionSpec::new(
                VersionSpecKind::Wildcard,
                trimmed,
                trimmed,
            ));
        }

        let caps = SINGLE_RE.captures(trimmed)?;
        let operator = caps.get(1).map(|m| m.as_str());
        let version = caps.get(2)?.as_str();
        let spec = VersionSpec::new(kind_for_operator(operator), trimmed, version);

        // Keep whatever preceded the version (operator, `v`, spacing) so the
        // upgrade is written back exactly as the author styled it.
        let prefix = &trimmed[..trimmed.len() - version.len()];
        Some(if prefix.is_empty() {
            spec
        } else {
            spec.with_prefix(prefix)
        })
    }

    fn language(&self) -> Language {
        Language::NodeJs
    }
}
