//! Version specification parsers
//!
//! Turns the version strings found in a manifest into a [`VersionSpec`] so
//! a checker can compare the declared version with the latest release and
//! write the upgrade back in the same style.

mod node;

pub use node::NodeVersionParser;

use crate::domain::{Language, VersionSpec};

/// Trait for parsing version specifications
pub trait VersionParser: Send + Sync {
    /// Parse a version specification string.
    ///
    /// Returns `None` for anything that is not a registry version
    /// (git URLs, local paths, workspace protocols, tags).
    fn parse(&self, version_str: &str) -> Option<VersionSpec>;

    /// Returns the language this parser handles
    fn language(&self) -> Language;
}

/// Get a version parser for the specified language
pub fn get_parser(language: Language) -> Box<dyn VersionParser> {
    match language {
        Language::NodeJs => Box::new(NodeVersionParser),
    }
}
