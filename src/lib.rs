//! outdater - dependency update bot library
//!
//! Each invocation runs `Discover → Mutate → Converge`:
//! - Discover outdated dependencies in the root manifest and every workspace member
//! - Mutate the manifests (or only preview them inside a pull request)
//! - Converge the update branch, pull request and tracking comment upstream
//!
//! Runs are stateless; every upstream object is found again through keys
//! derived from the invocation context, so repeated runs converge instead of
//! duplicating.

pub mod checker;
pub mod cli;
pub mod config;
pub mod domain;
pub mod engine;
pub mod error;
pub mod git;
pub mod hosting;
pub mod http;
pub mod manifest;
pub mod orchestrator;
pub mod output;
pub mod package_manager;
pub mod parser;
pub mod progress;
pub mod provider;
pub mod registry;
pub mod report;
