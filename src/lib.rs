// Library root
// -----------
// This crate exposes the pieces behind the `openverse` binary so they can
// be tested without a terminal or a live server.
//
// Module responsibilities:
// - `remote_path`: normalized repository-relative paths and repo names.
// - `archive`: builds push archives and merges pulled ones.
// - `api`: HTTP calls to the repository service.
// - `token_store`: where the API token lives between runs.
// - `commands`: one function per CLI verb, wired from `cli`.
// - `ui`: terminal output and prompts.
pub mod api;
pub mod archive;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod remote_path;
pub mod token_store;
pub mod ui;

pub use error::{CliError, Result};
