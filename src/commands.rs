// Command handlers, one per CLI verb. Each takes the service and the token
// store as arguments, prints its own status lines and returns what it did
// so the binary can pick an exit code.

use crate::api::EnvironmentApi;
use crate::archive;
use crate::error::{CliError, Result};
use crate::remote_path::{RemotePath, RepoName};
use crate::token_store::{Credentials, TokenStore};
use crate::ui;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    /// Credentials were already stored; nothing changed.
    AlreadyLoggedIn(String),
    LoggedIn(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateOutcome {
    Created(String),
    AlreadyExists,
}

/// Load stored credentials or fail before any request is made.
fn require_credentials(store: &dyn TokenStore) -> Result<Credentials> {
    store
        .load()?
        .ok_or_else(|| CliError::Auth("not logged in; run `openverse login` first".into()))
}

/// Log in with a token supplied by `read_token`, which is only consulted
/// when no credentials are stored yet.
pub fn login<A, F>(api: &A, store: &dyn TokenStore, read_token: F) -> Result<LoginOutcome>
where
    A: EnvironmentApi + ?Sized,
    F: FnOnce() -> Result<String>,
{
    if let Some(existing) = store.load()? {
        ui::warning(&format!("Already logged in as {}", existing.username));
        ui::info("If you want to log in as a different user, run:\n  openverse logout\n");
        return Ok(LoginOutcome::AlreadyLoggedIn(existing.username));
    }

    let token = read_token()?.trim().to_string();
    if token.is_empty() {
        return Err(CliError::Auth("no token entered".into()));
    }

    let spinner = ui::spinner("Validating token...");
    let user = api.validate_token(&token);
    spinner.finish_and_clear();
    let user = user?;

    store.save(&Credentials {
        token,
        username: user.username.clone(),
    })?;
    info!(username = %user.username, "logged in");
    ui::success(&format!("Logged in as {}", user.username));
    Ok(LoginOutcome::LoggedIn(user.username))
}

/// Forget stored credentials. Returns whether anything was stored.
pub fn logout(store: &dyn TokenStore) -> Result<bool> {
    if store.load()?.is_none() {
        ui::warning("You are not logged in.");
        return Ok(false);
    }
    store.delete()?;
    ui::success("Logged out successfully");
    Ok(true)
}

pub fn whoami(store: &dyn TokenStore) -> Result<Option<String>> {
    match store.load()? {
        Some(creds) => {
            ui::success(&format!("Logged in as {}", creds.username));
            Ok(Some(creds.username))
        }
        None => {
            ui::warning("Not logged in");
            Ok(None)
        }
    }
}

/// Create a repository. An existing repository only produces a warning.
pub fn create<A: EnvironmentApi + ?Sized>(api: &A, store: &dyn TokenStore, repo: &RepoName) -> Result<CreateOutcome> {
    let creds = require_credentials(store)?;
    match api.create_repo(&creds.token, repo) {
        Ok(created) => {
            ui::success(&format!("Created environment: {}", created.repo_url));
            Ok(CreateOutcome::Created(created.repo_url))
        }
        Err(e) if e.is_benign() => {
            warn!(repo = %repo, "repository already exists");
            ui::warning(&format!("Environment '{}' already exists.", repo));
            Ok(CreateOutcome::AlreadyExists)
        }
        Err(e) => Err(e),
    }
}

/// Package `local_path` so it lands at `remote_path` and upload it.
pub fn push<A: EnvironmentApi + ?Sized>(
    api: &A,
    store: &dyn TokenStore,
    repo: &RepoName,
    local_path: &Path,
    remote_path: &RemotePath,
    message: Option<&str>,
) -> Result<serde_json::Value> {
    let creds = require_credentials(store)?;

    let spinner = ui::spinner("Packing files...");
    let tarball = archive::build_push_archive(local_path, remote_path);
    spinner.finish_and_clear();
    let tarball = tarball?;

    let spinner = ui::spinner(&format!("Pushing to {}...", repo));
    let response = api.push_repo(&creds.token, repo, tarball, message);
    spinner.finish_and_clear();
    let response = response?;

    info!(repo = %repo, remote = %remote_path, "push complete");
    ui::success(&format!("Pushed {} to {}:{}", local_path.display(), repo, remote_path));
    ui::print_response(&response);
    Ok(response)
}

/// Download a repository and merge it into `destination/<repo>`.
pub fn pull<A: EnvironmentApi + ?Sized>(
    api: &A,
    store: &dyn TokenStore,
    repo: &RepoName,
    destination: &Path,
) -> Result<PathBuf> {
    let creds = require_credentials(store)?;

    let spinner = ui::spinner(&format!("Pulling {}...", repo));
    let bytes = api.pull_repo(&creds.token, repo);
    spinner.finish_and_clear();
    let bytes = bytes?;
    debug!(repo = %repo, bytes = bytes.len(), "downloaded archive");

    let target = archive::merge_into_destination(&bytes, repo, destination)?;
    ui::success(&format!("Pulled repository to: {}", target.display()));
    Ok(target)
}

/// Delete a path inside a repository. The root itself cannot be deleted
/// this way.
pub fn delete<A: EnvironmentApi + ?Sized>(
    api: &A,
    store: &dyn TokenStore,
    repo: &RepoName,
    path: &RemotePath,
) -> Result<serde_json::Value> {
    if path.is_root() {
        return Err(CliError::InvalidPath(
            "refusing to delete the repository root; name a path inside it".into(),
        ));
    }
    let creds = require_credentials(store)?;
    let response = api.delete_path(&creds.token, repo, path)?;
    info!(repo = %repo, path = %path, "deleted");
    ui::success(&format!("Deleted {}:{}", repo, path));
    ui::print_response(&response);
    Ok(response)
}
