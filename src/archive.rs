// Archive packaging for push and pull.
//
// Push plans a layout (archive path -> local source) and streams it through
// tar + gzip into memory, so no staging copy of the tree is ever written.
// Pull unpacks into a scoped temp directory and merges the repository
// subtree into the destination, overwriting same-named files only.

use crate::error::{CliError, Result};
use crate::remote_path::{RemotePath, RepoName};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use tar::{Archive, Builder};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Directory names that never leave the machine.
pub const VCS_DIRS: &[&str] = &[".git", ".hg", ".svn", ".bzr"];

/// One entry of the archive being built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayoutEntry {
    Dir { archive_path: PathBuf },
    File { source: PathBuf, archive_path: PathBuf },
}

/// The exact file layout that must appear inside a push archive.
#[derive(Debug, Default)]
pub struct ArchiveLayout {
    entries: Vec<LayoutEntry>,
}

impl ArchiveLayout {
    /// Decide what the archive for `local_path` pushed to `remote_path`
    /// contains.
    ///
    /// A directory contributes its contents (never its own name), nested
    /// under `remote_path` when that is not the root. A file lands at the
    /// archive root under its own name, or at `remote_path` itself.
    pub fn plan(local_path: &Path, remote_path: &RemotePath) -> Result<Self> {
        let metadata = fs::metadata(local_path).map_err(|_| {
            CliError::LocalPathNotFound(local_path.display().to_string())
        })?;

        let mut layout = ArchiveLayout::default();
        if metadata.is_dir() {
            layout.add_dir_contents(local_path, &remote_path.to_path_buf())?;
        } else if remote_path.is_root() {
            let name = local_path.file_name().ok_or_else(|| {
                CliError::InvalidPath(format!("{} has no file name", local_path.display()))
            })?;
            layout.entries.push(LayoutEntry::File {
                source: local_path.to_path_buf(),
                archive_path: PathBuf::from(name),
            });
        } else {
            if remote_path.has_directory_hint() {
                return Err(CliError::InvalidPath(format!(
                    "'{}/' names a directory but {} is a file",
                    remote_path,
                    local_path.display()
                )));
            }
            layout.entries.push(LayoutEntry::File {
                source: local_path.to_path_buf(),
                archive_path: remote_path.to_path_buf(),
            });
        }
        Ok(layout)
    }

    /// Symlinks are followed, so a linked directory is pushed with its
    /// contents. A link cycle is an error.
    fn add_dir_contents(&mut self, dir: &Path, prefix: &Path) -> Result<()> {
        let walker = WalkDir::new(dir)
            .min_depth(1)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| !is_vcs_metadata(entry.file_name()));

        for entry in walker {
            let entry = entry?;
            let relative = entry.path().strip_prefix(dir).unwrap_or(entry.path());
            let archive_path = prefix.join(relative);
            if entry.file_type().is_dir() {
                self.entries.push(LayoutEntry::Dir { archive_path });
            } else {
                self.entries.push(LayoutEntry::File {
                    source: entry.path().to_path_buf(),
                    archive_path,
                });
            }
        }
        Ok(())
    }

    pub fn entries(&self) -> &[LayoutEntry] {
        &self.entries
    }

    pub fn file_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| matches!(e, LayoutEntry::File { .. }))
            .count()
    }

    /// Stream the layout into an in-memory tar.gz.
    pub fn to_tar_gz(&self) -> Result<Vec<u8>> {
        let encoder = GzEncoder::new(Vec::new(), Compression::default());
        let mut builder = Builder::new(encoder);
        for entry in &self.entries {
            match entry {
                LayoutEntry::Dir { archive_path } => {
                    let mut header = tar::Header::new_gnu();
                    header.set_entry_type(tar::EntryType::Directory);
                    header.set_mode(0o755);
                    header.set_size(0);
                    builder.append_data(&mut header, archive_path, std::io::empty())?;
                }
                LayoutEntry::File {
                    source,
                    archive_path,
                } => {
                    builder.append_path_with_name(source, archive_path)?;
                }
            }
        }
        let encoder = builder.into_inner()?;
        Ok(encoder.finish()?)
    }
}

fn is_vcs_metadata(name: &OsStr) -> bool {
    VCS_DIRS.iter().any(|vcs| name == OsStr::new(vcs))
}

/// Build the tar.gz for pushing `local_path` to `remote_path`.
pub fn build_push_archive(local_path: &Path, remote_path: &RemotePath) -> Result<Vec<u8>> {
    let layout = ArchiveLayout::plan(local_path, remote_path)?;
    let bytes = layout.to_tar_gz()?;
    debug!(
        local = %local_path.display(),
        remote = %remote_path,
        files = layout.file_count(),
        bytes = bytes.len(),
        "built push archive"
    );
    Ok(bytes)
}

/// Unpack a pulled archive and merge it into `destination_root/<repo>`.
///
/// The archive must hold exactly one top-level directory named after the
/// repository. Only regular files and directories are merged; symlinks and
/// other special entries are skipped. Existing files under the target are overwritten when the
/// archive carries the same path and kept otherwise. Returns the target
/// directory.
pub fn merge_into_destination(
    archive_bytes: &[u8],
    repo: &RepoName,
    destination_root: &Path,
) -> Result<PathBuf> {
    let extract_dir = tempfile::Builder::new().prefix("openverse-pull-").tempdir()?;
    debug!(dir = %extract_dir.path().display(), "extracting pulled archive");

    let mut archive = Archive::new(GzDecoder::new(archive_bytes));
    archive
        .unpack(extract_dir.path())
        .map_err(|e| CliError::MalformedArchive(format!("could not unpack archive: {}", e)))?;

    let source_root = single_repo_dir(extract_dir.path(), repo)?;

    fs::create_dir_all(destination_root)?;
    let target_root = destination_root.join(repo.as_str());
    fs::create_dir_all(&target_root)?;

    let mut copied = 0usize;
    for entry in WalkDir::new(&source_root).min_depth(1).sort_by_file_name() {
        let entry = entry?;
        let relative = entry.path().strip_prefix(&source_root).unwrap_or(entry.path());
        let target = target_root.join(relative);
        let file_type = entry.file_type();
        if file_type.is_dir() {
            fs::create_dir_all(&target)?;
        } else if file_type.is_file() {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(entry.path(), &target)?;
            copied += 1;
        } else {
            // links from the archive could point anywhere on this machine
            warn!(path = %relative.display(), "skipping non-regular archive entry");
        }
    }

    debug!(target = %target_root.display(), files = copied, "merged pulled archive");
    Ok(target_root)
}

/// Locate the extracted repository directory, rejecting anything else at
/// the archive root.
fn single_repo_dir(extract_dir: &Path, repo: &RepoName) -> Result<PathBuf> {
    let mut top_level = Vec::new();
    for entry in fs::read_dir(extract_dir)? {
        top_level.push(entry?);
    }

    match top_level.as_slice() {
        [only] if only.file_name().as_os_str() == OsStr::new(repo.as_str()) => {
            if only.file_type()?.is_dir() {
                Ok(only.path())
            } else {
                Err(CliError::MalformedArchive(format!(
                    "top-level entry '{}' is not a directory",
                    repo
                )))
            }
        }
        [] => Err(CliError::MalformedArchive("archive is empty".into())),
        entries => {
            let names: Vec<String> = entries
                .iter()
                .map(|e| e.file_name().to_string_lossy().into_owned())
                .collect();
            Err(CliError::MalformedArchive(format!(
                "expected a single top-level directory '{}', found: {}",
                repo,
                names.join(", ")
            )))
        }
    }
}
