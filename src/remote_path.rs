// Path values for the remote side: repository-relative locations and
// repository names. Both are validated once on construction; the rest of
// the crate only ever sees the normalized form.

use crate::error::{CliError, Result};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// A traversal-free location inside a repository.
///
/// Segments are trimmed and joined with `/`, repeated separators are
/// collapsed, `.` segments are dropped and no leading separator survives. The empty path
/// is the repository root. The trailing separator of the raw input is not
/// part of the normalized string but is remembered as a directory hint.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RemotePath {
    normalized: String,
    directory_hint: bool,
}

impl RemotePath {
    /// The repository root.
    pub fn root() -> Self {
        Self::default()
    }

    /// Normalize raw user input.
    ///
    /// Fails with [`CliError::InvalidPath`] when `raw` is empty or any
    /// segment is `..`. `..` is rejected even where it could be resolved
    /// lexically (`a/../b`).
    pub fn parse(raw: &str) -> Result<Self> {
        if raw.is_empty() {
            return Err(CliError::InvalidPath("path must not be empty".into()));
        }

        let canonical = raw.trim().replace('\\', "/");
        let mut rest = canonical.as_str();
        loop {
            if let Some(stripped) = rest.strip_prefix("./") {
                rest = stripped;
            } else if let Some(stripped) = rest.strip_prefix('/') {
                rest = stripped;
            } else {
                break;
            }
        }

        let mut segments = Vec::new();
        for segment in rest.split('/').map(str::trim) {
            match segment {
                "" | "." => continue,
                ".." => {
                    return Err(CliError::InvalidPath(
                        "path traversal ('..') is not allowed".into(),
                    ))
                }
                other => segments.push(other),
            }
        }

        let normalized = segments.join("/");
        let directory_hint = !normalized.is_empty() && rest.ends_with('/');
        Ok(Self {
            normalized,
            directory_hint,
        })
    }

    pub fn is_root(&self) -> bool {
        self.normalized.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.normalized
    }

    /// Whether the raw input ended with a separator, i.e. named a directory.
    pub fn has_directory_hint(&self) -> bool {
        self.directory_hint
    }

    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.normalized.split('/').filter(|s| !s.is_empty())
    }

    /// The path as a relative filesystem path (empty for the root).
    pub fn to_path_buf(&self) -> PathBuf {
        self.segments().collect()
    }
}

impl fmt::Display for RemotePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_root() {
            write!(f, "/")
        } else {
            write!(f, "{}", self.normalized)
        }
    }
}

impl FromStr for RemotePath {
    type Err = CliError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Name of a remote repository: a single, non-empty path component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoName(String);

impl RepoName {
    pub fn parse(raw: &str) -> Result<Self> {
        let name = raw.trim();
        if name.is_empty() {
            return Err(CliError::InvalidPath("repository name must not be empty".into()));
        }
        if name == "." || name == ".." || name.contains(['/', '\\']) {
            return Err(CliError::InvalidPath(format!(
                "'{}' is not a valid repository name",
                name
            )));
        }
        Ok(Self(name.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RepoName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for RepoName {
    type Err = CliError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn norm(raw: &str) -> String {
        RemotePath::parse(raw).unwrap().as_str().to_string()
    }

    #[test]
    fn test_collapses_and_strips_prefixes() {
        assert_eq!(norm("./a//b/"), "a/b");
        assert_eq!(norm("/x/y"), "x/y");
        assert_eq!(norm("././//a/./b"), "a/b");
        assert_eq!(norm("  nested/file.txt  "), "nested/file.txt");
        assert_eq!(norm("dir\\sub\\f.txt"), "dir/sub/f.txt");
    }

    #[test]
    fn test_dot_and_slash_are_root() {
        assert!(RemotePath::parse(".").unwrap().is_root());
        assert!(RemotePath::parse("./").unwrap().is_root());
        assert!(RemotePath::parse("/").unwrap().is_root());
        assert!(RemotePath::parse("   ").unwrap().is_root());
        assert_eq!(RemotePath::root().to_string(), "/");
    }

    #[test]
    fn test_rejects_empty_and_traversal() {
        assert!(matches!(RemotePath::parse(""), Err(CliError::InvalidPath(_))));
        assert!(matches!(RemotePath::parse("../x"), Err(CliError::InvalidPath(_))));
        assert!(matches!(RemotePath::parse("a/../b"), Err(CliError::InvalidPath(_))));
        assert!(matches!(RemotePath::parse("/a/b/.."), Err(CliError::InvalidPath(_))));
    }

    #[test]
    fn test_whitespace_around_segments_is_trimmed() {
        assert_eq!(norm("/ a"), "a");
        assert_eq!(norm("a/b /"), "a/b");
        assert_eq!(norm("a/ /b"), "a/b");
        assert_eq!(norm("my dir/ file.txt"), "my dir/file.txt");
        assert!(matches!(RemotePath::parse("a/ .. /b"), Err(CliError::InvalidPath(_))));
        assert!(RemotePath::parse("a/b /").unwrap().has_directory_hint());
    }

    #[test]
    fn test_dots_inside_names_are_fine() {
        assert_eq!(norm("..hidden/a..b"), "..hidden/a..b");
        assert_eq!(norm(".env"), ".env");
    }

    #[test]
    fn test_directory_hint() {
        assert!(RemotePath::parse("a/b/").unwrap().has_directory_hint());
        assert!(RemotePath::parse("a/b//").unwrap().has_directory_hint());
        assert!(!RemotePath::parse("a/b").unwrap().has_directory_hint());
        assert!(!RemotePath::parse("/").unwrap().has_directory_hint());
    }

    #[test]
    fn test_normalization_is_idempotent() {
        for raw in [
            "./a//b/",
            "/x/y",
            "a",
            ".//a/./b/c//",
            "dir/file.tar.gz",
            "/ a",
            "a/b /",
            "./ ./x",
            "a/ /b",
        ] {
            let once = norm(raw);
            assert_eq!(norm(&once), once, "input {:?}", raw);
        }
    }

    #[test]
    fn test_to_path_buf() {
        let path = RemotePath::parse("x/y/z.txt").unwrap();
        assert_eq!(path.to_path_buf(), PathBuf::from("x").join("y").join("z.txt"));
        assert_eq!(RemotePath::root().to_path_buf(), PathBuf::new());
    }

    #[test]
    fn test_repo_names() {
        assert_eq!(RepoName::parse(" my-env ").unwrap().as_str(), "my-env");
        assert!(RepoName::parse("").is_err());
        assert!(RepoName::parse("..").is_err());
        assert!(RepoName::parse("a/b").is_err());
        assert!(RepoName::parse("a\\b").is_err());
    }
}
