// API client module: a small blocking HTTP client for the environment
// repository service. Every call takes the bearer token explicitly; the
// commands decide where it comes from.

use crate::config::Config;
use crate::error::{CliError, Result};
use crate::remote_path::{RemotePath, RepoName};
use reqwest::blocking::{multipart, Client, RequestBuilder, Response};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Operations the CLI needs from the service. `ApiClient` is the real
/// implementation; tests provide their own.
pub trait EnvironmentApi {
    /// Check a token and return the account it belongs to.
    fn validate_token(&self, token: &str) -> Result<UserInfo>;
    fn create_repo(&self, token: &str, repo: &RepoName) -> Result<CreatedRepo>;
    fn push_repo(
        &self,
        token: &str,
        repo: &RepoName,
        tarball: Vec<u8>,
        commit_message: Option<&str>,
    ) -> Result<serde_json::Value>;
    /// Download the repository as tar.gz bytes.
    fn pull_repo(&self, token: &str, repo: &RepoName) -> Result<Vec<u8>>;
    fn delete_path(&self, token: &str, repo: &RepoName, path: &RemotePath) -> Result<serde_json::Value>;
}

/// Body of `GET /auth/validate`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct UserInfo {
    pub username: String,
}

/// Body of `POST /env/create`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct CreatedRepo {
    pub repo_url: String,
}

#[derive(Serialize, Debug)]
struct CreateRequest<'a> {
    env_name: &'a str,
}

#[derive(Serialize, Debug)]
struct DeleteRequest<'a> {
    path: &'a str,
}

/// Blocking client holding the reqwest client and the service base URL.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: Url,
}

impl ApiClient {
    /// Only connecting is time-limited; uploads and downloads may take as
    /// long as they need.
    pub fn new(config: &Config) -> Result<Self> {
        let base_url = Url::parse(&config.api_url).map_err(|e| CliError::Transport {
            status: None,
            message: format!("invalid API URL '{}': {}", config.api_url, e),
        })?;
        let client = Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(None::<Duration>)
            .user_agent(concat!("openverse-cli/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(ApiClient { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    /// Append path segments to the base URL, percent-encoding each one so a
    /// repository name can never change the route.
    fn url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| CliError::Transport {
                status: None,
                message: format!("API URL '{}' cannot take a path", self.base_url),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn auth_headers(token: &str) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        let val = HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|_| CliError::Auth("token contains characters not allowed in a header".into()))?;
        headers.insert(AUTHORIZATION, val);
        Ok(headers)
    }

    /// Send a request and turn any non-2xx answer into a classified error.
    fn send(&self, req: RequestBuilder, what: &str) -> Result<Response> {
        let res = req.send()?;
        let status = res.status();
        debug!(request = what, status = status.as_u16(), "response received");
        if !status.is_success() {
            let txt = res.text().unwrap_or_default();
            return Err(CliError::from_status(status, txt));
        }
        Ok(res)
    }
}

impl EnvironmentApi for ApiClient {
    fn validate_token(&self, token: &str) -> Result<UserInfo> {
        let req = self
            .client
            .get(self.url(&["auth", "validate"])?)
            .headers(Self::auth_headers(token)?);
        let res = self.send(req, "validate")?;
        Ok(res.json()?)
    }

    fn create_repo(&self, token: &str, repo: &RepoName) -> Result<CreatedRepo> {
        let req = self
            .client
            .post(self.url(&["env", "create"])?)
            .headers(Self::auth_headers(token)?)
            .json(&CreateRequest {
                env_name: repo.as_str(),
            });
        let res = self.send(req, "create")?;
        Ok(res.json()?)
    }

    fn push_repo(
        &self,
        token: &str,
        repo: &RepoName,
        tarball: Vec<u8>,
        commit_message: Option<&str>,
    ) -> Result<serde_json::Value> {
        let part = multipart::Part::bytes(tarball)
            .file_name("repo.tar.gz")
            .mime_str("application/gzip")?;
        let mut form = multipart::Form::new().part("tarball", part);
        if let Some(msg) = commit_message.filter(|m| !m.is_empty()) {
            form = form.text("commit_message", msg.to_string());
        }

        let req = self
            .client
            .post(self.url(&["env", repo.as_str(), "push"])?)
            .headers(Self::auth_headers(token)?)
            .multipart(form);
        let res = self.send(req, "push")?;
        Ok(res.json()?)
    }

    fn pull_repo(&self, token: &str, repo: &RepoName) -> Result<Vec<u8>> {
        let req = self
            .client
            .get(self.url(&["env", repo.as_str(), "pull"])?)
            .headers(Self::auth_headers(token)?);
        let res = self.send(req, "pull")?;
        Ok(res.bytes()?.to_vec())
    }

    fn delete_path(&self, token: &str, repo: &RepoName, path: &RemotePath) -> Result<serde_json::Value> {
        let req = self
            .client
            .post(self.url(&["env", repo.as_str(), "delete"])?)
            .headers(Self::auth_headers(token)?)
            .json(&DeleteRequest { path: path.as_str() });
        let res = self.send(req, "delete")?;
        Ok(res.json()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_urls_are_joined_to_base() {
        let config = Config::resolve(Some("http://localhost:9000/cli/".into()), Some(PathBuf::from("/tmp")), None);
        let api = ApiClient::new(&config).unwrap();
        assert_eq!(api.base_url(), "http://localhost:9000/cli");
        assert_eq!(
            api.url(&["env", "create"]).unwrap().as_str(),
            "http://localhost:9000/cli/env/create"
        );
    }

    #[test]
    fn test_repo_name_cannot_change_route() {
        let config = Config::resolve(Some("http://localhost:9000/cli".into()), Some(PathBuf::from("/tmp")), None);
        let api = ApiClient::new(&config).unwrap();
        let repo = RepoName::parse("a#b?c%d").unwrap();
        assert_eq!(
            api.url(&["env", repo.as_str(), "pull"]).unwrap().as_str(),
            "http://localhost:9000/cli/env/a%23b%3Fc%25d/pull"
        );
    }

    #[test]
    fn test_root_base_url() {
        let config = Config::resolve(Some("http://localhost:9000".into()), Some(PathBuf::from("/tmp")), None);
        let api = ApiClient::new(&config).unwrap();
        assert_eq!(
            api.url(&["auth", "validate"]).unwrap().as_str(),
            "http://localhost:9000/auth/validate"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        let config = Config::resolve(Some("not a url".into()), Some(PathBuf::from("/tmp")), None);
        assert!(matches!(ApiClient::new(&config), Err(CliError::Transport { status: None, .. })));
    }

    #[test]
    fn test_auth_header() {
        let headers = ApiClient::auth_headers("abc").unwrap();
        assert_eq!(headers.get(AUTHORIZATION).unwrap(), "Bearer abc");
        assert!(matches!(ApiClient::auth_headers("bad\ntoken"), Err(CliError::Auth(_))));
    }

    #[test]
    fn test_unreachable_server_is_transport_error() {
        // port 9 (discard) on localhost is not expected to serve HTTP
        let config = Config::resolve(Some("http://127.0.0.1:9".into()), Some(PathBuf::from("/tmp")), Some(2));
        let api = ApiClient::new(&config).unwrap();
        let err = api.validate_token("t").unwrap_err();
        assert!(matches!(err, CliError::Transport { status: None, .. }));
    }
}
