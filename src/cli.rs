// CLI argument parsing and command dispatch.
// clap derive describes the verbs; `Cli::run` wires each one to the real
// API client and token file.

use crate::api::ApiClient;
use crate::commands;
use crate::config::Config;
use crate::error::Result;
use crate::remote_path::{RemotePath, RepoName};
use crate::token_store::FileTokenStore;
use crate::ui;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Openverse CLI: manage your AI environment repositories.
#[derive(Parser, Debug)]
#[command(name = "openverse")]
#[command(version)]
#[command(propagate_version = true)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOptions,

    #[command(subcommand)]
    pub command: Commands,
}

/// Options shared by every command.
#[derive(Args, Debug, Clone)]
pub struct GlobalOptions {
    /// Base URL of the repository service.
    #[arg(long, env = "OPENVERSE_API_URL", global = true)]
    pub api_url: Option<String>,

    /// Directory holding the stored token (default: ~/.openverse).
    #[arg(long, env = "OPENVERSE_CONFIG_DIR", global = true)]
    pub config_dir: Option<PathBuf>,

    /// Connection timeout in seconds. Transfers are not time-limited.
    #[arg(long = "connect-timeout", global = true)]
    pub connect_timeout_secs: Option<u64>,

    /// Enable debug logging.
    #[arg(short = 'v', long = "verbose", global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Suppress all logging output.
    #[arg(short = 'q', long = "quiet", global = true)]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Authenticate using an Openverse API token.
    Login,

    /// Log out of Openverse.
    Logout,

    /// Display the currently logged-in user.
    Whoami,

    /// Create a new environment repository.
    Create {
        #[arg(value_parser = parse_repo)]
        repo: RepoName,
    },

    /// Push local files to an environment repository.
    Push {
        #[arg(value_parser = parse_repo)]
        repo: RepoName,

        /// File or directory to upload.
        #[arg(default_value = ".")]
        local_path: PathBuf,

        /// Location inside the repository (default: the repository root).
        remote_path: Option<String>,

        /// Optional commit message for the push.
        #[arg(short = 'm', long = "message")]
        message: Option<String>,
    },

    /// Pull an environment repository into `<destination>/<repo>`.
    Pull {
        #[arg(value_parser = parse_repo)]
        repo: RepoName,

        #[arg(default_value = ".")]
        destination: PathBuf,
    },

    /// Delete a path inside an environment repository.
    Delete {
        #[arg(value_parser = parse_repo)]
        repo: RepoName,

        path: String,
    },
}

fn parse_repo(raw: &str) -> std::result::Result<RepoName, String> {
    RepoName::parse(raw).map_err(|e| e.to_string())
}

impl Cli {
    pub fn config(&self) -> Config {
        Config::resolve(
            self.global.api_url.clone(),
            self.global.config_dir.clone(),
            self.global.connect_timeout_secs,
        )
    }

    /// Run the selected command against the real service and token file.
    pub fn run(self) -> Result<()> {
        let config = self.config();
        let store = FileTokenStore::new(&config.config_dir);
        tracing::debug!(api_url = %config.api_url, config_dir = %config.config_dir.display(), "resolved configuration");

        match self.command {
            Commands::Login => {
                ui::banner();
                let api = ApiClient::new(&config)?;
                commands::login(&api, &store, ui::prompt_token).map(drop)
            }
            Commands::Logout => commands::logout(&store).map(drop),
            Commands::Whoami => commands::whoami(&store).map(drop),
            Commands::Create { repo } => {
                let api = ApiClient::new(&config)?;
                commands::create(&api, &store, &repo).map(drop)
            }
            Commands::Push {
                repo,
                local_path,
                remote_path,
                message,
            } => {
                let remote = match remote_path {
                    Some(raw) => RemotePath::parse(&raw)?,
                    None => RemotePath::root(),
                };
                let api = ApiClient::new(&config)?;
                commands::push(&api, &store, &repo, &local_path, &remote, message.as_deref()).map(drop)
            }
            Commands::Pull { repo, destination } => {
                let api = ApiClient::new(&config)?;
                commands::pull(&api, &store, &repo, &destination).map(drop)
            }
            Commands::Delete { repo, path } => {
                let path = RemotePath::parse(&path)?;
                let api = ApiClient::new(&config)?;
                commands::delete(&api, &store, &repo, &path).map(drop)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_push_defaults() {
        let cli = Cli::try_parse_from(["openverse", "push", "my-env"]).unwrap();
        match cli.command {
            Commands::Push {
                repo,
                local_path,
                remote_path,
                message,
            } => {
                assert_eq!(repo.as_str(), "my-env");
                assert_eq!(local_path, PathBuf::from("."));
                assert_eq!(remote_path, None);
                assert_eq!(message, None);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_push_with_all_arguments() {
        let cli = Cli::try_parse_from(["openverse", "push", "env", "./data", "x/y", "-m", "first"]).unwrap();
        match cli.command {
            Commands::Push {
                local_path,
                remote_path,
                message,
                ..
            } => {
                assert_eq!(local_path, PathBuf::from("./data"));
                assert_eq!(remote_path.as_deref(), Some("x/y"));
                assert_eq!(message.as_deref(), Some("first"));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_bad_repo_name_rejected_at_parse_time() {
        assert!(Cli::try_parse_from(["openverse", "create", "a/b"]).is_err());
        assert!(Cli::try_parse_from(["openverse", "pull", ".."]).is_err());
    }

    #[test]
    fn test_global_options() {
        let cli = Cli::try_parse_from([
            "openverse",
            "whoami",
            "--config-dir",
            "/tmp/ov",
            "--api-url",
            "http://localhost:1/",
            "--connect-timeout",
            "7",
            "-v",
        ])
        .unwrap();
        let config = cli.config();
        assert_eq!(config.config_dir, PathBuf::from("/tmp/ov"));
        assert_eq!(config.api_url, "http://localhost:1");
        assert_eq!(config.connect_timeout, std::time::Duration::from_secs(7));
        assert!(cli.global.verbose);
        assert!(Cli::try_parse_from(["openverse", "whoami", "-v", "-q"]).is_err());
    }
}
