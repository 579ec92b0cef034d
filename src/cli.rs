//! Command-line arguments for the `ofs` binary.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use ofs_client::Credentials;
use secrecy::SecretString;

/// Command-line access to an object storage account.
///
/// Connection settings can be given as flags or environment variables.
#[derive(Debug, Parser)]
#[command(name = "ofs", version, about = "Object storage client")]
pub struct Cli {
    #[command(flatten)]
    pub credentials: CredentialArgs,

    /// Request timeout in seconds (no timeout when unset)
    #[arg(long, env = "OFS_TIMEOUT_SECS", global = true)]
    pub timeout_secs: Option<u64>,

    /// Slack webhook notified when a command fails
    #[arg(long, env = "SLACK_WEBHOOK_URL", hide_env_values = true, global = true)]
    pub slack_webhook_url: Option<String>,

    /// Log filter (trace, debug, info, warn, error or an EnvFilter directive)
    #[arg(long, env = "LOG_LEVEL", default_value = "info", global = true)]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Args)]
pub struct CredentialArgs {
    /// API user name
    #[arg(long, env = "OFS_USERNAME", global = true)]
    pub username: Option<String>,

    /// API password
    #[arg(long, env = "OFS_PASSWORD", hide_env_values = true, global = true)]
    pub password: Option<SecretString>,

    /// Tenant identifier
    #[arg(long, env = "OFS_TENANT_ID", global = true)]
    pub tenant_id: Option<String>,

    /// Token-issuing endpoint
    #[arg(long, env = "OFS_TOKEN_URL", global = true)]
    pub token_url: Option<String>,

    /// Object storage account URL
    #[arg(long, env = "OFS_STORAGE_URL", global = true)]
    pub storage_url: Option<String>,
}

impl CredentialArgs {
    pub fn credentials(&self) -> anyhow::Result<Credentials> {
        Ok(Credentials {
            username: required(&self.username, "--username / OFS_USERNAME")?,
            password: self
                .password
                .clone()
                .context("missing --password / OFS_PASSWORD")?,
            tenant_id: required(&self.tenant_id, "--tenant-id / OFS_TENANT_ID")?,
            token_url: required(&self.token_url, "--token-url / OFS_TOKEN_URL")?,
            storage_url: required(&self.storage_url, "--storage-url / OFS_STORAGE_URL")?,
        })
    }
}

fn required(value: &Option<String>, name: &str) -> anyhow::Result<String> {
    value.clone().with_context(|| format!("missing {name}"))
}

impl Cli {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Create a container
    CreateContainer { name: String },

    /// Download an object
    Get {
        /// Object URI, e.g. `container/path/file.txt`
        uri: String,
        /// Local directory to write into
        #[arg(short, long, default_value = ".")]
        output: PathBuf,
        /// Write to `<output>/<file name>` instead of `<output>/<uri>`
        #[arg(long)]
        omit_folders: bool,
    },

    /// Upload a local file into a remote directory
    Put { file: PathBuf, put_path: String },

    /// Delete an object or an empty container
    Delete { uri: String },

    /// List objects in a container
    List {
        container: String,
        #[arg(long, default_value = "")]
        prefix: String,
    },

    /// Allow anonymous reads on a container
    Publish { container: String },

    /// Revoke anonymous reads on a container
    Unpublish { container: String },

    /// Post a message to the Slack webhook
    Notify { text: String },
}

impl Commands {
    pub fn name(&self) -> &'static str {
        match self {
            Commands::CreateContainer { .. } => "create-container",
            Commands::Get { .. } => "get",
            Commands::Put { .. } => "put",
            Commands::Delete { .. } => "delete",
            Commands::List { .. } => "list",
            Commands::Publish { .. } => "publish",
            Commands::Unpublish { .. } => "unpublish",
            Commands::Notify { .. } => "notify",
        }
    }
}
