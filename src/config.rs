//! 命令行参数和 TOML 配置文件。
//!
//! 优先级：命令行 / 环境变量 > 配置文件 > 默认值。

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Deserialize;

use crate::client::DEFAULT_REFRESH_DELAY;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:8000";

#[derive(Debug, Parser)]
#[command(name = "filedeck", version, about, long_about = None)]
pub struct Cli {
    /// TOML config file with [server] / [client] tables
    #[arg(long, global = true, env = "FILEDECK_CONFIG")]
    pub config: Option<PathBuf>,

    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Pretty, env = "FILEDECK_LOG_FORMAT")]
    pub log_format: LogFormat,

    /// Also write logs to a daily rolling file in this directory
    #[arg(long, global = true, env = "FILEDECK_LOG_DIR")]
    pub log_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Serve a directory over HTTP
    Serve(ServeArgs),
    /// List a remote directory
    Ls {
        /// Directory path relative to the served root
        path: Option<String>,
        #[command(flatten)]
        client: ClientArgs,
    },
    /// Upload local files into the served root
    Upload {
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Directory to show after the upload finishes
        #[arg(long)]
        path: Option<String>,
        #[command(flatten)]
        client: ClientArgs,
    },
    /// Download a remote file
    Get {
        path: String,
        /// Destination file (defaults to the remote file name)
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[command(flatten)]
        client: ClientArgs,
    },
}

#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Directory to serve (defaults to the working directory)
    #[arg(long, env = "FILEDECK_ROOT")]
    pub root: Option<PathBuf>,
    #[arg(long, env = "FILEDECK_HOST")]
    pub host: Option<String>,
    #[arg(short, long, env = "FILEDECK_PORT")]
    pub port: Option<u16>,
    /// Request body limit for uploads; 0 disables the limit
    #[arg(long, env = "FILEDECK_MAX_UPLOAD_BYTES")]
    pub max_upload_bytes: Option<u64>,
}

#[derive(Debug, Args)]
pub struct ClientArgs {
    /// Base URL of a filedeck server
    #[arg(long, env = "FILEDECK_SERVER")]
    pub server: Option<String>,
    /// Delay before the listing refreshes after a successful upload
    #[arg(long, env = "FILEDECK_REFRESH_DELAY_MS")]
    pub refresh_delay_ms: Option<u64>,
}

/// 配置文件内容
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub server: ServerSection,
    pub client: ClientSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerSection {
    pub root: Option<PathBuf>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub max_upload_bytes: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClientSection {
    pub server: Option<String>,
    pub refresh_delay_ms: Option<u64>,
}

impl FileConfig {
    /// 没有指定文件时返回默认配置
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read config {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("invalid config {}", path.display()))
    }

    pub fn parse(text: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(text)?)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub root: PathBuf,
    pub host: String,
    pub port: u16,
    pub max_upload_bytes: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub server: String,
    pub refresh_delay: Duration,
}

impl ServeArgs {
    pub fn resolve(self, file: &FileConfig) -> anyhow::Result<ServerConfig> {
        let root = match self.root.or_else(|| file.server.root.clone()) {
            Some(root) => root,
            None => std::env::current_dir().context("cannot determine working directory")?,
        };
        Ok(ServerConfig {
            root,
            host: self
                .host
                .or_else(|| file.server.host.clone())
                .unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: self.port.or(file.server.port).unwrap_or(DEFAULT_PORT),
            max_upload_bytes: self
                .max_upload_bytes
                .or(file.server.max_upload_bytes)
                .unwrap_or(0),
        })
    }
}

impl ClientArgs {
    pub fn resolve(self, file: &FileConfig) -> ClientConfig {
        ClientConfig {
            server: self
                .server
                .or_else(|| file.client.server.clone())
                .unwrap_or_else(|| DEFAULT_SERVER_URL.to_string()),
            refresh_delay: self
                .refresh_delay_ms
                .or(file.client.refresh_delay_ms)
                .map(Duration::from_millis)
                .unwrap_or(DEFAULT_REFRESH_DELAY),
        }
    }
}
