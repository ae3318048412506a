use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::Parser;

mod client;
mod config;
mod error;
mod html;
mod logging;
mod model;
mod server;
mod view;

use client::{ApiClient, LoadOutcome, PendingFile, Session, TerminalUi, UploadOutcome};
use config::{ClientConfig, Cli, Command, FileConfig};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // 1. 日志
    let _guard = match logging::init(cli.log_format, cli.log_dir.as_deref()) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("failed to initialize logging: {:#}", e);
            return ExitCode::FAILURE;
        }
    };

    // 2. 执行子命令
    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let file = FileConfig::load(cli.config.as_deref())?;

    match cli.command {
        Command::Serve(args) => {
            server::serve(args.resolve(&file)?).await?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Ls { path, client } => {
            let mut session = session(client.resolve(&file))?;
            Ok(exit_for_load(session.load(&path.unwrap_or_default()).await))
        }
        Command::Upload { files, path, client } => {
            upload(client.resolve(&file), files, path.unwrap_or_default()).await
        }
        Command::Get { path, output, client } => {
            let config = client.resolve(&file);
            let api = ApiClient::new(&config.server)?;
            let dest = match output {
                Some(dest) => dest,
                None => default_output(&path)?,
            };
            let written = api
                .download(&path, &dest)
                .await
                .with_context(|| format!("download of {} failed", path))?;
            tracing::info!(path = %path, dest = %dest.display(), bytes = written, "downloaded");
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn session(config: ClientConfig) -> Result<Session<TerminalUi>> {
    let api = ApiClient::new(&config.server)?;
    Ok(Session::new(api, TerminalUi::new()).with_refresh_delay(config.refresh_delay))
}

fn exit_for_load(outcome: LoadOutcome) -> ExitCode {
    match outcome {
        LoadOutcome::Loaded => ExitCode::SUCCESS,
        LoadOutcome::Rejected(_) | LoadOutcome::Unreachable => ExitCode::FAILURE,
    }
}

async fn upload(config: ClientConfig, files: Vec<PathBuf>, path: String) -> Result<ExitCode> {
    let mut session = session(config)?;

    // 先进入目标目录，上传完成后刷新的就是它
    if let LoadOutcome::Rejected(_) | LoadOutcome::Unreachable = session.load(&path).await {
        return Ok(ExitCode::FAILURE);
    }

    let mut pending = Vec::with_capacity(files.len());
    for file in &files {
        let entry = PendingFile::open(file)
            .await
            .with_context(|| format!("cannot read {}", file.display()))?;
        pending.push(entry);
    }
    session.add_files(pending);

    match session.upload().await {
        UploadOutcome::Completed => {
            tracing::debug!(path = %session.state().current_path, "listing refreshed");
            Ok(ExitCode::SUCCESS)
        }
        UploadOutcome::Skipped => Ok(ExitCode::SUCCESS),
        UploadOutcome::Rejected(_) | UploadOutcome::Failed => Ok(ExitCode::FAILURE),
    }
}

/// 远程路径的最后一段作为本地文件名
fn default_output(path: &str) -> Result<PathBuf> {
    match path.rsplit('/').next().filter(|name| !name.is_empty()) {
        Some(name) => Ok(PathBuf::from(sanitize_filename::sanitize(name))),
        None => bail!("cannot derive a file name from `{}`; pass --output", path),
    }
}
