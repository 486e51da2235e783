use crate::cli::ui::{display_success, format_size};
use crate::storage::{FileSystem, Storage};
use clap::Parser;
use futures_util::TryStreamExt;
use std::path::PathBuf;
use tokio::io::AsyncWriteExt;

#[derive(Parser, Debug)]
#[command(name = "get", about = "Download a file to local disk")]
pub struct GetCommand {
    pub remote: String,

    /// Local destination; defaults to the remote file name in the current directory
    pub local: Option<PathBuf>,
}

pub async fn execute(command: GetCommand, storage: &Storage) -> anyhow::Result<()> {
    let mut file = storage.read(&command.remote).await?;
    let local = command
        .local
        .unwrap_or_else(|| PathBuf::from(&file.info.filename));

    let mut out = tokio::fs::File::create(&local).await?;
    let mut written = 0u64;
    while let Some(chunk) = file.stream.try_next().await? {
        out.write_all(&chunk).await?;
        written += chunk.len() as u64;
    }
    out.flush().await?;

    display_success(&format!(
        "{} -> {} ({})",
        file.info.path,
        local.display(),
        format_size(written)
    ));
    Ok(())
}
