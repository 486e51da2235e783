use crate::cli::ui::display_success;
use crate::core::ByteStream;
use crate::storage::{FileSystem, Storage};
use crate::UnifsError;
use clap::Parser;
use std::path::PathBuf;
use tokio_util::io::ReaderStream;

#[derive(Parser, Debug)]
#[command(name = "put", about = "Upload a local file")]
pub struct PutCommand {
    pub local: PathBuf,

    pub remote: String,

    /// Replace the destination if it already exists
    #[arg(short, long)]
    pub overwrite: bool,
}

pub async fn execute(command: PutCommand, storage: &Storage) -> anyhow::Result<()> {
    let file = tokio::fs::File::open(&command.local).await?;
    let stream: ByteStream = Box::pin(ReaderStream::new(file));

    match storage.write(&command.remote, stream, command.overwrite).await {
        Ok(()) => {
            display_success(&format!(
                "{} -> {}",
                command.local.display(),
                command.remote
            ));
            Ok(())
        }
        Err(UnifsError::AlreadyExists { path }) => {
            anyhow::bail!("{} already exists, pass --overwrite to replace it", path)
        }
        Err(e) => Err(e.into()),
    }
}
