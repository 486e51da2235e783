use crate::storage::{FileSystem, Storage};
use clap::Parser;
use futures_util::TryStreamExt;
use tokio::io::AsyncWriteExt;

#[derive(Parser, Debug)]
#[command(name = "cat", about = "Write the content of a file to stdout")]
pub struct CatCommand {
    pub path: String,
}

pub async fn execute(command: CatCommand, storage: &Storage) -> anyhow::Result<()> {
    let mut file = storage.read(&command.path).await?;
    let mut stdout = tokio::io::stdout();
    while let Some(chunk) = file.stream.try_next().await? {
        stdout.write_all(&chunk).await?;
    }
    stdout.flush().await?;
    Ok(())
}
