use crate::storage::{FileSystem, Storage};
use clap::Parser;
use futures_util::TryStreamExt;

#[derive(Parser, Debug)]
#[command(name = "find", about = "Print every file below a path")]
pub struct FindCommand {
    #[arg(default_value = "/")]
    pub path: String,

    /// Only print files whose name contains this text
    #[arg(long)]
    pub name: Option<String>,
}

pub async fn execute(command: FindCommand, storage: &Storage) -> anyhow::Result<()> {
    // Print as the walk goes instead of collecting the whole tree first
    let mut files = storage.walk(&command.path);
    let mut count = 0usize;
    while let Some(file) = files.try_next().await? {
        let wanted = command
            .name
            .as_deref()
            .is_none_or(|needle| file.filename.contains(needle));
        if wanted {
            println!("{}", file.path);
            count += 1;
        }
    }
    tracing::debug!("find matched {} files", count);
    Ok(())
}
