use crate::cli::ui::display_success;
use crate::storage::{Backend, Storage};
use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "mkdir", about = "Create a directory and any missing parents")]
pub struct MkdirCommand {
    pub path: String,
}

pub async fn execute(command: MkdirCommand, storage: &Storage) -> anyhow::Result<()> {
    storage.ensure_dir(&command.path).await?;
    display_success(&format!("Created {}", command.path));
    Ok(())
}
