use crate::cli::ui::{display_info, display_success};
use crate::storage::{Backend, FileSystem, Storage};
use clap::Parser;
use inquire::Confirm;

#[derive(Parser, Debug)]
#[command(name = "rm", about = "Delete a file or directory")]
pub struct RmCommand {
    pub path: String,

    /// Refuse to delete a directory that still has entries
    #[arg(long)]
    pub no_recursive: bool,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

pub async fn execute(command: RmCommand, storage: &Storage) -> anyhow::Result<()> {
    if !command.yes {
        let info = storage.head(&command.path).await?;
        let what = if info.is_dir() { "directory" } else { "file" };
        let confirmed = Confirm::new(&format!("Delete {} {}?", what, info.path))
            .with_default(false)
            .prompt()?;
        if !confirmed {
            display_info("Nothing deleted");
            return Ok(());
        }
    }

    let removed = storage.remove(&command.path, !command.no_recursive).await?;
    display_success(&format!("Deleted {}", removed.path));
    Ok(())
}
