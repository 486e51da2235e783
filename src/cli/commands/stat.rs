use crate::cli::ui::{display_file_info, display_warning};
use crate::storage::{Backend, Storage};
use crate::UnifsError;
use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "stat", about = "Show the metadata of a file or directory")]
pub struct StatCommand {
    pub path: String,
}

pub async fn execute(command: StatCommand, storage: &Storage) -> anyhow::Result<()> {
    match storage.head(&command.path).await {
        Ok(info) => display_file_info(&info),
        Err(UnifsError::NotFound { .. }) => {
            display_warning(&format!("{} does not exist", command.path));
        }
        Err(e) => return Err(e.into()),
    }
    Ok(())
}
