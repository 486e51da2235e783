use crate::cli::ui::file_table;
use crate::storage::{Backend, Storage};
use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "ls", about = "List the entries of a directory")]
pub struct ListCommand {
    #[arg(default_value = "/")]
    pub path: String,

    /// Print the entries as JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

pub async fn execute(command: ListCommand, storage: &Storage) -> anyhow::Result<()> {
    let entries = storage.list(&command.path).await?;

    if command.json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
    } else if entries.is_empty() {
        println!("(empty)");
    } else {
        println!("{}", file_table(&entries));
    }
    Ok(())
}
