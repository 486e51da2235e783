pub mod cli;
pub mod commands;
pub mod ui;

pub use cli::{BackendKind, Cli, Commands, ConnectionArgs};

use crate::storage::Storage;

/// Run one parsed subcommand against a backend
pub async fn run(command: Commands, storage: &Storage) -> anyhow::Result<()> {
    match command {
        Commands::Ls(cmd) => commands::list::execute(cmd, storage).await,
        Commands::Stat(cmd) => commands::stat::execute(cmd, storage).await,
        Commands::Find(cmd) => commands::find::execute(cmd, storage).await,
        Commands::Cat(cmd) => commands::cat::execute(cmd, storage).await,
        Commands::Get(cmd) => commands::get::execute(cmd, storage).await,
        Commands::Put(cmd) => commands::put::execute(cmd, storage).await,
        Commands::Mkdir(cmd) => commands::mkdir::execute(cmd, storage).await,
        Commands::Rm(cmd) => commands::rm::execute(cmd, storage).await,
    }
}
