use clap::Parser;
use tracing_subscriber::filter::LevelFilter;
use unifs::cli::ui::display_error;
use unifs::cli::{run, Cli};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => LevelFilter::WARN,
        1 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let storage = cli.connection.storage()?;
    tracing::debug!("Using {} backend", storage.name());

    if let Err(e) = run(cli.command, &storage).await {
        display_error(&format!("{:#}", e));
        std::process::exit(1);
    }
    Ok(())
}
