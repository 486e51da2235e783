use crate::cli::commands::{
    CatCommand, FindCommand, GetCommand, ListCommand, MkdirCommand, PutCommand, RmCommand,
    StatCommand,
};
use crate::storage::{FtpConfig, Storage, StorageConfig, WebdavConfig};
use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "unifs", about = "Browse and move files on local disk, FTP and WebDAV", long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    Ls(ListCommand),
    Stat(StatCommand),
    Find(FindCommand),
    Cat(CatCommand),
    Get(GetCommand),
    Put(PutCommand),
    Mkdir(MkdirCommand),
    Rm(RmCommand),
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BackendKind {
    #[default]
    Local,
    Ftp,
    Webdav,
}

#[derive(Args, Debug)]
pub struct ConnectionArgs {
    /// Storage backend to talk to
    #[arg(short, long, global = true, value_enum, default_value_t = BackendKind::Local)]
    pub backend: BackendKind,

    /// FTP host name, or WebDAV base URL
    #[arg(long, global = true, env = "UNIFS_HOST")]
    pub host: Option<String>,

    #[arg(long, global = true, env = "UNIFS_PORT")]
    pub port: Option<u16>,

    #[arg(short, long, global = true, env = "UNIFS_USER")]
    pub user: Option<String>,

    #[arg(long, global = true, env = "UNIFS_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
}

impl ConnectionArgs {
    pub fn storage_config(&self) -> anyhow::Result<StorageConfig> {
        let config = match self.backend {
            BackendKind::Local => StorageConfig::Local,
            BackendKind::Ftp => {
                let mut config = FtpConfig::new(self.require_host()?, 21, "anonymous", "");
                if let Some(port) = self.port {
                    config.port = port;
                }
                if let Some(user) = &self.user {
                    config.user = user.clone();
                }
                if let Some(password) = &self.password {
                    config.password = password.clone();
                }
                StorageConfig::Ftp(config)
            }
            BackendKind::Webdav => StorageConfig::Webdav(WebdavConfig::new(
                self.require_host()?,
                self.user.clone().unwrap_or_default(),
                self.password.clone().unwrap_or_default(),
            )),
        };
        Ok(config)
    }

    pub fn storage(&self) -> anyhow::Result<Storage> {
        Ok(Storage::from(self.storage_config()?))
    }

    fn require_host(&self) -> anyhow::Result<String> {
        self.host
            .clone()
            .ok_or_else(|| anyhow::anyhow!("--host (or UNIFS_HOST) is required for this backend"))
    }
}
