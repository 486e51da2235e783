pub mod backend;
pub mod ftp;
pub mod tokio_fs;
pub mod traits;
pub mod webdav;

pub use backend::Backend;
pub use ftp::{FtpConfig, FtpFileSystem};
pub use tokio_fs::LocalFileSystem;
pub use traits::{FileSystem, FileWalk};
pub use webdav::{WebdavConfig, WebdavFileSystem};

use crate::core::{ByteStream, FileInfo, WriteData};
use crate::error::Result;
use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Which backend to talk to, with its connection parameters.
///
/// ```json
/// { "backend": "ftp", "host": "ftp.example.com", "user": "me", "password": "..." }
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "backend", rename_all = "lowercase")]
pub enum StorageConfig {
    Local,
    Ftp(FtpConfig),
    Webdav(WebdavConfig),
}

/// A backend chosen at construction time
#[derive(Clone, Debug)]
pub enum Storage {
    Local(LocalFileSystem),
    Ftp(FtpFileSystem),
    Webdav(WebdavFileSystem),
}

impl From<StorageConfig> for Storage {
    fn from(config: StorageConfig) -> Self {
        match config {
            StorageConfig::Local => Self::Local(LocalFileSystem::new()),
            StorageConfig::Ftp(config) => Self::Ftp(FtpFileSystem::new(config)),
            StorageConfig::Webdav(config) => Self::Webdav(WebdavFileSystem::new(config)),
        }
    }
}

impl Storage {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Local(_) => "local",
            Self::Ftp(_) => "ftp",
            Self::Webdav(_) => "webdav",
        }
    }
}

macro_rules! delegate {
    ($self:ident, $fs:ident => $call:expr) => {
        match $self {
            Storage::Local($fs) => $call,
            Storage::Ftp($fs) => $call,
            Storage::Webdav($fs) => $call,
        }
    };
}

#[async_trait]
impl Backend for Storage {
    fn join(&self, segments: &[&str]) -> String {
        delegate!(self, fs => fs.join(segments))
    }

    async fn head(&self, path: &str) -> Result<FileInfo> {
        delegate!(self, fs => fs.head(path).await)
    }

    async fn list(&self, path: &str) -> Result<Vec<FileInfo>> {
        delegate!(self, fs => fs.list(path).await)
    }

    async fn ensure_dir(&self, path: &str) -> Result<()> {
        delegate!(self, fs => fs.ensure_dir(path).await)
    }

    async fn get_readable(&self, path: &str) -> Result<ByteStream> {
        delegate!(self, fs => fs.get_readable(path).await)
    }

    async fn get_buffer(&self, path: &str) -> Result<Bytes> {
        delegate!(self, fs => fs.get_buffer(path).await)
    }

    async fn write_file(&self, path: &str, data: WriteData, overwrite: bool) -> Result<()> {
        delegate!(self, fs => fs.write_file(path, data, overwrite).await)
    }

    async fn remove_file(&self, path: &str) -> Result<()> {
        delegate!(self, fs => fs.remove_file(path).await)
    }

    async fn remove_dir_recursive(&self, path: &str) -> Result<()> {
        delegate!(self, fs => fs.remove_dir_recursive(path).await)
    }
}
