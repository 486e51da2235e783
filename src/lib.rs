pub mod core;
pub mod error;
pub mod prelude;
pub mod storage;

pub use crate::core::{
    get_mime_type, ByteStream, FileBuffer, FileInfo, FileStream, FileType, WriteData,
};
pub use crate::error::{Result, UnifsError};
pub use crate::storage::{
    Backend, FileSystem, FtpConfig, FtpFileSystem, LocalFileSystem, Storage, StorageConfig,
    WebdavConfig, WebdavFileSystem,
};

#[cfg(feature = "cli")]
pub mod cli;
