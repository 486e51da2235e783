//! Prelude module for convenient imports
//!
//! Use `use unifs::prelude::*;` to import commonly used types

// Entities
pub use crate::core::{ByteStream, FileBuffer, FileInfo, FileStream, FileType, WriteData};

// Contract and backends
pub use crate::storage::{
    Backend, FileSystem, FtpConfig, FtpFileSystem, LocalFileSystem, Storage, StorageConfig,
    WebdavConfig, WebdavFileSystem,
};

// Error handling
pub use crate::error::{Result, UnifsError};
