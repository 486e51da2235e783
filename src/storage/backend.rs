use crate::core::{ByteStream, FileInfo, WriteData};
use crate::error::Result;
use async_trait::async_trait;
use bytes::Bytes;

/// Primitives a storage backend must supply.
///
/// Everything callers normally use (`exists`, `read`, `write`, `remove`,
/// traversal) lives on [`FileSystem`](crate::storage::FileSystem), which is
/// implemented once on top of these for every backend.
///
/// Backends report an absent path as [`UnifsError::NotFound`](crate::UnifsError::NotFound)
/// and pass any other failure through.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Build a path from segments using the backend's own syntax
    fn join(&self, segments: &[&str]) -> String {
        segments.join("/")
    }

    /// Stat a single path
    async fn head(&self, path: &str) -> Result<FileInfo>;

    /// Immediate children of a directory, in the backend's native order
    async fn list(&self, path: &str) -> Result<Vec<FileInfo>>;

    /// Create a directory and any missing ancestors
    async fn ensure_dir(&self, path: &str) -> Result<()>;

    /// Open the content of a file as a stream
    async fn get_readable(&self, path: &str) -> Result<ByteStream>;

    /// Read the whole content of a file
    async fn get_buffer(&self, path: &str) -> Result<Bytes>;

    /// Commit a payload to a path
    async fn write_file(&self, path: &str, data: WriteData, overwrite: bool) -> Result<()>;

    /// Delete one file, or one empty directory
    async fn remove_file(&self, path: &str) -> Result<()>;

    /// Delete a directory and everything below it
    async fn remove_dir_recursive(&self, path: &str) -> Result<()>;
}
