use crate::core::{FileBuffer, FileInfo, FileStream, WriteData};
use crate::error::{Result, UnifsError};
use crate::storage::backend::Backend;
use async_stream::try_stream;
use async_trait::async_trait;
use bytes::Bytes;
use futures_util::stream::{BoxStream, Stream};
use futures_util::TryStreamExt;
use std::future::Future;

/// Lazy pre-order sequence of the files below a path
pub type FileWalk<'a> = BoxStream<'a, Result<FileInfo>>;

/// Storage-agnostic file access, implemented once for every [`Backend`].
///
/// None of these operations are atomic. `write` without `overwrite` and
/// `remove` both look before they act, so a concurrent writer can slip in
/// between the two steps. Callers that need atomicity coordinate externally.
#[async_trait]
pub trait FileSystem: Backend {
    /// Check if a path exists. An absent path is `Ok(false)`, never an error.
    async fn exists(&self, path: &str) -> Result<bool> {
        match self.head(path).await {
            Ok(_) => Ok(true),
            Err(UnifsError::NotFound { .. }) => {
                tracing::debug!("{} does not exist", path);
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    /// Open a file as a stream
    async fn read(&self, path: &str) -> Result<FileStream> {
        let info = check_before_read(self, path).await?;
        tracing::debug!("Opening {} ({} bytes)", path, info.size);
        let stream = self.get_readable(path).await?;
        Ok(FileStream { info, stream })
    }

    /// Read a whole file into memory
    async fn get(&self, path: &str) -> Result<FileBuffer> {
        let info = check_before_read(self, path).await?;
        tracing::debug!("Reading {} ({} bytes)", path, info.size);
        let buffer = self.get_buffer(path).await?;
        Ok(FileBuffer { info, buffer })
    }

    async fn read_buffer(&self, path: &str) -> Result<Bytes> {
        tracing::debug!("Reading buffer of {}", path);
        Ok(self.get(path).await?.buffer)
    }

    /// Read a file as UTF-8 text. Invalid sequences are replaced.
    async fn read_text(&self, path: &str) -> Result<String> {
        tracing::debug!("Reading text of {}", path);
        let buffer = self.read_buffer(path).await?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }

    /// Write a payload, refusing to replace an existing path unless `overwrite` is set
    async fn write<D>(&self, path: &str, data: D, overwrite: bool) -> Result<()>
    where
        D: Into<WriteData> + Send,
    {
        if !overwrite && self.exists(path).await? {
            return Err(UnifsError::already_exists(path));
        }
        tracing::debug!("Writing {} (overwrite: {})", path, overwrite);
        self.write_file(path, data.into(), overwrite).await
    }

    /// Delete a file or directory and return what was there before.
    ///
    /// A non-empty directory is only removed when `recursive` is set.
    async fn remove(&self, path: &str, recursive: bool) -> Result<FileInfo> {
        let info = self.head(path).await?;
        if info.is_file() {
            tracing::debug!("Removing file {}", path);
            self.remove_file(path).await?;
            return Ok(info);
        }

        let children = self.list(path).await?;
        if children.is_empty() {
            tracing::debug!("Removing empty directory {}", path);
            self.remove_file(path).await?;
        } else if recursive {
            tracing::debug!(
                "Removing directory {} with {} entries",
                path,
                children.len()
            );
            self.remove_dir_recursive(path).await?;
        } else {
            return Err(UnifsError::directory_not_empty(path));
        }
        Ok(info)
    }

    /// Every file below `path`, depth-first in listing order
    async fn find_files_recursive(&self, path: &str) -> Result<Vec<FileInfo>> {
        let files: Vec<FileInfo> = self.walk(path).try_collect().await?;
        tracing::debug!("Found {} files below {}", files.len(), path);
        Ok(files)
    }

    /// Call `visit` once per file below `path`. Directories are expanded, never visited.
    ///
    /// The visitor finishes with one file before the next is looked up, so it
    /// can release whatever it opened for that file first.
    async fn file_traverse<V, Fut>(&self, path: &str, mut visit: V) -> Result<()>
    where
        V: FnMut(FileInfo) -> Fut + Send,
        Fut: Future<Output = Result<()>> + Send,
    {
        tracing::debug!("Traversing files below {}", path);
        let mut files = self.walk(path);
        let mut visited = 0usize;
        while let Some(file) = files.try_next().await? {
            tracing::trace!("Visiting {}", file.path);
            visit(file).await?;
            visited += 1;
        }
        tracing::debug!("Visited {} files below {}", visited, path);
        Ok(())
    }

    /// Lazily walk the files below `path`.
    ///
    /// Nothing is fetched until the stream is polled, and each call starts a
    /// fresh walk. A file path yields just that file.
    fn walk<'a>(&'a self, path: &'a str) -> FileWalk<'a> {
        Box::pin(walk_files(self, path))
    }
}

impl<B: Backend + ?Sized> FileSystem for B {}

async fn check_before_read<B: Backend + ?Sized>(fs: &B, path: &str) -> Result<FileInfo> {
    let info = fs.head(path).await?;
    if info.is_dir() {
        return Err(UnifsError::is_directory(path));
    }
    Ok(info)
}

fn walk_files<'a, B: Backend + ?Sized>(
    fs: &'a B,
    path: &'a str,
) -> impl Stream<Item = Result<FileInfo>> + Send + 'a {
    try_stream! {
        let root = fs.head(path).await?;
        let mut pending = vec![root];

        while let Some(entry) = pending.pop() {
            if entry.is_file() {
                yield entry;
                continue;
            }
            let mut children = fs.list(&entry.path).await?;
            // Stack order: first listed child is expanded next
            children.reverse();
            pending.extend(children);
        }
    }
}
