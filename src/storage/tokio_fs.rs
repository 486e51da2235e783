use crate::core::{ByteStream, FileInfo, WriteData};
use crate::error::{Result, UnifsError};
use crate::storage::backend::Backend;
use crate::storage::traits::FileSystem;
use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use futures_util::future::{try_join_all, BoxFuture};
use std::io;
use std::path::{Component, Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio_util::io::{ReaderStream, StreamReader};

/// Local disk backend using tokio::fs
#[derive(Clone, Debug, Default)]
pub struct LocalFileSystem;

impl LocalFileSystem {
    pub fn new() -> Self {
        Self
    }

    /// Move `src` to `dest`, refusing to replace `dest` unless `overwrite` is set
    pub async fn rename(&self, src: &str, dest: &str, overwrite: bool) -> Result<()> {
        if !overwrite && self.exists(dest).await? {
            return Err(UnifsError::already_exists(dest));
        }
        fs::rename(src, dest)
            .await
            .map_err(|e| map_io_error(e, src))
    }

    /// Copy a file or a whole directory tree, with the same guard as `rename`
    pub async fn copy(&self, src: &str, dest: &str, overwrite: bool) -> Result<()> {
        if !overwrite && self.exists(dest).await? {
            return Err(UnifsError::already_exists(dest));
        }
        copy_recursive(PathBuf::from(src), PathBuf::from(dest)).await
    }
}

#[async_trait]
impl Backend for LocalFileSystem {
    /// Resolve segments against the current directory, like a shell `cd` chain
    fn join(&self, segments: &[&str]) -> String {
        let mut resolved = std::env::current_dir().unwrap_or_default();
        for segment in segments.iter().filter(|s| !s.is_empty()) {
            resolved.push(segment);
        }
        normalize_lexically(&resolved).to_string_lossy().into_owned()
    }

    async fn head(&self, path: &str) -> Result<FileInfo> {
        let metadata = fs::metadata(path)
            .await
            .map_err(|e| map_io_error(e, path))?;
        Ok(parse_file_info(path, &metadata))
    }

    async fn list(&self, path: &str) -> Result<Vec<FileInfo>> {
        let mut entries = fs::read_dir(path)
            .await
            .map_err(|e| map_io_error(e, path))?;

        let mut children = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| map_io_error(e, path))?
        {
            children.push(entry.path().to_string_lossy().into_owned());
        }

        // Stat siblings concurrently; order follows read_dir
        try_join_all(children.iter().map(|child| stat_entry(child))).await
    }

    async fn ensure_dir(&self, path: &str) -> Result<()> {
        fs::create_dir_all(path)
            .await
            .map_err(|e| map_io_error(e, path))
    }

    async fn get_readable(&self, path: &str) -> Result<ByteStream> {
        let file = fs::File::open(path)
            .await
            .map_err(|e| map_io_error(e, path))?;
        Ok(Box::pin(ReaderStream::new(file)))
    }

    async fn get_buffer(&self, path: &str) -> Result<Bytes> {
        let contents = fs::read(path).await.map_err(|e| map_io_error(e, path))?;
        Ok(Bytes::from(contents))
    }

    async fn write_file(&self, path: &str, data: WriteData, _overwrite: bool) -> Result<()> {
        let written = async {
            match data {
                WriteData::Bytes(bytes) => fs::write(path, &bytes).await?,
                WriteData::Stream(stream) => {
                    let mut reader = StreamReader::new(stream);
                    let mut file = fs::File::create(path).await?;
                    tokio::io::copy(&mut reader, &mut file).await?;
                    file.flush().await?;
                }
            }
            Ok::<(), io::Error>(())
        }
        .await;
        written.map_err(|e| map_io_error(e, path))
    }

    async fn remove_file(&self, path: &str) -> Result<()> {
        let metadata = fs::symlink_metadata(path)
            .await
            .map_err(|e| map_io_error(e, path))?;
        let removed = if metadata.is_dir() {
            fs::remove_dir(path).await
        } else {
            fs::remove_file(path).await
        };
        removed.map_err(|e| map_io_error(e, path))
    }

    async fn remove_dir_recursive(&self, path: &str) -> Result<()> {
        fs::remove_dir_all(path)
            .await
            .map_err(|e| map_io_error(e, path))
    }
}

fn map_io_error(err: io::Error, path: &str) -> UnifsError {
    if err.kind() == io::ErrorKind::NotFound {
        UnifsError::not_found_with_cause(path, err.to_string())
    } else {
        err.into()
    }
}

/// Stat through symlinks. A dangling link is described by the link itself.
async fn stat_entry(path: &str) -> Result<FileInfo> {
    let metadata = match fs::metadata(path).await {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == io::ErrorKind::NotFound => fs::symlink_metadata(path)
            .await
            .map_err(|e| map_io_error(e, path))?,
        Err(e) => return Err(map_io_error(e, path)),
    };
    Ok(parse_file_info(path, &metadata))
}

fn parse_file_info(path: &str, metadata: &std::fs::Metadata) -> FileInfo {
    let filename = Path::new(path)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let last_modified = metadata
        .modified()
        .ok()
        .map(|time| DateTime::<Utc>::from(time).to_rfc3339());

    if metadata.is_dir() {
        FileInfo::directory(filename, path, last_modified)
    } else {
        FileInfo::file(filename, path, metadata.len(), last_modified)
    }
}

fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

fn copy_recursive(src: PathBuf, dest: PathBuf) -> BoxFuture<'static, Result<()>> {
    Box::pin(async move {
        let src_err = |e| map_io_error(e, &src.to_string_lossy());
        let dest_err = |e| map_io_error(e, &dest.to_string_lossy());

        let metadata = fs::metadata(&src).await.map_err(src_err)?;
        if !metadata.is_dir() {
            fs::copy(&src, &dest).await.map_err(dest_err)?;
            return Ok(());
        }

        fs::create_dir_all(&dest).await.map_err(dest_err)?;
        let mut entries = fs::read_dir(&src).await.map_err(src_err)?;
        while let Some(entry) = entries.next_entry().await.map_err(src_err)? {
            copy_recursive(entry.path(), dest.join(entry.file_name())).await?;
        }
        Ok(())
    })
}
