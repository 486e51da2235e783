use crate::core::path::{child_path, is_root, normalize, parent_dir};
use crate::core::{collect_stream, ByteStream, FileInfo, WriteData};
use crate::error::{Result, UnifsError};
use crate::storage::backend::Backend;
use async_stream::try_stream;
use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use futures_util::future::BoxFuture;
use futures_util::{Stream, StreamExt};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io;
use suppaftp::list::File as ListEntry;
use suppaftp::tokio::{AsyncFtpStream, AsyncNoTlsStream, TransferStream};
use suppaftp::types::FileType as TransferType;
use suppaftp::{FtpError, Status};
use tokio::io::AsyncWriteExt;
use tokio_util::io::{ReaderStream, StreamReader};

pub const DEFAULT_FTP_PORT: u16 = 21;

/// Connection parameters for an FTP server
#[derive(Clone, Serialize, Deserialize)]
pub struct FtpConfig {
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_user")]
    pub user: String,
    #[serde(default)]
    pub password: String,
}

fn default_port() -> u16 {
    DEFAULT_FTP_PORT
}

fn default_user() -> String {
    "anonymous".to_string()
}

impl FtpConfig {
    pub fn new(
        host: impl Into<String>,
        port: u16,
        user: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            port,
            user: user.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for FtpConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FtpConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"****")
            .finish()
    }
}

/// FTP backend. Every operation opens its own control connection.
///
/// Paths are absolute, slash-separated server paths.
#[derive(Clone, Debug)]
pub struct FtpFileSystem {
    config: FtpConfig,
}

impl FtpFileSystem {
    pub fn new(config: FtpConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FtpConfig {
        &self.config
    }

    /// Connect, log in and switch to binary transfers
    async fn open(&self) -> Result<AsyncFtpStream> {
        let (host, port) = (self.config.host.as_str(), self.config.port);
        let mut ftp = AsyncFtpStream::connect((host, port)).await.map_err(|e| {
            UnifsError::backend_with_cause(
                format!("Failed to connect to {}:{}", host, port),
                e.to_string(),
            )
        })?;
        ftp.login(self.config.user.as_str(), self.config.password.as_str())
            .await?;
        ftp.transfer_type(TransferType::Binary).await?;

        tracing::debug!("Logged in to {}:{} as {}", host, port, self.config.user);
        Ok(ftp)
    }

    /// Run `op` on a fresh connection. QUIT is sent whether `op` succeeds or not.
    async fn connect<T, F>(&self, op: F) -> Result<T>
    where
        T: Send,
        F: for<'c> FnOnce(&'c mut AsyncFtpStream) -> BoxFuture<'c, Result<T>> + Send,
    {
        let mut ftp = self.open().await?;
        let result = op(&mut ftp).await;
        quit(&mut ftp).await;
        result
    }
}

#[async_trait]
impl Backend for FtpFileSystem {
    async fn head(&self, path: &str) -> Result<FileInfo> {
        if is_root(path) {
            return Ok(FileInfo::directory("", "/", None));
        }
        let target = normalize(path);
        let siblings = self.list(&parent_dir(&target)).await?;
        siblings
            .into_iter()
            .find(|info| info.path == target)
            .ok_or_else(|| UnifsError::not_found(path))
    }

    async fn list(&self, path: &str) -> Result<Vec<FileInfo>> {
        let dir = path.to_string();
        let lines = self
            .connect(move |ftp| {
                Box::pin(async move { Ok(ftp.list(Some(dir.as_str())).await?) })
            })
            .await
            .map_err(|e| not_found_on_unavailable(e, path))?;

        Ok(lines
            .iter()
            .filter_map(|line| to_file_info(path, line))
            .collect())
    }

    async fn ensure_dir(&self, path: &str) -> Result<()> {
        let dir = path.to_string();
        self.connect(move |ftp| {
            Box::pin(async move {
                if dir.starts_with('/') {
                    ftp.cwd("/").await?;
                }
                // One level at a time: CWD into it, or MKD then CWD
                for segment in dir.split('/').filter(|s| !s.is_empty()) {
                    if ftp.cwd(segment).await.is_ok() {
                        continue;
                    }
                    tracing::debug!("FTP creating directory {}", segment);
                    ftp.mkdir(segment).await?;
                    ftp.cwd(segment).await?;
                }
                Ok(())
            })
        })
        .await
    }

    async fn get_readable(&self, path: &str) -> Result<ByteStream> {
        // The stream owns the connection and quits after the last byte
        let mut ftp = self.open().await?;
        match ftp.retr_as_stream(path).await {
            Ok(transfer) => Ok(Box::pin(download(ftp, transfer))),
            Err(e) => {
                quit(&mut ftp).await;
                Err(not_found_on_unavailable(e.into(), path))
            }
        }
    }

    async fn get_buffer(&self, path: &str) -> Result<Bytes> {
        let stream = self.get_readable(path).await?;
        Ok(collect_stream(stream).await?)
    }

    async fn write_file(&self, path: &str, data: WriteData, _overwrite: bool) -> Result<()> {
        let target = path.to_string();
        self.connect(move |ftp| {
            Box::pin(async move {
                let mut upload = ftp.put_with_stream(&target).await?;
                match data {
                    WriteData::Bytes(bytes) => upload.write_all(&bytes).await?,
                    WriteData::Stream(stream) => {
                        let mut reader = StreamReader::new(stream);
                        tokio::io::copy(&mut reader, &mut upload).await?;
                    }
                }
                upload.finish().await?;
                Ok(())
            })
        })
        .await
        .map_err(|e| not_found_on_unavailable(e, path))
    }

    async fn remove_file(&self, path: &str) -> Result<()> {
        let target = path.to_string();
        self.connect(move |ftp| {
            Box::pin(async move {
                match ftp.rm(&target).await {
                    Ok(()) => Ok(()),
                    // DELE refuses directories; an empty one goes with RMD
                    Err(refused @ FtpError::UnexpectedResponse(_)) => {
                        ftp.rmdir(&target).await.map_err(|_| refused.into())
                    }
                    Err(e) => Err(e.into()),
                }
            })
        })
        .await
        .map_err(|e| not_found_on_unavailable(e, path))
    }

    async fn remove_dir_recursive(&self, path: &str) -> Result<()> {
        let root = normalize(path);
        self.connect(move |ftp| remove_tree(ftp, root))
            .await
            .map_err(|e| not_found_on_unavailable(e, path))
    }
}

/// Stream the transfer, then read its completion reply and quit
fn download(
    mut ftp: AsyncFtpStream,
    mut transfer: TransferStream<AsyncNoTlsStream>,
) -> impl Stream<Item = io::Result<Bytes>> + Send {
    try_stream! {
        let mut chunks = ReaderStream::new(&mut transfer);
        while let Some(chunk) = chunks.next().await {
            yield chunk?;
        }
        drop(chunks);
        transfer.finish().await.map_err(io::Error::other)?;
        quit(&mut ftp).await;
    }
}

/// Failures are ignored, the socket closes on drop either way
async fn quit(ftp: &mut AsyncFtpStream) {
    if let Err(e) = ftp.quit().await {
        tracing::debug!("FTP QUIT failed: {}", e);
    }
}

/// Depth-first delete over one connection: files first, then the emptied directory
fn remove_tree(ftp: &mut AsyncFtpStream, dir: String) -> BoxFuture<'_, Result<()>> {
    Box::pin(async move {
        let lines = ftp.list(Some(dir.as_str())).await?;
        for entry in lines.iter().filter_map(|line| to_file_info(&dir, line)) {
            if entry.is_dir() {
                remove_tree(ftp, entry.path).await?;
            } else {
                ftp.rm(&entry.path).await?;
            }
        }
        tracing::debug!("FTP removing directory {}", dir);
        ftp.rmdir(&dir).await?;
        Ok(())
    })
}

fn not_found_on_unavailable(err: UnifsError, path: &str) -> UnifsError {
    match err {
        UnifsError::Ftp {
            source: FtpError::UnexpectedResponse(response),
        } if response.status == Status::FileUnavailable => {
            UnifsError::not_found_with_cause(path, response.to_string())
        }
        other => other,
    }
}

/// Parse one LIST line (Unix or DOS layout). Totals, `.` and `..` yield nothing.
fn to_file_info(dir: &str, line: &str) -> Option<FileInfo> {
    let entry = match ListEntry::try_from(line) {
        Ok(entry) => entry,
        Err(e) => {
            tracing::trace!("Skipping LIST line {:?}: {}", line, e);
            return None;
        }
    };
    let name = entry.name();
    if name == "." || name == ".." {
        return None;
    }
    let path = child_path(dir, name);
    let modified = Some(DateTime::<Utc>::from(entry.modified()).to_rfc3339());
    if entry.is_directory() {
        Some(FileInfo::directory(name, path, modified))
    } else {
        Some(FileInfo::file(name, path, entry.size() as u64, modified))
    }
}
