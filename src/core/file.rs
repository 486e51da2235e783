use bytes::Bytes;
use futures_util::{Stream, TryStreamExt};
use mime_guess::from_path;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::io;
use std::pin::Pin;

/// Byte stream handed to callers by `read`. The caller owns it once returned.
pub type ByteStream = Pin<Box<dyn Stream<Item = io::Result<Bytes>> + Send>>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    File,
    Directory,
}

/// Snapshot of one entry on a backend, taken at call time.
///
/// Two infos are the same entry when their paths match, regardless of the
/// other fields.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FileInfo {
    pub filename: String,
    pub path: String,
    #[serde(rename = "type")]
    pub file_type: FileType,
    pub mime: Option<String>,
    pub size: u64,
    #[serde(rename = "lastModified")]
    pub last_modified: Option<String>,
}

impl FileInfo {
    /// Build a file entry, guessing its MIME type from the name
    pub fn file(
        filename: impl Into<String>,
        path: impl Into<String>,
        size: u64,
        last_modified: Option<String>,
    ) -> Self {
        let filename = filename.into();
        Self {
            mime: get_mime_type(&filename),
            filename,
            path: path.into(),
            file_type: FileType::File,
            size,
            last_modified,
        }
    }

    pub fn directory(
        filename: impl Into<String>,
        path: impl Into<String>,
        last_modified: Option<String>,
    ) -> Self {
        Self {
            filename: filename.into(),
            path: path.into(),
            file_type: FileType::Directory,
            mime: None,
            size: 0,
            last_modified,
        }
    }

    pub fn is_file(&self) -> bool {
        self.file_type == FileType::File
    }

    pub fn is_dir(&self) -> bool {
        self.file_type == FileType::Directory
    }
}

impl PartialEq for FileInfo {
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path
    }
}

impl Eq for FileInfo {}

impl Hash for FileInfo {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.path.hash(state);
    }
}

/// An opened file: its info plus the content stream
pub struct FileStream {
    pub info: FileInfo,
    pub stream: ByteStream,
}

impl fmt::Debug for FileStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileStream")
            .field("info", &self.info)
            .finish_non_exhaustive()
    }
}

/// A fully materialized file
#[derive(Clone, Debug)]
pub struct FileBuffer {
    pub info: FileInfo,
    pub buffer: Bytes,
}

/// Payload accepted by `write`
pub enum WriteData {
    Bytes(Bytes),
    Stream(ByteStream),
}

impl fmt::Debug for WriteData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bytes(bytes) => f.debug_tuple("Bytes").field(&bytes.len()).finish(),
            Self::Stream(_) => f.write_str("Stream(..)"),
        }
    }
}

impl From<Bytes> for WriteData {
    fn from(bytes: Bytes) -> Self {
        Self::Bytes(bytes)
    }
}

impl From<Vec<u8>> for WriteData {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Bytes(Bytes::from(bytes))
    }
}

impl From<&[u8]> for WriteData {
    fn from(bytes: &[u8]) -> Self {
        Self::Bytes(Bytes::copy_from_slice(bytes))
    }
}

impl From<String> for WriteData {
    fn from(text: String) -> Self {
        Self::Bytes(Bytes::from(text))
    }
}

impl From<&str> for WriteData {
    fn from(text: &str) -> Self {
        Self::Bytes(Bytes::copy_from_slice(text.as_bytes()))
    }
}

impl From<ByteStream> for WriteData {
    fn from(stream: ByteStream) -> Self {
        Self::Stream(stream)
    }
}

/// Drain a byte stream into memory
pub async fn collect_stream(stream: ByteStream) -> io::Result<Bytes> {
    let chunks: Vec<Bytes> = stream.try_collect().await?;
    Ok(Bytes::from(chunks.concat()))
}

pub fn get_mime_type(filename: &str) -> Option<String> {
    from_path(filename).first().map(|mime| mime.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashSet;

    #[test]
    fn test_file_info_wire_shape() {
        let info = FileInfo::file("b.txt", "/a/b.txt", 5, Some("Mon, 01 Jan 2024".into()));
        let json = serde_json::to_value(&info).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "filename": "b.txt",
                "path": "/a/b.txt",
                "type": "file",
                "mime": "text/plain",
                "size": 5,
                "lastModified": "Mon, 01 Jan 2024",
            })
        );
    }

    #[test]
    fn test_directory_has_no_mime() {
        let info = FileInfo::directory("a", "/a", None);
        assert!(info.is_dir());
        assert_eq!(info.mime, None);
        assert_eq!(serde_json::to_value(&info).unwrap()["type"], "directory");
    }

    #[test]
    fn test_identity_is_by_path() {
        let old = FileInfo::file("b.txt", "/a/b.txt", 5, None);
        let new = FileInfo::file("b.txt", "/a/b.txt", 11, Some("later".into()));
        assert_eq!(old, new);

        let set: HashSet<FileInfo> = [old, new].into_iter().collect();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_unknown_extension_has_no_mime() {
        assert_eq!(get_mime_type("README"), None);
        assert_eq!(get_mime_type("image.png").as_deref(), Some("image/png"));
    }

    #[test]
    fn test_write_data_from_text() {
        match WriteData::from("hello") {
            WriteData::Bytes(bytes) => assert_eq!(&bytes[..], b"hello"),
            WriteData::Stream(_) => panic!("expected bytes"),
        }
    }
}
