pub mod propfind;

pub use propfind::{parse_multistatus, DavEntry, PROPFIND_BODY};

use crate::core::path::{basename, normalize, percent_decode};
use crate::core::{ByteStream, FileInfo, WriteData};
use crate::error::{Result, UnifsError};
use crate::storage::backend::Backend;
use async_trait::async_trait;
use bytes::Bytes;
use futures_util::TryStreamExt;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Body, Client as HttpClient, Method, RequestBuilder, Response, StatusCode, Url};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io;

/// Connection parameters for a WebDAV server. `host` is the base URL,
/// e.g. `https://cloud.example.com/remote.php/dav/files/me`.
#[derive(Clone, Serialize, Deserialize)]
pub struct WebdavConfig {
    pub host: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

impl WebdavConfig {
    pub fn new(
        host: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for WebdavConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebdavConfig")
            .field("host", &self.host)
            .field("username", &self.username)
            .field("password", &"****")
            .finish()
    }
}

/// WebDAV backend. Paths are relative to the base URL and start with `/`.
#[derive(Clone, Debug)]
pub struct WebdavFileSystem {
    config: WebdavConfig,
    client: HttpClient,
}

impl WebdavFileSystem {
    pub fn new(config: WebdavConfig) -> Self {
        Self {
            config,
            client: HttpClient::new(),
        }
    }

    pub fn config(&self) -> &WebdavConfig {
        &self.config
    }

    fn base_url(&self) -> Result<Url> {
        Url::parse(&self.config.host).map_err(|e| {
            UnifsError::backend_with_cause(
                format!("Invalid WebDAV host: {}", self.config.host),
                e.to_string(),
            )
        })
    }

    /// Full URL of a path below the base URL
    fn url_for(&self, path: &str) -> Result<Url> {
        let mut url = self.base_url()?;
        url.path_segments_mut()
            .map_err(|_| UnifsError::backend(format!("Invalid WebDAV host: {}", self.config.host)))?
            .pop_if_empty()
            .extend(path.split('/').filter(|s| !s.is_empty()));
        Ok(url)
    }

    /// Path of an href relative to the base URL
    fn href_to_path(&self, href: &str) -> Result<String> {
        let base = percent_decode(self.base_url()?.path());
        let base = base.trim_end_matches('/');

        let raw = match Url::parse(href) {
            Ok(url) => url.path().to_string(),
            Err(_) => href.to_string(),
        };
        let decoded = percent_decode(&raw);
        let relative = match decoded.strip_prefix(base) {
            Some(rest) if rest.is_empty() || rest.starts_with('/') => rest,
            _ => decoded.as_str(),
        };
        Ok(normalize(relative))
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder> {
        let url = self.url_for(path)?;
        tracing::debug!("WebDAV {} {}", method, url);
        let builder = self.client.request(method, url);
        if self.config.username.is_empty() {
            Ok(builder)
        } else {
            Ok(builder.basic_auth(&self.config.username, Some(&self.config.password)))
        }
    }

    async fn propfind(&self, path: &str, depth: &str) -> Result<Vec<FileInfo>> {
        let method = Method::from_bytes(b"PROPFIND").map_err(|e| UnifsError::backend(e.to_string()))?;
        let response = self
            .request(method, path)?
            .header("Depth", depth)
            .header(CONTENT_TYPE, "application/xml; charset=utf-8")
            .body(PROPFIND_BODY)
            .send()
            .await?;
        let body = check_status(response, path)?.text().await?;

        parse_multistatus(&body)?
            .into_iter()
            .map(|entry| self.to_file_info(entry))
            .collect()
    }

    fn to_file_info(&self, entry: DavEntry) -> Result<FileInfo> {
        let path = self.href_to_path(&entry.href)?;
        let filename = basename(&path);
        if entry.collection {
            return Ok(FileInfo::directory(filename, path, entry.last_modified));
        }

        let mut info = FileInfo::file(
            filename,
            path,
            entry.content_length.unwrap_or_default(),
            entry.last_modified,
        );
        // The server's content type wins over a guess from the name
        if entry.content_type.is_some() {
            info.mime = entry.content_type;
        }
        Ok(info)
    }
}

fn check_status(response: Response, path: &str) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    if status == StatusCode::NOT_FOUND {
        return Err(UnifsError::not_found_with_cause(path, format!("HTTP {}", status)));
    }
    Err(UnifsError::Webdav {
        status: status.as_u16(),
        message: status.canonical_reason().unwrap_or("unknown status").to_string(),
    })
}

#[async_trait]
impl Backend for WebdavFileSystem {
    async fn head(&self, path: &str) -> Result<FileInfo> {
        self.propfind(path, "0")
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| UnifsError::not_found(path))
    }

    async fn list(&self, path: &str) -> Result<Vec<FileInfo>> {
        let target = normalize(path);
        let entries = self.propfind(path, "1").await?;
        Ok(entries
            .into_iter()
            .filter(|info| info.path != target)
            .collect())
    }

    async fn ensure_dir(&self, path: &str) -> Result<()> {
        let mut current = String::new();
        for segment in path.split('/').filter(|s| !s.is_empty()) {
            current.push('/');
            current.push_str(segment);

            let method = Method::from_bytes(b"MKCOL").map_err(|e| UnifsError::backend(e.to_string()))?;
            let response = self.request(method, &current)?.send().await?;
            // 405: the collection is already there
            if response.status() != StatusCode::METHOD_NOT_ALLOWED {
                check_status(response, &current)?;
            }
        }
        Ok(())
    }

    async fn get_readable(&self, path: &str) -> Result<ByteStream> {
        let response = self.request(Method::GET, path)?.send().await?;
        let stream = check_status(response, path)?
            .bytes_stream()
            .map_err(io::Error::other);
        Ok(Box::pin(stream))
    }

    async fn get_buffer(&self, path: &str) -> Result<Bytes> {
        let response = self.request(Method::GET, path)?.send().await?;
        Ok(check_status(response, path)?.bytes().await?)
    }

    async fn write_file(&self, path: &str, data: WriteData, _overwrite: bool) -> Result<()> {
        let body = match data {
            WriteData::Bytes(bytes) => Body::from(bytes),
            WriteData::Stream(stream) => Body::wrap_stream(stream),
        };
        let response = self.request(Method::PUT, path)?.body(body).send().await?;
        check_status(response, path)?;
        Ok(())
    }

    async fn remove_file(&self, path: &str) -> Result<()> {
        let response = self.request(Method::DELETE, path)?.send().await?;
        check_status(response, path)?;
        Ok(())
    }

    /// DELETE on a collection removes its members too
    async fn remove_dir_recursive(&self, path: &str) -> Result<()> {
        self.remove_file(path).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::FileType;
    use crate::storage::traits::FileSystem;
    use mockito::{Matcher, Server, ServerGuard};
    use pretty_assertions::assert_eq;

    fn multistatus(responses: &[(&str, bool, u64)]) -> String {
        let body: String = responses
            .iter()
            .map(|(href, collection, size)| {
                let resource = if *collection { "<d:collection/>" } else { "" };
                format!(
                    "<d:response><d:href>{}</d:href><d:propstat><d:prop>\
                     <d:resourcetype>{}</d:resourcetype>\
                     <d:getcontentlength>{}</d:getcontentlength>\
                     <d:getlastmodified>Mon, 01 Jan 2024 12:00:00 GMT</d:getlastmodified>\
                     </d:prop><d:status>HTTP/1.1 200 OK</d:status></d:propstat></d:response>",
                    href, resource, size
                )
            })
            .collect();
        format!(
            r#"<?xml version="1.0" encoding="utf-8"?><d:multistatus xmlns:d="DAV:">{}</d:multistatus>"#,
            body
        )
    }

    fn filesystem(server: &ServerGuard) -> WebdavFileSystem {
        WebdavFileSystem::new(WebdavConfig::new(
            format!("{}/dav", server.url()),
            "user",
            "secret",
        ))
    }

    #[test]
    fn test_href_to_path() {
        let fs = WebdavFileSystem::new(WebdavConfig::new("http://host/remote/dav/", "", ""));
        assert_eq!(fs.href_to_path("/remote/dav/a%20b.txt").unwrap(), "/a b.txt");
        assert_eq!(fs.href_to_path("http://host/remote/dav/docs/").unwrap(), "/docs");
        assert_eq!(fs.href_to_path("/remote/dav/").unwrap(), "/");
        assert_eq!(fs.href_to_path("/other/x").unwrap(), "/other/x");
    }

    #[test]
    fn test_url_for_keeps_base_path() {
        let fs = WebdavFileSystem::new(WebdavConfig::new("http://host/dav/", "", ""));
        assert_eq!(
            fs.url_for("/docs/my file.txt").unwrap().as_str(),
            "http://host/dav/docs/my%20file.txt"
        );
    }

    #[test]
    fn test_config_debug_redacts_password() {
        let shown = format!("{:?}", WebdavConfig::new("http://h", "u", "hunter2"));
        assert!(!shown.contains("hunter2"));
    }

    #[tokio::test]
    async fn test_head_file() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("PROPFIND", "/dav/docs/a.txt")
            .match_header("depth", "0")
            .match_header("authorization", Matcher::Regex("^Basic ".into()))
            .with_status(207)
            .with_body(multistatus(&[("/dav/docs/a.txt", false, 5)]))
            .create_async()
            .await;

        let info = filesystem(&server).head("/docs/a.txt").await.unwrap();
        assert_eq!(info.filename, "a.txt");
        assert_eq!(info.path, "/docs/a.txt");
        assert_eq!(info.file_type, FileType::File);
        assert_eq!(info.size, 5);
        assert_eq!(info.mime.as_deref(), Some("text/plain"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_missing_path_is_not_found() {
        let mut server = Server::new_async().await;
        server
            .mock("PROPFIND", "/dav/nope.txt")
            .with_status(404)
            .create_async()
            .await;

        let fs = filesystem(&server);
        assert!(!fs.exists("/nope.txt").await.unwrap());
        assert!(fs.head("/nope.txt").await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_other_statuses_pass_through() {
        let mut server = Server::new_async().await;
        server
            .mock("PROPFIND", "/dav/locked")
            .with_status(403)
            .create_async()
            .await;

        let err = filesystem(&server).exists("/locked").await.unwrap_err();
        assert!(matches!(err, UnifsError::Webdav { status: 403, .. }));
    }

    #[tokio::test]
    async fn test_list_skips_collection_itself() {
        let mut server = Server::new_async().await;
        server
            .mock("PROPFIND", "/dav/docs")
            .match_header("depth", "1")
            .with_status(207)
            .with_body(multistatus(&[
                ("/dav/docs/", true, 0),
                ("/dav/docs/a.txt", false, 5),
                ("/dav/docs/sub/", true, 0),
            ]))
            .create_async()
            .await;

        let entries = filesystem(&server).list("/docs").await.unwrap();
        let paths: Vec<(&str, FileType)> = entries
            .iter()
            .map(|info| (info.path.as_str(), info.file_type))
            .collect();
        assert_eq!(
            paths,
            vec![("/docs/a.txt", FileType::File), ("/docs/sub", FileType::Directory)]
        );
    }

    #[tokio::test]
    async fn test_read_text() {
        let mut server = Server::new_async().await;
        server
            .mock("PROPFIND", "/dav/hello.txt")
            .with_status(207)
            .with_body(multistatus(&[("/dav/hello.txt", false, 5)]))
            .create_async()
            .await;
        server
            .mock("GET", "/dav/hello.txt")
            .with_status(200)
            .with_body("hello")
            .create_async()
            .await;

        let fs = filesystem(&server);
        assert_eq!(fs.read_text("/hello.txt").await.unwrap(), "hello");

        let file = fs.read("/hello.txt").await.unwrap();
        let chunks: Vec<Bytes> = file.stream.try_collect().await.unwrap();
        assert_eq!(chunks.concat(), b"hello");
    }

    #[tokio::test]
    async fn test_write_refuses_existing_without_overwrite() {
        let mut server = Server::new_async().await;
        server
            .mock("PROPFIND", "/dav/a.txt")
            .with_status(207)
            .with_body(multistatus(&[("/dav/a.txt", false, 3)]))
            .create_async()
            .await;
        let put = server
            .mock("PUT", "/dav/a.txt")
            .with_status(201)
            .expect(1)
            .create_async()
            .await;

        let fs = filesystem(&server);
        let err = fs.write("/a.txt", "new", false).await.unwrap_err();
        assert!(matches!(err, UnifsError::AlreadyExists { .. }));

        fs.write("/a.txt", "new", true).await.unwrap();
        put.assert_async().await;
    }

    #[tokio::test]
    async fn test_write_streamed_body() {
        let mut server = Server::new_async().await;
        let put = server
            .mock("PUT", "/dav/b.bin")
            .match_body("chunk-1chunk-2")
            .with_status(201)
            .create_async()
            .await;

        let chunks = vec![
            Ok(Bytes::from_static(b"chunk-1")),
            Ok(Bytes::from_static(b"chunk-2")),
        ];
        let stream: ByteStream = Box::pin(futures_util::stream::iter(chunks));
        filesystem(&server)
            .write("/b.bin", stream, true)
            .await
            .unwrap();
        put.assert_async().await;
    }

    #[tokio::test]
    async fn test_recursive_remove_is_single_delete() {
        let mut server = Server::new_async().await;
        server
            .mock("PROPFIND", "/dav/d")
            .match_header("depth", "0")
            .with_status(207)
            .with_body(multistatus(&[("/dav/d/", true, 0)]))
            .create_async()
            .await;
        server
            .mock("PROPFIND", "/dav/d")
            .match_header("depth", "1")
            .with_status(207)
            .with_body(multistatus(&[("/dav/d/", true, 0), ("/dav/d/f.txt", false, 1)]))
            .create_async()
            .await;
        let delete = server
            .mock("DELETE", "/dav/d")
            .with_status(204)
            .expect(1)
            .create_async()
            .await;

        let fs = filesystem(&server);
        let err = fs.remove("/d", false).await.unwrap_err();
        assert!(matches!(err, UnifsError::DirectoryNotEmpty { .. }));

        let info = fs.remove("/d", true).await.unwrap();
        assert!(info.is_dir());
        delete.assert_async().await;
    }

    #[tokio::test]
    async fn test_ensure_dir_tolerates_existing_collections() {
        let mut server = Server::new_async().await;
        let existing = server
            .mock("MKCOL", "/dav/a")
            .with_status(405)
            .create_async()
            .await;
        let created = server
            .mock("MKCOL", "/dav/a/b")
            .with_status(201)
            .create_async()
            .await;

        filesystem(&server).ensure_dir("/a/b").await.unwrap();
        existing.assert_async().await;
        created.assert_async().await;
    }
}
