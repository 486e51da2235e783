//! PROPFIND request body and multistatus response parsing.

use crate::error::{Result, UnifsError};
use quick_xml::Reader;
use quick_xml::events::Event;

pub const PROPFIND_BODY: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<d:propfind xmlns:d="DAV:">
  <d:prop>
    <d:resourcetype/>
    <d:getcontenttype/>
    <d:getcontentlength/>
    <d:getlastmodified/>
  </d:prop>
</d:propfind>"#;

/// One `<response>` of a multistatus body
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DavEntry {
    pub href: String,
    pub collection: bool,
    pub content_type: Option<String>,
    pub content_length: Option<u64>,
    pub last_modified: Option<String>,
}

#[derive(Clone, Copy)]
enum Field {
    Href,
    ContentType,
    ContentLength,
    LastModified,
}

impl Field {
    fn from_tag(name: &[u8]) -> Option<Self> {
        match name {
            b"href" => Some(Self::Href),
            b"getcontenttype" => Some(Self::ContentType),
            b"getcontentlength" => Some(Self::ContentLength),
            b"getlastmodified" => Some(Self::LastModified),
            _ => None,
        }
    }

    fn apply(self, entry: &mut DavEntry, value: &str) {
        match self {
            Self::Href => entry.href.push_str(value),
            Self::ContentType => entry.content_type = Some(value.to_string()),
            Self::ContentLength => entry.content_length = value.parse().ok(),
            Self::LastModified => entry.last_modified = Some(value.to_string()),
        }
    }
}

/// Parse a `207 Multi-Status` body. Namespace prefixes are ignored.
pub fn parse_multistatus(xml: &str) -> Result<Vec<DavEntry>> {
    let mut reader = Reader::from_str(xml);
    let mut entries = Vec::new();
    let mut current: Option<DavEntry> = None;
    let mut field: Option<Field> = None;

    loop {
        match reader
            .read_event()
            .map_err(|e| UnifsError::xml(e.to_string()))?
        {
            Event::Start(tag) => match tag.local_name().as_ref() {
                b"response" => current = Some(DavEntry::default()),
                b"collection" => mark_collection(&mut current),
                name => field = Field::from_tag(name),
            },
            Event::Empty(tag) => {
                if tag.local_name().as_ref() == b"collection" {
                    mark_collection(&mut current);
                }
            }
            Event::Text(text) => {
                if let (Some(entry), Some(field)) = (current.as_mut(), field) {
                    let value = text.unescape().map_err(|e| UnifsError::xml(e.to_string()))?;
                    let value = value.trim();
                    if !value.is_empty() {
                        field.apply(entry, value);
                    }
                }
            }
            Event::End(tag) => {
                if tag.local_name().as_ref() == b"response" {
                    if let Some(entry) = current.take().filter(|e| !e.href.is_empty()) {
                        entries.push(entry);
                    }
                }
                field = None;
            }
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(entries)
}

fn mark_collection(current: &mut Option<DavEntry>) {
    if let Some(entry) = current.as_mut() {
        entry.collection = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const LISTING: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<D:multistatus xmlns:D="DAV:">
  <D:response>
    <D:href>/dav/docs/</D:href>
    <D:propstat>
      <D:prop>
        <D:resourcetype><D:collection/></D:resourcetype>
        <D:getlastmodified>Mon, 01 Jan 2024 12:00:00 GMT</D:getlastmodified>
      </D:prop>
      <D:status>HTTP/1.1 200 OK</D:status>
    </D:propstat>
  </D:response>
  <D:response>
    <D:href>/dav/docs/my%20notes.txt</D:href>
    <D:propstat>
      <D:prop>
        <D:resourcetype/>
        <D:getcontenttype>text/plain</D:getcontenttype>
        <D:getcontentlength>11</D:getcontentlength>
      </D:prop>
      <D:status>HTTP/1.1 200 OK</D:status>
    </D:propstat>
  </D:response>
</D:multistatus>"#;

    #[test]
    fn test_parse_listing() {
        let entries = parse_multistatus(LISTING).unwrap();
        assert_eq!(
            entries,
            vec![
                DavEntry {
                    href: "/dav/docs/".into(),
                    collection: true,
                    content_type: None,
                    content_length: None,
                    last_modified: Some("Mon, 01 Jan 2024 12:00:00 GMT".into()),
                },
                DavEntry {
                    href: "/dav/docs/my%20notes.txt".into(),
                    collection: false,
                    content_type: Some("text/plain".into()),
                    content_length: Some(11),
                    last_modified: None,
                },
            ]
        );
    }

    #[test]
    fn test_collection_as_start_tag() {
        let xml = r#"<multistatus xmlns="DAV:"><response><href>/a/</href>
            <propstat><prop><resourcetype><collection></collection></resourcetype></prop></propstat>
            </response></multistatus>"#;
        let entries = parse_multistatus(xml).unwrap();
        assert!(entries[0].collection);
    }

    #[test]
    fn test_mismatched_tags_are_rejected() {
        let err = parse_multistatus("<multistatus><response></multistatus>").unwrap_err();
        assert!(matches!(err, UnifsError::Xml { .. }));
    }
}
