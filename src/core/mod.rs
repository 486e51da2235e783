pub mod file;
pub mod path;

pub use file::{
    collect_stream, get_mime_type, ByteStream, FileBuffer, FileInfo, FileStream, FileType, WriteData,
};
