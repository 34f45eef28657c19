//! Local file storage primitives.

pub mod record_file;

pub use record_file::TomlRecordFile;
