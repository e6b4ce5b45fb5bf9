//! Multipart body types

use std::path::{Path, PathBuf};

use crate::{Error, Result};

/// Part name used for the file when the caller does not supply one
pub const DEFAULT_FILE_KEY: &str = "file";

/// An ordered multipart/form-data payload with exactly one file part.
///
/// The file part always comes first; text fields follow in the order the
/// caller supplied them. Building the body performs no I/O — the file's
/// bytes are streamed by the transport at send time.
#[derive(Debug, Clone)]
pub struct MultipartBody {
    parts: Vec<MultipartPart>,
}

/// A single named part of a multipart body
#[derive(Debug, Clone)]
pub enum MultipartPart {
    /// Binary content streamed from a file on disk
    File {
        /// Field name on the wire
        name: String,
        /// Source file
        path: PathBuf,
        /// Declared media type, if the caller supplied one
        content_type: Option<String>,
        /// Filename reported in the part headers
        file_name: String,
    },
    /// A plain UTF-8 text field
    Field {
        /// Field name on the wire
        name: String,
        /// Field value
        value: String,
    },
}

impl MultipartBody {
    /// Assemble a body from the file part plus zero or more text fields.
    ///
    /// A missing `file_key` falls back to [`DEFAULT_FILE_KEY`]. A declared
    /// `content_type` must parse as a media type; field values are carried
    /// as raw UTF-8 with no further escaping.
    pub fn build(
        file_key: Option<&str>,
        file: &Path,
        content_type: Option<&str>,
        params: &[(String, String)],
    ) -> Result<Self> {
        if let Some(value) = content_type {
            value
                .parse::<mime::Mime>()
                .map_err(|_| Error::Encoding(format!("invalid media type: {value}")))?;
        }

        let file_name = file
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("file")
            .to_string();

        let mut parts = Vec::with_capacity(1 + params.len());
        parts.push(MultipartPart::File {
            name: file_key.unwrap_or(DEFAULT_FILE_KEY).to_string(),
            path: file.to_path_buf(),
            content_type: content_type.map(str::to_string),
            file_name,
        });

        for (name, value) in params {
            parts.push(MultipartPart::Field {
                name: name.clone(),
                value: value.clone(),
            });
        }

        Ok(Self { parts })
    }

    /// Borrow the parts in wire order
    pub fn parts(&self) -> &[MultipartPart] {
        &self.parts
    }

    /// Consume the body, yielding the parts in wire order
    pub fn into_parts(self) -> Vec<MultipartPart> {
        self.parts
    }
}
