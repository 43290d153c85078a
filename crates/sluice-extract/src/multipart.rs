//! `multipart/form-data` bodies.
//!
//! The body is already buffered, so the multer stream is a single ready
//! chunk and its futures complete on first poll. Parsing is driven with
//! `now_or_never` instead of an async runtime.

use bytes::Bytes;
use futures_util::FutureExt;
use serde_json::{json, Map, Value};

use crate::error::{ExtractionError, ExtractionSource};
use crate::query::collect_pairs;

/// Default maximum number of parts.
const DEFAULT_MAX_FIELDS: usize = 100;

/// A file part read from a multipart body.
///
/// Handed to steps through the exchange extensions as [`UploadedFiles`]; the
/// matching param only carries `{filename, content_type, size}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    name: String,
    file_name: String,
    content_type: Option<String>,
    data: Bytes,
}

impl UploadedFile {
    /// Form field name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Client-supplied file name.
    #[must_use]
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Declared content type of the part.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    /// File contents.
    #[must_use]
    pub fn data(&self) -> &Bytes {
        &self.data
    }

    /// Size in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// True for a zero-byte upload.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    fn summary(&self) -> Value {
        json!({
            "filename": self.file_name,
            "content_type": self.content_type,
            "size": self.data.len(),
        })
    }
}

/// Every file part of one request, in body order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadedFiles(pub Vec<UploadedFile>);

impl UploadedFiles {
    /// The first file uploaded under `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&UploadedFile> {
        self.0.iter().find(|f| f.name == name)
    }
}

/// Decoded multipart body.
#[derive(Debug, Clone, Default)]
pub struct MultipartForm {
    /// Text parts as strings, file parts as summaries
    pub fields: Map<String, Value>,
    /// File parts with their contents
    pub files: UploadedFiles,
}

/// Parses a buffered multipart body.
///
/// # Errors
///
/// Fails when the Content-Type has no boundary, the body is malformed, or
/// the part count exceeds the limit.
pub fn parse_multipart(content_type: &str, body: Bytes) -> Result<MultipartForm, ExtractionError> {
    let boundary = multer::parse_boundary(content_type)
        .map_err(|_| {
            ExtractionError::invalid_content_type("missing or invalid multipart boundary")
        })?;

    let chunk = futures_util::future::ready(Ok::<_, std::io::Error>(body));
    let stream = futures_util::stream::once(chunk);
    let mut multipart = multer::Multipart::new(stream, boundary);

    let parse = async move {
        let mut texts = Vec::new();
        let mut files = Vec::new();

        while let Some(field) = multipart.next_field().await.map_err(malformed)? {
            if texts.len() + files.len() >= DEFAULT_MAX_FIELDS {
                return Err(ExtractionError::malformed(
                    ExtractionSource::Body,
                    format!("too many parts (max {DEFAULT_MAX_FIELDS})"),
                ));
            }

            let name = field.name().unwrap_or_default().to_string();
            match field.file_name().map(ToString::to_string) {
                Some(file_name) => {
                    let content_type = field.content_type().map(ToString::to_string);
                    let data = field.bytes().await.map_err(malformed)?;
                    files.push(UploadedFile {
                        name,
                        file_name,
                        content_type,
                        data,
                    });
                }
                None => {
                    let text = field.text().await.map_err(malformed)?;
                    texts.push((name, text));
                }
            }
        }

        let mut fields = collect_pairs(texts);
        for file in &files {
            fields.insert(file.name.clone(), file.summary());
        }

        Ok(MultipartForm {
            fields,
            files: UploadedFiles(files),
        })
    };

    parse.now_or_never().unwrap_or_else(|| {
        Err(ExtractionError::malformed(
            ExtractionSource::Body,
            "incomplete multipart body",
        ))
    })
}

fn malformed(e: multer::Error) -> ExtractionError {
    ExtractionError::malformed(ExtractionSource::Body, e)
}
