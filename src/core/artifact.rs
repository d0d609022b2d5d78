//! Artifacts submitted to analyzers.
//!
//! An artifact is either a file attachment, sent as a multipart body, or
//! inline structured data, sent as JSON. Files may be held in memory or
//! read from disk at submission time.

use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

use crate::core::error::Result;

/// Content type used when none is set on a file artifact.
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Data submitted to an analyzer.
#[derive(Debug, Clone)]
pub enum Artifact {
    /// A file attachment with JSON metadata.
    File(FileArtifact),
    /// Inline observable data.
    Data(DataArtifact),
}

impl Artifact {
    /// Returns `true` if this is a file attachment.
    pub fn is_file(&self) -> bool {
        matches!(self, Self::File(_))
    }

    /// Returns `true` if this is inline data.
    pub fn is_data(&self) -> bool {
        matches!(self, Self::Data(_))
    }
}

impl From<FileArtifact> for Artifact {
    fn from(file: FileArtifact) -> Self {
        Self::File(file)
    }
}

impl From<DataArtifact> for Artifact {
    fn from(data: DataArtifact) -> Self {
        Self::Data(data)
    }
}

/// Where the bytes of a file artifact come from.
#[derive(Clone)]
pub enum FileSource {
    /// A file on disk, read when the artifact is submitted.
    Path(PathBuf),
    /// In-memory bytes.
    Bytes(Vec<u8>),
}

impl std::fmt::Debug for FileSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Path(path) => f.debug_tuple("Path").field(path).finish(),
            Self::Bytes(data) => f
                .debug_struct("Bytes")
                .field("data_len", &data.len())
                .finish(),
        }
    }
}

/// A file attachment.
///
/// # Examples
///
/// ```rust
/// use cortexbridge::core::FileArtifact;
/// use serde_json::json;
///
/// let artifact = FileArtifact::from_bytes(vec![0x4D, 0x5A])
///     .with_filename("sample.exe")
///     .with_attribute("tlp", json!(2));
/// assert_eq!(artifact.filename(), Some("sample.exe"));
/// ```
#[derive(Debug, Clone)]
pub struct FileArtifact {
    source: FileSource,
    filename: Option<String>,
    content_type: Option<String>,
    attributes: Map<String, Value>,
}

impl FileArtifact {
    /// Creates an artifact backed by a file on disk.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self::with_source(FileSource::Path(path.into()))
    }

    /// Creates an artifact from in-memory bytes.
    pub fn from_bytes(data: impl Into<Vec<u8>>) -> Self {
        Self::with_source(FileSource::Bytes(data.into()))
    }

    fn with_source(source: FileSource) -> Self {
        Self {
            source,
            filename: None,
            content_type: None,
            attributes: Map::new(),
        }
    }

    /// Sets the filename reported to the engine.
    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    /// Sets the content type of the binary part.
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Adds one metadata attribute (`dataType`, `tlp`, `message`, ...).
    pub fn with_attribute(mut self, key: impl Into<String>, value: Value) -> Self {
        self.attributes.insert(key.into(), value);
        self
    }

    /// Replaces all metadata attributes.
    pub fn with_attributes(mut self, attributes: Map<String, Value>) -> Self {
        self.attributes = attributes;
        self
    }

    /// Returns the byte source.
    pub fn source(&self) -> &FileSource {
        &self.source
    }

    /// Returns the filename, if known.
    ///
    /// For path-backed artifacts without an explicit name, the last path
    /// component is used.
    pub fn filename(&self) -> Option<&str> {
        match (&self.filename, &self.source) {
            (Some(name), _) => Some(name),
            (None, FileSource::Path(path)) => path.file_name().and_then(|n| n.to_str()),
            (None, FileSource::Bytes(_)) => None,
        }
    }

    /// Returns the content type of the binary part.
    pub fn content_type(&self) -> &str {
        self.content_type.as_deref().unwrap_or(DEFAULT_CONTENT_TYPE)
    }

    /// Returns the metadata attributes.
    pub fn attributes(&self) -> &Map<String, Value> {
        &self.attributes
    }

    /// Returns the path, if this artifact is backed by a file on disk.
    pub fn as_path(&self) -> Option<&Path> {
        match &self.source {
            FileSource::Path(path) => Some(path),
            FileSource::Bytes(_) => None,
        }
    }

    /// Loads the file content.
    pub async fn read(&self) -> Result<Vec<u8>> {
        match &self.source {
            FileSource::Path(path) => Ok(tokio::fs::read(path).await?),
            FileSource::Bytes(data) => Ok(data.clone()),
        }
    }
}

/// Inline observable data, submitted as a JSON object.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataArtifact {
    fields: Map<String, Value>,
}

impl DataArtifact {
    /// Creates an artifact carrying `dataType` and `data`.
    pub fn new(data_type: impl Into<String>, data: impl Into<String>) -> Self {
        Self::default()
            .with_field("dataType", Value::String(data_type.into()))
            .with_field("data", Value::String(data.into()))
    }

    /// Creates an artifact from raw fields.
    pub fn from_fields(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    /// Sets one field.
    pub fn with_field(mut self, key: impl Into<String>, value: Value) -> Self {
        self.fields.insert(key.into(), value);
        self
    }

    /// Sets the traffic-light classification.
    pub fn with_tlp(self, tlp: i64) -> Self {
        self.with_field("tlp", Value::from(tlp))
    }

    /// Sets the analyst message.
    pub fn with_message(self, message: impl Into<String>) -> Self {
        self.with_field("message", Value::String(message.into()))
    }

    /// Returns the fields.
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    #[test]
    fn test_file_artifact_from_path() {
        let artifact = FileArtifact::from_path("/samples/invoice.pdf");
        assert_eq!(artifact.filename(), Some("invoice.pdf"));
        assert_eq!(artifact.as_path(), Some(Path::new("/samples/invoice.pdf")));
        assert_eq!(artifact.content_type(), DEFAULT_CONTENT_TYPE);
    }

    #[test]
    fn test_file_artifact_from_bytes() {
        let artifact = FileArtifact::from_bytes(vec![1, 2, 3])
            .with_content_type("application/pdf")
            .with_attribute("dataType", json!("file"));
        assert_eq!(artifact.filename(), None);
        assert_eq!(artifact.content_type(), "application/pdf");
        assert_eq!(artifact.attributes().get("dataType"), Some(&json!("file")));
        assert!(Artifact::from(artifact).is_file());
    }

    #[tokio::test]
    async fn test_file_artifact_read_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"MZ payload").unwrap();

        let artifact = FileArtifact::from_path(file.path());
        assert_eq!(artifact.read().await.unwrap(), b"MZ payload");

        let missing = FileArtifact::from_path("/nonexistent/cortexbridge/sample");
        assert!(matches!(
            missing.read().await,
            Err(crate::core::ClientError::Io(_))
        ));
    }

    #[test]
    fn test_data_artifact_fields() {
        let artifact = DataArtifact::new("domain", "example.org")
            .with_tlp(2)
            .with_message("from alert #42");
        assert_eq!(
            Value::Object(artifact.fields().clone()),
            json!({
                "dataType": "domain",
                "data": "example.org",
                "tlp": 2,
                "message": "from alert #42"
            })
        );
        assert!(Artifact::from(artifact).is_data());
    }
}
