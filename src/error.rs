use crate::storage::StorageError;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Unrecognized dtype descriptor; the affected scale level cannot be decoded.
    #[error("unsupported element type descriptor {0:?}")]
    UnsupportedElementType(String),
    /// A metadata document is missing, unparseable, or internally inconsistent.
    #[error("malformed metadata: {0}")]
    MalformedMetadata(String),
    /// Requested scale index outside the resolved pyramid.
    #[error("invalid scale {scale}, image has {levels} levels")]
    InvalidScale { scale: usize, levels: usize },
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("decode failure: {0}")]
    Decode(String),
}

impl Error {
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedMetadata(message.into())
    }

    /// JSON failures while reading a metadata document are metadata errors,
    /// tagged with the document key.
    pub(crate) fn malformed_json(key: &str, error: serde_json::Error) -> Self {
        Self::MalformedMetadata(format!("could not parse {key}: {error}"))
    }
}
