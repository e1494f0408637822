use std::path::PathBuf;

use crate::ObjectId;

/// error type for twig operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("repository not found at {0}")]
    NoRepo(PathBuf),

    #[error("object not found: {0}")]
    ObjectNotFound(ObjectId),

    #[error("ref not found: {0}")]
    RefNotFound(String),

    #[error("invalid ref name: {0}")]
    InvalidRef(String),

    #[error("invalid object id hex: {0}")]
    InvalidIdHex(String),

    #[error("corrupt object {id}: {reason}")]
    CorruptObject { id: ObjectId, reason: String },

    #[error("invalid object type: {0}")]
    InvalidObjectType(String),

    #[error("invalid tree entry name: {0}")]
    InvalidEntryName(String),

    #[error("unsupported file mode for {path}")]
    UnsupportedMode { path: PathBuf },

    #[error("unsupported tree entry mode {mode} for {name}")]
    UnsupportedEntryMode { mode: String, name: String },

    #[error("malformed pkt-line: {0}")]
    MalformedPktLine(String),

    #[error("malformed ref advertisement: {0}")]
    MalformedAdvertisement(String),

    #[error("corrupt packfile: {0}")]
    CorruptPack(String),

    #[error("unsupported packfile feature: {0}")]
    UnsupportedPack(&'static str),

    #[error("corrupt delta: {0}")]
    CorruptDelta(String),

    #[error("delta base not found in pack: {0}")]
    DeltaBaseMissing(ObjectId),

    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;

/// helper to wrap io errors with path context
pub trait IoResultExt<T> {
    fn with_path(self, path: impl Into<PathBuf>) -> Result<T>;
}

impl<T> IoResultExt<T> for std::io::Result<T> {
    fn with_path(self, path: impl Into<PathBuf>) -> Result<T> {
        self.map_err(|source| Error::Io {
            path: path.into(),
            source,
        })
    }
}
