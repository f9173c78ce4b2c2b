use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MergeError {
    #[error("{origin}: version {found} does not match version {expected} of the files merged before it")]
    VersionMismatch {
        origin: String,
        expected: i64,
        found: i64,
    },

    #[error("{origin}: malformed collection: {reason}")]
    MalformedDocument { origin: String, reason: String },

    #[error("cannot read {}", path.display())]
    SourceUnavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot serialize collection: {0}")]
    Serialize(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, MergeError>;
