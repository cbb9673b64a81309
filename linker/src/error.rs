use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LinkError {
    #[error("I/O error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed descriptor set: {source}")]
    MalformedDescriptor {
        #[source]
        source: prost::DecodeError,
    },

    #[error("Malformed reference catalog {path}: {msg}")]
    Catalog { path: PathBuf, msg: String },

    #[error("Invalid file descriptor \"{file}\": {msg}")]
    Validation { file: String, msg: String },

    #[error("File \"{file}\" carries no source-code info; descriptors must be compiled with source positions retained for comment lookup")]
    MissingSourceInfo { file: String },
}
