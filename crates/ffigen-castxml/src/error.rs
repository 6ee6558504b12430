//! Error types for ffigen-castxml.

use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, CastXmlError>;

#[derive(Debug, thiserror::Error)]
pub enum CastXmlError {
    #[error("castxml not found: {0}")]
    BinaryNotFound(String),

    #[error("castxml invocation failed (exit code {status}): {stderr}")]
    ProcessFailed { status: i32, stderr: String },

    #[error("cannot parse version section from castxml output: {0}")]
    VersionParse(String),

    #[error("file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("invalid XML document: {0}")]
    Xml(#[from] roxmltree::Error),

    #[error("document root is not a CastXML element, found <{0}>")]
    UnexpectedRoot(String),

    #[error("element with id \"{0}\" could not be found")]
    UnresolvedId(String),

    #[error("element <{tag}> is missing required attribute \"{attribute}\"")]
    MissingAttribute { tag: String, attribute: String },

    #[error("malformed location signature \"{0}\", expected \"<fileId>:<line>\"")]
    MalformedLocation(String),

    #[error("variadic marker without a preceding argument in \"{0}\"")]
    DanglingEllipsis(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
