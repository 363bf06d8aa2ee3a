//! Error types for the content and comment pipeline
//!
//! Two families matter here: fatal configuration errors (broken metadata
//! document, bad dates, unparseable templates) abort startup, while
//! per-request errors (unknown post id, missing source file, a render
//! failure) map to an error response without taking the process down.

use std::path::PathBuf;
use thiserror::Error;

/// Errors produced by the registry, renderer, composer and comment flow
#[derive(Error, Debug)]
pub enum SiteError {
    /// The post metadata document could not be read or parsed
    #[error("invalid post metadata in {path}: {message}")]
    Metadata { path: PathBuf, message: String },

    /// Two posts in the metadata document share an id
    #[error("duplicate post id {0:?} in metadata document")]
    DuplicatePostId(String),

    /// A post date does not match the YYYY-MM-DD grammar
    #[error("invalid date {date:?} for post {id:?}")]
    InvalidDate { id: String, date: String },

    /// A post's Markdown source file is missing or unreadable
    #[error("markdown source {path} unreadable: {source}")]
    SourceNotFound {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Lookup or comment submission for an id not in the registry
    #[error("no post with id {0:?}")]
    PostNotFound(String),

    /// A template could not be loaded, parsed or rendered
    #[error("template error: {0}")]
    Template(#[from] tera::Error),
}

impl SiteError {
    /// True for errors caused by the request (unknown id), as opposed to
    /// broken operator-controlled assets.
    pub fn is_not_found(&self) -> bool {
        matches!(self, SiteError::PostNotFound(_))
    }
}
