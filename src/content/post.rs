//! Post model

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One entry of the metadata document, exactly as written on disk
///
/// All four fields are required; a missing or mistyped field fails the
/// whole load.
#[derive(Debug, Clone, Deserialize)]
pub struct PostRecord {
    pub id: String,
    pub date: String,
    pub filename: String,
    pub title: String,
}

/// A blog post, immutable after registry load
#[derive(Debug, Clone, Serialize)]
pub struct Post {
    /// Unique string key, used in URLs
    pub id: String,

    /// Publication date
    pub date: NaiveDate,

    /// Human-readable date, precomputed at load ("Monday, October 20")
    pub display_date: String,

    /// Markdown source path, relative to the posts directory
    pub filename: String,

    /// Post title
    pub title: String,
}
