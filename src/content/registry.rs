//! Post registry - loads and indexes post metadata
//!
//! The registry is built exactly once, before the server accepts requests,
//! and is read-only afterwards. Concurrent readers need no locking.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use super::post::{Post, PostRecord};
use crate::errors::SiteError;
use crate::helpers::date;

/// The loaded, immutable set of posts
#[derive(Debug)]
pub struct PostRegistry {
    /// Posts in metadata-document order, for the listing page
    posts: Vec<Post>,
    /// id -> position in `posts`
    index: HashMap<String, usize>,
}

impl PostRegistry {
    /// Load the registry from a JSON metadata document
    ///
    /// The document is an array of objects with string fields `id`, `date`
    /// (`YYYY-MM-DD`), `filename` and `title`. Any malformed entry, bad
    /// date or duplicate id fails the load; callers treat that as a fatal
    /// startup error.
    pub fn load(path: &Path) -> Result<Self, SiteError> {
        let content = fs::read_to_string(path).map_err(|e| SiteError::Metadata {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        let records: Vec<PostRecord> =
            serde_json::from_str(&content).map_err(|e| SiteError::Metadata {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;

        Self::from_records(records)
    }

    /// Build the registry from parsed metadata records
    pub fn from_records(records: Vec<PostRecord>) -> Result<Self, SiteError> {
        let mut posts = Vec::with_capacity(records.len());
        let mut index = HashMap::with_capacity(records.len());

        for record in records {
            let parsed = date::parse_iso(&record.date).ok_or_else(|| SiteError::InvalidDate {
                id: record.id.clone(),
                date: record.date.clone(),
            })?;

            if index.contains_key(&record.id) {
                return Err(SiteError::DuplicatePostId(record.id));
            }

            index.insert(record.id.clone(), posts.len());
            posts.push(Post {
                id: record.id,
                date: parsed,
                display_date: date::display_date(parsed),
                filename: record.filename,
                title: record.title,
            });
        }

        tracing::debug!("loaded {} posts", posts.len());
        Ok(Self { posts, index })
    }

    /// Exact, case-sensitive lookup by id
    pub fn lookup(&self, id: &str) -> Option<&Post> {
        self.index.get(id).map(|&pos| &self.posts[pos])
    }

    /// All posts, in metadata-document order
    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    pub fn len(&self) -> usize {
        self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }
}
