//! In-memory comment threads
//!
//! The comment log is the only long-lived mutable state in the process.
//! It is shared by every request task, so all access goes through a
//! concurrent map; the per-key entry API makes an append atomic with
//! concurrent appends to the same or other post ids.
//!
//! Comments are accepted as opaque strings. Escaping happens at display
//! time in the templates, never here.

use dashmap::DashMap;
use serde::Serialize;

/// One submitted comment
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Comment {
    pub name: String,
    pub content: String,
}

/// Post id -> append-ordered comments, held in process memory
///
/// Created empty at startup and discarded on shutdown; nothing is
/// persisted.
#[derive(Debug, Default)]
pub struct CommentLog {
    threads: DashMap<String, Vec<Comment>>,
}

impl CommentLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a comment to a post's thread, creating the thread if needed
    pub fn append(&self, post_id: &str, comment: Comment) {
        self.threads
            .entry(post_id.to_string())
            .or_default()
            .push(comment);
    }

    /// The current thread for a post, oldest first
    ///
    /// Unknown ids yield an empty vector, never an error.
    pub fn get(&self, post_id: &str) -> Vec<Comment> {
        self.threads
            .get(post_id)
            .map(|thread| thread.value().clone())
            .unwrap_or_default()
    }

    /// Number of comments for a post
    pub fn count(&self, post_id: &str) -> usize {
        self.threads.get(post_id).map_or(0, |thread| thread.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn comment(name: &str, content: &str) -> Comment {
        Comment {
            name: name.to_string(),
            content: content.to_string(),
        }
    }

    #[test]
    fn test_append_preserves_order() {
        let log = CommentLog::new();
        log.append("p1", comment("A", "hi"));
        log.append("p1", comment("B", "yo"));

        assert_eq!(log.get("p1"), vec![comment("A", "hi"), comment("B", "yo")]);
    }

    #[test]
    fn test_unknown_id_is_empty() {
        let log = CommentLog::new();
        assert!(log.get("unknown").is_empty());
        assert_eq!(log.count("unknown"), 0);
    }

    #[test]
    fn test_threads_are_independent() {
        let log = CommentLog::new();
        log.append("p1", comment("A", "hi"));
        log.append("p2", comment("B", "yo"));

        assert_eq!(log.count("p1"), 1);
        assert_eq!(log.count("p2"), 1);
    }

    #[test]
    fn test_empty_and_markup_content_accepted() {
        let log = CommentLog::new();
        log.append("p1", comment("", ""));
        log.append("p1", comment("<b>", "<script>alert(1)</script>"));

        let thread = log.get("p1");
        assert_eq!(thread.len(), 2);
        assert_eq!(thread[1].content, "<script>alert(1)</script>");
    }

    #[test]
    fn test_concurrent_appends_lose_nothing() {
        const TASKS: usize = 32;
        const PER_TASK: usize = 50;

        let log = Arc::new(CommentLog::new());
        let mut handles = Vec::new();

        for task in 0..TASKS {
            let log = Arc::clone(&log);
            handles.push(std::thread::spawn(move || {
                for n in 0..PER_TASK {
                    log.append("p1", comment(&format!("t{}", task), &format!("c{}", n)));
                    // another key racing on the same map
                    log.append("other", comment("x", "y"));
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(log.count("p1"), TASKS * PER_TASK);
        assert_eq!(log.count("other"), TASKS * PER_TASK);

        // per-task order survives the interleaving
        let thread = log.get("p1");
        for task in 0..TASKS {
            let name = format!("t{}", task);
            let contents: Vec<_> = thread
                .iter()
                .filter(|c| c.name == name)
                .map(|c| c.content.clone())
                .collect();
            let expected: Vec<_> = (0..PER_TASK).map(|n| format!("c{}", n)).collect();
            assert_eq!(contents, expected);
        }
    }
}
