//! Post model, registry and Markdown rendering

mod markdown;
mod post;
mod registry;

pub use markdown::MarkdownRenderer;
pub use post::Post;
pub use registry::PostRegistry;
