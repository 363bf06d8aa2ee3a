//! Page templates using the Tera template engine
//!
//! A base layout declares the insertion points (`title`, `main`); each page
//! template extends it and fills them. Templates are plain files in the
//! templates directory and are parsed once at startup.
//!
//! Autoescaping stays ON: every context value is HTML-entity-encoded when
//! interpolated, and only values a template explicitly marks `| safe` (the
//! Markdown renderer's fragment) are embedded verbatim. Comment text relies
//! on this.

use std::fs;
use std::path::Path;

use tera::{Context, Tera};

use crate::errors::SiteError;

/// The layout every page extends
pub const LAYOUT: &str = "base.html";

/// Page templates resolved in the templates directory
pub const PAGES: &[&str] = &["index.html", "post.html", "404.html", "500.html"];

/// Template renderer holding the parsed layout and page set
#[derive(Debug)]
pub struct TemplateRenderer {
    tera: Tera,
}

impl TemplateRenderer {
    /// Load and parse all templates from the templates directory
    ///
    /// Fails if any template is missing or unparseable, or if a page does
    /// not fill every block the layout declares. Callers treat this as a
    /// fatal startup error.
    pub fn new(templates_dir: &Path) -> Result<Self, SiteError> {
        let layout_src = read_template(templates_dir, LAYOUT)?;
        let insertion_points = declared_blocks(&layout_src);

        let mut templates = vec![(LAYOUT, layout_src)];
        for name in PAGES {
            let src = read_template(templates_dir, name)?;
            for block in &insertion_points {
                if !fills_block(&src, block) {
                    return Err(SiteError::Template(tera::Error::msg(format!(
                        "page {} does not fill layout block {:?}",
                        name, block
                    ))));
                }
            }
            templates.push((*name, src));
        }

        let mut tera = Tera::default();
        tera.add_raw_templates(templates)?;
        Ok(Self { tera })
    }

    /// Compose a page with the given context into a full HTML document
    pub fn render(&self, page: &str, context: &Context) -> Result<String, SiteError> {
        Ok(self.tera.render(page, context)?)
    }
}

fn read_template(dir: &Path, name: &str) -> Result<String, SiteError> {
    let path = dir.join(name);
    fs::read_to_string(&path).map_err(|e| {
        SiteError::Template(tera::Error::msg(format!(
            "cannot read template {}: {}",
            path.display(),
            e
        )))
    })
}

/// Names of `{% block ... %}` tags appearing in a template source
fn declared_blocks(source: &str) -> Vec<String> {
    let mut blocks = Vec::new();
    for chunk in source.split("{%").skip(1) {
        let tag = chunk.split("%}").next().unwrap_or("");
        let tag = tag.trim_start_matches('-').trim();
        if let Some(rest) = tag.strip_prefix("block ") {
            if let Some(name) = rest.split_whitespace().next() {
                if !blocks.iter().any(|b| b == name) {
                    blocks.push(name.to_string());
                }
            }
        }
    }
    blocks
}

fn fills_block(source: &str, name: &str) -> bool {
    declared_blocks(source).iter().any(|b| b == name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;

    fn repo_templates() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("templates")
    }

    #[test]
    fn test_declared_blocks() {
        let src = "a {% block title %}{% endblock %} b {%- block main -%}{% endblock %}";
        assert_eq!(declared_blocks(src), vec!["title", "main"]);
    }

    #[test]
    fn test_loads_shipped_templates() {
        TemplateRenderer::new(&repo_templates()).unwrap();
    }

    #[test]
    fn test_escapes_context_values() {
        let renderer = TemplateRenderer::new(&repo_templates()).unwrap();

        let mut context = Context::new();
        context.insert(
            "site",
            &serde_json::json!({"title": "<b>Site</b>", "description": "", "language": "en"}),
        );
        context.insert(
            "post",
            &serde_json::json!({"id": "p", "title": "T", "display_date": "Monday, October 20"}),
        );
        context.insert("content", "<strong>bold</strong>");
        context.insert(
            "comments",
            &serde_json::json!([{"name": "A", "content": "<script>alert(1)</script>"}]),
        );

        let html = renderer.render("post.html", &context).unwrap();

        // untrusted values are entity-encoded
        assert!(html.contains("&lt;script&gt;alert(1)&lt;&#x2F;script&gt;"));
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;b&gt;Site&lt;&#x2F;b&gt;"));

        // the pre-rendered fragment is embedded verbatim
        assert!(html.contains("<strong>bold</strong>"));
    }

    #[test]
    fn test_missing_template_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            TemplateRenderer::new(dir.path()),
            Err(SiteError::Template(_))
        ));
    }

    #[test]
    fn test_page_must_fill_layout_blocks() {
        let dir = tempfile::tempdir().unwrap();
        let write = |name: &str, body: &str| {
            let mut f = std::fs::File::create(dir.path().join(name)).unwrap();
            write!(f, "{}", body).unwrap();
        };

        write(
            "base.html",
            "<title>{% block title %}{% endblock %}</title>{% block main %}{% endblock %}",
        );
        // post.html fills only one of the two insertion points
        write(
            "post.html",
            "{% extends \"base.html\" %}{% block title %}t{% endblock %}",
        );
        write(
            "index.html",
            "{% extends \"base.html\" %}{% block title %}t{% endblock %}{% block main %}m{% endblock %}",
        );
        write(
            "404.html",
            "{% extends \"base.html\" %}{% block title %}t{% endblock %}{% block main %}m{% endblock %}",
        );
        write(
            "500.html",
            "{% extends \"base.html\" %}{% block title %}t{% endblock %}{% block main %}m{% endblock %}",
        );

        let err = TemplateRenderer::new(dir.path()).unwrap_err();
        assert!(err.to_string().contains("post.html"));
    }
}
