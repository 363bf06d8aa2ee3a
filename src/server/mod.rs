//! HTTP server and request dispatch
//!
//! `AppState` carries the artifacts built once at startup (registry,
//! renderer, template set) plus the shared comment log, and exposes the
//! three core operations the routes consume: `render_index`,
//! `render_post` and `submit_comment`. Handlers are thin wrappers that
//! map errors onto responses; recoverable errors never take the process
//! down.

use anyhow::Result;
use axum::{
    extract::{Form, Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tera::Context;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::comments::{Comment, CommentLog};
use crate::content::{MarkdownRenderer, PostRegistry};
use crate::errors::SiteError;
use crate::templates::TemplateRenderer;
use crate::Site;

struct AppStateInner {
    registry: PostRegistry,
    markdown: MarkdownRenderer,
    templates: TemplateRenderer,
    comments: CommentLog,
    posts_dir: PathBuf,
    static_dir: PathBuf,
    site: SiteContext,
}

/// Site-wide values exposed to every template
#[derive(Debug, Clone, Serialize)]
struct SiteContext {
    title: String,
    description: String,
    author: String,
    language: String,
}

/// Shared application state, cheap to clone
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

impl AppState {
    /// Load the registry and templates and assemble the state
    ///
    /// Any error here means an operator-controlled asset is broken and is
    /// fatal to startup.
    pub fn build(site: &Site) -> Result<Self, SiteError> {
        let registry = PostRegistry::load(&site.metadata_path)?;
        let templates = TemplateRenderer::new(&site.templates_dir)?;
        tracing::info!(
            "loaded {} posts from {}",
            registry.len(),
            site.metadata_path.display()
        );

        Ok(Self {
            inner: Arc::new(AppStateInner {
                registry,
                markdown: MarkdownRenderer::new(),
                templates,
                comments: CommentLog::new(),
                posts_dir: site.posts_dir.clone(),
                static_dir: site.static_dir.clone(),
                site: SiteContext {
                    title: site.config.title.clone(),
                    description: site.config.description.clone(),
                    author: site.config.author.clone(),
                    language: site.config.language.clone(),
                },
            }),
        })
    }

    /// The comment log shared by all requests
    pub fn comments(&self) -> &CommentLog {
        &self.inner.comments
    }

    fn base_context(&self) -> Context {
        let mut context = Context::new();
        context.insert("site", &self.inner.site);
        context
    }

    /// Compose the homepage from the full registry, declaration order
    pub fn render_index(&self) -> Result<String, SiteError> {
        let mut context = self.base_context();
        context.insert("posts", self.inner.registry.posts());
        self.inner.templates.render("index.html", &context)
    }

    /// Compose a single post page: Markdown body plus its comment thread
    ///
    /// Unknown ids fail before any rendering or comment lookup happens.
    pub fn render_post(&self, id: &str) -> Result<String, SiteError> {
        let post = self
            .inner
            .registry
            .lookup(id)
            .ok_or_else(|| SiteError::PostNotFound(id.to_string()))?;

        let content = self
            .inner
            .markdown
            .render_post(&self.inner.posts_dir, post)?;
        let comments = self.inner.comments.get(id);

        let mut context = self.base_context();
        context.insert("post", post);
        context.insert("content", &content);
        context.insert("comments", &comments);
        self.inner.templates.render("post.html", &context)
    }

    /// Accept a comment for an existing post
    ///
    /// Submissions for unknown ids are rejected without creating a thread.
    pub fn submit_comment(&self, id: &str, name: String, message: String) -> Result<(), SiteError> {
        if self.inner.registry.lookup(id).is_none() {
            return Err(SiteError::PostNotFound(id.to_string()));
        }
        self.inner.comments.append(
            id,
            Comment {
                name,
                content: message,
            },
        );
        Ok(())
    }

    fn render_not_found(&self) -> Result<String, SiteError> {
        self.inner.templates.render("404.html", &self.base_context())
    }

    fn render_error(&self) -> Result<String, SiteError> {
        self.inner.templates.render("500.html", &self.base_context())
    }
}

/// Comment form fields, taken as opaque untrusted strings
#[derive(Debug, Deserialize)]
struct CommentForm {
    #[serde(default)]
    name: String,
    #[serde(default)]
    message: String,
}

/// Build the application router
pub fn router(state: AppState) -> Router {
    let static_dir = state.inner.static_dir.clone();
    Router::new()
        .route("/", get(index))
        .route("/posts/:id", get(show_post))
        .route("/posts/:id/comments", post(submit_comment))
        .nest_service("/static", ServeDir::new(static_dir))
        .fallback(not_found)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Start the server
pub async fn start(site: &Site) -> Result<()> {
    let state = AppState::build(site)?;
    let app = router(state);

    let addr = site.config.listen_address();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("listening on {}", addr);
    println!("Listening on http://{}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}

async fn index(State(state): State<AppState>) -> Response {
    match state.render_index() {
        Ok(html) => Html(html).into_response(),
        Err(e) => error_response(&state, e),
    }
}

async fn show_post(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    match state.render_post(&id) {
        Ok(html) => Html(html).into_response(),
        Err(e) => error_response(&state, e),
    }
}

async fn submit_comment(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(form): Form<CommentForm>,
) -> Response {
    match state.submit_comment(&id, form.name, form.message) {
        Ok(()) => Redirect::to(&format!("/posts/{}", id)).into_response(),
        Err(e) => error_response(&state, e),
    }
}

async fn not_found(State(state): State<AppState>) -> Response {
    not_found_response(&state)
}

fn error_response(state: &AppState, err: SiteError) -> Response {
    if err.is_not_found() {
        tracing::debug!("{}", err);
        return not_found_response(state);
    }

    tracing::error!("request failed: {}", err);
    match state.render_error() {
        Ok(html) => (StatusCode::INTERNAL_SERVER_ERROR, Html(html)).into_response(),
        Err(e) => {
            tracing::error!("rendering error page failed: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
        }
    }
}

fn not_found_response(state: &AppState) -> Response {
    match state.render_not_found() {
        Ok(html) => (StatusCode::NOT_FOUND, Html(html)).into_response(),
        Err(e) => {
            tracing::error!("rendering 404 page failed: {}", e);
            (StatusCode::NOT_FOUND, "Not Found").into_response()
        }
    }
}
