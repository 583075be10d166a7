//! Request handlers for the article resource.
//!
//! Each handler is a thin translation: pull the raw title from the path or
//! body, hand it to the store (which normalizes it), and render the result.
//! Outcomes are a tagged [`ApiError`] rather than ad-hoc 200s, so the
//! status-code mapping lives in exactly one place
//! ([`ApiError::into_response`]) while the message text stays what clients
//! of the original service expect.

use std::sync::Arc;

use http::{Method, StatusCode};
use thiserror::Error;
use tracing::{error, info, warn};

use crate::article::{Article, ArticleFields, ArticlePatch};
use crate::request::Request;
use crate::response::{IntoResponse, Response};
use crate::router::Router;
use crate::store::{ArticleStore, StoreError};
use crate::view;

/// A handler-level failure, mapped to a status code and a stable message
/// body at the edge.
#[derive(Debug, Error)]
pub enum ApiError {
    /// No record matches the (raw, as-supplied) title.
    #[error("No such article - \"{0}\"")]
    NotFound(String),

    /// Creation or replacement without a usable title.
    #[error("Article validation failed - \"title\" is required")]
    MissingTitle,

    /// The request body claimed to be JSON and was not.
    #[error("Malformed request body: {0}")]
    BadBody(#[from] serde_json::Error),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::NotFound(title) => Response::builder()
                .status(StatusCode::NOT_FOUND)
                .text(format!("No such article - \"{title}\"\n")),
            Self::MissingTitle => Response::builder()
                .status(StatusCode::UNPROCESSABLE_ENTITY)
                .text("Article validation failed - \"title\" is required\n"),
            Self::BadBody(e) => Response::builder()
                .status(StatusCode::BAD_REQUEST)
                .text(format!("Malformed request body: {e}\n")),
            Self::Store(StoreError::AlreadyExists { title }) => {
                warn!(%title, "rejected duplicate article");
                Response::builder()
                    .status(StatusCode::CONFLICT)
                    .text(format!("Article already exists - \"{title}\"\n"))
            }
            Self::Store(e) => {
                error!("store operation failed: {e}");
                Response::builder()
                    .status(StatusCode::INTERNAL_SERVER_ERROR)
                    .text(format!("{e}\n"))
            }
        }
    }
}

impl<T: IntoResponse> IntoResponse for Result<T, ApiError> {
    fn into_response(self) -> Response {
        match self {
            Ok(v) => v.into_response(),
            Err(e) => e.into_response(),
        }
    }
}

/// Shared handler state: the store handle and the PATCH compatibility flag.
///
/// Cloning is cheap (one `Arc` bump), which is how each route closure gets
/// its own copy.
#[derive(Clone)]
pub struct App {
    store: Arc<dyn ArticleStore>,
    patch_merges_content: bool,
}

impl App {
    pub fn new(store: Arc<dyn ArticleStore>, patch_merges_content: bool) -> Self {
        Self { store, patch_merges_content }
    }

    // GET /
    async fn index(self, _req: Request) -> Result<Response, ApiError> {
        let articles = self.store.list_all().await?;
        Ok(Response::html(view::index_page(&articles)))
    }

    // GET /articles
    async fn list(self, _req: Request) -> Result<Response, ApiError> {
        let articles = self.store.list_all().await?;
        let mut body = serde_json::to_vec(&articles)?;
        body.push(b'\n');
        Ok(Response::json(body))
    }

    // POST /articles
    async fn create(self, req: Request) -> Result<Response, ApiError> {
        let fields = ArticleFields::parse(req.content_type(), req.body())?;
        let Some(title) = fields.title() else {
            return Err(ApiError::MissingTitle);
        };
        let article = self.store.create(title, fields.content.as_deref()).await?;
        info!(title = %article.title, "article created");
        Ok(Response::builder()
            .status(StatusCode::CREATED)
            .text(format!("Article saved - {}\n", article.to_json())))
    }

    // DELETE /articles
    async fn destroy_all(self, _req: Request) -> Result<Response, ApiError> {
        let count = self.store.delete_all().await?;
        info!(count, "all articles deleted");
        Ok(Response::text("All articles deleted\n"))
    }

    // GET /articles/{title}
    async fn show(self, req: Request) -> Result<Response, ApiError> {
        let raw = req.param("title").unwrap_or_default().to_owned();
        match self.store.find_by_title(&raw).await? {
            Some(article) => Ok(Response::json(record_body(&article))),
            None => Err(ApiError::NotFound(raw)),
        }
    }

    // PUT /articles/{title} — full replace, no upsert.
    async fn update(self, req: Request) -> Result<Response, ApiError> {
        let raw = req.param("title").unwrap_or_default().to_owned();
        let fields = ArticleFields::parse(req.content_type(), req.body())?;
        let Some(title) = fields.title() else {
            return Err(ApiError::MissingTitle);
        };
        match self
            .store
            .replace(&raw, title, fields.content.as_deref())
            .await?
        {
            Some(article) => Ok(Response::text(format!(
                "Article Updated - {}\n",
                article.to_json()
            ))),
            None => Err(ApiError::NotFound(raw)),
        }
    }

    // PATCH /articles/{title}
    //
    // Compatibility rule: a body carrying `title` is a rename, and any
    // `content` alongside it is dropped. `GAZETTE_PATCH_MERGE` opts into
    // updating both.
    async fn modify(self, req: Request) -> Result<Response, ApiError> {
        let raw = req.param("title").unwrap_or_default().to_owned();
        let fields = ArticleFields::parse(req.content_type(), req.body())?;

        let patch = match (fields.title, fields.content) {
            (Some(title), content) => {
                let title = title.trim().to_owned();
                if title.is_empty() {
                    return Err(ApiError::MissingTitle);
                }
                ArticlePatch {
                    title: Some(title),
                    content: if self.patch_merges_content { content } else { None },
                }
            }
            (None, content) => ArticlePatch { title: None, content },
        };

        match self.store.patch(&raw, patch).await? {
            Some(article) => Ok(Response::text(format!(
                "Article Updated - {}\n",
                article.to_json()
            ))),
            None => Err(ApiError::NotFound(raw)),
        }
    }

    // DELETE /articles/{title}
    async fn destroy_one(self, req: Request) -> Result<Response, ApiError> {
        let raw = req.param("title").unwrap_or_default().to_owned();
        if self.store.delete_one(&raw).await? {
            info!(title = %raw, "article deleted");
            Ok(Response::text(format!("Article Deleted - \"{raw}\"\n")))
        } else {
            Err(ApiError::NotFound(raw))
        }
    }

    // GET /healthz — liveness: if we can answer at all, we are alive.
    async fn healthz(self, _req: Request) -> Response {
        Response::text("ok")
    }

    // GET /readyz — readiness, gated on the store answering.
    async fn readyz(self, _req: Request) -> Response {
        match self.store.ping().await {
            Ok(()) => Response::text("ready"),
            Err(e) => {
                warn!("readiness check failed: {e}");
                Response::status(StatusCode::SERVICE_UNAVAILABLE)
            }
        }
    }
}

/// Single-record JSON body with the trailing newline the original service
/// appended to everything it sent.
fn record_body(article: &Article) -> Vec<u8> {
    let mut body = article.to_json().into_bytes();
    body.push(b'\n');
    body
}

/// Builds the full routing table over `app`.
pub fn routes(app: App) -> Router {
    macro_rules! to {
        ($method:ident) => {{
            let app = app.clone();
            move |req| app.clone().$method(req)
        }};
    }

    Router::new()
        .on(Method::GET, "/", to!(index))
        .on(Method::GET, "/articles", to!(list))
        .on(Method::POST, "/articles", to!(create))
        .on(Method::DELETE, "/articles", to!(destroy_all))
        .on(Method::GET, "/articles/{title}", to!(show))
        .on(Method::PUT, "/articles/{title}", to!(update))
        .on(Method::PATCH, "/articles/{title}", to!(modify))
        .on(Method::DELETE, "/articles/{title}", to!(destroy_one))
        .on(Method::GET, "/healthz", to!(healthz))
        .on(Method::GET, "/readyz", to!(readyz))
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::request::testutil::request;
    use crate::store::memory::MemoryStore;

    /// A store whose backend is down: every operation fails the same way.
    struct FailingStore;

    impl FailingStore {
        fn unavailable<T>() -> Result<T, StoreError> {
            Err(StoreError::Database(sqlx::Error::PoolTimedOut))
        }
    }

    #[async_trait]
    impl ArticleStore for FailingStore {
        async fn ping(&self) -> Result<(), StoreError> {
            Self::unavailable()
        }

        async fn list_all(&self) -> Result<Vec<Article>, StoreError> {
            Self::unavailable()
        }

        async fn find_by_title(&self, _raw_title: &str) -> Result<Option<Article>, StoreError> {
            Self::unavailable()
        }

        async fn create(
            &self,
            _title: &str,
            _content: Option<&str>,
        ) -> Result<Article, StoreError> {
            Self::unavailable()
        }

        async fn replace(
            &self,
            _raw_title: &str,
            _new_title: &str,
            _new_content: Option<&str>,
        ) -> Result<Option<Article>, StoreError> {
            Self::unavailable()
        }

        async fn patch(
            &self,
            _raw_title: &str,
            _patch: ArticlePatch,
        ) -> Result<Option<Article>, StoreError> {
            Self::unavailable()
        }

        async fn delete_one(&self, _raw_title: &str) -> Result<bool, StoreError> {
            Self::unavailable()
        }

        async fn delete_all(&self) -> Result<u64, StoreError> {
            Self::unavailable()
        }
    }

    fn app() -> App {
        App::new(Arc::new(MemoryStore::new()), false)
    }

    fn merging_app() -> App {
        App::new(Arc::new(MemoryStore::new()), true)
    }

    fn json_post(body: &str) -> Request {
        request(Method::POST, "/articles", &[], Some("application/json"), body.as_bytes())
    }

    fn titled(method: Method, title: &str, body: &str) -> Request {
        request(
            method,
            "/articles/x",
            &[("title", title)],
            Some("application/json"),
            body.as_bytes(),
        )
    }

    #[tokio::test]
    async fn create_then_read_any_casing() {
        let app = app();
        let created = app
            .clone()
            .create(json_post(r#"{"title":"Hello World","content":"first post"}"#))
            .await
            .unwrap();
        assert_eq!(created.status_code(), StatusCode::CREATED);
        assert_eq!(
            created.body_bytes(),
            b"Article saved - {\"title\":\"Hello World\",\"content\":\"first post\"}\n"
        );

        let shown = app
            .clone()
            .show(titled(Method::GET, "HELLO WORLD", ""))
            .await
            .unwrap();
        assert_eq!(
            shown.body_bytes(),
            b"{\"title\":\"Hello World\",\"content\":\"first post\"}\n"
        );
    }

    #[tokio::test]
    async fn create_accepts_form_bodies() {
        let app = app();
        let req = request(
            Method::POST,
            "/articles",
            &[],
            Some("application/x-www-form-urlencoded"),
            b"title=Hello+World&content=first+post",
        );
        app.clone().create(req).await.unwrap();

        let shown = app.show(titled(Method::GET, "hello world", "")).await.unwrap();
        assert_eq!(
            shown.body_bytes(),
            b"{\"title\":\"Hello World\",\"content\":\"first post\"}\n"
        );
    }

    #[tokio::test]
    async fn create_without_title_is_rejected() {
        let err = app().create(json_post(r#"{"content":"orphan"}"#)).await.unwrap_err();
        let resp = err.into_response();
        assert_eq!(resp.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            resp.body_bytes(),
            b"Article validation failed - \"title\" is required\n"
        );
    }

    #[tokio::test]
    async fn duplicate_create_conflicts() {
        let app = app();
        app.clone().create(json_post(r#"{"title":"Hello"}"#)).await.unwrap();

        let err = app.create(json_post(r#"{"title":"HELLO"}"#)).await.unwrap_err();
        let resp = err.into_response();
        assert_eq!(resp.status_code(), StatusCode::CONFLICT);
        assert_eq!(resp.body_bytes(), b"Article already exists - \"HELLO\"\n");
    }

    #[tokio::test]
    async fn malformed_json_is_a_bad_request() {
        let err = app().create(json_post("{not json")).await.unwrap_err();
        assert_eq!(err.into_response().status_code(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn missing_article_messages_carry_the_raw_title() {
        let app = app();

        for result in [
            app.clone().show(titled(Method::GET, "Ghost Story", "")).await,
            app.clone()
                .update(titled(Method::PUT, "Ghost Story", r#"{"title":"New"}"#))
                .await,
            app.clone()
                .modify(titled(Method::PATCH, "Ghost Story", r#"{"content":"x"}"#))
                .await,
            app.clone().destroy_one(titled(Method::DELETE, "Ghost Story", "")).await,
        ] {
            let resp = result.unwrap_err().into_response();
            assert_eq!(resp.status_code(), StatusCode::NOT_FOUND);
            assert_eq!(resp.body_bytes(), b"No such article - \"Ghost Story\"\n");
        }
    }

    #[tokio::test]
    async fn put_is_a_total_replace() {
        let app = app();
        app.clone()
            .create(json_post(r#"{"title":"Hello World","content":"first post"}"#))
            .await
            .unwrap();

        let updated = app
            .clone()
            .update(titled(
                Method::PUT,
                "hello world",
                r#"{"title":"Greetings","content":"v2"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(
            updated.body_bytes(),
            b"Article Updated - {\"title\":\"Greetings\",\"content\":\"v2\"}\n"
        );

        // The old key no longer resolves; the new one does.
        assert!(app.clone().show(titled(Method::GET, "hello world", "")).await.is_err());
        assert!(app.show(titled(Method::GET, "GREETINGS", "")).await.is_ok());
    }

    #[tokio::test]
    async fn patch_content_only_keeps_title() {
        let app = app();
        app.clone()
            .create(json_post(r#"{"title":"Hello World","content":"first post"}"#))
            .await
            .unwrap();

        let patched = app
            .modify(titled(Method::PATCH, "hello world", r#"{"content":"edited"}"#))
            .await
            .unwrap();
        assert_eq!(
            patched.body_bytes(),
            b"Article Updated - {\"title\":\"Hello World\",\"content\":\"edited\"}\n"
        );
    }

    #[tokio::test]
    async fn patch_title_wins_and_drops_content_by_default() {
        let app = app();
        app.clone()
            .create(json_post(r#"{"title":"Hello","content":"original"}"#))
            .await
            .unwrap();

        let patched = app
            .clone()
            .modify(titled(
                Method::PATCH,
                "hello",
                r#"{"title":"Renamed","content":"ignored"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(
            patched.body_bytes(),
            b"Article Updated - {\"title\":\"Renamed\",\"content\":\"original\"}\n"
        );
    }

    #[tokio::test]
    async fn patch_merge_flag_updates_both_fields() {
        let app = merging_app();
        app.clone()
            .create(json_post(r#"{"title":"Hello","content":"original"}"#))
            .await
            .unwrap();

        let patched = app
            .modify(titled(
                Method::PATCH,
                "hello",
                r#"{"title":"Renamed","content":"merged"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(
            patched.body_bytes(),
            b"Article Updated - {\"title\":\"Renamed\",\"content\":\"merged\"}\n"
        );
    }

    #[tokio::test]
    async fn delete_one_then_delete_all() {
        let app = app();
        app.clone().create(json_post(r#"{"title":"A"}"#)).await.unwrap();
        app.clone().create(json_post(r#"{"title":"B"}"#)).await.unwrap();
        app.clone().create(json_post(r#"{"title":"C"}"#)).await.unwrap();

        let deleted = app
            .clone()
            .destroy_one(titled(Method::DELETE, "a", ""))
            .await
            .unwrap();
        assert_eq!(deleted.body_bytes(), b"Article Deleted - \"a\"\n");

        let cleared = app
            .clone()
            .destroy_all(request(Method::DELETE, "/articles", &[], None, b""))
            .await
            .unwrap();
        assert_eq!(cleared.body_bytes(), b"All articles deleted\n");

        let listed = app
            .list(request(Method::GET, "/articles", &[], None, b""))
            .await
            .unwrap();
        assert_eq!(listed.body_bytes(), b"[]\n");
    }

    #[tokio::test]
    async fn index_page_lists_stored_articles() {
        let app = app();
        app.clone()
            .create(json_post(r#"{"title":"Hello World","content":"first post"}"#))
            .await
            .unwrap();

        let page = app.index(request(Method::GET, "/", &[], None, b"")).await.unwrap();
        let html = std::str::from_utf8(page.body_bytes()).unwrap();
        assert!(html.contains("Available Records"));
        assert!(html.contains("Hello World"));
    }

    #[tokio::test]
    async fn store_failures_map_to_500_with_the_detail_in_the_body() {
        let app = App::new(Arc::new(FailingStore), false);

        let results = [
            app.clone().list(request(Method::GET, "/articles", &[], None, b"")).await,
            app.clone().create(json_post(r#"{"title":"Hello"}"#)).await,
            app.clone().destroy_all(request(Method::DELETE, "/articles", &[], None, b"")).await,
            app.clone().show(titled(Method::GET, "Hello", "")).await,
        ];
        for result in results {
            let resp = result.unwrap_err().into_response();
            assert_eq!(resp.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
            let body = std::str::from_utf8(resp.body_bytes()).unwrap();
            assert!(body.starts_with("database error:"), "unexpected body: {body}");
            assert!(body.ends_with('\n'));
        }

        // And the readiness probe goes unhealthy rather than erroring.
        let ready = app.readyz(request(Method::GET, "/readyz", &[], None, b"")).await;
        assert_eq!(ready.status_code(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn article_lifecycle_end_to_end() {
        let app = app();

        // Create, then read back under a different casing.
        let created = app
            .clone()
            .create(json_post(r#"{"title":"Hello World","content":"first post"}"#))
            .await
            .unwrap();
        assert_eq!(created.status_code(), StatusCode::CREATED);

        let shown = app
            .clone()
            .show(titled(Method::GET, "HELLO WORLD", ""))
            .await
            .unwrap();
        assert_eq!(
            shown.body_bytes(),
            b"{\"title\":\"Hello World\",\"content\":\"first post\"}\n"
        );

        // Patch content only; the title stays.
        let patched = app
            .clone()
            .modify(titled(Method::PATCH, "hello world", r#"{"content":"edited"}"#))
            .await
            .unwrap();
        assert_eq!(
            patched.body_bytes(),
            b"Article Updated - {\"title\":\"Hello World\",\"content\":\"edited\"}\n"
        );

        // Full replace under a new title retires the old key.
        let replaced = app
            .clone()
            .update(titled(
                Method::PUT,
                "hello world",
                r#"{"title":"Greetings","content":"v2"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(
            replaced.body_bytes(),
            b"Article Updated - {\"title\":\"Greetings\",\"content\":\"v2\"}\n"
        );

        let gone = app
            .clone()
            .show(titled(Method::GET, "hello world", ""))
            .await
            .unwrap_err()
            .into_response();
        assert_eq!(gone.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(gone.body_bytes(), b"No such article - \"hello world\"\n");

        // Delete everything and confirm the list is empty.
        app.clone()
            .destroy_all(request(Method::DELETE, "/articles", &[], None, b""))
            .await
            .unwrap();
        let listed = app
            .list(request(Method::GET, "/articles", &[], None, b""))
            .await
            .unwrap();
        assert_eq!(listed.body_bytes(), b"[]\n");
    }

    #[tokio::test]
    async fn health_probes_answer() {
        let app = app();
        let live = app.clone().healthz(request(Method::GET, "/healthz", &[], None, b"")).await;
        assert_eq!(live.body_bytes(), b"ok");
        let ready = app.readyz(request(Method::GET, "/readyz", &[], None, b"")).await;
        assert_eq!(ready.body_bytes(), b"ready");
    }
}
