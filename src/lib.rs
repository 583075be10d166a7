//! # gazette
//!
//! A small article directory service: HTTP CRUD over a single `article`
//! resource, addressed by the canonical lowercase form of its title.
//!
//! ## The contract
//!
//! An article is `title` + optional `content`. Its only identity is the
//! normalized key derived from the title — every write recomputes it, every
//! read-by-title derives it the same way, and the store enforces that no
//! two articles share one. Nothing else is clever on purpose.
//!
//! | Path | Verb | Does |
//! |---|---|---|
//! | `/` | GET | HTML list of every article |
//! | `/articles` | GET | JSON list |
//! | `/articles` | POST | create (`title` required) |
//! | `/articles` | DELETE | delete everything |
//! | `/articles/{title}` | GET / PUT / PATCH / DELETE | one article, by any casing of its title |
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use gazette::{App, MemoryStore, Server, routes};
//!
//! #[tokio::main]
//! async fn main() {
//!     let app = App::new(Arc::new(MemoryStore::new()), false);
//!     Server::bind("0.0.0.0:3000".parse().unwrap())
//!         .serve(routes(app))
//!         .await
//!         .unwrap();
//! }
//! ```
//!
//! The binary wires the same pieces to a [`SqliteStore`] configured from the
//! environment; see [`config::Config`].

mod article;
pub mod config;
mod error;
mod handler;
mod handlers;
mod normalize;
mod request;
mod response;
mod router;
mod server;
pub mod store;
mod view;

pub use article::{Article, ArticleFields, ArticlePatch};
pub use error::Error;
pub use handler::Handler;
pub use handlers::{ApiError, App, routes};
pub use normalize::normalize_key;
pub use request::Request;
pub use response::{IntoResponse, Response};
pub use router::Router;
pub use server::Server;
pub use store::memory::MemoryStore;
pub use store::sqlite::SqliteStore;
pub use store::{ArticleStore, StoreError};
