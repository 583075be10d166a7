//! Radix-tree request router.
//!
//! One [`matchit`] tree per HTTP method, built once at startup. Path
//! parameters are percent-decoded when a route matches, before any handler
//! (or the key normalizer behind it) sees them.

use std::collections::HashMap;
use std::sync::Arc;

use http::Method;
use matchit::Router as MatchitRouter;
use percent_encoding::percent_decode_str;

use crate::handler::{BoxedHandler, Handler};

/// The application router.
///
/// Each [`Router::on`] call returns `self` so registrations chain naturally:
///
/// ```rust,no_run
/// # use gazette::{Request, Response, Router};
/// # use http::Method;
/// # async fn list(_: Request) -> Response { Response::text("") }
/// # async fn create(_: Request) -> Response { Response::text("") }
/// Router::new()
///     .on(Method::GET, "/articles", list)
///     .on(Method::POST, "/articles", create);
/// ```
pub struct Router {
    routes: HashMap<Method, MatchitRouter<BoxedHandler>>,
}

impl Router {
    pub fn new() -> Self {
        Self { routes: HashMap::new() }
    }

    /// Register a handler for a method + path pair. Returns `self` for
    /// chaining. Path parameters use `{name}` syntax.
    ///
    /// # Panics
    ///
    /// Panics at startup on an invalid or conflicting route pattern.
    pub fn on(mut self, method: Method, path: &str, handler: impl Handler) -> Self {
        self.routes
            .entry(method)
            .or_default()
            .insert(path, handler.into_boxed_handler())
            .unwrap_or_else(|e| panic!("invalid route `{path}`: {e}"));
        self
    }

    pub(crate) fn lookup(
        &self,
        method: &Method,
        path: &str,
    ) -> Option<(BoxedHandler, HashMap<String, String>)> {
        let tree = self.routes.get(method)?;
        let matched = tree.at(path).ok()?;
        let handler = Arc::clone(matched.value);
        let params = matched
            .params
            .iter()
            .map(|(k, v)| {
                let decoded = percent_decode_str(v).decode_utf8_lossy().into_owned();
                (k.to_owned(), decoded)
            })
            .collect();
        Some((handler, params))
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::Request;
    use crate::response::Response;

    async fn echo(req: Request) -> Response {
        Response::text(req.param("title").unwrap_or("").to_owned())
    }

    #[test]
    fn params_are_percent_decoded() {
        let router = Router::new().on(Method::GET, "/articles/{title}", echo);
        let (_, params) = router.lookup(&Method::GET, "/articles/Hello%20World").unwrap();
        assert_eq!(params["title"], "Hello World");
    }

    #[test]
    fn method_and_path_both_gate_the_match() {
        let router = Router::new().on(Method::GET, "/articles", echo);
        assert!(router.lookup(&Method::GET, "/articles").is_some());
        assert!(router.lookup(&Method::POST, "/articles").is_none());
        assert!(router.lookup(&Method::GET, "/nope").is_none());
    }
}
