//! The article record and the request-body shapes that mutate it.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// The public article record.
///
/// This is the projection callers see: `title` and `content` only. The
/// normalized lookup key is internal to the store and never serialized out.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Article {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl Article {
    /// JSON rendering used in confirmation messages and single-record bodies.
    pub fn to_json(&self) -> String {
        // Serializing a struct of strings cannot fail.
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// A partial update: only the fields present are written.
///
/// The exclusive-field rule (title wins over content) is applied by the
/// handler before this reaches the store; the store writes exactly what it
/// is given. A title change always recomputes the lookup key.
#[derive(Clone, Debug, Default)]
pub struct ArticlePatch {
    pub title: Option<String>,
    pub content: Option<String>,
}

/// Fields extracted from a request body, JSON or form-encoded.
#[derive(Debug, Default, Deserialize)]
pub struct ArticleFields {
    pub title: Option<String>,
    pub content: Option<String>,
}

impl ArticleFields {
    /// Parses a request body according to its content type.
    ///
    /// `application/json` bodies go through serde; anything else is treated
    /// as `application/x-www-form-urlencoded`, which is what HTML forms and
    /// the original clients of this service send. An empty body yields empty
    /// fields rather than an error.
    pub fn parse(content_type: Option<&str>, body: &Bytes) -> Result<Self, serde_json::Error> {
        if body.is_empty() {
            return Ok(Self::default());
        }
        if content_type.is_some_and(|ct| ct.starts_with("application/json")) {
            return serde_json::from_slice(body);
        }
        let mut fields = Self::default();
        for (key, value) in form_urlencoded::parse(body) {
            match &*key {
                "title" => fields.title = Some(value.into_owned()),
                "content" => fields.content = Some(value.into_owned()),
                _ => {}
            }
        }
        Ok(fields)
    }

    /// The title, if present and non-blank.
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref().map(str::trim).filter(|t| !t.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_json_body() {
        let body = Bytes::from_static(br#"{"title":"Hello","content":"first"}"#);
        let fields = ArticleFields::parse(Some("application/json"), &body).unwrap();
        assert_eq!(fields.title.as_deref(), Some("Hello"));
        assert_eq!(fields.content.as_deref(), Some("first"));
    }

    #[test]
    fn parses_form_body() {
        let body = Bytes::from_static(b"title=Hello+World&content=first%20post");
        let fields = ArticleFields::parse(None, &body).unwrap();
        assert_eq!(fields.title.as_deref(), Some("Hello World"));
        assert_eq!(fields.content.as_deref(), Some("first post"));
    }

    #[test]
    fn empty_body_is_empty_fields() {
        let fields = ArticleFields::parse(Some("application/json"), &Bytes::new()).unwrap();
        assert!(fields.title.is_none());
        assert!(fields.content.is_none());
    }

    #[test]
    fn blank_title_does_not_count() {
        let body = Bytes::from_static(b"title=%20%20");
        let fields = ArticleFields::parse(None, &body).unwrap();
        assert!(fields.title().is_none());
    }

    #[test]
    fn invalid_json_is_an_error() {
        let body = Bytes::from_static(b"{not json");
        assert!(ArticleFields::parse(Some("application/json"), &body).is_err());
    }

    #[test]
    fn content_is_omitted_from_json_when_absent() {
        let article = Article { title: "T".into(), content: None };
        assert_eq!(article.to_json(), r#"{"title":"T"}"#);
    }
}
