//! HTML rendering for the index page.
//!
//! One page, one list. Titles and content are user-supplied and must be
//! escaped before they reach markup.

use crate::article::Article;

/// The "Available Records" index page.
pub fn index_page(articles: &[Article]) -> String {
    let mut items = String::new();
    for article in articles {
        items.push_str("      <li><strong>");
        items.push_str(&escape(&article.title));
        items.push_str("</strong>");
        if let Some(content) = &article.content {
            items.push_str(": ");
            items.push_str(&escape(content));
        }
        items.push_str("</li>\n");
    }
    if items.is_empty() {
        items.push_str("      <li><em>No articles yet.</em></li>\n");
    }

    format!(
        "<!DOCTYPE html>\n<html>\n  <head>\n    <meta charset=\"utf-8\">\n    \
         <title>Available Records</title>\n  </head>\n  <body>\n    \
         <h1>Available Records</h1>\n    <ul>\n{items}    </ul>\n  </body>\n</html>\n"
    )
}

fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lists_articles_and_escapes_markup() {
        let articles = vec![
            Article { title: "Hello <World>".into(), content: Some("a & b".into()) },
            Article { title: "Second".into(), content: None },
        ];
        let page = index_page(&articles);
        assert!(page.contains("Available Records"));
        assert!(page.contains("Hello &lt;World&gt;"));
        assert!(page.contains("a &amp; b"));
        assert!(page.contains("Second"));
        assert!(!page.contains("<World>"));
    }

    #[test]
    fn empty_store_renders_placeholder() {
        let page = index_page(&[]);
        assert!(page.contains("No articles yet."));
    }
}
