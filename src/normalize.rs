//! Title-to-key normalization.
//!
//! Every article is addressed by the canonical lowercase form of its title.
//! The same function runs at every write path and every read-by-title path —
//! an asymmetry here would make stored articles unreachable.

/// Canonical lookup key for a title.
///
/// Lowercases and collapses runs of whitespace to single spaces, trimming the
/// ends. Pure and total: never fails, never allocates beyond the result.
///
/// ```rust
/// use gazette::normalize_key;
///
/// assert_eq!(normalize_key("  Hello   World "), "hello world");
/// assert_eq!(normalize_key("HELLO WORLD"), "hello world");
/// ```
pub fn normalize_key(raw: &str) -> String {
    let lowered = raw.to_lowercase();
    lowered.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::normalize_key;

    #[test]
    fn lowercases() {
        assert_eq!(normalize_key("Hello World"), "hello world");
        assert_eq!(normalize_key("HELLO WORLD"), "hello world");
    }

    #[test]
    fn collapses_and_trims_whitespace() {
        assert_eq!(normalize_key("  Hello \t  World\n"), "hello world");
        assert_eq!(normalize_key("a  b   c"), "a b c");
    }

    #[test]
    fn idempotent() {
        for s in ["Hello World", "  MIXED   Case\tTitle ", "", "   ", "one"] {
            let once = normalize_key(s);
            assert_eq!(normalize_key(&once), once);
        }
    }

    #[test]
    fn case_insensitive() {
        for s in ["Hello World", "ärger im Büro", "greetings"] {
            assert_eq!(normalize_key(s), normalize_key(&s.to_uppercase()));
        }
    }

    #[test]
    fn empty_and_blank_collapse_to_empty() {
        assert_eq!(normalize_key(""), "");
        assert_eq!(normalize_key(" \t "), "");
    }
}
