//! Page activation gate.
//!
//! The limiter only runs on one route: the configured path with either no
//! query string or a query containing the configured marker. Every other
//! route is inert.

use serde::{Deserialize, Serialize};
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageGate {
    #[serde(default = "default_path")]
    pub path: String,
    /// Substring that also activates the gate when present in the query.
    #[serde(default)]
    pub query_marker: Option<String>,
}

fn default_path() -> String {
    "/".into()
}

impl Default for PageGate {
    fn default() -> Self {
        Self {
            path: default_path(),
            query_marker: Some("sk=h_chr".into()),
        }
    }
}

impl PageGate {
    /// Whether the limiter should activate for `url`. Unparseable URLs are inert.
    pub fn matches(&self, url: &str) -> bool {
        match Url::parse(url) {
            Ok(parsed) => self.matches_parts(parsed.path(), parsed.query()),
            Err(_) => false,
        }
    }

    /// Same check on already-split components; `query` excludes the `?`.
    pub fn matches_parts(&self, path: &str, query: Option<&str>) -> bool {
        if path != self.path {
            return false;
        }
        match query {
            None | Some("") => true,
            Some(q) => self
                .query_marker
                .as_deref()
                .is_some_and(|marker| !marker.is_empty() && q.contains(marker)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_without_query_matches() {
        let gate = PageGate::default();
        assert!(gate.matches("https://www.facebook.com/"));
        assert!(gate.matches("https://www.facebook.com"));
        assert!(gate.matches("https://www.facebook.com/?"));
    }

    #[test]
    fn marker_query_matches() {
        let gate = PageGate::default();
        assert!(gate.matches("https://www.facebook.com/?sk=h_chr"));
        assert!(gate.matches("https://www.facebook.com/?ref=x&sk=h_chr"));
    }

    #[test]
    fn other_routes_are_inert() {
        let gate = PageGate::default();
        assert!(!gate.matches("https://www.facebook.com/?sk=h_nor"));
        assert!(!gate.matches("https://www.facebook.com/groups/feed/"));
        assert!(!gate.matches("https://www.facebook.com/marketplace?sk=h_chr"));
        assert!(!gate.matches("not a url"));
    }

    #[test]
    fn no_marker_only_allows_bare_path() {
        let gate = PageGate {
            path: "/feed".into(),
            query_marker: None,
        };
        assert!(gate.matches_parts("/feed", None));
        assert!(!gate.matches_parts("/feed", Some("a=1")));
        assert!(!gate.matches_parts("/", None));
    }
}
