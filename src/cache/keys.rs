//! Cache entry identity.

use axum::http::Method;
use url::Url;

use crate::domain::WorkerRequest;

/// Normalized request identity: method plus URL with the fragment
/// stripped.
///
/// Query strings are significant. Fragments never reach the server and
/// would split entries for the same resource, so they are dropped.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EntryKey {
    method: String,
    url: String,
}

impl EntryKey {
    pub fn for_request(request: &WorkerRequest) -> Self {
        Self::from_parts(request.method(), request.url())
    }

    /// Key for a path joined against the configured origin.
    pub fn for_path(origin: &Url, path: &str) -> Result<Self, url::ParseError> {
        let url = origin.join(path)?;
        Ok(Self::from_parts(&Method::GET, &url))
    }

    fn from_parts(method: &Method, url: &Url) -> Self {
        let mut url = url.clone();
        url.set_fragment(None);
        Self {
            method: method.as_str().to_string(),
            url: url.to_string(),
        }
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn origin() -> Url {
        Url::parse("http://origin.test").expect("valid origin")
    }

    #[test]
    fn fragment_is_stripped_from_identity() {
        let with_fragment = WorkerRequest::new(
            Method::GET,
            Url::parse("http://origin.test/page#section").expect("valid url"),
        );
        let without = WorkerRequest::new(
            Method::GET,
            Url::parse("http://origin.test/page").expect("valid url"),
        );
        assert_eq!(
            EntryKey::for_request(&with_fragment),
            EntryKey::for_request(&without)
        );
    }

    #[test]
    fn query_is_significant() {
        let a = EntryKey::for_path(&origin(), "/search?q=a").expect("key");
        let b = EntryKey::for_path(&origin(), "/search?q=b").expect("key");
        assert_ne!(a, b);
    }

    #[test]
    fn path_keys_join_against_the_origin() {
        let key = EntryKey::for_path(&origin(), "/offline").expect("key");
        assert_eq!(key.url(), "http://origin.test/offline");
        assert_eq!(key.method(), "GET");
    }
}
