use axum::http::Method;
use url::Url;

/// The kind of resource a request is fetching, mirroring the
/// `Sec-Fetch-Dest` values the gateway observes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Destination {
    Document,
    Script,
    Style,
    Image,
    Font,
    Manifest,
    Other,
}

impl Destination {
    /// Parse a `Sec-Fetch-Dest` header value.
    pub fn from_header(value: &str) -> Self {
        match value {
            "document" => Self::Document,
            "script" => Self::Script,
            "style" => Self::Style,
            "image" => Self::Image,
            "font" => Self::Font,
            "manifest" => Self::Manifest,
            _ => Self::Other,
        }
    }

    /// Whether this request is a full page navigation.
    pub fn is_document(self) -> bool {
        matches!(self, Self::Document)
    }
}

/// An intercepted request: method, absolute URL and destination.
///
/// Bodies are not carried. Only GET requests are ever served from the
/// cache; pass-through requests keep their original transport
/// representation at the gateway.
#[derive(Debug, Clone)]
pub struct WorkerRequest {
    method: Method,
    url: Url,
    destination: Destination,
}

impl WorkerRequest {
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            destination: Destination::Other,
        }
    }

    pub fn with_destination(mut self, destination: Destination) -> Self {
        self.destination = destination;
        self
    }

    /// A GET navigation for `url`.
    pub fn document(url: Url) -> Self {
        Self::new(Method::GET, url).with_destination(Destination::Document)
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn destination(&self) -> Destination {
        self.destination
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn destination_parses_known_header_values() {
        assert_eq!(Destination::from_header("document"), Destination::Document);
        assert_eq!(Destination::from_header("font"), Destination::Font);
        assert_eq!(Destination::from_header("empty"), Destination::Other);
    }

    #[test]
    fn document_constructor_sets_navigation_destination() {
        let url = Url::parse("http://origin.test/blog/post-1").expect("valid url");
        let request = WorkerRequest::document(url);
        assert_eq!(request.method(), &Method::GET);
        assert!(request.destination().is_document());
    }
}
