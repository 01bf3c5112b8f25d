use axum::http::{request::Parts, HeaderName, Method, Request, Uri};

/// Name of the correlation header read from requests and echoed on responses.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Correlation identifier of the current request, stored in request
/// extensions by the request-id middleware.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct XRequestId(pub String);

impl XRequestId {
    pub fn header() -> HeaderName {
        HeaderName::from_static(REQUEST_ID_HEADER)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// The request facts echoed in every envelope.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RequestMeta {
    pub method: Method,
    /// Path plus query string, as received.
    pub path: String,
    /// `"unknown"` when the request-id middleware did not run.
    pub request_id: String,
}

impl RequestMeta {
    pub const UNKNOWN_REQUEST_ID: &'static str = "unknown";

    pub fn from_request<B>(req: &Request<B>) -> Self {
        Self::build(
            req.method(),
            req.uri(),
            req.extensions().get::<XRequestId>(),
        )
    }

    pub fn from_parts(parts: &Parts) -> Self {
        Self::build(&parts.method, &parts.uri, parts.extensions.get::<XRequestId>())
    }

    fn build(method: &Method, uri: &Uri, rid: Option<&XRequestId>) -> Self {
        let path = uri
            .path_and_query()
            .map(|pq| pq.as_str().to_owned())
            .unwrap_or_else(|| uri.path().to_owned());
        Self {
            method: method.clone(),
            path,
            request_id: rid
                .map(|r| r.0.clone())
                .unwrap_or_else(|| Self::UNKNOWN_REQUEST_ID.to_owned()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    #[test]
    fn meta_keeps_query_string_and_request_id() {
        let mut req = Request::builder()
            .method(Method::GET)
            .uri("/api/v1/products?page=2&limit=5")
            .body(Body::empty())
            .unwrap();
        req.extensions_mut().insert(XRequestId("rid-1".into()));

        let meta = RequestMeta::from_request(&req);
        assert_eq!(meta.method, Method::GET);
        assert_eq!(meta.path, "/api/v1/products?page=2&limit=5");
        assert_eq!(meta.request_id, "rid-1");
    }

    #[test]
    fn meta_without_request_id_reports_unknown() {
        let req = Request::builder()
            .method(Method::DELETE)
            .uri("/x")
            .body(Body::empty())
            .unwrap();
        assert_eq!(RequestMeta::from_request(&req).request_id, "unknown");
    }
}
