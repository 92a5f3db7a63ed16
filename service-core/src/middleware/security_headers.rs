use axum::{extract::Request, http::header, middleware::Next, response::IntoResponse};

/// Which content-security policy a path gets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteGroup {
    Api,
    Docs,
    Static,
}

pub fn route_group(path: &str) -> RouteGroup {
    if path.starts_with("/docs") || path == "/.well-known/openapi.json" {
        RouteGroup::Docs
    } else if path.starts_with("/api/") || path == "/health" || path == "/metrics" {
        RouteGroup::Api
    } else {
        RouteGroup::Static
    }
}

pub async fn security_headers_middleware(req: Request, next: Next) -> impl IntoResponse {
    let group = route_group(req.uri().path());

    let mut response = next.run(req).await;
    let headers = response.headers_mut();

    headers.insert(
        header::X_CONTENT_TYPE_OPTIONS,
        header::HeaderValue::from_static("nosniff"),
    );
    headers.insert(
        header::STRICT_TRANSPORT_SECURITY,
        header::HeaderValue::from_static("max-age=31536000; includeSubDomains"),
    );
    headers.insert(
        header::REFERRER_POLICY,
        header::HeaderValue::from_static("no-referrer"),
    );

    let (csp, framing) = match group {
        // Swagger UI ships inline styles and scripts
        RouteGroup::Docs => (
            "default-src 'self'; \
             script-src 'self' 'unsafe-inline'; \
             style-src 'self' 'unsafe-inline'; \
             img-src 'self' data:; \
             font-src 'self'; \
             connect-src 'self'",
            "SAMEORIGIN",
        ),
        RouteGroup::Static => (
            "default-src 'self'; img-src 'self' data:; frame-ancestors 'none'",
            "DENY",
        ),
        RouteGroup::Api => ("default-src 'none'; frame-ancestors 'none'", "DENY"),
    };

    headers.insert(
        header::CONTENT_SECURITY_POLICY,
        header::HeaderValue::from_static(csp),
    );
    headers.insert(
        header::X_FRAME_OPTIONS,
        header::HeaderValue::from_static(framing),
    );

    response
}
