use axum::{
    extract::Request,
    http::{header, HeaderMap, HeaderValue},
    middleware::Next,
    response::IntoResponse,
};

const API_CSP: &str = "default-src 'none'; frame-ancestors 'none'";
const PAGE_CSP: &str = "default-src 'self'; img-src 'self' data:; style-src 'self' 'unsafe-inline'; frame-ancestors 'none'";

fn is_api_path(path: &str) -> bool {
    path.starts_with("/api/") || path == "/health" || path == "/metrics"
}

fn set(headers: &mut HeaderMap, name: header::HeaderName, value: &'static str) {
    headers.insert(name, HeaderValue::from_static(value));
}

pub async fn security_headers_middleware(req: Request, next: Next) -> impl IntoResponse {
    let api = is_api_path(req.uri().path());

    let mut response = next.run(req).await;
    // Access redirects depend on the caller's session and must not be reused.
    let per_caller = api || response.status().is_redirection();
    let headers = response.headers_mut();

    set(headers, header::X_CONTENT_TYPE_OPTIONS, "nosniff");
    set(
        headers,
        header::STRICT_TRANSPORT_SECURITY,
        "max-age=31536000; includeSubDomains",
    );
    set(headers, header::REFERRER_POLICY, "strict-origin-when-cross-origin");
    set(headers, header::X_FRAME_OPTIONS, "DENY");
    set(
        headers,
        header::CONTENT_SECURITY_POLICY,
        if api { API_CSP } else { PAGE_CSP },
    );

    if per_caller {
        set(headers, header::CACHE_CONTROL, "no-store");
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, middleware::from_fn, response::Redirect, routing::get, Router};
    use tower::ServiceExt;

    fn app() -> Router {
        Router::new()
            .route("/api/ping", get(|| async { "pong" }))
            .route("/about", get(|| async { "about" }))
            .route("/app", get(|| async { Redirect::temporary("/auth/login") }))
            .layer(from_fn(security_headers_middleware))
    }

    async fn headers_for(uri: &str) -> HeaderMap {
        app()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
            .headers()
            .clone()
    }

    #[tokio::test]
    async fn api_routes_get_strict_csp_and_no_store() {
        let headers = headers_for("/api/ping").await;
        assert_eq!(headers[header::CONTENT_SECURITY_POLICY], API_CSP);
        assert_eq!(headers[header::CACHE_CONTROL], "no-store");
    }

    #[tokio::test]
    async fn pages_are_cacheable_unless_redirected() {
        let headers = headers_for("/about").await;
        assert_eq!(headers[header::CONTENT_SECURITY_POLICY], PAGE_CSP);
        assert!(headers.get(header::CACHE_CONTROL).is_none());

        let headers = headers_for("/app").await;
        assert_eq!(headers[header::CACHE_CONTROL], "no-store");
    }
}
