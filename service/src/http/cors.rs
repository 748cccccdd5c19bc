use axum::body::Body;
use axum::http::{HeaderMap, HeaderValue, Method, Request, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

/// Open CORS policy: the form may be served from any origin.
pub(crate) async fn cors_middleware(req: Request<Body>, next: Next) -> Response {
    if req.method() == Method::OPTIONS {
        let mut resp = StatusCode::NO_CONTENT.into_response();
        allow_any_origin(resp.headers_mut());
        resp.headers_mut().insert(
            "access-control-allow-methods",
            HeaderValue::from_static("GET,POST,OPTIONS"),
        );
        resp.headers_mut().insert(
            "access-control-allow-headers",
            HeaderValue::from_static("content-type"),
        );
        return resp;
    }

    let mut resp = next.run(req).await;
    allow_any_origin(resp.headers_mut());
    resp
}

fn allow_any_origin(headers: &mut HeaderMap) {
    headers.insert("access-control-allow-origin", HeaderValue::from_static("*"));
}
