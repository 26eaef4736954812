use axum::{
    body::Body,
    extract::Request,
    http::{
        header::{COOKIE, SET_COOKIE},
        HeaderValue,
    },
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

/// Cookie carrying the browser session id
pub const SESSION_COOKIE: &str = "movie_finder_session";

/// Extension type for the session a request belongs to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SessionId(pub Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Session id from a `Cookie` header value, if present and well formed
    pub fn from_cookie_header(header: &str) -> Option<Self> {
        header
            .split(';')
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(name, _)| *name == SESSION_COOKIE)
            .and_then(|(_, value)| Uuid::parse_str(value.trim()).ok())
            .map(Self)
    }

    fn set_cookie_value(&self) -> String {
        format!("{}={}; Path=/; HttpOnly; SameSite=Lax", SESSION_COOKIE, self.0)
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Resolves the session cookie or mints a new session, stores the
/// `SessionId` in the request extensions and sets the cookie on the response
/// when the browser did not send one.
pub async fn session_middleware(mut request: Request, next: Next) -> Response {
    let existing = request
        .headers()
        .get_all(COOKIE)
        .iter()
        .filter_map(|h| h.to_str().ok())
        .find_map(SessionId::from_cookie_header);

    let session_id = existing.unwrap_or_else(SessionId::new);
    request.extensions_mut().insert(session_id);

    let mut response = next.run(request).await;

    if existing.is_none() {
        if let Ok(value) = HeaderValue::from_str(&session_id.set_cookie_value()) {
            response.headers_mut().append(SET_COOKIE, value);
        }
    }

    response
}

/// Tracing span for an HTTP request, tagged with its session
pub fn make_span_with_session(request: &Request<Body>) -> tracing::Span {
    let session = request
        .extensions()
        .get::<SessionId>()
        .map(|id| id.to_string())
        .unwrap_or_else(|| "unknown".to_string());

    tracing::info_span!(
        "http_request",
        method = %request.method(),
        uri = %request.uri(),
        session = %session,
    )
}
