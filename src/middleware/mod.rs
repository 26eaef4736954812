pub mod session;

pub use session::{make_span_with_session, session_middleware, SessionId, SESSION_COOKIE};
