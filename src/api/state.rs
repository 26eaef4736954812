use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::{
    error::{AppError, AppResult},
    middleware::SessionId,
    models::RecommendOptions,
    services::{model_store::ModelOrigin, Recommender},
};

use super::views::PageRenderer;

/// Form state retained between requests of one browser session
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    pub query: String,
    pub options: RecommendOptions,
    pub submitted: bool,
}

/// Sessions kept before the least recently used one is dropped
pub const DEFAULT_SESSION_CAPACITY: usize = 1000;

struct SessionEntry {
    state: SessionState,
    last_used: u64,
}

struct Sessions {
    entries: HashMap<SessionId, SessionEntry>,
    clock: u64,
}

impl Sessions {
    fn tick(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }
}

/// Per-session form state keyed by the session cookie
///
/// Holds at most `capacity` sessions; storing a new one past that evicts the
/// session that was read or written longest ago.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<RwLock<Sessions>>,
    capacity: usize,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_SESSION_CAPACITY)
    }
}

impl SessionStore {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Sessions {
                entries: HashMap::new(),
                clock: 0,
            })),
            capacity: capacity.max(1),
        }
    }

    /// Stored state, or a fresh form for an unknown session
    pub async fn get(&self, id: SessionId) -> SessionState {
        let mut sessions = self.inner.write().await;
        let now = sessions.tick();
        match sessions.entries.get_mut(&id) {
            Some(entry) => {
                entry.last_used = now;
                entry.state.clone()
            }
            None => SessionState::default(),
        }
    }

    pub async fn set(&self, id: SessionId, state: SessionState) {
        let mut sessions = self.inner.write().await;
        let now = sessions.tick();

        if !sessions.entries.contains_key(&id) && sessions.entries.len() >= self.capacity {
            let oldest = sessions
                .entries
                .iter()
                .min_by_key(|(_, entry)| entry.last_used)
                .map(|(id, _)| *id);
            if let Some(oldest) = oldest {
                sessions.entries.remove(&oldest);
                tracing::debug!(session = %oldest, "Session evicted");
            }
        }

        sessions.entries.insert(
            id,
            SessionEntry {
                state,
                last_used: now,
            },
        );
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    recommender: Option<Arc<Recommender>>,
    load_error: Option<String>,
    pub sessions: SessionStore,
    pub renderer: Arc<PageRenderer>,
}

impl AppState {
    pub fn new(recommender: Recommender) -> AppResult<Self> {
        Ok(Self {
            recommender: Some(Arc::new(recommender)),
            load_error: None,
            sessions: SessionStore::default(),
            renderer: Arc::new(PageRenderer::new()?),
        })
    }

    pub fn with_sessions(mut self, sessions: SessionStore) -> Self {
        self.sessions = sessions;
        self
    }

    /// State for a server whose corpus could not be loaded; pages show
    /// `message` and the JSON API answers 503.
    pub fn unavailable(message: impl Into<String>) -> AppResult<Self> {
        Ok(Self {
            recommender: None,
            load_error: Some(message.into()),
            sessions: SessionStore::default(),
            renderer: Arc::new(PageRenderer::new()?),
        })
    }

    pub fn from_result(result: AppResult<Recommender>) -> AppResult<Self> {
        match result {
            Ok(recommender) => Self::new(recommender),
            Err(AppError::NotFound(message)) => Self::unavailable(message),
            Err(e) => Self::unavailable(e.to_string()),
        }
    }

    pub fn recommender(&self) -> AppResult<&Recommender> {
        self.recommender.as_deref().ok_or_else(|| {
            AppError::Unavailable(
                self.load_error
                    .clone()
                    .unwrap_or_else(|| "no model loaded".to_string()),
            )
        })
    }

    pub fn load_error(&self) -> Option<&str> {
        self.load_error.as_deref()
    }

    /// Whether the model had to be rebuilt at startup
    pub fn model_rebuilt(&self) -> bool {
        self.recommender
            .as_ref()
            .is_some_and(|r| r.origin() == ModelOrigin::Built)
    }
}
