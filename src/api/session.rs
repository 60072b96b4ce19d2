//! Mounted pages, keyed by a random id handed to the browser on page load

use rand::RngExt;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::PlaceMapError;
use crate::page::Page;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

impl FromStr for SessionId {
    type Err = PlaceMapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != 16 {
            return Err(PlaceMapError::session_not_found(s));
        }
        u64::from_str_radix(s, 16)
            .map(SessionId)
            .map_err(|_| PlaceMapError::session_not_found(s))
    }
}

struct Entry {
    page: Arc<Page>,
    mounted_seq: u64,
}

#[derive(Default)]
struct Sessions {
    pages: HashMap<SessionId, Entry>,
    next_seq: u64,
}

/// Bounded table of mounted pages; the oldest page is dropped when full
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<RwLock<Sessions>>,
    capacity: usize,
}

impl SessionStore {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Sessions::default())),
            capacity: capacity.max(1),
        }
    }

    /// Register a freshly built page and return its id
    pub async fn mount(&self, page: Page) -> SessionId {
        let mut sessions = self.inner.write().await;

        if sessions.pages.len() >= self.capacity {
            let oldest = sessions
                .pages
                .iter()
                .min_by_key(|(_, entry)| entry.mounted_seq)
                .map(|(id, _)| *id);
            if let Some(oldest) = oldest {
                info!(session = %oldest, "Session table full, evicting oldest page");
                sessions.pages.remove(&oldest);
            }
        }

        let id = loop {
            let candidate = SessionId(rand::rng().random::<u64>());
            if !sessions.pages.contains_key(&candidate) {
                break candidate;
            }
        };
        let mounted_seq = sessions.next_seq;
        sessions.next_seq += 1;
        sessions.pages.insert(
            id,
            Entry {
                page: Arc::new(page),
                mounted_seq,
            },
        );

        debug!(session = %id, "Mounted page");
        id
    }

    pub async fn get(&self, id: SessionId) -> Option<Arc<Page>> {
        self.inner
            .read()
            .await
            .pages
            .get(&id)
            .map(|entry| Arc::clone(&entry.page))
    }

    /// Forget a page; returns false if it was not mounted
    pub async fn unmount(&self, id: SessionId) -> bool {
        let removed = self.inner.write().await.pages.remove(&id).is_some();
        if removed {
            debug!(session = %id, "Unmounted page");
        }
        removed
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.pages.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
