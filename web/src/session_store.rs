//! In-memory session store that forgets expired sessions.
//!
//! `tower_sessions::MemoryStore` only hides expired records on load, so every
//! anonymous login would stay in memory for the life of the process. This store
//! implements `ExpiredDeletion` and `init_server` runs the deletion periodically.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use log::*;
use time::OffsetDateTime;
use tokio::sync::Mutex;
use tower_sessions::session::{Id, Record};
use tower_sessions::session_store::{self, ExpiredDeletion, SessionStore};

/// How often expired sessions are swept from the store.
pub const EXPIRED_DELETION_PERIOD: Duration = Duration::from_secs(60);

#[derive(Clone, Debug, Default)]
pub struct ExpiringMemoryStore(Arc<Mutex<HashMap<Id, Record>>>);

#[async_trait]
impl SessionStore for ExpiringMemoryStore {
    async fn create(&self, record: &mut Record) -> session_store::Result<()> {
        let mut store = self.0.lock().await;
        while store.contains_key(&record.id) {
            record.id = Id::default();
        }
        store.insert(record.id, record.clone());
        Ok(())
    }

    async fn save(&self, record: &Record) -> session_store::Result<()> {
        self.0.lock().await.insert(record.id, record.clone());
        Ok(())
    }

    async fn load(&self, session_id: &Id) -> session_store::Result<Option<Record>> {
        Ok(self
            .0
            .lock()
            .await
            .get(session_id)
            .filter(|record| is_active(record))
            .cloned())
    }

    async fn delete(&self, session_id: &Id) -> session_store::Result<()> {
        self.0.lock().await.remove(session_id);
        Ok(())
    }
}

#[async_trait]
impl ExpiredDeletion for ExpiringMemoryStore {
    async fn delete_expired(&self) -> session_store::Result<()> {
        let mut store = self.0.lock().await;
        let before = store.len();
        store.retain(|_, record| is_active(record));

        let removed = before - store.len();
        if removed > 0 {
            debug!("Deleted {} expired sessions", removed);
        }
        Ok(())
    }
}

impl ExpiringMemoryStore {
    /// Sweep expired sessions every `period`, forever.
    pub async fn delete_expired_every(self, period: Duration) {
        let mut interval = tokio::time::interval(period);
        loop {
            interval.tick().await;
            if let Err(e) = self.delete_expired().await {
                warn!("Failed to delete expired sessions: {:?}", e);
            }
        }
    }

    #[cfg(test)]
    pub(crate) async fn len(&self) -> usize {
        self.0.lock().await.len()
    }
}

fn is_active(record: &Record) -> bool {
    record.expiry_date > OffsetDateTime::now_utc()
}
