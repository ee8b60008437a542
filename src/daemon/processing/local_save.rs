use anyhow::Result;
use tracing::info;

use crate::daemon::storage::{entities::Session, session_store::SessionStore};

use super::module::EventProcessor;

/// Represents saving module. Bridges [ProcessingModule](super::ProcessingModule) and
/// [SessionStore].
pub struct LocalSaver<S: SessionStore> {
    store: S,
    saved: usize,
}

impl<S: SessionStore> LocalSaver<S> {
    pub fn new(store: S) -> Self {
        Self { store, saved: 0 }
    }
}

impl<S: SessionStore + Send> EventProcessor for LocalSaver<S> {
    async fn process_next(&mut self, session: Session) -> Result<()> {
        self.store.append(&session)?;
        self.saved += 1;
        Ok(())
    }

    async fn finalize(&mut self) -> Result<()> {
        info!("Saved {} sessions", self.saved);
        Ok(())
    }
}
