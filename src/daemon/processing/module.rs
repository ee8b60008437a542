use std::future::Future;

use anyhow::Result;

use crate::daemon::storage::entities::Session;

/// Represents a consumer of finished sessions. Saving into the local session store is the only
/// one for now.
pub trait EventProcessor {
    fn process_next(&mut self, session: Session) -> impl Future<Output = Result<()>> + Send;

    fn finalize(&mut self) -> impl Future<Output = Result<()>> + Send;
}
