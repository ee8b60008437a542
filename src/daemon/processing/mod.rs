use anyhow::Result;
use module::EventProcessor;
use tokio::sync::mpsc::Receiver;
use tracing::{debug, error, info};

use super::storage::entities::Session;

pub mod local_save;
pub mod module;

/// Receives finished sessions from the tracker and hands them to a processor. A session that
/// fails to save is logged and dropped, later sessions are still processed.
pub struct ProcessingModule<Processor> {
    receiver: Receiver<Session>,
    processor: Processor,
}

impl<P: EventProcessor> ProcessingModule<P> {
    pub fn new(receiver: Receiver<Session>, processor: P) -> Self {
        Self {
            receiver,
            processor,
        }
    }

    /// Runs until the tracker drops its sender.
    pub async fn run(mut self) -> Result<()> {
        while let Some(session) = self.receiver.recv().await {
            debug!("Processing session {:?}", session);
            match self.processor.process_next(session.clone()).await {
                Ok(_) => {
                    info!(
                        "Saved {} for {}s since {}",
                        session.app, session.duration, session.start
                    )
                }
                Err(e) => {
                    error!("Error saving session {:?}: {e:?}", session)
                }
            }
        }

        let result = self.processor.finalize().await;
        self.receiver.close();
        result
    }
}
