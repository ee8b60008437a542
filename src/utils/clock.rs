use async_trait::async_trait;
use chrono::{DateTime, Local};
use tokio::time::Instant;

/// Represents an entity responsible for providing dates across application. Allows the tracker to
/// be driven by a paused tokio clock in tests.
#[async_trait]
pub trait Clock: Sync + Send + 'static {
    /// Wall clock time. Sessions are stored in local time.
    fn time(&self) -> DateTime<Local>;

    fn instant(&self) -> Instant;

    async fn sleep_until(&self, instant: tokio::time::Instant);
}

pub struct DefaultClock;

#[async_trait]
impl Clock for DefaultClock {
    fn time(&self) -> DateTime<Local> {
        Local::now()
    }

    fn instant(&self) -> Instant {
        Instant::now()
    }

    async fn sleep_until(&self, instant: tokio::time::Instant) {
        tokio::time::sleep_until(instant).await;
    }
}
