use tokio::select;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// Resolves on SIGTERM, which is what `screentime stop` sends.
#[cfg(unix)]
async fn terminate() {
    use tokio::signal::unix::{signal, SignalKind};

    match signal(SignalKind::terminate()) {
        Ok(mut stream) => {
            stream.recv().await;
        }
        Err(e) => {
            error!("Can't listen for SIGTERM {e:?}");
            std::future::pending::<()>().await
        }
    }
}

#[cfg(not(unix))]
async fn terminate() {
    std::future::pending::<()>().await
}

/// Waits for ctrl-c, SIGTERM or for the tracker to give up on its own, whichever comes first.
///
/// On Windows detached processes can't detect signals sent to them, so this should be enhanced in
/// the future to support another way of sending signals.
pub async fn detect_shutdown(cancelation: CancellationToken) {
    select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Received ctrl-c");
            cancelation.cancel();
        },
        _ = terminate() => {
            info!("Received termination request");
            cancelation.cancel();
        },
        _ = cancelation.cancelled() => (),
    };
}
