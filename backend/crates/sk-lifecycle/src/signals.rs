use crate::{CancellationDomain, LifecycleError, LifecycleErrorResult, ShutdownCause};

/// Spawn the OS signal watcher on `domain`.
///
/// SIGINT or SIGTERM cancels the domain with a [`ShutdownCause::Signal`].
/// The watcher exits quietly when the domain is cancelled for another reason.
pub fn watch_signals(domain: &CancellationDomain) {
    let trigger = domain.clone();

    domain.spawn("signal-watcher", async move {
        tokio::select! {
            _ = trigger.cancelled() => Ok(()),
            signal = wait_for_signal() => match signal {
                Ok(name) => {
                    trigger.trigger(ShutdownCause::Signal(name));
                    Ok(())
                }
                Err(e) => Err(e),
            }
        }
    });
}

#[cfg(unix)]
async fn wait_for_signal() -> LifecycleErrorResult<&'static str> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut sigterm = signal(SignalKind::terminate()).map_err(LifecycleError::signal)?;
    let mut sigint = signal(SignalKind::interrupt()).map_err(LifecycleError::signal)?;

    tokio::select! {
        _ = sigint.recv() => Ok("SIGINT"),
        _ = sigterm.recv() => Ok("SIGTERM"),
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() -> LifecycleErrorResult<&'static str> {
    tokio::signal::ctrl_c()
        .await
        .map_err(LifecycleError::signal)?;
    Ok("SIGINT")
}
