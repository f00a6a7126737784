/// Waits for SIGTERM or SIGINT.
#[cfg(unix)]
async fn wait_for_signal_impl() -> &'static str {
    use tokio::signal::unix::{signal, SignalKind};

    let (mut terminate, mut interrupt) =
        match (signal(SignalKind::terminate()), signal(SignalKind::interrupt())) {
            (Ok(terminate), Ok(interrupt)) => (terminate, interrupt),
            (Err(err), _) | (_, Err(err)) => {
                tracing::error!("failed to register signal handlers: {}", err);
                return std::future::pending().await;
            }
        };

    tokio::select! {
        _ = terminate.recv() => "SIGTERM",
        _ = interrupt.recv() => "SIGINT",
    }
}

/// Waits for Ctrl-C.
#[cfg(windows)]
async fn wait_for_signal_impl() -> &'static str {
    match tokio::signal::ctrl_c().await {
        Ok(()) => "CTRL_C",
        Err(err) => {
            tracing::error!("failed to register ctrl-c handler: {}", err);
            std::future::pending().await
        }
    }
}

/// Resolves once the process is asked to stop, with the signal's name.
pub(crate) async fn wait_for_stop_signal() -> &'static str {
    wait_for_signal_impl().await
}
