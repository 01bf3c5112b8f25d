use anyhow::Result;

/// Resolves on the first Ctrl-C or SIGTERM.
pub async fn wait_for_shutdown() -> Result<()> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigterm = signal(SignalKind::terminate())?;
        tokio::select! {
            _ = sigterm.recv() => tracing::info!("Received SIGTERM"),
            res = tokio::signal::ctrl_c() => {
                res?;
                tracing::info!("Received Ctrl-C");
            }
        }
        Ok(())
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await?;
        tracing::info!("Received Ctrl-C");
        Ok(())
    }
}
