//! Espera por sinais do SO (SIGINT/SIGTERM) na thread principal.
//!
//! Um runtime tokio de thread única existe só para isso; o loop de
//! transmissão roda numa thread dedicada e nunca toca no runtime.

use std::io;
use tracing::info;

/// Bloqueia até receber SIGINT (Ctrl+C) ou SIGTERM.
pub fn block_until_signal() -> io::Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    let signal = runtime.block_on(wait_for_signal())?;
    info!("Recebido {signal}");
    Ok(())
}

#[cfg(unix)]
async fn wait_for_signal() -> io::Result<&'static str> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut terminate = signal(SignalKind::terminate())?;
    tokio::select! {
        result = tokio::signal::ctrl_c() => {
            result?;
            Ok("SIGINT (Ctrl+C)")
        }
        _ = terminate.recv() => Ok("SIGTERM"),
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() -> io::Result<&'static str> {
    tokio::signal::ctrl_c().await?;
    Ok("Ctrl+C")
}
