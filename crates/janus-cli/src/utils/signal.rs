use janusmc::engine::cancel::CancellationToken;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Cancels `token` on the first Ctrl-C. Abort the returned handle once the run is over.
pub fn cancel_on_ctrl_c(token: CancellationToken) -> JoinHandle<()> {
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Interrupt received, finishing the current interval.");
                token.cancel();
            }
            Err(e) => warn!("Unable to listen for Ctrl-C: {}", e),
        }
    })
}
