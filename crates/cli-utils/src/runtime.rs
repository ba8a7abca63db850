//! Ctrl+C handling.

use tokio_util::sync::CancellationToken;
use tracing::{error, warn};

/// Returns a token that is cancelled when the process receives Ctrl+C.
///
/// Must be called from within a Tokio runtime. A second Ctrl+C is left to the default handler
/// once the first one has been observed.
pub fn cancel_on_ctrl_c() -> CancellationToken {
    let token = CancellationToken::new();
    let cancel = token.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                warn!("Received Ctrl+C, cancelling");
                cancel.cancel();
            }
            Err(err) => error!(error = %err, "Failed to install Ctrl+C handler"),
        }
    });
    token
}
