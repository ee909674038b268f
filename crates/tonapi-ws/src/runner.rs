//! Running a connection: the read loop joined with a caller configurator.

use std::future::Future;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use tonapi_core::StreamError;

use crate::connection::WsConnection;

/// Run the JSON-RPC protocol on `conn` until something finishes.
///
/// The read loop and `configurator` run concurrently. The configurator gets the
/// connection and a token that fires when the connection is torn down; it may
/// subscribe and unsubscribe at any time, e.g. from a loop over a command
/// channel.
///
/// Whichever side finishes first decides the result, `Ok(())` included: a
/// configurator that returns ends the connection, so a long-lived caller
/// should keep it pending (`token.cancelled().await`). Cancelling `cancel`
/// yields [`StreamError::Cancelled`]. The socket is closed exactly once on
/// every path.
pub async fn run_json_rpc<F, Fut>(
    conn: Arc<WsConnection>,
    cancel: &CancellationToken,
    configurator: F,
) -> Result<(), StreamError>
where
    F: FnOnce(Arc<WsConnection>, CancellationToken) -> Fut,
    Fut: Future<Output = Result<(), StreamError>>,
{
    let token = cancel.child_token();

    let result = {
        let read = conn.read_loop(&token);
        let configure = configurator(Arc::clone(&conn), token.clone());
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(StreamError::Cancelled),
            res = read => {
                tracing::debug!(ok = res.is_ok(), "read loop finished first");
                res
            }
            res = configure => {
                tracing::debug!(ok = res.is_ok(), "configurator finished first");
                res
            }
        }
    };

    token.cancel();
    conn.close().await;

    match &result {
        Ok(()) | Err(StreamError::Cancelled) => tracing::info!("websocket connection closed"),
        Err(e) => tracing::warn!(error = %e, "websocket connection terminated"),
    }
    result
}
