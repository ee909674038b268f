//! Dialing the `/v2/websocket` endpoint.

use async_trait::async_trait;
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::header::AUTHORIZATION;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tokio_util::sync::CancellationToken;
use url::Url;

use tonapi_core::{FrameSink, FrameSource, StreamError};

use crate::connection::WsConnection;

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Path of the JSON-RPC endpoint relative to the API root.
pub const WEBSOCKET_PATH: &str = "/v2/websocket";

/// Build the websocket URL for an API endpoint.
///
/// `http` becomes `ws` and `https` becomes `wss`; other schemes are kept.
pub fn websocket_url(endpoint: &str) -> Result<String, StreamError> {
    let invalid = |reason: String| StreamError::InvalidEndpoint {
        endpoint: endpoint.to_string(),
        reason,
    };
    let mut url = Url::parse(endpoint).map_err(|e| invalid(e.to_string()))?;
    let scheme = match url.scheme() {
        "http" => Some("ws"),
        "https" => Some("wss"),
        _ => None,
    };
    if let Some(scheme) = scheme {
        url.set_scheme(scheme)
            .map_err(|_| invalid(format!("cannot switch scheme to {scheme}")))?;
    }
    Ok(format!("{}{WEBSOCKET_PATH}", url.as_str().trim_end_matches('/')))
}

/// Open one websocket connection to `endpoint`.
///
/// The bearer header is attached only when `api_key` is non-empty. The
/// handshake is raced against `cancel`; there is no retry.
pub async fn connect(
    endpoint: &str,
    api_key: &str,
    cancel: &CancellationToken,
) -> Result<WsConnection, StreamError> {
    let url = websocket_url(endpoint)?;
    let dial_err = |reason: String| StreamError::Dial {
        url: url.clone(),
        reason,
    };

    let mut request = url
        .as_str()
        .into_client_request()
        .map_err(|e| dial_err(e.to_string()))?;
    if !api_key.is_empty() {
        let value = HeaderValue::from_str(&format!("bearer {api_key}"))
            .map_err(|e| dial_err(format!("invalid api key: {e}")))?;
        request.headers_mut().insert(AUTHORIZATION, value);
    }

    tracing::info!(url = %url, "connecting via WebSocket");
    let socket = tokio::select! {
        res = connect_async(request) => match res {
            Ok((socket, _)) => socket,
            Err(e) => {
                tracing::warn!(url = %url, error = %e, "WS handshake failed");
                return Err(dial_err(e.to_string()));
            }
        },
        _ = cancel.cancelled() => return Err(StreamError::Cancelled),
    };
    tracing::debug!(url = %url, "WS connected");

    let (sink, stream) = socket.split();
    Ok(WsConnection::new(WsSink(sink), WsSource(stream)))
}

/// Write half of a tungstenite socket.
pub struct WsSink(SplitSink<Socket, Message>);

#[async_trait]
impl FrameSink for WsSink {
    async fn send_text(&mut self, text: String) -> Result<(), StreamError> {
        self.0
            .send(Message::Text(text.into()))
            .await
            .map_err(|e| StreamError::Write(e.to_string()))
    }

    async fn close(&mut self) -> Result<(), StreamError> {
        self.0
            .close()
            .await
            .map_err(|e| StreamError::WebSocket(e.to_string()))
    }
}

/// Read half of a tungstenite socket.
pub struct WsSource(SplitStream<Socket>);

#[async_trait]
impl FrameSource for WsSource {
    async fn next_text(&mut self) -> Option<Result<String, StreamError>> {
        loop {
            match self.0.next().await? {
                Ok(Message::Text(text)) => return Some(Ok(text.to_string())),
                Ok(Message::Binary(bytes)) => {
                    return Some(
                        String::from_utf8(bytes.to_vec())
                            .map_err(|e| StreamError::WebSocket(format!("non-UTF-8 frame: {e}"))),
                    )
                }
                Ok(Message::Close(_)) => return None,
                // ping/pong are answered by tungstenite itself
                Ok(_) => continue,
                Err(e) => return Some(Err(StreamError::WebSocket(e.to_string()))),
            }
        }
    }
}
