//! End-to-end tests against an in-process websocket server.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tokio_tungstenite::tungstenite::Message;
use tokio_util::sync::CancellationToken;

use tonapi_core::{JsonRpcRequest, StreamError};
use tonapi_ws::{connect, run_json_rpc};

#[derive(Debug, Default, Clone)]
struct Handshake {
    path: String,
    authorization: Option<String>,
}

/// Accept one client, record its handshake, expect `expect_requests` frames,
/// then push `pushes` and wait for the client to go away.
async fn mock_server(
    expect_requests: usize,
    pushes: Vec<&'static str>,
) -> (SocketAddr, Arc<Mutex<Handshake>>, JoinHandle<Vec<JsonRpcRequest>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().unwrap();
    let handshake = Arc::new(Mutex::new(Handshake::default()));
    let seen = handshake.clone();

    let jh = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.expect("accept");
        let callback = move |req: &Request, resp: Response| -> Result<Response, ErrorResponse> {
            let mut hs = seen.lock().unwrap();
            hs.path = req.uri().path().to_string();
            hs.authorization = req
                .headers()
                .get("authorization")
                .and_then(|v| v.to_str().ok())
                .map(String::from);
            Ok(resp)
        };
        let mut ws = tokio_tungstenite::accept_hdr_async(stream, callback)
            .await
            .expect("handshake");

        let mut requests = Vec::new();
        while requests.len() < expect_requests {
            let msg = ws.next().await.expect("stream ended").expect("read");
            if let Ok(text) = msg.to_text() {
                requests.push(serde_json::from_str::<JsonRpcRequest>(text).expect("request json"));
            }
        }
        for push in pushes {
            ws.send(Message::Text(push.into())).await.expect("send push");
        }
        // drain until the client closes
        while let Some(Ok(msg)) = ws.next().await {
            if msg.is_close() {
                break;
            }
        }
        requests
    });

    (addr, handshake, jh)
}

#[tokio::test]
async fn subscribe_and_receive_trace() {
    let (addr, handshake, server) = mock_server(
        1,
        vec![
            r#"{"id":1,"jsonrpc":"2.0","result":"success! 1 new subscriptions created"}"#,
            r#"{"jsonrpc":"2.0","method":"trace","params":{"accounts":["0:01"],"hash":"abc"}}"#,
        ],
    )
    .await;

    let cancel = CancellationToken::new();
    let conn = connect(&format!("http://{addr}"), "secret", &cancel)
        .await
        .expect("connect");

    let (tx, mut rx) = mpsc::unbounded_channel();
    let res = timeout(
        Duration::from_secs(5),
        run_json_rpc(Arc::new(conn), &cancel, |ws, _token| async move {
            ws.set_trace_handler(move |ev| {
                let _ = tx.send(ev);
            });
            ws.subscribe_to_traces(&["0:01".to_string()]).await?;
            let ev = rx.recv().await.ok_or(StreamError::ConnectionClosed)?;
            assert_eq!(ev.hash, "abc");
            Ok::<(), StreamError>(())
        }),
    )
    .await
    .expect("timed out");
    assert!(res.is_ok(), "{res:?}");

    let requests = server.await.unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].id, 1);
    assert_eq!(requests[0].method, "subscribe_trace");
    assert_eq!(requests[0].params, vec!["0:01".to_string()]);

    let hs = handshake.lock().unwrap().clone();
    assert_eq!(hs.path, "/v2/websocket");
    assert_eq!(hs.authorization.as_deref(), Some("bearer secret"));
}

#[tokio::test]
async fn no_token_means_no_authorization_header() {
    let (addr, handshake, server) = mock_server(1, vec![]).await;

    let cancel = CancellationToken::new();
    let conn = connect(&format!("http://{addr}"), "", &cancel).await.expect("connect");
    let res = run_json_rpc(Arc::new(conn), &cancel, |ws, _| async move {
        ws.subscribe_to_blocks(Some(-1)).await
    })
    .await;
    assert!(res.is_ok());

    let requests = server.await.unwrap();
    assert_eq!(requests[0].params, vec!["workchain=-1".to_string()]);
    assert!(handshake.lock().unwrap().authorization.is_none());
}

#[tokio::test]
async fn server_hang_up_ends_read_loop() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();
        let _ = ws.close(None).await;
    });

    let cancel = CancellationToken::new();
    let conn = connect(&format!("http://{addr}"), "", &cancel).await.unwrap();
    let res = timeout(
        Duration::from_secs(5),
        run_json_rpc(Arc::new(conn), &cancel, |_, token| async move {
            token.cancelled().await;
            Ok::<(), StreamError>(())
        }),
    )
    .await
    .expect("timed out");

    assert!(
        matches!(res, Err(StreamError::ConnectionClosed) | Err(StreamError::WebSocket(_))),
        "{res:?}"
    );
}
