use futures_util::{SinkExt, StreamExt};
use hydro_realtime::{RealtimeConfig, RealtimeService};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::time::timeout;
use tokio_tungstenite::accept_async;
use tokio_tungstenite::tungstenite::Message;

const WAIT: Duration = Duration::from_secs(5);

/// 本地 WebSocket 服务：第 n 次连接时发送 `frames(n)`；`close_after_send` 为真时随后主动关闭。
async fn spawn_server(
    frames: fn(usize) -> Vec<String>,
    close_after_send: bool,
) -> (String, Arc<AtomicUsize>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    let accepted = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&accepted);
    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
            tokio::spawn(async move {
                let Ok(mut ws) = accept_async(stream).await else {
                    return;
                };
                for frame in frames(n) {
                    if ws.send(Message::Text(frame)).await.is_err() {
                        return;
                    }
                }
                if close_after_send {
                    let _ = ws.close(None).await;
                    return;
                }
                while let Some(Ok(_)) = ws.next().await {}
            });
        }
    });
    (format!("ws://{addr}"), accepted)
}

fn service(url: &str, delay_ms: u64) -> RealtimeService {
    RealtimeService::new(
        RealtimeConfig::new(url, Duration::from_millis(delay_ms)).expect("config"),
    )
}

#[tokio::test]
async fn signals_expose_latest_value() {
    let (url, _) = spawn_server(
        |_| {
            vec![
                "not json at all".to_string(),
                r#"{"type":"heartbeat"}"#.to_string(),
                r#"{"type":"notification","event":"new","notificationId":42}"#.to_string(),
                r#"{"type":"watchdog","event":"update","filename":"logs_0501.csv"}"#.to_string(),
            ]
        },
        false,
    )
    .await;
    let service = service(&url, 50);
    let mut watchdog = service.watchdog();
    let mut notifications = service.notifications();
    assert!(service.start());

    timeout(WAIT, watchdog.changed())
        .await
        .expect("watchdog timeout")
        .expect("watchdog");
    let signal = watchdog.borrow_and_update().clone().expect("signal");
    assert_eq!(signal.filename.as_deref(), Some("logs_0501.csv"));

    // 通知帧先于 watchdog 帧到达，此时已可见。
    let notification = notifications.borrow_and_update().clone().expect("notification");
    assert_eq!(notification.notification_id, 42);
    assert!(notification.seq < signal.seq);

    service.stop().await;
    assert!(!service.is_running());
}

#[tokio::test]
async fn reconnects_after_server_close() {
    let (url, accepted) = spawn_server(
        |n| {
            if n == 1 {
                Vec::new()
            } else {
                vec![r#"{"type":"watchdog","event":"update"}"#.to_string()]
            }
        },
        true,
    )
    .await;
    let service = service(&url, 50);
    let mut watchdog = service.watchdog();
    assert!(service.start());

    timeout(WAIT, watchdog.changed())
        .await
        .expect("watchdog after reconnect")
        .expect("watchdog");
    assert!(accepted.load(Ordering::SeqCst) >= 2);
    assert_eq!(
        watchdog.borrow().as_ref().and_then(|s| s.filename.clone()),
        None
    );
    service.stop().await;
}

#[tokio::test]
async fn start_is_guarded_and_stop_cancels_reconnect() {
    // 没有服务监听的端口：连接失败后进入重连等待。
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let service = service(&format!("ws://{addr}"), 60_000);
    assert!(service.start());
    assert!(!service.start());
    assert!(service.is_running());

    timeout(WAIT, service.stop()).await.expect("stop promptly");
    assert!(!service.is_running());
    assert!(service.start());
    service.stop().await;
}

#[test]
fn config_requires_websocket_scheme() {
    assert!(RealtimeConfig::new("http://127.0.0.1:9001", Duration::from_secs(5)).is_err());
    assert!(RealtimeConfig::new("wss://example.org/ws", Duration::from_secs(5)).is_ok());
}
