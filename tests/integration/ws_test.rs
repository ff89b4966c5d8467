//! Integration tests for the observer WebSocket.

use std::time::Duration;

use chrono::NaiveDateTime;
use futures::SinkExt;
use relay_core::events::{AccountStatus, RawStatusEvent};
use tokio_tungstenite::tungstenite::{Error as WsError, Message};

use crate::helpers::{TARGET_ID, TestApp, assert_silent, connect, next_snapshot};

#[tokio::test]
async fn test_observer_receives_snapshot_on_connect() {
    let app = TestApp::new(AccountStatus::Online);
    let addr = app.serve().await;

    let mut observer = connect(addr).await;
    let first = next_snapshot(&mut observer).await;

    assert_eq!(first["name"], "Alice");
    assert_eq!(first["status"], "CONNECTING");
    assert_eq!(first["last_seen"], "--");
    assert_eq!(first["duration"], "");
}

#[tokio::test]
async fn test_observer_follows_transitions() {
    let app = TestApp::with_config(AccountStatus::offline_unknown(), |config| {
        config.tracker.offline_delay_seconds = 1;
    });
    let addr = app.serve().await;
    let mut observer = connect(addr).await;
    assert_eq!(next_snapshot(&mut observer).await["status"], "CONNECTING");

    let _tracker = app.start_tracker().await;
    let initial = next_snapshot(&mut observer).await;
    assert_eq!(initial["status"], "OFFLINE");
    assert_eq!(initial["last_seen"], "--");

    app.session.push(RawStatusEvent::online(TARGET_ID));
    assert_eq!(next_snapshot(&mut observer).await["status"], "ONLINE");

    // A repeated online report is not pushed again.
    app.session.push(RawStatusEvent::online(TARGET_ID));
    assert_silent(&mut observer, Duration::from_millis(300)).await;

    app.session.push(RawStatusEvent::offline(TARGET_ID));
    let confirmed = next_snapshot(&mut observer).await;
    assert_eq!(confirmed["status"], "OFFLINE");
    let last_seen = confirmed["last_seen"].as_str().expect("last_seen");
    assert!(NaiveDateTime::parse_from_str(last_seen, "%Y-%m-%d %H:%M:%S").is_ok());
}

#[tokio::test]
async fn test_flicker_is_not_pushed() {
    let app = TestApp::with_config(AccountStatus::Online, |config| {
        config.tracker.offline_delay_seconds = 1;
    });
    let addr = app.serve().await;
    let _tracker = app.start_tracker().await;

    let mut observer = connect(addr).await;
    assert_eq!(next_snapshot(&mut observer).await["status"], "ONLINE");

    app.session.push(RawStatusEvent::offline(TARGET_ID));
    tokio::time::sleep(Duration::from_millis(200)).await;
    app.session.push(RawStatusEvent::online(TARGET_ID));

    assert_silent(&mut observer, Duration::from_millis(1500)).await;
    let metrics = app.engine.metrics.snapshot();
    assert_eq!(metrics.flickers_suppressed, 1);
    assert_eq!(metrics.offline_confirmed, 0);
}

#[tokio::test]
async fn test_late_joiner_sees_current_state() {
    let app = TestApp::new(AccountStatus::offline_unknown());
    let addr = app.serve().await;
    let _tracker = app.start_tracker().await;

    app.session.push(RawStatusEvent::online(TARGET_ID));
    let mut early = connect(addr).await;
    let mut seen = next_snapshot(&mut early).await;
    if seen["status"] != "ONLINE" {
        seen = next_snapshot(&mut early).await;
    }
    assert_eq!(seen["status"], "ONLINE");

    let mut late = connect(addr).await;
    assert_eq!(next_snapshot(&mut late).await["status"], "ONLINE");
}

#[tokio::test]
async fn test_disconnect_unregisters_observer() {
    let app = TestApp::new(AccountStatus::Online);
    let addr = app.serve().await;

    let mut observer = connect(addr).await;
    next_snapshot(&mut observer).await;
    app.wait_for_observers(1).await;

    observer.send(Message::Close(None)).await.expect("close");
    drop(observer);
    app.wait_for_observers(0).await;
}

#[tokio::test]
async fn test_departed_observer_does_not_block_others() {
    let app = TestApp::new(AccountStatus::offline_unknown());
    let addr = app.serve().await;
    let _tracker = app.start_tracker().await;

    let mut staying = connect(addr).await;
    let leaving = connect(addr).await;
    next_snapshot(&mut staying).await;
    app.wait_for_observers(2).await;
    drop(leaving);

    app.session.push(RawStatusEvent::online(TARGET_ID));
    assert_eq!(next_snapshot(&mut staying).await["status"], "ONLINE");
    app.wait_for_observers(1).await;
}

#[tokio::test]
async fn test_observer_limit_refuses_upgrade() {
    let app = TestApp::with_config(AccountStatus::Online, |config| {
        config.realtime.max_observers = 1;
    });
    let addr = app.serve().await;

    let mut first = connect(addr).await;
    next_snapshot(&mut first).await;

    let refused = tokio_tungstenite::connect_async(format!("ws://{addr}/ws")).await;
    match refused {
        Err(WsError::Http(response)) => assert_eq!(response.status().as_u16(), 503),
        other => panic!("expected HTTP 503, got {other:?}"),
    }
}

#[tokio::test]
async fn test_shutdown_closes_observers() {
    let app = TestApp::new(AccountStatus::Online);
    let addr = app.serve().await;
    let tracker = app.start_tracker().await;

    let mut observer = connect(addr).await;
    next_snapshot(&mut observer).await;

    app.engine.shutdown();
    assert!(tracker.await.expect("join").is_ok());

    let closed = tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            match futures::StreamExt::next(&mut observer).await {
                Some(Ok(Message::Close(_))) | None | Some(Err(_)) => break,
                Some(Ok(_)) => {}
            }
        }
    })
    .await;
    assert!(closed.is_ok(), "observer socket was not closed");
}
