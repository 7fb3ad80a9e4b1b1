//! Hub behavior tests: registry invariants, fan-out, failure cleanup,
//! per-connection write integrity.

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use plaza_core::{BroadcastEvent, Creator, FeedAction, Post, PostId, PostSnapshot, UserId};
use plaza_hub::{ConnectionError, ConnectionHandle, FeedConnection, FeedHub, HubConfig};

/// Test double for a peer connection.
///
/// Appends each frame to `frames` and, byte by byte in two chunks with a
/// yield in between, to the shared `wire` buffer — so an implementation
/// that let two writes run concurrently on one connection would produce an
/// interleaved wire image.
#[derive(Default)]
struct TestConnection {
    frames: Mutex<Vec<String>>,
    wire: Mutex<String>,
    fail_sends: AtomicBool,
    send_delay_ms: AtomicUsize,
    closed: AtomicBool,
}

impl TestConnection {
    fn failing() -> Self {
        let conn = Self::default();
        conn.fail_sends.store(true, Ordering::SeqCst);
        conn
    }

    fn frames(&self) -> Vec<String> {
        self.frames.lock().clone()
    }
}

#[async_trait]
impl FeedConnection for TestConnection {
    async fn send(&self, frame: &str) -> Result<(), ConnectionError> {
        let delay = self.send_delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay as u64)).await;
        }
        if self.fail_sends.load(Ordering::SeqCst) {
            return Err(ConnectionError::Io("broken pipe".into()));
        }
        let mid = frame.len() / 2;
        self.wire.lock().push_str(&frame[..mid]);
        tokio::task::yield_now().await;
        self.wire.lock().push_str(&frame[mid..]);
        self.frames.lock().push(frame.to_owned());
        Ok(())
    }

    async fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }

    fn peer_addr(&self) -> Option<SocketAddr> {
        None
    }
}

fn snapshot(id: &str, title: &str) -> PostSnapshot {
    Post {
        id: PostId::from(id),
        title: title.into(),
        content: "some content".into(),
        image_url: None,
        creator_id: UserId::from("user_1"),
        creator: Creator { name: "Jack Berry".into() },
        created_at: chrono::Utc::now(),
        updated_at: chrono::Utc::now(),
    }
    .snapshot()
}

/// Wait for spawned delivery tasks and control-loop turns to settle.
async fn settle() {
    tokio::time::sleep(Duration::from_millis(60)).await;
}

#[tokio::test]
async fn n_distinct_registrations_yield_n_entries() {
    let (hub, _join) = FeedHub::spawn(HubConfig::default());
    for _ in 0..7 {
        hub.attach(ConnectionHandle::new(Arc::new(TestConnection::default())))
            .await
            .unwrap();
    }
    settle().await;
    assert_eq!(hub.connection_count(), 7);
}

#[tokio::test]
async fn duplicate_registration_never_doubles() {
    let (hub, _join) = FeedHub::spawn(HubConfig::default());
    let handle = ConnectionHandle::new(Arc::new(TestConnection::default()));
    hub.attach(handle.clone()).await.unwrap();
    hub.attach(handle).await.unwrap();
    settle().await;
    assert_eq!(hub.connection_count(), 1);
}

#[tokio::test]
async fn unregistering_absent_handle_changes_nothing() {
    let (hub, _join) = FeedHub::spawn(HubConfig::default());
    hub.attach(ConnectionHandle::new(Arc::new(TestConnection::default())))
        .await
        .unwrap();
    settle().await;

    hub.detach(plaza_core::ConnectionId::new()).await.unwrap();
    settle().await;
    assert_eq!(hub.connection_count(), 1);
}

#[tokio::test]
async fn write_failure_removes_only_the_broken_connection() {
    let (hub, _join) = FeedHub::spawn(HubConfig::default());
    let broken = Arc::new(TestConnection::failing());
    let healthy = Arc::new(TestConnection::default());
    hub.attach(ConnectionHandle::new(broken.clone())).await.unwrap();
    hub.attach(ConnectionHandle::new(healthy.clone())).await.unwrap();

    hub.publish(BroadcastEvent::new(FeedAction::Create, snapshot("post_1", "first")))
        .await
        .unwrap();
    settle().await;

    // The broken connection is closed and gone; the healthy one got the event.
    assert!(broken.closed.load(Ordering::SeqCst));
    assert_eq!(hub.connection_count(), 1);
    assert_eq!(healthy.frames().len(), 1);

    // Later events only reach the survivor.
    hub.publish(BroadcastEvent::new(FeedAction::Update, snapshot("post_1", "edited")))
        .await
        .unwrap();
    settle().await;
    assert!(broken.frames().is_empty());
    assert_eq!(healthy.frames().len(), 2);
}

#[tokio::test]
async fn event_arrives_unchanged_at_every_connection() {
    let (hub, _join) = FeedHub::spawn(HubConfig::default());
    let conns: Vec<_> = (0..3).map(|_| Arc::new(TestConnection::default())).collect();
    for conn in &conns {
        hub.attach(ConnectionHandle::new(conn.clone())).await.unwrap();
    }

    let event = BroadcastEvent::new(FeedAction::Create, snapshot("post_42", "x"));
    hub.publish(event).await.unwrap();
    settle().await;

    for conn in &conns {
        let frames = conn.frames();
        assert_eq!(frames.len(), 1, "exactly one delivery attempt per connection");
        let decoded: BroadcastEvent = serde_json::from_str(&frames[0]).unwrap();
        assert_eq!(decoded.action, FeedAction::Create);
        assert_eq!(decoded.post.id, PostId::from("post_42"));
        assert_eq!(decoded.post.title, "x");
    }
}

#[tokio::test]
async fn concurrent_publishes_never_interleave_on_one_connection() {
    let (hub, _join) = FeedHub::spawn(HubConfig::default());
    let conn = Arc::new(TestConnection::default());
    hub.attach(ConnectionHandle::new(conn.clone())).await.unwrap();
    settle().await;

    for i in 0..10 {
        hub.publish(BroadcastEvent::new(
            FeedAction::Update,
            snapshot(&format!("post_{i}"), &format!("title number {i}")),
        ))
        .await
        .unwrap();
    }
    settle().await;

    // The wire image must be exactly the concatenation of whole frames, in
    // the order they were recorded — no frame is a byte-level mix of two
    // events.
    let frames = conn.frames();
    assert_eq!(frames.len(), 10);
    assert_eq!(*conn.wire.lock(), frames.concat());
}

#[tokio::test]
async fn detached_connection_receives_nothing_further() {
    let (hub, _join) = FeedHub::spawn(HubConfig::default());
    let conn_a = Arc::new(TestConnection::default());
    let conn_b = Arc::new(TestConnection::default());
    let handle_a = ConnectionHandle::new(conn_a.clone());
    let id_a = handle_a.id().clone();
    hub.attach(handle_a).await.unwrap();
    hub.attach(ConnectionHandle::new(conn_b.clone())).await.unwrap();

    hub.publish(BroadcastEvent::new(FeedAction::Create, snapshot("post_42", "x")))
        .await
        .unwrap();
    settle().await;
    assert_eq!(conn_a.frames().len(), 1);
    assert_eq!(conn_b.frames().len(), 1);

    hub.detach(id_a).await.unwrap();
    settle().await;

    hub.publish(BroadcastEvent::new(FeedAction::Delete, snapshot("post_42", "x")))
        .await
        .unwrap();
    settle().await;

    assert_eq!(conn_a.frames().len(), 1, "A must receive nothing after detach");
    let b_frames = conn_b.frames();
    assert_eq!(b_frames.len(), 2);
    let decoded: BroadcastEvent = serde_json::from_str(&b_frames[1]).unwrap();
    assert_eq!(decoded.action, FeedAction::Delete);
    assert_eq!(decoded.post.id, PostId::from("post_42"));
}

#[tokio::test]
async fn slow_connection_drops_past_in_flight_cap() {
    let config = HubConfig {
        max_in_flight_per_connection: 1,
        ..HubConfig::default()
    };
    let (hub, _join) = FeedHub::spawn(config);
    let slow = Arc::new(TestConnection::default());
    slow.send_delay_ms.store(200, Ordering::SeqCst);
    hub.attach(ConnectionHandle::new(slow.clone())).await.unwrap();
    settle().await;

    for i in 0..5 {
        hub.publish(BroadcastEvent::new(
            FeedAction::Create,
            snapshot(&format!("post_{i}"), "title"),
        ))
        .await
        .unwrap();
    }
    settle().await;

    // With one delivery slot and a 200ms write, most of the burst is dropped
    // — and the drops are observable.
    assert!(hub.dropped_deliveries() >= 3, "drops: {}", hub.dropped_deliveries());
    assert_eq!(hub.connection_count(), 1, "a slow peer is not a dead peer");
}

#[tokio::test]
async fn two_hubs_are_isolated() {
    let (hub_a, _ja) = FeedHub::spawn(HubConfig::default());
    let (hub_b, _jb) = FeedHub::spawn(HubConfig::default());
    let conn = Arc::new(TestConnection::default());
    hub_a.attach(ConnectionHandle::new(conn.clone())).await.unwrap();
    settle().await;

    hub_b
        .publish(BroadcastEvent::new(FeedAction::Create, snapshot("post_1", "title")))
        .await
        .unwrap();
    settle().await;

    assert_eq!(hub_a.connection_count(), 1);
    assert_eq!(hub_b.connection_count(), 0);
    assert!(conn.frames().is_empty());
}
