use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::{sleep, timeout};

use haltwatch::{
    CoordinatorServer, Event, EventKind, InMemoryCoordinator, InterruptCause, InterruptConfig,
    InterruptHandler, StackError, StackInspector, Subscribe, TcpCoordinator,
};
use haltwatch::Coordinator as _;

struct FixedStacks;

impl StackInspector for FixedStacks {
    fn capture_all(&self) -> Result<String, StackError> {
        Ok("task 7 [running]:\n  suite::hangs_forever".to_string())
    }
}

#[derive(Default)]
struct Recorder {
    events: Mutex<Vec<Event>>,
}

impl Recorder {
    fn kinds(&self) -> Vec<EventKind> {
        self.events.lock().unwrap().iter().map(|e| e.kind).collect()
    }
}

#[async_trait]
impl Subscribe for Recorder {
    async fn on_event(&self, ev: &Event) {
        self.events.lock().unwrap().push(ev.clone());
    }

    fn name(&self) -> &'static str {
        "recorder"
    }
}

fn with_timeout(t: Duration) -> InterruptConfig {
    InterruptConfig {
        timeout: t,
        ..Default::default()
    }
}

fn polling_fast() -> InterruptConfig {
    InterruptConfig {
        poll_interval: Duration::from_millis(20),
        ..Default::default()
    }
}

// ---- Timeout interrupts ----

#[tokio::test(start_paused = true)]
async fn timeout_closes_notifier_and_marks_interrupted() {
    let handler = InterruptHandler::new(Duration::from_millis(500), "");

    let status = handler.status();
    assert!(!status.interrupted);
    assert_eq!(status.cause, InterruptCause::None);

    timeout(Duration::from_millis(600), status.notifier.closed())
        .await
        .expect("watchdog should fire within the timeout");
    assert!(handler.status().interrupted);

    handler.stop().await;
}

#[tokio::test(start_paused = true)]
async fn timeout_cause_and_message_carry_stacks() {
    let handler = InterruptHandler::builder(with_timeout(Duration::from_millis(500)))
        .with_inspector(Arc::new(FixedStacks))
        .build();

    handler.status().notifier.closed().await;
    assert_eq!(handler.status().cause, InterruptCause::Timeout);

    let msg = handler.interrupt_message_with_stack_traces();
    assert!(msg.starts_with("Interrupted by Timeout\n\n"), "{msg}");
    assert!(msg.contains("Here's a stack trace"), "{msg}");
    assert!(msg.contains("  task 7 [running]:"), "{msg}");

    handler.stop().await;
}

#[tokio::test]
async fn timeout_message_with_default_inspector() {
    let handler = InterruptHandler::new(Duration::from_millis(50), "");
    timeout(Duration::from_secs(5), handler.status().notifier.closed())
        .await
        .unwrap();

    let msg = handler.interrupt_message_with_stack_traces();
    assert!(msg.starts_with("Interrupted by Timeout\n\n"), "{msg}");
    assert!(msg.contains("Here's a stack trace"), "{msg}");

    handler.stop().await;
}

#[tokio::test(start_paused = true)]
async fn timeout_renotifies_every_tenth() {
    let handler = InterruptHandler::new(Duration::from_millis(500), "");

    let status = handler.status();
    assert!(!status.interrupted);
    status.notifier.closed().await;

    for _ in 0..5 {
        let status = handler.status();
        assert!(status.interrupted);
        assert!(!status.notifier.is_closed(), "fresh notifier must start open");
        timeout(Duration::from_millis(60), status.notifier.closed())
            .await
            .expect("re-notification within T/10");
    }
    assert_eq!(handler.status().cause, InterruptCause::Timeout);

    handler.stop().await;
}

// ---- Interrupting when another process has aborted ----

#[tokio::test(start_paused = true)]
async fn remote_abort_closes_notifier() {
    let coordinator = InMemoryCoordinator::new();
    let handler = InterruptHandler::builder(polling_fast())
        .with_coordinator(Arc::new(coordinator.clone()))
        .build();

    let status = handler.status();
    sleep(Duration::from_secs(2)).await;
    assert!(!status.notifier.is_closed(), "must stay open until a sibling aborts");

    coordinator.post_abort("default").await.unwrap();
    timeout(Duration::from_millis(100), status.notifier.closed())
        .await
        .expect("abort observed within one poll");

    let status = handler.status();
    assert!(status.interrupted);
    assert_eq!(status.cause, InterruptCause::AbortByOtherProcess);

    let msg = handler.interrupt_message_with_stack_traces();
    assert!(msg.starts_with("Interrupted by Other Worker Process"), "{msg}");
    assert!(!msg.contains("Here's a stack trace"), "{msg}");

    handler.stop().await;
}

#[tokio::test(start_paused = true)]
async fn remote_abort_has_no_self_loop() {
    let coordinator = InMemoryCoordinator::new();
    coordinator.abort("default");
    let handler = InterruptHandler::builder(polling_fast())
        .with_coordinator(Arc::new(coordinator))
        .build();

    handler.status().notifier.closed().await;
    let after = handler.status();
    sleep(Duration::from_secs(5)).await;
    assert!(!after.notifier.is_closed());

    handler.stop().await;
}

#[tokio::test(start_paused = true)]
async fn abort_is_scoped_to_group() {
    let coordinator = InMemoryCoordinator::new();
    let cfg = InterruptConfig {
        group: "run-b".into(),
        ..polling_fast()
    };
    let handler = InterruptHandler::builder(cfg)
        .with_coordinator(Arc::new(coordinator.clone()))
        .build();

    coordinator.abort("run-a");
    sleep(Duration::from_secs(1)).await;
    assert!(!handler.status().interrupted);

    coordinator.abort("run-b");
    sleep(Duration::from_millis(50)).await;
    assert_eq!(handler.status().cause, InterruptCause::AbortByOtherProcess);

    handler.stop().await;
}

#[tokio::test]
async fn remote_abort_over_tcp() {
    let server = CoordinatorServer::bind("127.0.0.1:0").await.unwrap();
    let cfg = InterruptConfig {
        coordinator_address: server.address(),
        peer_label: "Ginkgo".into(),
        ..polling_fast()
    };
    let handler = InterruptHandler::builder(cfg).build();

    let status = handler.status();
    sleep(Duration::from_millis(200)).await;
    assert!(!status.notifier.is_closed());

    TcpCoordinator::new(server.address())
        .post_abort("default")
        .await
        .unwrap();
    timeout(Duration::from_secs(5), status.notifier.closed())
        .await
        .expect("abort observed over tcp");

    assert_eq!(handler.status().cause, InterruptCause::AbortByOtherProcess);
    assert!(
        handler
            .interrupt_message_with_stack_traces()
            .starts_with("Interrupted by Other Ginkgo Process")
    );

    handler.stop().await;
    server.close().await;
}

#[tokio::test]
async fn remote_abort_via_new_with_address() {
    let server = CoordinatorServer::bind("127.0.0.1:0").await.unwrap();
    let handler = InterruptHandler::new(Duration::ZERO, server.address());

    let status = handler.status();
    server.post_abort("default");
    timeout(Duration::from_secs(5), status.notifier.closed())
        .await
        .expect("default poll interval is well under the bound");
    assert_eq!(handler.status().cause, InterruptCause::AbortByOtherProcess);

    handler.stop().await;
    server.close().await;
}

// ---- Degradation ----

#[tokio::test]
async fn unreachable_coordinator_never_fires() {
    let port = {
        let l = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        l.local_addr().unwrap().port()
    };
    let cfg = InterruptConfig {
        coordinator_address: format!("127.0.0.1:{port}"),
        ..polling_fast()
    };
    let recorder = Arc::new(Recorder::default());
    let handler = InterruptHandler::builder(cfg)
        .with_subscribers(vec![recorder.clone() as Arc<dyn Subscribe>])
        .build();

    sleep(Duration::from_millis(200)).await;
    assert!(!handler.status().interrupted);

    timeout(Duration::from_secs(2), handler.stop())
        .await
        .expect("stop returns promptly");
    assert!(recorder.kinds().contains(&EventKind::CoordinatorUnavailable));
}

#[tokio::test]
async fn malformed_address_never_fires() {
    let handler = InterruptHandler::new(Duration::ZERO, "this is :: not an address");
    sleep(Duration::from_millis(100)).await;
    assert!(!handler.status().interrupted);
    handler.stop().await;
}

#[tokio::test(start_paused = true)]
async fn no_sources_never_fire() {
    let handler = InterruptHandler::new(Duration::ZERO, "");
    let status = handler.status();
    sleep(Duration::from_secs(60)).await;
    assert!(!status.notifier.is_closed());
    handler.stop().await;
}

// ---- Cause stickiness ----

#[tokio::test(start_paused = true)]
async fn first_cause_wins() {
    let coordinator = InMemoryCoordinator::new();
    coordinator.abort("default");
    let recorder = Arc::new(Recorder::default());
    let handler = InterruptHandler::builder(InterruptConfig {
        timeout: Duration::from_millis(500),
        ..polling_fast()
    })
    .with_coordinator(Arc::new(coordinator))
    .with_inspector(Arc::new(FixedStacks))
    .with_subscribers(vec![recorder.clone() as Arc<dyn Subscribe>])
    .build();

    handler.status().notifier.closed().await;
    assert_eq!(handler.status().cause, InterruptCause::AbortByOtherProcess);

    let parked = handler.status();
    sleep(Duration::from_secs(2)).await;
    assert_eq!(handler.status().cause, InterruptCause::AbortByOtherProcess);
    assert!(!parked.notifier.is_closed(), "losing timeout must not re-notify");
    assert!(
        !handler
            .interrupt_message_with_stack_traces()
            .contains("Here's a stack trace")
    );

    handler.stop().await;
    let ignored = recorder
        .events
        .lock()
        .unwrap()
        .iter()
        .find(|e| e.kind == EventKind::InterruptIgnored)
        .cloned()
        .expect("timeout attempt is recorded as ignored");
    assert_eq!(ignored.cause, Some(InterruptCause::Timeout));
    assert_eq!(ignored.reason.as_deref(), Some("abort_by_other_process"));
}

// ---- Stop ----

#[tokio::test(start_paused = true)]
async fn stop_before_timeout_prevents_interrupt() {
    let handler = InterruptHandler::new(Duration::from_millis(500), "");
    let status = handler.status();

    handler.stop().await;
    sleep(Duration::from_secs(2)).await;

    assert!(!status.notifier.is_closed());
    assert!(!handler.status().interrupted);
}

#[tokio::test(start_paused = true)]
async fn stop_halts_renotification() {
    let handler = InterruptHandler::new(Duration::from_millis(500), "");
    handler.status().notifier.closed().await;

    handler.stop().await;
    let last = handler.status();
    sleep(Duration::from_secs(2)).await;

    assert!(last.interrupted);
    assert!(!last.notifier.is_closed());
}

#[tokio::test(start_paused = true)]
async fn stop_is_idempotent() {
    let handler = InterruptHandler::new(Duration::from_millis(500), "");
    handler.stop().await;
    handler.stop().await;
    assert!(!handler.status().interrupted);
}

#[tokio::test(start_paused = true)]
async fn stop_flushes_events_to_subscribers() {
    let recorder = Arc::new(Recorder::default());
    let handler = InterruptHandler::builder(with_timeout(Duration::from_millis(100)))
        .with_subscribers(vec![recorder.clone() as Arc<dyn Subscribe>])
        .build();

    handler.status().notifier.closed().await;
    handler.stop().await;

    let kinds = recorder.kinds();
    assert_eq!(kinds.first(), Some(&EventKind::WatcherStarted));
    assert!(kinds.contains(&EventKind::InterruptRaised));
    assert_eq!(kinds.last(), Some(&EventKind::HandlerStopped));
}

// ---- Isolation ----

#[tokio::test(start_paused = true)]
async fn handlers_are_independent() {
    let fast = InterruptHandler::new(Duration::from_millis(100), "");
    let slow = InterruptHandler::new(Duration::from_secs(10), "");

    fast.status().notifier.closed().await;
    assert!(fast.status().interrupted);
    assert!(!slow.status().interrupted);

    let mut events = slow.events();
    fast.stop().await;
    assert!(events.try_recv().is_err(), "no cross-talk between buses");

    slow.stop().await;
}
