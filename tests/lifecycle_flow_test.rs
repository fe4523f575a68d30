//! 生命周期集成测试：使用 MockTransport 人为控制完成顺序

use std::sync::Arc;
use std::time::Duration;

use foodmood::core::{
    ErrorKind, LifecycleState, ManagerOptions, RecommendationItem, RequestLifecycleManager,
    StateStore, TransportError,
};
use foodmood::query::{normalize, RawQuery};
use foodmood::transport::{MockController, MockTransport};

fn manager(cancel_superseded: bool) -> (RequestLifecycleManager, MockController) {
    let (transport, controller) = MockTransport::new();
    let manager = RequestLifecycleManager::new(
        Arc::new(transport),
        StateStore::new(),
        ManagerOptions { cancel_superseded },
    );
    (manager, controller)
}

fn item(id: &str, name: &str, description: &str) -> RecommendationItem {
    RecommendationItem {
        id: id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
    }
}

async fn settled(manager: &RequestLifecycleManager) -> LifecycleState {
    manager
        .subscribe()
        .wait_until(|s| !s.is_loading())
        .await
        .unwrap()
}

/// 让已就绪的后台任务跑完
async fn drain() {
    tokio::time::sleep(Duration::from_millis(50)).await;
}

#[tokio::test]
async fn test_hungry_scenario_success() {
    let (manager, mut controller) = manager(true);
    manager.submit(RawQuery::new(37.7749, -122.4194, "Hungry"));

    let call = controller.next_call().await.unwrap();
    assert_eq!(call.query(), &normalize(37.7749, -122.4194, "hungry").unwrap());
    call.succeed(vec![item("1", "Pizza Place", "Great pizza")]);

    match settled(&manager).await {
        LifecycleState::Success { items, query } => {
            assert_eq!(items.len(), 1);
            assert_eq!(items[0].name, "Pizza Place");
            assert_eq!(query.mood().as_str(), "hungry");
        }
        other => panic!("expected success, got {other:?}"),
    }
}

#[tokio::test]
async fn test_server_rejected_scenario() {
    let (manager, mut controller) = manager(true);
    manager.submit(RawQuery::new(40.7128, -74.0060, "sad"));

    controller.next_call().await.unwrap().fail(TransportError::ServerRejected {
        status_code: 500,
        message: "overloaded".into(),
    });

    let state = settled(&manager).await;
    let error = state.error().unwrap();
    assert_eq!(error.kind(), ErrorKind::ServerRejected);
    assert_eq!(state.user_message().as_deref(), Some("overloaded"));
    assert!(state.query().is_some());
}

#[tokio::test]
async fn test_out_of_range_fails_immediately_without_request() {
    let (manager, controller) = manager(true);
    manager.submit(RawQuery::new(200.0, 0.0, "Happy"));

    let state = manager.current_state();
    let error = state.error().expect("failed state");
    assert_eq!(error.kind(), ErrorKind::Validation);
    assert!(error.as_validation().unwrap().is_out_of_range());

    drain().await;
    assert_eq!(controller.calls_made(), 0);
}

#[tokio::test]
async fn test_later_request_wins_when_completed_first() {
    let (manager, mut controller) = manager(false);

    manager.submit(RawQuery::new(1.0, 1.0, "happy"));
    manager.submit(RawQuery::new(2.0, 2.0, "sad"));
    let first = controller.next_call().await.unwrap();
    let second = controller.next_call().await.unwrap();
    assert_eq!(second.query().mood().as_str(), "sad");

    // 后发请求先失败
    assert!(second.fail(TransportError::NoResponse {
        reason: "timeout".into()
    }));
    let state = settled(&manager).await;
    assert_eq!(state.error().unwrap().kind(), ErrorKind::NoResponse);

    // 先发请求慢慢成功，必须被丢弃
    assert!(first.succeed(vec![item("1", "Stale Diner", "")]));
    drain().await;

    let state = manager.current_state();
    assert!(state.is_failed());
    assert!(state.items().is_empty());
    assert_eq!(state.query().unwrap().mood().as_str(), "sad");
}

#[tokio::test]
async fn test_superseded_call_is_cancelled() {
    let (manager, mut controller) = manager(true);

    manager.submit(RawQuery::new(1.0, 1.0, "happy"));
    let first = controller.next_call().await.unwrap();
    manager.submit(RawQuery::new(2.0, 2.0, "relaxed"));
    let second = controller.next_call().await.unwrap();

    second.succeed(vec![item("2", "Tea House", "Calm")]);
    let state = settled(&manager).await;
    assert_eq!(state.items()[0].name, "Tea House");

    // 第一个调用已被取消，迟到的结果无人接收
    assert!(!first.succeed(vec![item("1", "Stale Diner", "")]));
    drain().await;
    assert_eq!(manager.current_state().items()[0].name, "Tea House");
}

#[tokio::test]
async fn test_retry_reissues_same_query_as_new_request() {
    let (manager, mut controller) = manager(false);
    manager.submit(RawQuery::new(51.5074, -0.1278, "energetic"));

    let call = controller.next_call().await.unwrap();
    let query = call.query().clone();
    call.fail(TransportError::NoResponse {
        reason: "offline".into(),
    });
    settled(&manager).await;

    assert!(manager.retry());
    assert_eq!(
        manager.current_state(),
        LifecycleState::Loading {
            query: query.clone()
        }
    );
    let retried = controller.next_call().await.unwrap();
    assert_eq!(retried.query(), &query);
    assert_eq!(controller.calls_made(), 2);

    retried.succeed(vec![]);

    let state = settled(&manager).await;
    assert!(matches!(state, LifecycleState::Success { ref items, .. } if items.is_empty()));
    assert_eq!(controller.calls_made(), 2);
}

#[tokio::test]
async fn test_retry_is_noop_when_idle_or_loading() {
    let (manager, mut controller) = manager(true);

    assert!(!manager.retry());
    assert_eq!(manager.current_state(), LifecycleState::Idle);

    manager.submit(RawQuery::new(1.0, 1.0, "happy"));
    let loading = manager.current_state();
    assert!(!manager.retry());
    assert_eq!(manager.current_state(), loading);

    let _pending = controller.next_call().await.unwrap();
    drain().await;
    assert!(controller.try_next_call().is_none());
    assert_eq!(manager.current_state(), loading);
    assert_eq!(controller.calls_made(), 1);
}

#[tokio::test]
async fn test_clear_drops_late_response() {
    let (manager, mut controller) = manager(false);
    manager.submit(RawQuery::new(1.0, 1.0, "happy"));
    let call = controller.next_call().await.unwrap();

    manager.clear();
    assert!(manager.current_state().is_idle());

    assert!(call.succeed(vec![item("1", "Late Cafe", "")]));
    drain().await;
    assert!(manager.current_state().is_idle());
    assert!(!manager.retry());
}

#[tokio::test]
async fn test_validation_failure_supersedes_in_flight_and_retry_replays_last_query() {
    let (manager, mut controller) = manager(false);
    manager.submit(RawQuery::new(1.0, 1.0, "hungry"));
    let call = controller.next_call().await.unwrap();
    let accepted = call.query().clone();

    manager.submit(RawQuery::new(1.0, 1.0, "bored"));
    let state = manager.current_state();
    assert_eq!(state.error().unwrap().kind(), ErrorKind::Validation);

    assert!(call.succeed(vec![item("1", "Late Cafe", "")]));
    drain().await;
    assert!(manager.current_state().is_failed());

    assert!(manager.retry());
    let call = controller.next_call().await.unwrap();
    assert_eq!(call.query(), &accepted);
}

#[tokio::test]
async fn test_new_loading_never_shows_previous_items() {
    let (manager, mut controller) = manager(true);
    manager.submit(RawQuery::new(1.0, 1.0, "happy"));
    controller
        .next_call()
        .await
        .unwrap()
        .succeed(vec![item("1", "Pizza Place", "Great pizza")]);
    assert_eq!(settled(&manager).await.items().len(), 1);

    manager.submit(RawQuery::new(1.0, 1.0, "sad"));
    let state = manager.current_state();
    assert!(state.is_loading());
    assert!(state.items().is_empty());
}

#[tokio::test]
async fn test_stores_are_independent_per_manager() {
    let (a, mut controller_a) = manager(true);
    let (b, _controller_b) = manager(true);

    a.submit(RawQuery::new(1.0, 1.0, "happy"));
    let _pending = controller_a.next_call().await.unwrap();
    assert!(a.current_state().is_loading());
    assert!(b.current_state().is_idle());
}
