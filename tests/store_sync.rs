//! Synchronizer behaviour against a mocked task server.

use serde_json::json;
use std::sync::Arc;
use tasksync::api::HttpTaskApi;
use tasksync::store::SyncError;
use tasksync::{Task, TaskId, TaskStore};
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn store_for(server: &MockServer) -> TaskStore {
    TaskStore::new(Arc::new(HttpTaskApi::new(&server.uri())))
}

#[tokio::test]
async fn test_fetch_keeps_server_order() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/tasks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 2, "title": "Second", "description": "", "time": "", "completed": false},
            {"id": 1, "title": "First", "description": "", "time": "", "completed": false}
        ])))
        .mount(&mock_server)
        .await;

    let store = store_for(&mock_server);
    store.fetch_all().await.unwrap();

    let titles: Vec<String> = store.tasks().into_iter().map(|t| t.title).collect();
    assert_eq!(titles, vec!["Second", "First"]);
}

#[tokio::test]
async fn test_failed_fetch_keeps_the_previous_list() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/tasks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 1, "title": "Kept", "description": "", "time": "", "completed": false}
        ])))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/tasks"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let store = store_for(&mock_server);
    store.fetch_all().await.unwrap();
    assert!(store.fetch_all().await.is_err());

    assert_eq!(store.tasks().len(), 1);
    assert_eq!(store.tasks()[0].title, "Kept");
}

#[tokio::test]
async fn test_create_then_refetch_picks_up_server_id() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/tasks"))
        .and(body_partial_json(json!({"title": "New"})))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/tasks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 41, "title": "New", "description": "d", "time": "2024-01-01T09:00", "completed": false}
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let store = store_for(&mock_server);
    let task = Task::new(
        "New".to_string(),
        "d".to_string(),
        "2024-01-01T09:00".to_string(),
    );
    store.save(task).await.unwrap();

    assert_eq!(store.tasks()[0].id, Some(TaskId::Number(41)));
}

#[tokio::test]
async fn test_failed_create_skips_the_refetch() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/tasks"))
        .respond_with(ResponseTemplate::new(400))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&mock_server)
        .await;

    let store = store_for(&mock_server);
    let err = store
        .create(Task::new("x".into(), "y".into(), "".into()))
        .await
        .unwrap_err();
    assert!(matches!(err, SyncError::Api(_)));
}

#[tokio::test]
async fn test_toggle_sends_flipped_task() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/tasks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 5, "title": "T", "description": "d", "time": "2024-01-01T09:00", "completed": false}
        ])))
        .mount(&mock_server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/tasks/5"))
        .and(body_partial_json(json!({
            "id": 5,
            "title": "T",
            "description": "d",
            "time": "2024-01-01T09:00",
            "completed": true
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    let store = store_for(&mock_server);
    store.fetch_all().await.unwrap();
    store.toggle_complete(&TaskId::Number(5)).await.unwrap();
}

#[tokio::test]
async fn test_toggle_of_unknown_id_sends_nothing() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/tasks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let store = store_for(&mock_server);
    store.fetch_all().await.unwrap();
    let err = store.toggle_complete(&TaskId::Number(99)).await.unwrap_err();

    assert!(matches!(err, SyncError::TaskNotFound(TaskId::Number(99))));
}

#[tokio::test]
async fn test_delete_then_refetch() {
    let mock_server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/tasks/1"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/tasks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let store = store_for(&mock_server);
    store.delete(&TaskId::Number(1)).await.unwrap();
    assert!(store.tasks().is_empty());
}

#[tokio::test]
async fn test_subscribers_see_each_fetch() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/tasks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 1, "title": "A", "description": "", "time": "", "completed": false}
        ])))
        .mount(&mock_server)
        .await;

    let store = store_for(&mock_server);
    let mut rx = store.subscribe();
    store.fetch_all().await.unwrap();

    assert!(rx.has_changed().unwrap());
    assert_eq!(rx.borrow_and_update().len(), 1);
}
