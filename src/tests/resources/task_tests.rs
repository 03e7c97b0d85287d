use crate::{
    CancellationToken, DirectorError, DirectorRequest, TaskState, tests::create_test_client,
};
use reqwest::Method;
use std::time::{Duration, UNIX_EPOCH};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_json, method, path, query_param},
};

#[tokio::test]
async fn test_task_snapshot() {
    let mock_server = MockServer::start().await;
    let client = create_test_client(&mock_server);

    Mock::given(method("GET"))
        .and(path("/tasks/19"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": 19,
            "state": "processing",
            "description": "create deployment",
            "timestamp": 1390174354,
            "result": null,
            "user": "admin"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let task = client.task(19).await.unwrap();
    assert_eq!(task.id, 19);
    assert_eq!(task.state, TaskState::Processing);
    assert_eq!(task.description, "create deployment");
    assert_eq!(task.timestamp, UNIX_EPOCH + Duration::from_secs(1390174354));
    assert_eq!(task.user, "admin");
}

#[tokio::test]
async fn test_poll_task_with_json_body() {
    let mock_server = MockServer::start().await;
    let client = create_test_client(&mock_server);

    Mock::given(method("POST"))
        .and(path("/deployments/cf-warden/errands/smoke_tests/runs"))
        .and(body_json(serde_json::json!({"keep-alive": false})))
        .respond_with(ResponseTemplate::new(302).insert_header("Location", "/tasks/44"))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/tasks/44"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": 44,
            "state": "done",
            "description": "run errand smoke_tests",
            "timestamp": 1390174400,
            "result": "1 succeeded, 0 errored, 0 canceled",
            "user": "admin"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/tasks/44/output"))
        .and(query_param("type", "result"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{\"exit_code\":0}\n"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let trigger = DirectorRequest::new(
        Method::POST,
        "/deployments/cf-warden/errands/smoke_tests/runs",
    )
    .with_json_body(serde_json::json!({"keep-alive": false}));

    let result = client
        .poll_task(&trigger, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(result.task.id, 44);
    assert_eq!(
        result.task.result.as_deref(),
        Some("1 succeeded, 0 errored, 0 canceled")
    );
    assert_eq!(result.output, b"{\"exit_code\":0}\n");
    assert!(result.response.is_successful());
}

#[tokio::test]
async fn test_poll_task_times_out() {
    let mock_server = MockServer::start().await;
    let client = crate::DirectorClient::builder()
        .url(mock_server.uri())
        .unwrap()
        .poll_interval(Duration::from_millis(10))
        .max_poll_interval(Duration::from_millis(10))
        .poll_timeout(Duration::from_millis(100))
        .build()
        .unwrap();

    Mock::given(method("GET"))
        .and(path("/deployments/cf-warden/vms"))
        .respond_with(ResponseTemplate::new(302).insert_header("Location", "/tasks/3"))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/tasks/3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": 3,
            "state": "queued",
            "description": "retrieve vm-stats",
            "timestamp": 1390174354,
            "result": null,
            "user": "admin"
        })))
        .mount(&mock_server)
        .await;

    let result = client
        .fetch_vms_status("cf-warden", &CancellationToken::new())
        .await;

    assert!(matches!(
        result,
        Err(DirectorError::PollTimeout { task_id: 3, .. })
    ));
}

#[tokio::test]
async fn test_poll_timeout_cuts_slow_poll_short() {
    let mock_server = MockServer::start().await;
    let client = crate::DirectorClient::builder()
        .url(mock_server.uri())
        .unwrap()
        .request_timeout(Duration::from_secs(30))
        .poll_interval(Duration::from_millis(10))
        .max_poll_interval(Duration::from_millis(10))
        .poll_timeout(Duration::from_millis(200))
        .build()
        .unwrap();

    Mock::given(method("GET"))
        .and(path("/deployments/cf-warden/vms"))
        .respond_with(ResponseTemplate::new(302).insert_header("Location", "/tasks/5"))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/tasks/5"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({
                    "id": 5,
                    "state": "done",
                    "description": "retrieve vm-stats",
                    "timestamp": 1390174354,
                    "result": null,
                    "user": "admin"
                }))
                .set_delay(Duration::from_secs(10)),
        )
        .mount(&mock_server)
        .await;

    let started = std::time::Instant::now();
    let result = client
        .fetch_vms_status("cf-warden", &CancellationToken::new())
        .await;

    assert!(matches!(
        result,
        Err(DirectorError::PollTimeout { task_id: 5, .. })
    ));
    assert!(started.elapsed() < Duration::from_secs(5));
}
