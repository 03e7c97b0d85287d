use crate::{
    CancellationToken, DirectorClient, DirectorError,
    core::infrastructure::scripted_transport::{
        ScriptedTransport, json_response, redirect_to, task_body, text_response,
    },
    tests::create_test_client,
};
use reqwest::{Method, StatusCode};
use std::sync::Arc;
use std::time::Duration;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path, query_param},
};

const VMS_OUTPUT: &str = concat!(
    r#"{"vm_cid":"vm-a1a3d634-367d-4b75-940c-ef7742a970d9","ips":["10.244.1.14"],"dns":[],"agent_id":"c0da6161-e66f-4910-a0eb-dc6fc19b4b25","job_name":"hm9000_z1","index":0,"job_state":"running","resource_pool":"medium_z1","vitals":{"load":["0.11","0.21","0.18"],"cpu":{"user":"1.5","sys":"2.8","wait":"0.1"},"mem":{"percent":"46.8","kb":"2864212"},"swap":{"percent":"0.0","kb":"0"},"disk":{"system":{"percent":null},"persistent":{"percent":"1"}}},"resurrection_paused":false}"#,
    "\n",
    r#"{"vm_cid":"vm-affdbbdb-b91e-4838-b068-f1a057242169","ips":["10.244.0.38"],"dns":[],"agent_id":"bec309f8-0e2d-4843-9db3-a419adab4d38","job_name":"etcd_leader_z1","index":0,"job_state":"running","resource_pool":"medium_z1","vitals":{"load":["0.13","0.22","0.18"],"cpu":{"user":"0.4","sys":"2.0","wait":"0.1"},"mem":{"percent":"46.8","kb":"2863012"},"swap":{"percent":"0.0","kb":"0"},"disk":{"system":{"percent":null},"persistent":{"percent":"1"}}},"resurrection_paused":false}"#,
    "\n",
);

fn task_json(state: &str) -> serde_json::Value {
    serde_json::json!({
        "id": 12,
        "state": state,
        "description": "retrieve vm-stats",
        "timestamp": 1390174354,
        "result": null,
        "user": "admin"
    })
}

async fn mount_vms_redirect(mock_server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/deployments/cf-warden/vms"))
        .and(query_param("format", "full"))
        .respond_with(
            ResponseTemplate::new(302).insert_header("Location", "https://some.host/tasks/12"),
        )
        .expect(1)
        .mount(mock_server)
        .await;
}

#[tokio::test]
async fn test_fetch_vms_status_success() {
    let mock_server = MockServer::start().await;
    let client = create_test_client(&mock_server);

    mount_vms_redirect(&mock_server).await;

    // First poll sees the task queued, the second sees it done.
    Mock::given(method("GET"))
        .and(path("/tasks/12"))
        .respond_with(ResponseTemplate::new(200).set_body_json(task_json("queued")))
        .up_to_n_times(1)
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/tasks/12"))
        .respond_with(ResponseTemplate::new(200).set_body_json(task_json("done")))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/tasks/12/output"))
        .and(query_param("type", "result"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(VMS_OUTPUT)
                .insert_header("Content-Type", "text/plain"),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let vm_statuses = client
        .fetch_vms_status("cf-warden", &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(vm_statuses.len(), 2);

    let vm_status = &vm_statuses[0];
    assert_eq!(vm_status.job_name, "hm9000_z1");
    assert_eq!(vm_status.index, 0);
    assert_eq!(vm_status.job_state, "running");
    assert_eq!(vm_status.vm_cid, "vm-a1a3d634-367d-4b75-940c-ef7742a970d9");
    assert_eq!(vm_status.agent_id, "c0da6161-e66f-4910-a0eb-dc6fc19b4b25");
    assert_eq!(vm_status.resource_pool, "medium_z1");
    assert!(!vm_status.resurrection_paused);
    assert_eq!(vm_status.ips, vec!["10.244.1.14"]);
    assert!(vm_status.dns.is_empty());
    assert_eq!(vm_status.cpu_wait, 0.1);
    assert_eq!(vm_status.memory_kb, 2864212);
    assert_eq!(vm_status.disk_system_percent, 0.0);
    assert_eq!(vm_status.disk_persistent_percent, 1.0);

    assert_eq!(vm_statuses[1].job_name, "etcd_leader_z1");
    assert_eq!(vm_statuses[1].memory_kb, 2863012);
}

#[tokio::test]
async fn test_fetch_vms_status_task_error_skips_output() {
    let mock_server = MockServer::start().await;
    let client = create_test_client(&mock_server);

    mount_vms_redirect(&mock_server).await;

    Mock::given(method("GET"))
        .and(path("/tasks/12"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": 12,
            "state": "error",
            "description": "Deployment 'cf-warden' doesn't exist",
            "timestamp": 1390174354,
            "result": "Deployment 'cf-warden' doesn't exist",
            "user": "admin"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/tasks/12/output"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let error = client
        .fetch_vms_status("cf-warden", &CancellationToken::new())
        .await
        .unwrap_err();

    match error {
        DirectorError::TaskFailed {
            id, description, ..
        } => {
            assert_eq!(id, 12);
            assert_eq!(description, "Deployment 'cf-warden' doesn't exist");
        }
        other => panic!("expected TaskFailed, got {other:?}"),
    }
}

#[tokio::test]
async fn test_fetch_vms_status_with_scripted_transport() {
    let transport = Arc::new(
        ScriptedTransport::new()
            .expect(
                Method::GET,
                "/deployments/cf-warden/vms?format=full",
                redirect_to("https://some.host/tasks/12"),
            )
            .expect(
                Method::GET,
                "/tasks/12",
                json_response(StatusCode::OK, &task_body(12, "queued")),
            )
            .expect(
                Method::GET,
                "/tasks/12",
                json_response(StatusCode::OK, &task_body(12, "done")),
            )
            .expect(
                Method::GET,
                "/tasks/12/output?type=result",
                text_response(VMS_OUTPUT),
            ),
    );
    let client = DirectorClient::builder()
        .transport(transport.clone())
        .poll_interval(Duration::from_millis(1))
        .max_poll_interval(Duration::from_millis(1))
        .build()
        .unwrap();

    let (vm_statuses, response) = client
        .fetch_vms_status_with_response("cf-warden", &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(vm_statuses.len(), 2);
    assert_eq!(vm_statuses[0].job_name, "hm9000_z1");
    assert_eq!(vm_statuses[1].job_name, "etcd_leader_z1");
    assert!(response.is_successful());
    assert_eq!(response.body(), VMS_OUTPUT);
    assert!(transport.all_requests_called());
}

#[tokio::test]
async fn test_fetch_vms_status_bad_line_aborts() {
    let output = format!("{VMS_OUTPUT}{{\"job_name\": \n");
    let transport = Arc::new(
        ScriptedTransport::new()
            .expect(
                Method::GET,
                "/deployments/cf-warden/vms?format=full",
                redirect_to("/tasks/12"),
            )
            .expect(
                Method::GET,
                "/tasks/12",
                json_response(StatusCode::OK, &task_body(12, "done")),
            )
            .expect(
                Method::GET,
                "/tasks/12/output?type=result",
                text_response(&output),
            ),
    );
    let client = DirectorClient::builder()
        .transport(transport)
        .build()
        .unwrap();

    let error = client
        .fetch_vms_status("cf-warden", &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(error, DirectorError::Decode { line: 2, .. }));
    let response = error.api_response().unwrap();
    assert!(response.is_successful());
    assert_eq!(response.body(), output);
}

#[tokio::test]
async fn test_fetch_vms_status_rejects_bad_deployment_name() {
    let transport = Arc::new(ScriptedTransport::new());
    let client = DirectorClient::builder()
        .transport(transport.clone())
        .build()
        .unwrap();

    let result = client
        .fetch_vms_status("cf/../warden", &CancellationToken::new())
        .await;

    assert!(matches!(result, Err(DirectorError::Validation { .. })));
    assert!(transport.received().is_empty());
}
