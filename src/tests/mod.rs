mod resources;

use crate::DirectorClient;
use std::time::Duration;
use wiremock::MockServer;

/// A client pointed at `mock_server` that polls quickly.
pub(crate) fn create_test_client(mock_server: &MockServer) -> DirectorClient {
    DirectorClient::builder()
        .url(mock_server.uri())
        .unwrap()
        .credentials("admin", "admin")
        .unwrap()
        .poll_interval(Duration::from_millis(10))
        .max_poll_interval(Duration::from_millis(20))
        .build()
        .unwrap()
}
