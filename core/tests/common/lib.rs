use imds_core::ImdsClient;
use imds_core::ImdsConfig;
use imds_core::Node;
use imds_core::WatchStream;
use std::time::Duration;
use wiremock::Mock;
use wiremock::MockServer;
use wiremock::ResponseTemplate;
use wiremock::matchers::method;
use wiremock::matchers::path;

/// A small instance served under `/latest/`: listings, a JSON document, an
/// opaque blob, a list value and user-data.
pub const SAMPLE_INSTANCE: &[(&str, &str)] = &[
    (
        "meta-data",
        "ami-id\ninstance-id\ninstance-type\nplacement/\nsecurity-groups\npublic-keys/\n",
    ),
    ("meta-data/ami-id", "ami-0abcdef1234567890"),
    ("meta-data/instance-id", "i-1234567890abcdef0"),
    ("meta-data/instance-type", "t3.micro"),
    ("meta-data/placement", "availability-zone\nregion\n"),
    ("meta-data/placement/availability-zone", "us-east-1a"),
    ("meta-data/placement/region", "us-east-1"),
    ("meta-data/security-groups", "default\nweb"),
    ("meta-data/public-keys", "0=my-key"),
    ("dynamic", "instance-identity/\n"),
    ("dynamic/instance-identity", "document\npkcs7\nsignature\n"),
    (
        "dynamic/instance-identity/document",
        r#"{"accountId": "123456789012", "instanceId": "i-1234567890abcdef0", "region": "us-east-1"}"#,
    ),
    (
        "dynamic/instance-identity/pkcs7",
        "MIAGCSqGSIb3DQEHAqCAMIACAQExDzANBglghkgBZQMEAgEFADCABgkqhkiG9w0BBwGggCSABIIB\nHnsKICAiYWNjb3VudElkIiA6ICIxMjM0NTY3ODkwMTIiLAo=",
    ),
    (
        "dynamic/instance-identity/signature",
        "dExamplesjNQhhJan7pORLpLSr7lJEF4V2AhJ0b8Yx\n",
    ),
    ("user-data", "#!/bin/bash\necho hello\n"),
];

/// Serves each `(path, body)` at `GET /latest/<path>`. Anything else is a 404.
pub async fn mount_tree(server: &MockServer, entries: &[(&str, &str)]) {
    for (sub_path, body) in entries {
        Mock::given(method("GET"))
            .and(path(format!("/latest/{sub_path}")))
            .respond_with(ResponseTemplate::new(200).set_body_string(*body))
            .mount(server)
            .await;
    }
}

pub async fn start_sample_server() -> MockServer {
    let server = MockServer::start().await;
    mount_tree(&server, SAMPLE_INSTANCE).await;
    server
}

/// Config pointing at `server` with timings suited to tests.
pub fn config_for(server: &MockServer) -> ImdsConfig {
    ImdsConfig {
        request_timeout_ms: 2_000,
        watch_interval_ms: 20,
        ..ImdsConfig::default().with_endpoint(server.uri())
    }
}

pub fn client_for(server: &MockServer) -> ImdsClient {
    ImdsClient::new(config_for(server)).expect("build client for mock server")
}

/// Next snapshot from `stream`, failing the test after five seconds.
pub async fn next_snapshot(stream: &mut WatchStream) -> Node {
    tokio::time::timeout(Duration::from_secs(5), stream.recv())
        .await
        .expect("timed out waiting for a watch snapshot")
        .expect("watch stream ended")
}
