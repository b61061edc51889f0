use imds_core::HttpTransport;
use imds_core::ImdsClient;
use imds_core::ImdsConfig;
use imds_core::ImdsError;
use imds_core::LeafValue;
use imds_core::Node;
use imds_core::TreeCrawler;
use imds_core::transport::TOKEN_HEADER;
use imds_test_support::SAMPLE_INSTANCE;
use imds_test_support::client_for;
use imds_test_support::config_for;
use imds_test_support::mount_tree;
use imds_test_support::start_sample_server;
use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::Arc;
use wiremock::Mock;
use wiremock::MockServer;
use wiremock::ResponseTemplate;
use wiremock::matchers::header;
use wiremock::matchers::method;
use wiremock::matchers::path;

#[tokio::test]
async fn full_crawl_over_http() {
    let server = start_sample_server().await;
    let tree = client_for(&server).crawl("").await.unwrap();

    let value = serde_json::to_value(&tree).unwrap();
    assert_eq!(
        value["meta-data"]["placement"],
        json!({"availability-zone": "us-east-1a", "region": "us-east-1"})
    );
    assert_eq!(value["meta-data"]["security-groups"], json!(["default", "web"]));
    assert_eq!(value["meta-data"]["public-keys"], json!(["0=my-key"]));
    assert_eq!(
        value["dynamic"]["instance-identity"]["document"]["accountId"],
        json!("123456789012")
    );
    assert_eq!(value["user-data"], json!("#!/bin/bash\necho hello\n"));
}

#[tokio::test]
async fn opaque_blobs_are_kept_verbatim() {
    let server = start_sample_server().await;
    let tree = client_for(&server)
        .crawl("dynamic/instance-identity")
        .await
        .unwrap();

    let expected = SAMPLE_INSTANCE
        .iter()
        .find(|(path, _)| *path == "dynamic/instance-identity/pkcs7")
        .map(|(_, body)| body.to_string())
        .unwrap();
    assert_eq!(
        tree.lookup_path("dynamic/instance-identity/pkcs7"),
        Some(&LeafValue::Scalar(expected))
    );
}

#[tokio::test]
async fn crawled_tree_survives_json_round_trip() {
    let server = start_sample_server().await;
    let tree = client_for(&server).crawl("").await.unwrap();

    let encoded = serde_json::to_string_pretty(&tree).unwrap();
    let decoded: serde_json::Value = serde_json::from_str(&encoded).unwrap();
    assert_eq!(decoded, serde_json::to_value(&tree).unwrap());
}

#[tokio::test]
async fn nested_listings_become_nested_nodes() {
    let server = MockServer::start().await;
    mount_tree(
        &server,
        &[
            ("meta-data", "network/\n"),
            ("meta-data/network", "interfaces/\n"),
            ("meta-data/network/interfaces", "macs/\n"),
            ("meta-data/network/interfaces/macs", "0e:49:61:0f:c3:11/\n0e:49:61:0f:c3:12/\n"),
            ("meta-data/network/interfaces/macs/0e:49:61:0f:c3:11", "device-number\n"),
            ("meta-data/network/interfaces/macs/0e:49:61:0f:c3:11/device-number", "0"),
            ("meta-data/network/interfaces/macs/0e:49:61:0f:c3:12", "device-number\n"),
            ("meta-data/network/interfaces/macs/0e:49:61:0f:c3:12/device-number", "1"),
        ],
    )
    .await;

    let tree = client_for(&server).crawl("meta-data/network").await.unwrap();
    let mut expected = Node::new();
    expected.insert_at(
        &["meta-data", "network", "interfaces", "macs", "0e:49:61:0f:c3:11", "device-number"],
        LeafValue::Scalar("0".to_string()),
    );
    expected.insert_at(
        &["meta-data", "network", "interfaces", "macs", "0e:49:61:0f:c3:12", "device-number"],
        LeafValue::Scalar("1".to_string()),
    );
    assert_eq!(tree, expected);
}

#[tokio::test]
async fn server_error_demotes_parent_instead_of_failing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/latest/meta-data/placement/region"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    mount_tree(
        &server,
        &[
            ("meta-data", "ami-id\nplacement/\n"),
            ("meta-data/ami-id", "ami-1"),
            ("meta-data/placement", "region\n"),
        ],
    )
    .await;

    let tree = client_for(&server).crawl("meta-data").await.unwrap();
    assert_eq!(
        serde_json::to_value(&tree).unwrap(),
        json!({"meta-data": {"ami-id": "ami-1", "placement": "region"}})
    );
}

#[tokio::test]
async fn unreachable_endpoint_fails_the_crawl() {
    let config = ImdsConfig::default().with_endpoint("http://127.0.0.1:1");
    let client = ImdsClient::new(config).unwrap();
    let err = client.crawl("meta-data").await.unwrap_err();
    assert!(matches!(err, ImdsError::Unreachable { .. }), "{err:?}");
}

#[tokio::test]
async fn session_token_is_forwarded() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/latest/meta-data/instance-id"))
        .and(header(TOKEN_HEADER, "secret-token"))
        .respond_with(ResponseTemplate::new(200).set_body_string("i-abc"))
        // Once as a guessed listing, once more after `i-abc` 404s.
        .expect(2)
        .mount(&server)
        .await;

    let config = ImdsConfig {
        token: Some("secret-token".to_string()),
        ..config_for(&server)
    };
    let crawler = TreeCrawler::new(Arc::new(HttpTransport::new(&config).unwrap()));
    let tree = crawler.crawl("meta-data/instance-id").await.unwrap();
    assert_eq!(
        serde_json::to_value(&tree).unwrap(),
        json!({"meta-data": {"instance-id": "i-abc"}})
    );
}
