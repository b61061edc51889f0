use imds_test_support::client_for;
use imds_test_support::start_sample_server;
use pretty_assertions::assert_eq;

async fn requests_for(server: &wiremock::MockServer, path: &str) -> usize {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|request| request.url.path() == path)
        .count()
}

#[tokio::test]
async fn bare_names_resolve_to_full_paths() {
    let server = start_sample_server().await;
    let client = client_for(&server);

    assert_eq!(
        client.find_key("region").await.unwrap().as_deref(),
        Some("meta-data/placement/region")
    );
    assert_eq!(
        client.find_key("signature").await.unwrap().as_deref(),
        Some("dynamic/instance-identity/signature")
    );
    // Keys inside JSON documents are not indexed.
    assert_eq!(client.find_key("accountId").await.unwrap(), None);
    assert_eq!(requests_for(&server, "/latest/meta-data").await, 1);
    assert_eq!(requests_for(&server, "/latest/dynamic").await, 1);
}

#[tokio::test]
async fn typos_get_suggestions() {
    let server = start_sample_server().await;
    let client = client_for(&server);

    assert_eq!(client.find_key("instanc-typ").await.unwrap(), None);
    let suggestions = client.find_similar("instanc-typ").await.unwrap();
    assert_eq!(suggestions.first().map(String::as_str), Some("instance-type"));
    assert!(suggestions.len() <= client.config().max_suggestions);
}
