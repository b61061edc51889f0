use imds_core::LeafValue;
use imds_test_support::client_for;
use imds_test_support::mount_tree;
use imds_test_support::next_snapshot;
use pretty_assertions::assert_eq;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use wiremock::MockServer;

fn instance_type(snapshot: &imds_core::Node) -> Option<&str> {
    snapshot
        .lookup_path("meta-data/instance-type")
        .and_then(LeafValue::as_scalar)
}

#[tokio::test]
async fn watch_publishes_when_the_service_changes() {
    let server = MockServer::start().await;
    mount_tree(&server, &[("meta-data/instance-type", "t3.micro")]).await;
    let client = client_for(&server);
    let cancel = CancellationToken::new();
    let mut stream = client
        .watch("meta-data/instance-type", cancel.clone())
        .unwrap();

    let first = next_snapshot(&mut stream).await;
    assert_eq!(instance_type(&first), Some("t3.micro"));

    server.reset().await;
    mount_tree(&server, &[("meta-data/instance-type", "m5.large")]).await;

    // Ticks that land between the reset and the remount see an empty tree.
    let changed = tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            let snapshot = next_snapshot(&mut stream).await;
            if instance_type(&snapshot) == Some("m5.large") {
                break snapshot;
            }
        }
    })
    .await
    .unwrap();
    assert_eq!(instance_type(&changed), Some("m5.large"));

    cancel.cancel();
    let end = tokio::time::timeout(Duration::from_secs(5), stream.recv())
        .await
        .unwrap();
    assert_eq!(end, None);
}
