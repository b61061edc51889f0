use imds_test_support::client_for;
use imds_test_support::mount_tree;
use pretty_assertions::assert_eq;
use time::macros::datetime;
use wiremock::MockServer;

#[tokio::test]
async fn spot_interruption_notices_are_typed() {
    let server = MockServer::start().await;
    mount_tree(
        &server,
        &[
            (
                "meta-data/spot/instance-action",
                r#"{"action": "stop", "time": "2017-09-18T08:22:00Z"}"#,
            ),
            ("meta-data/spot/termination-time", "2017-09-18T08:22:00Z\n"),
            ("meta-data/events/maintenance/scheduled", "[]"),
        ],
    )
    .await;
    let client = client_for(&server);

    let action = client.spot_instance_action().await.unwrap().unwrap();
    assert_eq!(action.action, "stop");
    assert_eq!(action.time, datetime!(2017-09-18 08:22:00 UTC));
    assert_eq!(
        client.spot_termination_time().await.unwrap(),
        Some(datetime!(2017-09-18 08:22:00 UTC))
    );
    assert_eq!(client.rebalance_recommendation().await.unwrap(), None);
    assert!(client.scheduled_maintenance().await.unwrap().is_empty());
}
